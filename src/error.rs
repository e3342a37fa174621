//! Error types shared by the dashboard services.

use thiserror::Error;

/// Input problems that block an operation before anything is persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a data source must be selected")]
    MissingSource,

    #[error("a symbol must be selected")]
    MissingSymbol,

    #[error("at most {max} data sources can be selected")]
    TooManySources { max: usize },

    #[error("data source {0} is already selected")]
    DuplicateSource(String),

    #[error("custom comparison requires all four period dates")]
    MissingCustomDates,

    #[error("invalid custom dates: {0}")]
    InvalidCustomDates(String),

    #[error("component {0} already exists on this dashboard")]
    DuplicateComponent(String),

    #[error("component {id} is not aligned to the {cell}-unit grid")]
    OffGrid { id: String, cell: u32 },

    #[error("dashboard name must not be blank")]
    BlankName,

    #[error("dashboard is not in edit mode")]
    NotEditing,

    #[error("deletion must be confirmed")]
    DeleteNotConfirmed,
}

/// The main error type for dashboard operations.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence backend failures (write paths surface these).
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),

    /// Data feed failures that were not absorbed by a fallback.
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn dashboard_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "dashboard",
            id: id.into(),
        }
    }

    pub fn component_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "component",
            id: id.into(),
        }
    }

    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }

    pub fn transport(err: anyhow::Error) -> Self {
        Self::Transport(err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
