// Dashboard session - the interactive shell around one open dashboard
use crate::application::catalog_service::CatalogService;
use crate::application::dashboard_service::DashboardService;
use crate::domain::chart::RenderedWidget;
use crate::domain::component_store::ComponentStore;
use crate::domain::dashboard::Dashboard;
use crate::domain::data_source::DataSource;
use crate::domain::layout::{GridLayout, Placement, Point};
use crate::domain::widget::WidgetConfig;
use crate::domain::widget_form::WidgetDraft;
use crate::error::{DashboardError, Result, ValidationError};
use futures::future::join_all;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// User-facing message for a failed dashboard load.
    pub fn for_load_error(error: &DashboardError) -> Self {
        match error {
            DashboardError::NotFound { .. } => Self::error("Dashboard not found"),
            _ => Self::error("Failed to load dashboard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Edit,
}

pub struct DashboardSession {
    service: DashboardService,
    dashboard: Dashboard,
    components: ComponentStore,
    layout: GridLayout,
    data_sources: Vec<DataSource>,
    mode: Mode,
    draft_name: String,
    draft_description: String,
    notifications: Vec<Notification>,
}

impl DashboardSession {
    /// Load the data source catalog and the dashboard. A catalog failure is
    /// reported as a notification; a missing dashboard is an error (see
    /// `Notification::for_load_error`).
    pub async fn open(service: DashboardService, catalog: &CatalogService, id: &str) -> Result<Self> {
        let mut notifications = Vec::new();
        let data_sources = match catalog.list_data_sources().await {
            Ok(sources) => sources,
            Err(e) => {
                tracing::warn!("Failed to load data sources: {:#}", e);
                notifications.push(Notification::error("Failed to load data sources"));
                Vec::new()
            }
        };

        let dashboard = service.get_dashboard(id).await?;
        let layout = service.layout_for(&dashboard);

        Ok(Self {
            service,
            components: ComponentStore::new(dashboard.components.clone()),
            layout,
            data_sources,
            mode: Mode::Read,
            draft_name: dashboard.name.clone(),
            draft_description: dashboard.description.clone(),
            dashboard,
            notifications,
        })
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn components(&self) -> &[WidgetConfig] {
        self.components.as_slice()
    }

    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.layout.placements()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    /// Name as currently shown: the buffered edit while editing.
    pub fn name(&self) -> &str {
        &self.draft_name
    }

    pub fn description(&self) -> &str {
        &self.draft_description
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn enter_edit(&mut self) {
        self.mode = Mode::Edit;
        self.layout.set_editable(true);
    }

    /// Leave edit mode and throw away buffered name/description edits.
    pub fn cancel_edit(&mut self) {
        self.draft_name = self.dashboard.name.clone();
        self.draft_description = self.dashboard.description.clone();
        self.mode = Mode::Read;
        self.layout.set_editable(false);
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.require_edit()?;
        self.draft_name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.require_edit()?;
        self.draft_description = description.into();
        Ok(())
    }

    pub fn add_component(&mut self, draft: WidgetDraft) -> Result<WidgetConfig> {
        self.require_edit()?;
        let component = draft.into_config()?;
        self.components.add(component.clone())?;
        self.sync_layout();
        self.notifications
            .push(Notification::success("Component added successfully"));
        Ok(component)
    }

    pub fn edit_component(&mut self, id: &str, draft: WidgetDraft) -> Result<WidgetConfig> {
        self.require_edit()?;
        let existing = self
            .components
            .get(id)
            .ok_or_else(|| DashboardError::component_not_found(id))?;
        let updated = draft.apply_to(existing)?;
        self.components.replace(updated.clone());
        self.sync_layout();
        self.notifications
            .push(Notification::success("Component updated successfully"));
        Ok(updated)
    }

    pub fn remove_component(&mut self, id: &str) -> Result<WidgetConfig> {
        self.require_edit()?;
        let removed = self
            .components
            .remove(id)
            .ok_or_else(|| DashboardError::component_not_found(id))?;
        self.sync_layout();
        self.notifications
            .push(Notification::success("Component removed successfully"));
        Ok(removed)
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        self.layout.begin_drag(id)
    }

    /// Drop the dragged widget. Returns whether anything moved.
    pub fn drop_at(&mut self, pointer: Point, origin: Point) -> bool {
        match self.layout.drop_at(pointer, origin, self.components.as_slice()) {
            Some(updated) => {
                self.components.replace_all(updated);
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.layout.end_drag();
    }

    /// Persist buffered edits and the current components, then return to
    /// read mode. On failure the session stays in edit mode.
    pub async fn save(&mut self) -> Result<()> {
        self.require_edit()?;

        let mut dashboard = self.dashboard.clone();
        dashboard.name = self.draft_name.clone();
        dashboard.description = self.draft_description.clone();
        dashboard.components = self.components.as_slice().to_vec();

        match self.service.save_dashboard(dashboard).await {
            Ok(saved) => {
                self.components = ComponentStore::new(saved.components.clone());
                self.dashboard = saved;
                self.sync_layout();
                self.cancel_edit();
                self.notifications
                    .push(Notification::success("Dashboard saved successfully"));
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .push(Notification::error(format!("Failed to save dashboard: {}", e)));
                Err(e)
            }
        }
    }

    /// Delete the dashboard; the caller must pass the user's confirmation.
    pub async fn delete(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(ValidationError::DeleteNotConfirmed.into());
        }
        match self.service.delete_dashboard(&self.dashboard.id).await {
            Ok(()) => {
                self.notifications
                    .push(Notification::success("Dashboard deleted successfully"));
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .push(Notification::error("Failed to delete dashboard"));
                Err(e)
            }
        }
    }

    /// Render every component concurrently, in display order.
    pub async fn render_all(&self) -> Vec<RenderedWidget> {
        let renderer = self.service.renderer();
        join_all(self.components.as_slice().iter().map(|c| renderer.render(c))).await
    }

    fn require_edit(&self) -> std::result::Result<(), ValidationError> {
        if self.is_editing() {
            Ok(())
        } else {
            Err(ValidationError::NotEditing)
        }
    }

    fn sync_layout(&mut self) {
        self.layout.initialize_positions(self.components.as_slice());
    }
}
