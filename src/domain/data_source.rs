// Data source catalog entry
use serde::{Deserialize, Serialize};

/// A remote endpoint that supplies a time series or aggregate. Widgets
/// reference sources by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl DataSource {
    pub fn new(id: String, name: String, url: String, description: String) -> Self {
        Self {
            id,
            name,
            url,
            description,
        }
    }

    /// Name shown in source pickers, derived from the url when the
    /// catalog leaves it blank.
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        Self::format_name(&self.url)
    }

    fn format_name(url: &str) -> String {
        // "/metrics/daily_revenue/" -> "daily revenue"
        url.trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .replace(['_', '-'], " ")
    }
}
