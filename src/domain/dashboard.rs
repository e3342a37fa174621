// Dashboard domain model
use super::widget::WidgetConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "New Dashboard";
pub const DEFAULT_DESCRIPTION: &str = "A new dashboard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Empty until the repository assigns one.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub components: Vec<WidgetConfig>,
}

impl Dashboard {
    /// An empty, not yet persisted dashboard.
    pub fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
            components: Vec::new(),
        }
    }

    pub fn generate_id() -> String {
        format!("dash_{}", uuid::Uuid::new_v4().simple())
    }

    pub fn component(&self, id: &str) -> Option<&WidgetConfig> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Stamp a modification time that never precedes creation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Apply upsert rules before storing: assign an id when missing, keep
    /// the stored creation time, stamp the modification time.
    pub fn prepared_for_save(mut self, existing: Option<&Dashboard>, now: DateTime<Utc>) -> Self {
        if self.id.is_empty() {
            self.id = Self::generate_id();
        }
        if let Some(existing) = existing {
            self.created_at = existing.created_at;
        }
        self.touch(now);
        self
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DEFAULT_NAME.to_string(), DEFAULT_DESCRIPTION.to_string())
    }
}
