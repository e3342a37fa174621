// Repository trait for dashboard persistence
use crate::domain::dashboard::Dashboard;
use async_trait::async_trait;

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// List all stored dashboards
    async fn list(&self) -> anyhow::Result<Vec<Dashboard>>;

    /// Load a single dashboard by id
    async fn get(&self, id: &str) -> anyhow::Result<Option<Dashboard>>;

    /// Upsert by id. An empty id gets a fresh one; an existing record keeps
    /// its creation time and `updated_at` is stamped with the current time.
    async fn save(&self, dashboard: Dashboard) -> anyhow::Result<Dashboard>;

    /// Delete a dashboard together with its components. Returns whether a
    /// dashboard was removed.
    async fn delete(&self, id: &str) -> anyhow::Result<bool>;
}
