// In-memory dashboard repository
use crate::application::dashboard_repository::DashboardRepository;
use crate::domain::dashboard::Dashboard;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryDashboardRepository {
    dashboards: RwLock<HashMap<String, Dashboard>>,
}

impl InMemoryDashboardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DashboardRepository for InMemoryDashboardRepository {
    async fn list(&self) -> anyhow::Result<Vec<Dashboard>> {
        Ok(self.dashboards.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Dashboard>> {
        Ok(self.dashboards.read().await.get(id).cloned())
    }

    async fn save(&self, dashboard: Dashboard) -> anyhow::Result<Dashboard> {
        let id = dashboard.id.clone();
        let mut dashboards = self.dashboards.write().await;
        let saved = dashboard.prepared_for_save(dashboards.get(&id), Utc::now());
        dashboards.insert(saved.id.clone(), saved.clone());
        tracing::debug!("Saved dashboard {} ({} components)", saved.id, saved.components.len());
        Ok(saved)
    }

    async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.dashboards.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_save_assigns_id_and_roundtrips() {
        let repo = InMemoryDashboardRepository::new();
        let saved = repo.save(Dashboard::default()).await.unwrap();

        assert!(saved.id.starts_with("dash_"));
        assert!(saved.updated_at >= saved.created_at);
        assert_eq!(repo.get(&saved.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_resave_keeps_created_at() {
        let repo = InMemoryDashboardRepository::new();
        let saved = repo.save(Dashboard::default()).await.unwrap();

        let mut changed = saved.clone();
        changed.name = "Renamed".to_string();
        changed.created_at = saved.created_at + Duration::days(30);
        let resaved = repo.save(changed).await.unwrap();

        assert_eq!(resaved.id, saved.id);
        assert_eq!(resaved.created_at, saved.created_at);
        assert_eq!(resaved.name, "Renamed");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let repo = InMemoryDashboardRepository::new();
        let saved = repo.save(Dashboard::default()).await.unwrap();

        assert!(repo.delete(&saved.id).await.unwrap());
        assert!(!repo.delete(&saved.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
