// JSON file dashboard repository
use crate::application::dashboard_repository::DashboardRepository;
use crate::domain::dashboard::Dashboard;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    dashboards: Vec<Dashboard>,
}

/// All dashboards live in one JSON document. Every write replaces the file
/// through a temporary sibling and a rename.
pub struct FileDashboardRepository {
    path: PathBuf,
    dashboards: RwLock<Vec<Dashboard>>,
}

impl FileDashboardRepository {
    /// Open the store at `path`; a missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreDocument>(&bytes)
                .with_context(|| format!("Failed to parse dashboard store {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read dashboard store {}", path.display()));
            }
        };

        tracing::info!(
            "Loaded {} dashboards from {}",
            document.dashboards.len(),
            path.display()
        );
        Ok(Self {
            path,
            dashboards: RwLock::new(document.dashboards),
        })
    }

    async fn write_document(&self, dashboards: &[Dashboard]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let document = StoreDocument {
            dashboards: dashboards.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&document).context("Failed to serialize dashboards")?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl DashboardRepository for FileDashboardRepository {
    async fn list(&self) -> Result<Vec<Dashboard>> {
        Ok(self.dashboards.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Dashboard>> {
        Ok(self
            .dashboards
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn save(&self, dashboard: Dashboard) -> Result<Dashboard> {
        let mut dashboards = self.dashboards.write().await;
        let index = dashboards.iter().position(|d| d.id == dashboard.id);
        let saved = dashboard.prepared_for_save(index.map(|i| &dashboards[i]), Utc::now());

        let mut next = dashboards.clone();
        match index {
            Some(i) => next[i] = saved.clone(),
            None => next.push(saved.clone()),
        }
        self.write_document(&next).await?;
        *dashboards = next;

        tracing::debug!("Saved dashboard {} to {}", saved.id, self.path.display());
        Ok(saved)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut dashboards = self.dashboards.write().await;
        let Some(index) = dashboards.iter().position(|d| d.id == id) else {
            return Ok(false);
        };

        let mut next = dashboards.clone();
        next.remove(index);
        self.write_document(&next).await?;
        *dashboards = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::widget::{
        CandlestickSettings, ComparisonSettings, Timeframe, WidgetConfig, WidgetKind,
    };
    use std::collections::HashSet;

    fn components() -> Vec<WidgetConfig> {
        vec![
            WidgetConfig {
                id: "component_a".to_string(),
                kind: WidgetKind::Comparison(ComparisonSettings::default()),
                title: "Revenue".to_string(),
                x: 0,
                y: 0,
                width: 400,
                height: 200,
                sources: vec!["/revenue".to_string()],
            },
            WidgetConfig {
                id: "component_b".to_string(),
                kind: WidgetKind::Candlestick(CandlestickSettings {
                    symbol: "BTC".to_string(),
                    timeframe: Timeframe::OneHour,
                }),
                title: String::new(),
                x: 400,
                y: 300,
                width: 600,
                height: 400,
                sources: vec![],
            },
            WidgetConfig {
                id: "component_c".to_string(),
                kind: WidgetKind::Unsupported {
                    kind: "heatmap".to_string(),
                    settings: serde_json::json!({"palette": "viridis"}),
                },
                title: "Legacy".to_string(),
                x: 0,
                y: 500,
                width: 600,
                height: 400,
                sources: vec![],
            },
        ]
    }

    #[tokio::test]
    async fn test_reopen_preserves_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store").join("dashboards.json");

        let repo = FileDashboardRepository::open(&path).await.unwrap();
        let mut dashboard = Dashboard::default();
        dashboard.components = components();
        let saved = repo.save(dashboard).await.unwrap();

        let reopened = FileDashboardRepository::open(&path).await.unwrap();
        let loaded = reopened.get(&saved.id).await.unwrap().unwrap();

        let ids = |d: &Dashboard| d.components.iter().map(|c| c.id.clone()).collect::<HashSet<_>>();
        assert_eq!(ids(&loaded), ids(&saved));
        assert_eq!(loaded.components, saved.components);
        assert_eq!(loaded.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileDashboardRepository::open(dir.path().join("none.json"))
            .await
            .unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboards.json");

        let repo = FileDashboardRepository::open(&path).await.unwrap();
        let kept = repo.save(Dashboard::default()).await.unwrap();
        let removed = repo.save(Dashboard::default()).await.unwrap();
        assert!(repo.delete(&removed.id).await.unwrap());
        assert!(!repo.delete(&removed.id).await.unwrap());

        let reopened = FileDashboardRepository::open(&path).await.unwrap();
        let ids: Vec<_> = reopened
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![kept.id]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboards.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(FileDashboardRepository::open(&path).await.is_err());
    }
}
