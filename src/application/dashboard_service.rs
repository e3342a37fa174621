// Dashboard service - Use cases for managing and rendering dashboards
use crate::application::dashboard_repository::DashboardRepository;
use crate::application::widget_renderer::WidgetRenderer;
use crate::domain::chart::RenderedWidget;
use crate::domain::component_store::ComponentStore;
use crate::domain::dashboard::{Dashboard, DEFAULT_DESCRIPTION, DEFAULT_NAME};
use crate::domain::layout::{GridLayout, Point};
use crate::domain::widget::WidgetConfig;
use crate::domain::widget_form::{validate_component, WidgetDraft};
use crate::error::{DashboardError, Result, ValidationError};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Partial update of a dashboard; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub components: Option<Vec<WidgetConfig>>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn DashboardRepository>,
    renderer: WidgetRenderer,
    cell_size: u32,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn DashboardRepository>, renderer: WidgetRenderer, cell_size: u32) -> Self {
        Self {
            repository,
            renderer,
            cell_size,
        }
    }

    pub fn renderer(&self) -> &WidgetRenderer {
        &self.renderer
    }

    /// A read-only layout seeded with the dashboard's positions.
    pub fn layout_for(&self, dashboard: &Dashboard) -> GridLayout {
        let mut layout = GridLayout::new(self.cell_size);
        layout.initialize_positions(&dashboard.components);
        layout
    }

    pub async fn list_dashboards(&self) -> Result<Vec<Dashboard>> {
        let mut dashboards = self
            .repository
            .list()
            .await
            .map_err(DashboardError::storage)?;
        dashboards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(dashboards)
    }

    pub async fn get_dashboard(&self, id: &str) -> Result<Dashboard> {
        self.repository
            .get(id)
            .await
            .map_err(DashboardError::storage)?
            .ok_or_else(|| DashboardError::dashboard_not_found(id))
    }

    pub async fn create_dashboard(
        &self,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Dashboard> {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let description = description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let dashboard = self.persist(Dashboard::new(name, description)).await?;
        tracing::info!("Created dashboard {}", dashboard.id);
        Ok(dashboard)
    }

    /// Validate and persist a full dashboard.
    pub async fn save_dashboard(&self, dashboard: Dashboard) -> Result<Dashboard> {
        validate_dashboard(&dashboard, self.cell_size)?;
        self.persist(dashboard).await
    }

    pub async fn update_dashboard(&self, id: &str, update: DashboardUpdate) -> Result<Dashboard> {
        let mut dashboard = self.get_dashboard(id).await?;
        if let Some(name) = update.name {
            dashboard.name = name;
        }
        if let Some(description) = update.description {
            dashboard.description = description;
        }
        if let Some(components) = update.components {
            dashboard.components = components;
        }
        self.save_dashboard(dashboard).await
    }

    pub async fn delete_dashboard(&self, id: &str) -> Result<()> {
        let removed = self.repository.delete(id).await.map_err(|e| {
            tracing::error!("Failed to delete dashboard {}: {:#}", id, e);
            DashboardError::storage(e)
        })?;
        if !removed {
            return Err(DashboardError::dashboard_not_found(id));
        }
        tracing::info!("Deleted dashboard {}", id);
        Ok(())
    }

    pub async fn add_component(&self, dashboard_id: &str, draft: WidgetDraft) -> Result<WidgetConfig> {
        let mut dashboard = self.get_dashboard(dashboard_id).await?;
        let component = draft.into_config()?;

        let mut store = ComponentStore::new(std::mem::take(&mut dashboard.components));
        store.add(component.clone())?;
        dashboard.components = store.into_vec();

        self.persist(dashboard).await?;
        Ok(component)
    }

    pub async fn update_component(
        &self,
        dashboard_id: &str,
        component_id: &str,
        draft: WidgetDraft,
    ) -> Result<WidgetConfig> {
        let mut dashboard = self.get_dashboard(dashboard_id).await?;
        let existing = dashboard
            .component(component_id)
            .ok_or_else(|| DashboardError::component_not_found(component_id))?;
        let updated = draft.apply_to(existing)?;

        let mut store = ComponentStore::new(std::mem::take(&mut dashboard.components));
        store.replace(updated.clone());
        dashboard.components = store.into_vec();

        self.persist(dashboard).await?;
        Ok(updated)
    }

    pub async fn remove_component(&self, dashboard_id: &str, component_id: &str) -> Result<()> {
        let mut dashboard = self.get_dashboard(dashboard_id).await?;
        let mut store = ComponentStore::new(std::mem::take(&mut dashboard.components));
        store
            .remove(component_id)
            .ok_or_else(|| DashboardError::component_not_found(component_id))?;
        dashboard.components = store.into_vec();

        self.persist(dashboard).await?;
        Ok(())
    }

    /// Drag `component_id` to a pointer position and persist the snapped
    /// placement.
    pub async fn move_component(
        &self,
        dashboard_id: &str,
        component_id: &str,
        pointer: Point,
        origin: Point,
    ) -> Result<WidgetConfig> {
        let mut dashboard = self.get_dashboard(dashboard_id).await?;
        let mut layout = self.layout_for(&dashboard);
        layout.set_editable(true);

        if !layout.begin_drag(component_id) {
            return Err(DashboardError::component_not_found(component_id));
        }
        let components = layout
            .drop_at(pointer, origin, &dashboard.components)
            .ok_or_else(|| DashboardError::component_not_found(component_id))?;
        dashboard.components = components;

        let saved = self.persist(dashboard).await?;
        saved
            .component(component_id)
            .cloned()
            .ok_or_else(|| DashboardError::component_not_found(component_id))
    }

    pub async fn render_component(&self, dashboard_id: &str, component_id: &str) -> Result<RenderedWidget> {
        let dashboard = self.get_dashboard(dashboard_id).await?;
        let component = dashboard
            .component(component_id)
            .ok_or_else(|| DashboardError::component_not_found(component_id))?;
        Ok(self.renderer.render(component).await)
    }

    async fn persist(&self, dashboard: Dashboard) -> Result<Dashboard> {
        let id = dashboard.id.clone();
        self.repository.save(dashboard).await.map_err(|e| {
            tracing::error!("Failed to save dashboard {}: {:#}", id, e);
            DashboardError::storage(e)
        })
    }
}

/// Positions must sit on grid corners; `move_component` is the way to
/// place a widget from a raw pointer position.
fn validate_dashboard(dashboard: &Dashboard, cell_size: u32) -> std::result::Result<(), ValidationError> {
    if dashboard.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    let mut ids = HashSet::new();
    for component in &dashboard.components {
        if !ids.insert(component.id.as_str()) {
            return Err(ValidationError::DuplicateComponent(component.id.clone()));
        }
        if cell_size > 0 && (component.x % cell_size != 0 || component.y % cell_size != 0) {
            return Err(ValidationError::OffGrid {
                id: component.id.clone(),
                cell: cell_size,
            });
        }
        validate_component(component)?;
    }
    Ok(())
}
