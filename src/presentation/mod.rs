// Presentation layer - HTTP routing
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_component, create_dashboard, delete_dashboard, drop_component, get_dashboard,
    health_check, list_dashboards, list_data_sources, remove_component, render_component,
    stream_dashboard, update_component, update_dashboard, widget_options,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Responses are compressed by the handlers, so no CompressionLayer here.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/data-sources", get(list_data_sources))
        .route("/widget-options", get(widget_options))
        .route("/dashboards", get(list_dashboards).post(create_dashboard))
        .route(
            "/dashboards/:id",
            get(get_dashboard).put(update_dashboard).delete(delete_dashboard),
        )
        .route("/dashboards/:id/components", post(add_component))
        .route(
            "/dashboards/:id/components/:component_id",
            put(update_component).delete(remove_component),
        )
        .route(
            "/dashboards/:id/components/:component_id/drop",
            post(drop_component),
        )
        .route(
            "/dashboards/:id/components/:component_id/render",
            get(render_component),
        )
        .route("/dashboards/:id/render", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
