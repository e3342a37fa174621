// HTTP request handlers
use crate::application::dashboard_service::DashboardUpdate;
use crate::domain::layout::Point;
use crate::domain::widget_form::WidgetDraft;
use crate::error::DashboardError;
use crate::infrastructure::chunked_stream::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maps service errors onto HTTP statuses with a `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
            DashboardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateDashboardRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Pointer position at release, in the same space as `origin` (the grid
/// container's top-left corner). `origin` defaults to (0, 0).
#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub pointer: Point,
    #[serde(default)]
    pub origin: Point,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_data_sources(headers: HeaderMap, State(state): State<Arc<AppState>>) -> ApiResult {
    let sources = state
        .catalog_service
        .list_data_sources()
        .await
        .map_err(DashboardError::transport)?;
    Ok(respond(StatusCode::OK, &sources, &headers).await)
}

pub async fn widget_options(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(StatusCode::OK, &state.catalog_service.widget_options(), &headers).await
}

pub async fn list_dashboards(headers: HeaderMap, State(state): State<Arc<AppState>>) -> ApiResult {
    let dashboards = state.dashboard_service.list_dashboards().await?;
    Ok(respond(StatusCode::OK, &dashboards, &headers).await)
}

pub async fn create_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDashboardRequest>,
) -> ApiResult {
    let dashboard = state
        .dashboard_service
        .create_dashboard(request.name, request.description)
        .await?;
    Ok(respond(StatusCode::CREATED, &dashboard, &headers).await)
}

pub async fn get_dashboard(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let dashboard = state.dashboard_service.get_dashboard(&id).await?;
    Ok(respond(StatusCode::OK, &dashboard, &headers).await)
}

pub async fn update_dashboard(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<DashboardUpdate>,
) -> ApiResult {
    let dashboard = state.dashboard_service.update_dashboard(&id, update).await?;
    Ok(respond(StatusCode::OK, &dashboard, &headers).await)
}

pub async fn delete_dashboard(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state.dashboard_service.delete_dashboard(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn add_component(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<WidgetDraft>,
) -> ApiResult {
    let component = state.dashboard_service.add_component(&id, draft).await?;
    Ok(respond(StatusCode::CREATED, &component, &headers).await)
}

pub async fn update_component(
    Path((id, component_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<WidgetDraft>,
) -> ApiResult {
    let component = state
        .dashboard_service
        .update_component(&id, &component_id, draft)
        .await?;
    Ok(respond(StatusCode::OK, &component, &headers).await)
}

pub async fn remove_component(
    Path((id, component_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state
        .dashboard_service
        .remove_component(&id, &component_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Drop a dragged component; the stored position is snapped to the grid
pub async fn drop_component(
    Path((id, component_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<DropRequest>,
) -> ApiResult {
    let component = state
        .dashboard_service
        .move_component(&id, &component_id, request.pointer, request.origin)
        .await?;
    Ok(respond(StatusCode::OK, &component, &headers).await)
}

pub async fn render_component(
    Path((id, component_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let rendered = state
        .dashboard_service
        .render_component(&id, &component_id)
        .await?;
    Ok(respond(StatusCode::OK, &rendered, &headers).await)
}

/// Stream a dashboard render (progressive loading)
pub async fn stream_dashboard(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let dashboard = state.dashboard_service.get_dashboard(&id).await?;
    let rx = state.streaming_service.stream_dashboard(dashboard).await;
    Ok(stream_from_receiver(rx, accepts_brotli(&headers)).into_response())
}
