// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use widget_dashboard::application::catalog_service::CatalogService;
use widget_dashboard::application::dashboard_repository::DashboardRepository;
use widget_dashboard::application::dashboard_service::DashboardService;
use widget_dashboard::application::streaming_service::StreamingRenderService;
use widget_dashboard::application::widget_renderer::WidgetRenderer;
use widget_dashboard::infrastructure::config::{load_app_config, StorageBackend};
use widget_dashboard::infrastructure::fallback_feed::FallbackDataFeed;
use widget_dashboard::infrastructure::file_repository::FileDashboardRepository;
use widget_dashboard::infrastructure::http_data_feed::HttpDataFeed;
use widget_dashboard::infrastructure::memory_repository::InMemoryDashboardRepository;
use widget_dashboard::presentation::app_state::AppState;
use widget_dashboard::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_app_config()?;

    // Data feed (infrastructure layer)
    let feed = Arc::new(FallbackDataFeed::new(Arc::new(HttpDataFeed::new(&config.data_api)?)));

    let repository: Arc<dyn DashboardRepository> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryDashboardRepository::new()),
        StorageBackend::File => Arc::new(FileDashboardRepository::open(&config.storage.path).await?),
    };

    // Services (application layer)
    let cell_size = config.layout.cell_size;
    let renderer = WidgetRenderer::new(feed.clone());
    let state = Arc::new(AppState {
        catalog_service: CatalogService::new(feed),
        dashboard_service: DashboardService::new(repository, renderer.clone(), cell_size),
        streaming_service: StreamingRenderService::new(renderer, cell_size),
    });

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!("Starting widget-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
