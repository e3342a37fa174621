pub mod catalog_service;
pub mod dashboard_repository;
pub mod dashboard_service;
pub mod dashboard_session;
pub mod data_feed;
pub mod streaming_service;
pub mod widget_renderer;

#[cfg(test)]
pub mod test_support;
