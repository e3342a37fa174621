// Infrastructure layer - External dependencies and adapters
pub mod chunked_stream;
pub mod config;
pub mod fallback_feed;
pub mod file_repository;
pub mod http_data_feed;
pub mod http_response;
pub mod memory_repository;
