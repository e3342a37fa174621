//! Widget dashboards: grid-placed comparison, bar and candlestick widgets
//! rendered from a remote data API, persisted behind a repository trait and
//! served over HTTP.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

pub use error::{DashboardError, Result, ValidationError};
