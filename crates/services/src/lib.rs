#![forbid(unsafe_code)]

pub mod dashboard_service;
pub mod error;
pub mod projection_service;

pub use aac_core::Clock;

pub use dashboard_service::{DashboardService, LogSnapshot};
pub use error::{DashboardError, ProjectionError};
pub use projection_service::{IndependenceDuration, ProjectionConfig, ProjectionService};
