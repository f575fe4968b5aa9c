//! Business logic for the dashboard aggregator.

pub mod dashboard_service;
pub mod mock_repositories;

pub use dashboard_service::{DashboardRepo, DashboardService};
