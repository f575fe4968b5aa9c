//! Remote repositories for the dashboard aggregator.

pub mod admin_repository;

pub use admin_repository::AdminRepository;
