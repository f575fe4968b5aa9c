//! AYF Portal Dashboard Crate
//!
//! Read-only summaries for the admin console composed across the domain
//! tables: entity counts, the nearest upcoming events, the freshest
//! announcements, a merged activity feed, full-table backup, per-table CSV
//! export, storage usage, and the data retention sweep.

pub mod export;
pub mod repositories;
pub mod services;
pub mod types;

pub use export::rows_to_csv;
pub use repositories::AdminRepository;
pub use services::{DashboardRepo, DashboardService};
pub use types::{
    ActivityEntry, ActivityKind, BackupTable, DashboardCounts, DashboardError, DashboardResult,
    DashboardStats, StorageUsage,
};
