//! Business logic services for member management.

pub mod members_service;
pub mod mock_repositories;

pub use members_service::{MembersRepo, MembersService};
