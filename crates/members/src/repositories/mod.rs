//! Remote repositories for member management.

pub mod profiles_repository;

pub use profiles_repository::ProfilesRepository;
