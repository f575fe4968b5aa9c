//! AYF Portal Members Crate
//!
//! Member profiles (one row per auth account) and the admin console's
//! account operations: directory listing, admin account creation, role
//! changes, deletion. The privileged operations require an administrator
//! identity and the store's service role key.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;

pub use entities::{
    CreateProfileRequest, DirectoryEntry, ProfileRole, UpdateProfileRequest, UserProfile,
};
pub use repositories::ProfilesRepository;
pub use services::{MembersRepo, MembersService};
pub use types::{MembersError, MembersResult};
