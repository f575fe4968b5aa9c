//! Member domain entities.

pub mod profile;

pub use profile::{
    CreateProfileRequest, DirectoryEntry, ProfileRole, UpdateProfileRequest, UserProfile,
};
