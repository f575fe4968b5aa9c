//! Shared types for the content managers.

pub mod errors;
pub mod queries;

pub use errors::{
    AnnouncementsError, AnnouncementsResult, EventsError, EventsResult, GalleryError,
    GalleryResult, PlansError, PlansResult,
};
pub use queries::{AnnouncementQuery, EventListFilter, EventQuery, EventSearch};
