//! Domain entities flowing through the content managers.

pub mod announcement;
pub mod event;
pub mod gallery;
pub mod plan;

pub use announcement::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest};
pub use event::{
    CreateEventRequest, Event, EventStats, EventStatus, Rsvp, RsvpStatus, UpdateEventRequest,
};
pub use gallery::{GalleryItem, ImageUpload};
pub use plan::{CreatePlanRequest, PlanDocumentKind, UpdatePlanRequest, YearPlan};
