//! AYF Portal Content Crate
//!
//! Domain managers for the public site and the admin console: events (with
//! RSVPs), announcements, the photo gallery, and the yearly programme.
//! Each manager pairs a service with a repository that translates calls
//! 1:1 into remote store requests.
//!
//! ## Architecture
//!
//! - **Entities**: domain models ([`Event`], [`Announcement`], [`GalleryItem`], [`YearPlan`])
//! - **Services**: business logic, gated on the injected [`ayf_auth::Identity`]
//! - **Repositories**: pass-through data access against the remote store
//! - **Types**: errors and query option structs

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;

pub use entities::{
    Announcement, CreateAnnouncementRequest, CreateEventRequest, CreatePlanRequest, Event,
    EventStats, EventStatus, GalleryItem, ImageUpload, PlanDocumentKind, Rsvp, RsvpStatus,
    UpdateAnnouncementRequest, UpdateEventRequest, UpdatePlanRequest, YearPlan,
};
pub use repositories::{
    AnnouncementsRepository, EventsRepository, GalleryRepository, PlansRepository,
};
pub use services::{
    AnnouncementsRepo, AnnouncementsService, EventsRepo, EventsService, GalleryRepo,
    GalleryService, PlansRepo, PlansService,
};
pub use types::{
    AnnouncementQuery, AnnouncementsError, AnnouncementsResult, EventListFilter, EventQuery,
    EventSearch, EventsError, EventsResult, GalleryError, GalleryResult, PlansError, PlansResult,
};
