//! Business logic services for the content managers.
//!
//! Services gate writes on the injected identity, sequence the remote
//! calls, and own the derived-aggregate and file-upload protocols. Each
//! service is generic over its repository trait so tests run against the
//! in-memory mocks.

pub mod announcements_service;
pub mod events_service;
pub mod gallery_service;
pub mod mock_repositories;
pub mod plans_service;

pub use announcements_service::{AnnouncementsRepo, AnnouncementsService};
pub use events_service::{EventsRepo, EventsService};
pub use gallery_service::{GalleryRepo, GalleryService};
pub use plans_service::{PlansRepo, PlansService};
