//! Remote repositories: each one translates domain calls 1:1 into store
//! requests. The matching traits live beside the services that consume
//! them.

pub mod announcements_repository;
pub mod events_repository;
pub mod gallery_repository;
pub mod plans_repository;

pub use announcements_repository::AnnouncementsRepository;
pub use events_repository::EventsRepository;
pub use gallery_repository::GalleryRepository;
pub use plans_repository::PlansRepository;
