//! Error types for the content managers.
//!
//! Remote failures are re-thrown to callers; `AuthenticationRequired` and
//! `Validation` are local preconditions raised before any remote call is
//! issued.

use thiserror::Error;

use ayf_store::StoreError;

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("event not found")]
    EventNotFound,

    #[error("not authenticated")]
    AuthenticationRequired,

    #[error("already RSVP'd to this event")]
    AlreadyRsvpd,

    #[error("invalid event data: {0}")]
    Validation(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("remote store error: {0}")]
    Remote(StoreError),
}

#[derive(Debug, Error)]
pub enum AnnouncementsError {
    #[error("announcement not found")]
    AnnouncementNotFound,

    #[error("not authenticated")]
    AuthenticationRequired,

    #[error("invalid announcement data: {0}")]
    Validation(String),

    #[error("remote store error: {0}")]
    Remote(StoreError),
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery item not found")]
    ItemNotFound,

    #[error("not authenticated")]
    AuthenticationRequired,

    #[error("invalid image data: {0}")]
    Validation(String),

    #[error("remote store error: {0}")]
    Remote(StoreError),
}

#[derive(Debug, Error)]
pub enum PlansError {
    #[error("plan not found")]
    PlanNotFound,

    #[error("not authenticated")]
    AuthenticationRequired,

    #[error("a plan already exists for {year}-{month:02}")]
    PlanExists { year: i32, month: u32 },

    #[error("no plans recorded for {0}")]
    EmptyPlanYear(i32),

    #[error("invalid plan data: {0}")]
    Validation(String),

    #[error("remote store error: {0}")]
    Remote(StoreError),
}

pub type EventsResult<T> = Result<T, EventsError>;
pub type AnnouncementsResult<T> = Result<T, AnnouncementsError>;
pub type GalleryResult<T> = Result<T, GalleryError>;
pub type PlansResult<T> = Result<T, PlansError>;

/// Zero-row reads become the domain's own not-found variant.
impl From<StoreError> for EventsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => EventsError::EventNotFound,
            other => EventsError::Remote(other),
        }
    }
}

impl From<StoreError> for AnnouncementsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AnnouncementsError::AnnouncementNotFound,
            other => AnnouncementsError::Remote(other),
        }
    }
}

impl From<StoreError> for GalleryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => GalleryError::ItemNotFound,
            other => GalleryError::Remote(other),
        }
    }
}

impl From<StoreError> for PlansError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => PlansError::PlanNotFound,
            other => PlansError::Remote(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let events_err = EventsError::EventNotFound;
        assert_eq!(events_err.to_string(), "event not found");

        let plans_err = PlansError::PlanExists { year: 2025, month: 3 };
        assert_eq!(plans_err.to_string(), "a plan already exists for 2025-03");

        let gallery_err = GalleryError::AuthenticationRequired;
        assert_eq!(gallery_err.to_string(), "not authenticated");
    }

    #[test]
    fn zero_row_store_errors_become_not_found() {
        let err: EventsError = StoreError::NotFound.into();
        assert!(matches!(err, EventsError::EventNotFound));

        let err: PlansError = StoreError::NotFound.into();
        assert!(matches!(err, PlansError::PlanNotFound));
    }
}
