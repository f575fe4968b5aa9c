//! Events manager: listings, search, RSVP flow, statistics, duplication,
//! CSV export.

use std::sync::Arc;

use chrono::{Months, NaiveDate, Utc};
use tracing::{info, warn};

use ayf_auth::Identity;
use ayf_store::StoreClient;

use crate::entities::{
    CreateEventRequest, Event, EventStats, EventStatus, Rsvp, RsvpStatus, UpdateEventRequest,
};
use crate::repositories::EventsRepository;
use crate::types::{EventListFilter, EventQuery, EventSearch, EventsError, EventsResult};

const DEFAULT_SEARCH_LIMIT: u32 = 20;
const DEFAULT_FEATURED_LIMIT: u32 = 3;
const CSV_DESCRIPTION_LIMIT: usize = 100;

/// Data access for events and RSVPs.
pub trait EventsRepo {
    async fn list(&self, filter: &EventListFilter) -> EventsResult<Vec<Event>>;
    async fn find_by_id(&self, id: i64) -> EventsResult<Option<Event>>;
    async fn insert(
        &self,
        request: &CreateEventRequest,
        created_by: uuid::Uuid,
    ) -> EventsResult<Event>;
    async fn update(&self, id: i64, request: &UpdateEventRequest) -> EventsResult<Event>;
    async fn delete(&self, id: i64) -> EventsResult<()>;
    async fn insert_rsvp(&self, event_id: i64, user_id: uuid::Uuid) -> EventsResult<Rsvp>;
    async fn find_rsvp(
        &self,
        event_id: i64,
        user_id: uuid::Uuid,
    ) -> EventsResult<Option<Rsvp>>;
    async fn list_rsvps(&self, event_id: i64) -> EventsResult<Vec<Rsvp>>;
    async fn count_rsvps(&self, event_id: i64) -> EventsResult<u64>;
    async fn set_attendees_count(&self, event_id: i64, count: i64) -> EventsResult<()>;
    async fn event_stats(&self, event_id: i64) -> EventsResult<EventStats>;
}

impl EventsRepo for EventsRepository {
    async fn list(&self, filter: &EventListFilter) -> EventsResult<Vec<Event>> {
        self.list(filter).await
    }

    async fn find_by_id(&self, id: i64) -> EventsResult<Option<Event>> {
        self.find_by_id(id).await
    }

    async fn insert(
        &self,
        request: &CreateEventRequest,
        created_by: uuid::Uuid,
    ) -> EventsResult<Event> {
        self.insert(request, created_by).await
    }

    async fn update(&self, id: i64, request: &UpdateEventRequest) -> EventsResult<Event> {
        self.update(id, request).await
    }

    async fn delete(&self, id: i64) -> EventsResult<()> {
        self.delete(id).await
    }

    async fn insert_rsvp(&self, event_id: i64, user_id: uuid::Uuid) -> EventsResult<Rsvp> {
        self.insert_rsvp(event_id, user_id).await
    }

    async fn find_rsvp(
        &self,
        event_id: i64,
        user_id: uuid::Uuid,
    ) -> EventsResult<Option<Rsvp>> {
        self.find_rsvp(event_id, user_id).await
    }

    async fn list_rsvps(&self, event_id: i64) -> EventsResult<Vec<Rsvp>> {
        self.list_rsvps(event_id).await
    }

    async fn count_rsvps(&self, event_id: i64) -> EventsResult<u64> {
        self.count_rsvps(event_id).await
    }

    async fn set_attendees_count(&self, event_id: i64, count: i64) -> EventsResult<()> {
        self.set_attendees_count(event_id, count).await
    }

    async fn event_stats(&self, event_id: i64) -> EventsResult<EventStats> {
        self.event_stats(event_id).await
    }
}

/// Service for managing event operations.
pub struct EventsService<R, I> {
    repository: R,
    identity: Arc<I>,
}

impl<I: Identity> EventsService<EventsRepository, I> {
    pub fn new(client: StoreClient, identity: Arc<I>) -> Self {
        Self {
            repository: EventsRepository::new(client),
            identity,
        }
    }
}

impl<R, I> EventsService<R, I>
where
    R: EventsRepo,
    I: Identity,
{
    pub fn with_repository(repository: R, identity: Arc<I>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// List events ordered by date ascending.
    pub async fn list_events(&self, options: EventQuery) -> EventsResult<Vec<Event>> {
        let filter = EventListFilter {
            on_or_after: options.upcoming_only.then(|| self.today()),
            featured: options.featured_only.then_some(true),
            category_contains: options.category,
            limit: options.limit,
            ..Default::default()
        };

        self.repository.list(&filter).await
    }

    /// Events that have already happened, most recent first.
    pub async fn past_events(&self, limit: u32) -> EventsResult<Vec<Event>> {
        let filter = EventListFilter {
            before: Some(self.today()),
            newest_first: true,
            limit: Some(limit),
            ..Default::default()
        };

        self.repository.list(&filter).await
    }

    pub async fn event_by_id(&self, id: i64) -> EventsResult<Event> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(EventsError::EventNotFound)
    }

    pub async fn events_by_month(&self, year: i32, month: u32) -> EventsResult<Vec<Event>> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EventsError::Validation(format!("invalid month: {year}-{month}")))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| EventsError::Validation(format!("invalid month: {year}-{month}")))?;

        self.events_by_date_range(start, end).await
    }

    pub async fn events_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EventsResult<Vec<Event>> {
        let filter = EventListFilter {
            on_or_after: Some(start),
            on_or_before: Some(end),
            ..Default::default()
        };

        self.repository.list(&filter).await
    }

    /// Featured events that are still upcoming.
    pub async fn featured_events(&self, limit: Option<u32>) -> EventsResult<Vec<Event>> {
        let filter = EventListFilter {
            on_or_after: Some(self.today()),
            featured: Some(true),
            limit: Some(limit.unwrap_or(DEFAULT_FEATURED_LIMIT)),
            ..Default::default()
        };

        self.repository.list(&filter).await
    }

    /// Case-insensitive substring search across title, description and
    /// location. Results keep the date-ascending listing order.
    pub async fn search_events(
        &self,
        term: &str,
        options: EventSearch,
    ) -> EventsResult<Vec<Event>> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let filter = EventListFilter {
            search: Some(trimmed.to_string()),
            on_or_after: options.upcoming_only.then(|| self.today()),
            limit: Some(options.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
            ..Default::default()
        };

        self.repository.list(&filter).await
    }

    pub async fn create_event(&self, mut request: CreateEventRequest) -> EventsResult<Event> {
        let user = self.require_user()?;
        request.validate().map_err(EventsError::Validation)?;

        if request.category.is_none() {
            request.category = Some("general".to_string());
        }

        let event = self.repository.insert(&request, user.id).await?;
        info!(event_id = event.id, title = %event.title, "created event");
        Ok(event)
    }

    pub async fn update_event(
        &self,
        id: i64,
        request: UpdateEventRequest,
    ) -> EventsResult<Event> {
        self.require_user()?;
        self.repository.update(id, &request).await
    }

    pub async fn delete_event(&self, id: i64) -> EventsResult<()> {
        self.require_user()?;
        self.repository.delete(id).await?;
        info!(event_id = id, "deleted event");
        Ok(())
    }

    pub async fn toggle_featured(&self, id: i64, featured: bool) -> EventsResult<Event> {
        self.update_event(
            id,
            UpdateEventRequest {
                is_featured: Some(featured),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn update_event_status(
        &self,
        id: i64,
        status: EventStatus,
    ) -> EventsResult<Event> {
        self.update_event(
            id,
            UpdateEventRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// RSVP the signed-in user to an event, then recompute the cached
    /// attendee count from the RSVP rows. One RSVP per (event, user).
    pub async fn rsvp_to_event(&self, event_id: i64) -> EventsResult<Rsvp> {
        let user = self.require_user()?;

        if self
            .repository
            .find_rsvp(event_id, user.id)
            .await?
            .is_some()
        {
            return Err(EventsError::AlreadyRsvpd);
        }

        let rsvp = self.repository.insert_rsvp(event_id, user.id).await?;

        // A failed recompute leaves the count transiently stale; the next
        // RSVP change repairs it from the source rows.
        if let Err(error) = self.refresh_attendees_count(event_id).await {
            warn!(event_id, %error, "failed to refresh attendees count");
        }

        Ok(rsvp)
    }

    /// Recompute the cached count from the RSVP rows and write it back.
    pub async fn refresh_attendees_count(&self, event_id: i64) -> EventsResult<i64> {
        let count = self.repository.count_rsvps(event_id).await? as i64;
        self.repository.set_attendees_count(event_id, count).await?;
        Ok(count)
    }

    /// Fresh RSVP count for an event, straight from the source rows.
    pub async fn attendees_count(&self, event_id: i64) -> EventsResult<u64> {
        self.repository.count_rsvps(event_id).await
    }

    /// RSVPs for one event, newest first.
    pub async fn event_rsvps(&self, event_id: i64) -> EventsResult<Vec<Rsvp>> {
        self.repository.list_rsvps(event_id).await
    }

    /// Aggregates from the server-side hook, falling back to a client-side
    /// computation over the RSVP rows when the hook errors.
    pub async fn event_statistics(&self, event_id: i64) -> EventsResult<EventStats> {
        match self.repository.event_stats(event_id).await {
            Ok(stats) => Ok(stats),
            Err(error) => {
                warn!(event_id, %error, "stats hook failed, computing from rsvp rows");

                let rsvps = self.repository.list_rsvps(event_id).await?;
                let total_rsvps = rsvps.len() as i64;
                let confirmed_rsvps = rsvps
                    .iter()
                    .filter(|rsvp| rsvp.status == RsvpStatus::Confirmed)
                    .count() as i64;
                let total_guests = rsvps.iter().map(|rsvp| rsvp.guests.max(1)).sum();

                Ok(EventStats {
                    total_rsvps,
                    confirmed_rsvps,
                    total_guests,
                })
            }
        }
    }

    /// Copy an event into a new record: same fields, title marked as a
    /// copy, date pushed a week out, never featured.
    pub async fn duplicate_event(&self, id: i64) -> EventsResult<Event> {
        self.require_user()?;
        let source = self.event_by_id(id).await?;

        let request = CreateEventRequest {
            title: format!("{} (Copy)", source.title),
            description: source.description.clone(),
            full_description: source.full_description.clone(),
            date: source.date + chrono::Duration::days(7),
            time: source.time.clone(),
            location: source.location.clone(),
            speaker: source.speaker.clone(),
            category: Some(source.category.clone()),
            is_featured: false,
            max_attendees: source.max_attendees,
            image_url: source.image_url.clone(),
            rsvp_link: source.rsvp_link.clone(),
        };

        self.create_event(request).await
    }

    /// Full event dump as CSV. Zero events yield an empty string rather
    /// than a lone header row.
    pub async fn export_events_csv(&self) -> EventsResult<String> {
        let events = self.list_events(EventQuery::default()).await?;
        if events.is_empty() {
            return Ok(String::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(Vec::new());

        writer
            .write_record([
                "Title",
                "Date",
                "Time",
                "Location",
                "Description",
                "RSVP Link",
                "Status",
            ])
            .map_err(|error| EventsError::Export(error.to_string()))?;

        for event in &events {
            let description: String = event
                .description
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(CSV_DESCRIPTION_LIMIT)
                .collect();

            let record = [
                event.title.clone(),
                event.date.to_string(),
                event.time.clone().unwrap_or_default(),
                event.location.clone().unwrap_or_default(),
                description,
                event.rsvp_link.clone().unwrap_or_default(),
                event.status.as_str().to_string(),
            ];

            writer
                .write_record(&record)
                .map_err(|error| EventsError::Export(error.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|error| EventsError::Export(error.to_string()))?;
        let csv = String::from_utf8(bytes)
            .map_err(|error| EventsError::Export(error.to_string()))?;

        Ok(csv.trim_end_matches('\n').to_string())
    }

    fn require_user(&self) -> EventsResult<ayf_store::AuthUser> {
        self.identity
            .current_user()
            .ok_or(EventsError::AuthenticationRequired)
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
