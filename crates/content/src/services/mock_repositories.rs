//! Mock repository implementations for testing the content services.
//!
//! Each mock keeps its rows in memory, applies the same filtering the
//! remote store would, and counts every call so tests can assert that an
//! operation issued no remote traffic at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use ayf_store::StoreError;

use crate::entities::{
    Announcement, CreateAnnouncementRequest, CreateEventRequest, CreatePlanRequest, Event,
    EventStats, EventStatus, GalleryItem, ImageUpload, Rsvp, RsvpStatus,
    UpdateAnnouncementRequest, UpdateEventRequest, UpdatePlanRequest, YearPlan,
};
use crate::services::announcements_service::AnnouncementsRepo;
use crate::services::events_service::EventsRepo;
use crate::services::gallery_service::GalleryRepo;
use crate::services::plans_service::PlansRepo;
use crate::types::{
    AnnouncementsResult, EventListFilter, EventsResult, GalleryResult, PlansResult,
};

fn remote_failure(message: &str) -> StoreError {
    StoreError::Api {
        status: 500,
        message: message.to_string(),
    }
}

/// A plausible event row for seeding mocks.
pub fn sample_event(id: i64, title: &str, date: NaiveDate) -> Event {
    Event {
        id,
        title: title.to_string(),
        description: None,
        full_description: None,
        date,
        time: None,
        location: None,
        speaker: None,
        category: "general".to_string(),
        is_featured: false,
        status: EventStatus::Upcoming,
        attendees_count: 0,
        max_attendees: None,
        image_url: None,
        rsvp_link: None,
        created_by: None,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

/// Mock events + RSVP repository. Clones share state, so several services
/// (one per signed-in identity) can work against the same rows.
#[derive(Clone, Default)]
pub struct MockEventsRepository {
    events: Arc<Mutex<HashMap<i64, Event>>>,
    rsvps: Arc<Mutex<HashMap<i64, Rsvp>>>,
    next_event_id: Arc<AtomicI64>,
    next_rsvp_id: Arc<AtomicI64>,
    stats: Arc<Mutex<Option<EventStats>>>,
    calls: Arc<AtomicUsize>,
}

impl MockEventsRepository {
    pub fn new() -> Self {
        Self {
            next_event_id: Arc::new(AtomicI64::new(1)),
            next_rsvp_id: Arc::new(AtomicI64::new(1)),
            ..Default::default()
        }
    }

    /// Seed an event without counting a remote call.
    pub fn seed_event(&self, event: Event) {
        self.next_event_id
            .fetch_max(event.id + 1, Ordering::SeqCst);
        self.events.lock().unwrap().insert(event.id, event);
    }

    /// Make the stats hook succeed with a fixed result; it errors
    /// otherwise, as an undeployed procedure would.
    pub fn with_stats(self, stats: EventStats) -> Self {
        *self.stats.lock().unwrap() = Some(stats);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored_event(&self, id: i64) -> Option<Event> {
        self.events.lock().unwrap().get(&id).cloned()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl EventsRepo for MockEventsRepository {
    async fn list(&self, filter: &EventListFilter) -> EventsResult<Vec<Event>> {
        self.record_call();

        let mut events: Vec<Event> = self.events.lock().unwrap().values().cloned().collect();

        if let Some(date) = filter.on_or_after {
            events.retain(|event| event.date >= date);
        }
        if let Some(date) = filter.on_or_before {
            events.retain(|event| event.date <= date);
        }
        if let Some(date) = filter.before {
            events.retain(|event| event.date < date);
        }
        if let Some(featured) = filter.featured {
            events.retain(|event| event.is_featured == featured);
        }
        if let Some(category) = &filter.category_contains {
            let needle = category.to_lowercase();
            events.retain(|event| event.category.to_lowercase().contains(&needle));
        }
        if let Some(term) = &filter.search {
            let needle = term.to_lowercase();
            events.retain(|event| {
                event.title.to_lowercase().contains(&needle)
                    || event
                        .description
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                    || event
                        .location
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
            });
        }

        events.sort_by(|a, b| {
            if filter.newest_first {
                b.date.cmp(&a.date)
            } else {
                a.date.cmp(&b.date)
            }
        });

        if let Some(limit) = filter.limit {
            events.truncate(limit as usize);
        }

        Ok(events)
    }

    async fn find_by_id(&self, id: i64) -> EventsResult<Option<Event>> {
        self.record_call();
        Ok(self.events.lock().unwrap().get(&id).cloned())
    }

    async fn insert(
        &self,
        request: &CreateEventRequest,
        created_by: Uuid,
    ) -> EventsResult<Event> {
        self.record_call();

        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            full_description: request.full_description.clone(),
            date: request.date,
            time: request.time.clone(),
            location: request.location.clone(),
            speaker: request.speaker.clone(),
            category: request
                .category
                .clone()
                .unwrap_or_else(|| "general".to_string()),
            is_featured: request.is_featured,
            status: EventStatus::Upcoming,
            attendees_count: 0,
            max_attendees: request.max_attendees,
            image_url: request.image_url.clone(),
            rsvp_link: request.rsvp_link.clone(),
            created_by: Some(created_by),
            created_at: Some(Utc::now()),
            updated_at: None,
        };

        self.events.lock().unwrap().insert(id, event.clone());
        Ok(event)
    }

    async fn update(&self, id: i64, request: &UpdateEventRequest) -> EventsResult<Event> {
        self.record_call();

        let mut events = self.events.lock().unwrap();
        let event = events
            .get_mut(&id)
            .ok_or(crate::types::EventsError::EventNotFound)?;

        if let Some(title) = &request.title {
            event.title = title.clone();
        }
        if let Some(description) = &request.description {
            event.description = Some(description.clone());
        }
        if let Some(full_description) = &request.full_description {
            event.full_description = Some(full_description.clone());
        }
        if let Some(date) = request.date {
            event.date = date;
        }
        if let Some(time) = &request.time {
            event.time = Some(time.clone());
        }
        if let Some(location) = &request.location {
            event.location = Some(location.clone());
        }
        if let Some(speaker) = &request.speaker {
            event.speaker = Some(speaker.clone());
        }
        if let Some(category) = &request.category {
            event.category = category.clone();
        }
        if let Some(is_featured) = request.is_featured {
            event.is_featured = is_featured;
        }
        if let Some(status) = request.status {
            event.status = status;
        }
        if let Some(max_attendees) = request.max_attendees {
            event.max_attendees = Some(max_attendees);
        }
        if let Some(image_url) = &request.image_url {
            event.image_url = Some(image_url.clone());
        }
        if let Some(rsvp_link) = &request.rsvp_link {
            event.rsvp_link = Some(rsvp_link.clone());
        }
        event.updated_at = Some(Utc::now());

        Ok(event.clone())
    }

    async fn delete(&self, id: i64) -> EventsResult<()> {
        self.record_call();
        self.events.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn insert_rsvp(&self, event_id: i64, user_id: Uuid) -> EventsResult<Rsvp> {
        self.record_call();

        let id = self.next_rsvp_id.fetch_add(1, Ordering::SeqCst);
        let rsvp = Rsvp {
            id,
            event_id,
            user_id,
            status: RsvpStatus::Confirmed,
            guests: 1,
            created_at: Some(Utc::now()),
        };

        self.rsvps.lock().unwrap().insert(id, rsvp.clone());
        Ok(rsvp)
    }

    async fn find_rsvp(&self, event_id: i64, user_id: Uuid) -> EventsResult<Option<Rsvp>> {
        self.record_call();
        Ok(self
            .rsvps
            .lock()
            .unwrap()
            .values()
            .find(|rsvp| rsvp.event_id == event_id && rsvp.user_id == user_id)
            .cloned())
    }

    async fn list_rsvps(&self, event_id: i64) -> EventsResult<Vec<Rsvp>> {
        self.record_call();

        let mut rsvps: Vec<Rsvp> = self
            .rsvps
            .lock()
            .unwrap()
            .values()
            .filter(|rsvp| rsvp.event_id == event_id)
            .cloned()
            .collect();
        rsvps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rsvps)
    }

    async fn count_rsvps(&self, event_id: i64) -> EventsResult<u64> {
        self.record_call();
        Ok(self
            .rsvps
            .lock()
            .unwrap()
            .values()
            .filter(|rsvp| rsvp.event_id == event_id)
            .count() as u64)
    }

    async fn set_attendees_count(&self, event_id: i64, count: i64) -> EventsResult<()> {
        self.record_call();
        if let Some(event) = self.events.lock().unwrap().get_mut(&event_id) {
            event.attendees_count = count;
        }
        Ok(())
    }

    async fn event_stats(&self, _event_id: i64) -> EventsResult<EventStats> {
        self.record_call();
        match self.stats.lock().unwrap().clone() {
            Some(stats) => Ok(stats),
            None => Err(remote_failure("function get_event_stats does not exist").into()),
        }
    }
}

/// Mock announcements repository.
#[derive(Clone, Default)]
pub struct MockAnnouncementsRepository {
    announcements: Arc<Mutex<HashMap<i64, Announcement>>>,
    next_id: Arc<AtomicI64>,
    hook_available: bool,
    calls: Arc<AtomicUsize>,
}

impl MockAnnouncementsRepository {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            ..Default::default()
        }
    }

    /// Make the view-counter hook available instead of erroring.
    pub fn with_view_hook(mut self) -> Self {
        self.hook_available = true;
        self
    }

    pub fn seed_announcement(&self, announcement: Announcement) {
        self.next_id
            .fetch_max(announcement.id + 1, Ordering::SeqCst);
        self.announcements
            .lock()
            .unwrap()
            .insert(announcement.id, announcement);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored_announcement(&self, id: i64) -> Option<Announcement> {
        self.announcements.lock().unwrap().get(&id).cloned()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A plausible announcement row for seeding mocks.
pub fn sample_announcement(id: i64, title: &str, published: bool) -> Announcement {
    Announcement {
        id,
        title: title.to_string(),
        content: format!("{title} content"),
        excerpt: None,
        kind: None,
        author_id: None,
        published,
        publish_date: None,
        featured_image: None,
        tags: None,
        views: 0,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

impl AnnouncementsRepo for MockAnnouncementsRepository {
    async fn list(
        &self,
        published_only: bool,
        limit: Option<u32>,
    ) -> AnnouncementsResult<Vec<Announcement>> {
        self.record_call();

        let mut rows: Vec<Announcement> = self
            .announcements
            .lock()
            .unwrap()
            .values()
            .filter(|announcement| !published_only || announcement.published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AnnouncementsResult<Option<Announcement>> {
        self.record_call();
        Ok(self.announcements.lock().unwrap().get(&id).cloned())
    }

    async fn insert(
        &self,
        request: &CreateAnnouncementRequest,
        author_id: Uuid,
    ) -> AnnouncementsResult<Announcement> {
        self.record_call();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let announcement = Announcement {
            id,
            title: request.title.clone(),
            content: request.content.clone(),
            excerpt: request.excerpt.clone(),
            kind: request.kind.clone(),
            author_id: Some(author_id),
            published: request.published,
            publish_date: request.publish_date,
            featured_image: request.featured_image.clone(),
            tags: request.tags.clone(),
            views: 0,
            created_at: Some(Utc::now()),
            updated_at: None,
        };

        self.announcements
            .lock()
            .unwrap()
            .insert(id, announcement.clone());
        Ok(announcement)
    }

    async fn update(
        &self,
        id: i64,
        request: &UpdateAnnouncementRequest,
    ) -> AnnouncementsResult<Announcement> {
        self.record_call();

        let mut rows = self.announcements.lock().unwrap();
        let announcement = rows
            .get_mut(&id)
            .ok_or(crate::types::AnnouncementsError::AnnouncementNotFound)?;

        if let Some(title) = &request.title {
            announcement.title = title.clone();
        }
        if let Some(content) = &request.content {
            announcement.content = content.clone();
        }
        if let Some(excerpt) = &request.excerpt {
            announcement.excerpt = Some(excerpt.clone());
        }
        if let Some(kind) = &request.kind {
            announcement.kind = Some(kind.clone());
        }
        if let Some(published) = request.published {
            announcement.published = published;
        }
        if let Some(publish_date) = request.publish_date {
            announcement.publish_date = Some(publish_date);
        }
        if let Some(featured_image) = &request.featured_image {
            announcement.featured_image = Some(featured_image.clone());
        }
        if let Some(tags) = &request.tags {
            announcement.tags = Some(tags.clone());
        }
        announcement.updated_at = Some(Utc::now());

        Ok(announcement.clone())
    }

    async fn delete(&self, id: i64) -> AnnouncementsResult<()> {
        self.record_call();
        self.announcements.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn increment_views(&self, id: i64) -> AnnouncementsResult<()> {
        self.record_call();

        if !self.hook_available {
            return Err(
                remote_failure("function increment_announcement_views does not exist").into(),
            );
        }

        if let Some(announcement) = self.announcements.lock().unwrap().get_mut(&id) {
            announcement.views += 1;
        }
        Ok(())
    }

    async fn set_views(&self, id: i64, views: i64) -> AnnouncementsResult<()> {
        self.record_call();
        if let Some(announcement) = self.announcements.lock().unwrap().get_mut(&id) {
            announcement.views = views;
        }
        Ok(())
    }
}

/// Mock gallery repository with an in-memory object store.
#[derive(Clone, Default)]
pub struct MockGalleryRepository {
    items: Arc<Mutex<HashMap<i64, GalleryItem>>>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    next_id: Arc<AtomicI64>,
    fail_storage: bool,
    fail_removal: bool,
    calls: Arc<AtomicUsize>,
}

impl MockGalleryRepository {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            ..Default::default()
        }
    }

    /// Make object uploads fail, as a full or unreachable bucket would.
    pub fn with_failing_storage(mut self) -> Self {
        self.fail_storage = true;
        self
    }

    pub fn with_failing_removal(mut self) -> Self {
        self.fail_removal = true;
        self
    }

    pub fn seed_item(&self, item: GalleryItem) {
        self.next_id.fetch_max(item.id + 1, Ordering::SeqCst);
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn item_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl GalleryRepo for MockGalleryRepository {
    async fn list(&self, category: Option<&str>) -> GalleryResult<Vec<GalleryItem>> {
        self.record_call();

        let mut items: Vec<GalleryItem> = self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|item| category.is_none() || item.category.as_deref() == category)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert(
        &self,
        image_url: &str,
        upload: &ImageUpload,
        uploaded_by: Uuid,
    ) -> GalleryResult<GalleryItem> {
        self.record_call();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = GalleryItem {
            id,
            image_url: image_url.to_string(),
            category: upload.category.clone(),
            description: upload.description.clone(),
            uploaded_by: Some(uploaded_by),
            created_at: Some(Utc::now()),
        };

        self.items.lock().unwrap().insert(id, item.clone());
        Ok(item)
    }

    async fn delete(&self, id: i64) -> GalleryResult<()> {
        self.record_call();
        self.items.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn store_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> GalleryResult<String> {
        self.record_call();

        if self.fail_storage {
            return Err(remote_failure("bucket unavailable").into());
        }

        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes);
        Ok(format!("http://store.local/images/{path}"))
    }

    async fn remove_object(&self, path: &str) -> GalleryResult<()> {
        self.record_call();

        if self.fail_removal {
            return Err(remote_failure("object locked").into());
        }

        self.objects.lock().unwrap().remove(path);
        Ok(())
    }
}

/// Mock yearly plan repository.
#[derive(Clone, Default)]
pub struct MockPlansRepository {
    plans: Arc<Mutex<HashMap<i64, YearPlan>>>,
    documents: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    next_id: Arc<AtomicI64>,
    calls: Arc<AtomicUsize>,
}

impl MockPlansRepository {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            ..Default::default()
        }
    }

    pub fn seed_plan(&self, plan: YearPlan) {
        self.next_id.fetch_max(plan.id + 1, Ordering::SeqCst);
        self.plans.lock().unwrap().insert(plan.id, plan);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A plausible plan row for seeding mocks.
pub fn sample_plan(id: i64, year: i32, month: u32, theme: &str) -> YearPlan {
    YearPlan {
        id,
        year,
        month,
        theme: theme.to_string(),
        theme_scripture: None,
        activities: Vec::new(),
        scriptures: Vec::new(),
        goals: Vec::new(),
        notes: None,
        pdf_url: None,
        excel_url: None,
        created_by: None,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

impl PlansRepo for MockPlansRepository {
    async fn list_for_year(&self, year: i32) -> PlansResult<Vec<YearPlan>> {
        self.record_call();

        let mut plans: Vec<YearPlan> = self
            .plans
            .lock()
            .unwrap()
            .values()
            .filter(|plan| plan.year == year)
            .cloned()
            .collect();
        plans.sort_by_key(|plan| plan.month);
        Ok(plans)
    }

    async fn find_by_id(&self, id: i64) -> PlansResult<Option<YearPlan>> {
        self.record_call();
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_year_month(&self, year: i32, month: u32) -> PlansResult<Option<YearPlan>> {
        self.record_call();
        Ok(self
            .plans
            .lock()
            .unwrap()
            .values()
            .find(|plan| plan.year == year && plan.month == month)
            .cloned())
    }

    async fn insert(
        &self,
        request: &CreatePlanRequest,
        created_by: Uuid,
    ) -> PlansResult<YearPlan> {
        self.record_call();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let plan = YearPlan {
            id,
            year: request.year,
            month: request.month,
            theme: request.theme.clone(),
            theme_scripture: request.theme_scripture.clone(),
            activities: request.activities.clone(),
            scriptures: request.scriptures.clone(),
            goals: request.goals.clone(),
            notes: request.notes.clone(),
            pdf_url: None,
            excel_url: None,
            created_by: Some(created_by),
            created_at: Some(Utc::now()),
            updated_at: None,
        };

        self.plans.lock().unwrap().insert(id, plan.clone());
        Ok(plan)
    }

    async fn update(&self, id: i64, request: &UpdatePlanRequest) -> PlansResult<YearPlan> {
        self.record_call();

        let mut plans = self.plans.lock().unwrap();
        let plan = plans
            .get_mut(&id)
            .ok_or(crate::types::PlansError::PlanNotFound)?;

        if let Some(theme) = &request.theme {
            plan.theme = theme.clone();
        }
        if let Some(theme_scripture) = &request.theme_scripture {
            plan.theme_scripture = Some(theme_scripture.clone());
        }
        if let Some(activities) = &request.activities {
            plan.activities = activities.clone();
        }
        if let Some(scriptures) = &request.scriptures {
            plan.scriptures = scriptures.clone();
        }
        if let Some(goals) = &request.goals {
            plan.goals = goals.clone();
        }
        if let Some(notes) = &request.notes {
            plan.notes = Some(notes.clone());
        }
        if let Some(pdf_url) = &request.pdf_url {
            plan.pdf_url = Some(pdf_url.clone());
        }
        if let Some(excel_url) = &request.excel_url {
            plan.excel_url = Some(excel_url.clone());
        }
        plan.updated_at = Some(Utc::now());

        Ok(plan.clone())
    }

    async fn delete(&self, id: i64) -> PlansResult<()> {
        self.record_call();
        self.plans.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn store_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> PlansResult<String> {
        self.record_call();
        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes);
        Ok(format!("http://store.local/documents/{path}"))
    }
}
