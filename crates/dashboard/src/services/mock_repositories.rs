//! Mock repository for testing the dashboard service.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use ayf_content::{Announcement, Event, GalleryItem};
use ayf_store::StoreError;

use crate::services::dashboard_service::DashboardRepo;
use crate::types::{BackupTable, DashboardCounts, DashboardResult, StorageUsage};

fn remote_failure(message: &str) -> StoreError {
    StoreError::Api {
        status: 500,
        message: message.to_string(),
    }
}

/// Scriptable in-memory summary source. Clones share state.
#[derive(Clone, Default)]
pub struct MockDashboardRepository {
    counts: Arc<Mutex<DashboardCounts>>,
    events: Arc<Mutex<Vec<Event>>>,
    announcements: Arc<Mutex<Vec<Announcement>>>,
    gallery: Arc<Mutex<Vec<GalleryItem>>>,
    tables: Arc<Mutex<HashMap<BackupTable, Vec<Value>>>>,
    failing_tables: Arc<Mutex<HashSet<BackupTable>>>,
    storage: Arc<Mutex<StorageUsage>>,
    database_size: Arc<Mutex<Option<String>>>,
    fail_event_count: bool,
    fail_gallery_feed: bool,
    deleted_events_before: Arc<Mutex<Option<NaiveDate>>>,
    deleted_rsvps_before: Arc<Mutex<Option<DateTime<Utc>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockDashboardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(self, counts: DashboardCounts) -> Self {
        *self.counts.lock().unwrap() = counts;
        self
    }

    pub fn with_storage(self, storage: StorageUsage) -> Self {
        *self.storage.lock().unwrap() = storage;
        self
    }

    pub fn with_database_size(self, size: &str) -> Self {
        *self.database_size.lock().unwrap() = Some(size.to_string());
        self
    }

    pub fn with_failing_event_count(mut self) -> Self {
        self.fail_event_count = true;
        self
    }

    pub fn with_failing_gallery_feed(mut self) -> Self {
        self.fail_gallery_feed = true;
        self
    }

    pub fn with_failing_table(self, table: BackupTable) -> Self {
        self.failing_tables.lock().unwrap().insert(table);
        self
    }

    pub fn seed_event(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn seed_announcement(&self, announcement: Announcement) {
        self.announcements.lock().unwrap().push(announcement);
    }

    pub fn seed_gallery_item(&self, item: GalleryItem) {
        self.gallery.lock().unwrap().push(item);
    }

    pub fn seed_table(&self, table: BackupTable, rows: Vec<Value>) {
        self.tables.lock().unwrap().insert(table, rows);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn events_cutoff(&self) -> Option<NaiveDate> {
        *self.deleted_events_before.lock().unwrap()
    }

    pub fn rsvps_cutoff(&self) -> Option<DateTime<Utc>> {
        *self.deleted_rsvps_before.lock().unwrap()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl DashboardRepo for MockDashboardRepository {
    async fn count_events(&self) -> DashboardResult<u64> {
        self.record_call();
        if self.fail_event_count {
            return Err(remote_failure("count unavailable").into());
        }
        Ok(self.counts.lock().unwrap().events)
    }

    async fn count_gallery_items(&self) -> DashboardResult<u64> {
        self.record_call();
        Ok(self.counts.lock().unwrap().gallery)
    }

    async fn count_published_announcements(&self) -> DashboardResult<u64> {
        self.record_call();
        Ok(self.counts.lock().unwrap().announcements)
    }

    async fn count_rsvps(&self) -> DashboardResult<u64> {
        self.record_call();
        Ok(self.counts.lock().unwrap().rsvps)
    }

    async fn count_active_profiles(&self) -> DashboardResult<u64> {
        self.record_call();
        Ok(self.counts.lock().unwrap().users)
    }

    async fn upcoming_events(
        &self,
        on_or_after: NaiveDate,
        limit: u32,
    ) -> DashboardResult<Vec<Event>> {
        self.record_call();

        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.date >= on_or_after)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.date);
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn recent_announcements(&self, limit: u32) -> DashboardResult<Vec<Announcement>> {
        self.record_call();

        let mut rows: Vec<Announcement> = self
            .announcements
            .lock()
            .unwrap()
            .iter()
            .filter(|announcement| announcement.published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn recent_events(&self, limit: u32) -> DashboardResult<Vec<Event>> {
        self.record_call();

        let mut events = self.events.lock().unwrap().clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn recent_gallery_items(&self, limit: u32) -> DashboardResult<Vec<GalleryItem>> {
        self.record_call();

        if self.fail_gallery_feed {
            return Err(remote_failure("gallery unavailable").into());
        }

        let mut items = self.gallery.lock().unwrap().clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn fetch_table(&self, table: BackupTable) -> DashboardResult<Vec<Value>> {
        self.record_call();

        if self.failing_tables.lock().unwrap().contains(&table) {
            return Err(remote_failure("table unavailable").into());
        }

        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default())
    }

    async fn storage_object_counts(&self) -> DashboardResult<StorageUsage> {
        self.record_call();
        Ok(self.storage.lock().unwrap().clone())
    }

    async fn database_size(&self) -> DashboardResult<String> {
        self.record_call();
        self.database_size
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| remote_failure("function get_database_size does not exist").into())
    }

    async fn delete_events_before(&self, date: NaiveDate) -> DashboardResult<()> {
        self.record_call();
        *self.deleted_events_before.lock().unwrap() = Some(date);
        Ok(())
    }

    async fn delete_rsvps_before(&self, cutoff: DateTime<Utc>) -> DashboardResult<()> {
        self.record_call();
        *self.deleted_rsvps_before.lock().unwrap() = Some(cutoff);
        Ok(())
    }
}
