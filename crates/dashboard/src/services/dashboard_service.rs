//! The admin console's read-only aggregator plus backup/export and the
//! retention sweep.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use tracing::{info, warn};

use ayf_auth::Identity;
use ayf_config::StorageSettings;
use ayf_content::{Announcement, Event, GalleryItem};
use ayf_store::StoreClient;

use crate::export::rows_to_csv;
use crate::repositories::AdminRepository;
use crate::types::{
    ActivityEntry, ActivityKind, BackupTable, DashboardCounts, DashboardError, DashboardResult,
    DashboardStats, StorageUsage,
};

const OVERVIEW_LIMIT: u32 = 5;
const ACTIVITY_FETCH_LIMIT: u32 = 5;

/// Data access for the cross-entity summaries.
pub trait DashboardRepo {
    async fn count_events(&self) -> DashboardResult<u64>;
    async fn count_gallery_items(&self) -> DashboardResult<u64>;
    async fn count_published_announcements(&self) -> DashboardResult<u64>;
    async fn count_rsvps(&self) -> DashboardResult<u64>;
    async fn count_active_profiles(&self) -> DashboardResult<u64>;
    async fn upcoming_events(
        &self,
        on_or_after: NaiveDate,
        limit: u32,
    ) -> DashboardResult<Vec<Event>>;
    async fn recent_announcements(&self, limit: u32) -> DashboardResult<Vec<Announcement>>;
    async fn recent_events(&self, limit: u32) -> DashboardResult<Vec<Event>>;
    async fn recent_gallery_items(&self, limit: u32) -> DashboardResult<Vec<GalleryItem>>;
    async fn fetch_table(&self, table: BackupTable) -> DashboardResult<Vec<Value>>;
    async fn storage_object_counts(&self) -> DashboardResult<StorageUsage>;
    async fn database_size(&self) -> DashboardResult<String>;
    async fn delete_events_before(&self, date: NaiveDate) -> DashboardResult<()>;
    async fn delete_rsvps_before(&self, cutoff: DateTime<Utc>) -> DashboardResult<()>;
}

impl DashboardRepo for AdminRepository {
    async fn count_events(&self) -> DashboardResult<u64> {
        self.count_events().await
    }

    async fn count_gallery_items(&self) -> DashboardResult<u64> {
        self.count_gallery_items().await
    }

    async fn count_published_announcements(&self) -> DashboardResult<u64> {
        self.count_published_announcements().await
    }

    async fn count_rsvps(&self) -> DashboardResult<u64> {
        self.count_rsvps().await
    }

    async fn count_active_profiles(&self) -> DashboardResult<u64> {
        self.count_active_profiles().await
    }

    async fn upcoming_events(
        &self,
        on_or_after: NaiveDate,
        limit: u32,
    ) -> DashboardResult<Vec<Event>> {
        self.upcoming_events(on_or_after, limit).await
    }

    async fn recent_announcements(&self, limit: u32) -> DashboardResult<Vec<Announcement>> {
        self.recent_announcements(limit).await
    }

    async fn recent_events(&self, limit: u32) -> DashboardResult<Vec<Event>> {
        self.recent_events(limit).await
    }

    async fn recent_gallery_items(&self, limit: u32) -> DashboardResult<Vec<GalleryItem>> {
        self.recent_gallery_items(limit).await
    }

    async fn fetch_table(&self, table: BackupTable) -> DashboardResult<Vec<Value>> {
        self.fetch_table(table).await
    }

    async fn storage_object_counts(&self) -> DashboardResult<StorageUsage> {
        self.storage_object_counts().await
    }

    async fn database_size(&self) -> DashboardResult<String> {
        self.database_size().await
    }

    async fn delete_events_before(&self, date: NaiveDate) -> DashboardResult<()> {
        self.delete_events_before(date).await
    }

    async fn delete_rsvps_before(&self, cutoff: DateTime<Utc>) -> DashboardResult<()> {
        self.delete_rsvps_before(cutoff).await
    }
}

/// Service composing read-only summaries across the domain tables.
pub struct DashboardService<R, I> {
    repository: R,
    identity: Arc<I>,
}

impl<I: Identity> DashboardService<AdminRepository, I> {
    pub fn new(client: StoreClient, storage: StorageSettings, identity: Arc<I>) -> Self {
        Self {
            repository: AdminRepository::new(client, storage),
            identity,
        }
    }
}

impl<R, I> DashboardService<R, I>
where
    R: DashboardRepo,
    I: Identity,
{
    pub fn with_repository(repository: R, identity: Arc<I>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// The admin overview. The independent reads are issued together; a
    /// count that cannot be fetched reports as zero rather than sinking
    /// the whole overview.
    pub async fn dashboard_stats(&self) -> DashboardResult<DashboardStats> {
        let today = Utc::now().date_naive();

        let (events, gallery, announcements, rsvps, users, upcoming, recent) = tokio::join!(
            self.repository.count_events(),
            self.repository.count_gallery_items(),
            self.repository.count_published_announcements(),
            self.repository.count_rsvps(),
            self.repository.count_active_profiles(),
            self.repository.upcoming_events(today, OVERVIEW_LIMIT),
            self.repository.recent_announcements(OVERVIEW_LIMIT),
        );

        let counts = DashboardCounts {
            events: count_or_zero(events, "events"),
            gallery: count_or_zero(gallery, "gallery"),
            announcements: count_or_zero(announcements, "announcements"),
            rsvps: count_or_zero(rsvps, "rsvps"),
            users: count_or_zero(users, "users"),
        };

        Ok(DashboardStats {
            counts,
            upcoming_events: upcoming?,
            recent_announcements: recent?,
        })
    }

    /// Recent records across events, announcements and the gallery merged
    /// into one feed, newest first. A failed source contributes nothing.
    pub async fn recent_activity(&self, limit: usize) -> DashboardResult<Vec<ActivityEntry>> {
        let (events, announcements, gallery) = tokio::join!(
            self.repository.recent_events(ACTIVITY_FETCH_LIMIT),
            self.repository.recent_announcements(ACTIVITY_FETCH_LIMIT),
            self.repository.recent_gallery_items(ACTIVITY_FETCH_LIMIT),
        );

        let mut feed = Vec::new();

        match events {
            Ok(events) => feed.extend(events.into_iter().filter_map(|event| {
                Some(ActivityEntry {
                    kind: ActivityKind::Event,
                    id: event.id,
                    title: event.title,
                    occurred_at: event.created_at?,
                })
            })),
            Err(error) => warn!(%error, "skipping events in activity feed"),
        }

        match announcements {
            Ok(announcements) => feed.extend(announcements.into_iter().filter_map(|item| {
                Some(ActivityEntry {
                    kind: ActivityKind::Announcement,
                    id: item.id,
                    title: item.title,
                    occurred_at: item.created_at?,
                })
            })),
            Err(error) => warn!(%error, "skipping announcements in activity feed"),
        }

        match gallery {
            Ok(items) => feed.extend(items.into_iter().filter_map(|item| {
                Some(ActivityEntry {
                    kind: ActivityKind::GalleryImage,
                    id: item.id,
                    title: item
                        .description
                        .unwrap_or_else(|| "Untitled".to_string()),
                    occurred_at: item.created_at?,
                })
            })),
            Err(error) => warn!(%error, "skipping gallery in activity feed"),
        }

        feed.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        feed.truncate(limit);
        Ok(feed)
    }

    /// Full dump of the fixed table list as raw rows. The first fetch
    /// error fails the whole backup; empty tables are fine.
    pub async fn backup_data(&self) -> DashboardResult<serde_json::Map<String, Value>> {
        let mut backup = serde_json::Map::new();

        for table in BackupTable::ALL {
            let rows = self.repository.fetch_table(table).await?;
            backup.insert(table.as_str().to_string(), Value::Array(rows));
        }

        info!(tables = BackupTable::ALL.len(), "captured backup");
        Ok(backup)
    }

    /// One table as CSV. Zero rows yield an empty string.
    pub async fn export_table_csv(&self, table: BackupTable) -> DashboardResult<String> {
        let rows = self.repository.fetch_table(table).await?;
        rows_to_csv(&rows).map_err(DashboardError::Export)
    }

    pub async fn storage_usage(&self) -> DashboardResult<StorageUsage> {
        self.repository.storage_object_counts().await
    }

    /// Human-readable database size from the server-side hook, or
    /// "Unknown" when the hook is not deployed.
    pub async fn database_size(&self) -> String {
        match self.repository.database_size().await {
            Ok(size) => size,
            Err(error) => {
                warn!(%error, "database size hook failed");
                "Unknown".to_string()
            }
        }
    }

    /// Retention sweep: drop events dated before the cutoff and RSVPs
    /// created before it. Requires a session.
    pub async fn clean_old_data(&self, days: i64) -> DashboardResult<()> {
        if self.identity.current_user().is_none() {
            return Err(DashboardError::AuthenticationRequired);
        }

        let cutoff = Utc::now() - Duration::days(days);

        self.repository
            .delete_events_before(cutoff.date_naive())
            .await?;
        self.repository.delete_rsvps_before(cutoff).await?;

        info!(days, "cleaned old records");
        Ok(())
    }
}

fn count_or_zero(result: DashboardResult<u64>, what: &str) -> u64 {
    match result {
        Ok(count) => count,
        Err(error) => {
            warn!(what, %error, "count unavailable, reporting zero");
            0
        }
    }
}
