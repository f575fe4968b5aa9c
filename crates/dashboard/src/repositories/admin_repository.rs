//! Remote data access for the admin overview, backup and retention sweep.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use ayf_config::StorageSettings;
use ayf_store::{Filter, Order, StoreClient};

use ayf_content::{Announcement, Event, GalleryItem};

use crate::types::{BackupTable, DashboardResult, StorageUsage};

/// Remote repository spanning every table the admin console summarises.
pub struct AdminRepository {
    client: StoreClient,
    storage: StorageSettings,
}

impl AdminRepository {
    pub fn new(client: StoreClient, storage: StorageSettings) -> Self {
        Self { client, storage }
    }

    pub async fn count_events(&self) -> DashboardResult<u64> {
        Ok(self.client.table("events").count(Vec::new()).await?)
    }

    pub async fn count_gallery_items(&self) -> DashboardResult<u64> {
        Ok(self.client.table("gallery").count(Vec::new()).await?)
    }

    pub async fn count_published_announcements(&self) -> DashboardResult<u64> {
        Ok(self
            .client
            .table("announcements")
            .count(vec![Filter::eq("published", true)])
            .await?)
    }

    pub async fn count_rsvps(&self) -> DashboardResult<u64> {
        Ok(self.client.table("event_rsvps").count(Vec::new()).await?)
    }

    pub async fn count_active_profiles(&self) -> DashboardResult<u64> {
        Ok(self
            .client
            .table("user_profiles")
            .count(vec![Filter::eq("is_active", true)])
            .await?)
    }

    pub async fn upcoming_events(
        &self,
        on_or_after: NaiveDate,
        limit: u32,
    ) -> DashboardResult<Vec<Event>> {
        Ok(self
            .client
            .table("events")
            .select()
            .filter(Filter::gte("date", on_or_after))
            .order("date", Order::Ascending)
            .limit(limit)
            .fetch()
            .await?)
    }

    pub async fn recent_announcements(&self, limit: u32) -> DashboardResult<Vec<Announcement>> {
        Ok(self
            .client
            .table("announcements")
            .select()
            .filter(Filter::eq("published", true))
            .order("created_at", Order::Descending)
            .limit(limit)
            .fetch()
            .await?)
    }

    pub async fn recent_events(&self, limit: u32) -> DashboardResult<Vec<Event>> {
        Ok(self
            .client
            .table("events")
            .select()
            .order("created_at", Order::Descending)
            .limit(limit)
            .fetch()
            .await?)
    }

    pub async fn recent_gallery_items(&self, limit: u32) -> DashboardResult<Vec<GalleryItem>> {
        Ok(self
            .client
            .table("gallery")
            .select()
            .order("created_at", Order::Descending)
            .limit(limit)
            .fetch()
            .await?)
    }

    pub async fn fetch_table(
        &self,
        table: BackupTable,
    ) -> DashboardResult<Vec<serde_json::Value>> {
        Ok(self
            .client
            .table(table.as_str())
            .select()
            .fetch()
            .await?)
    }

    /// Object counts across the three buckets; any listing error fails the
    /// whole call.
    pub async fn storage_object_counts(&self) -> DashboardResult<StorageUsage> {
        let images = self.client.bucket(&self.storage.image_bucket).list("").await?;
        let documents = self
            .client
            .bucket(&self.storage.document_bucket)
            .list("")
            .await?;
        let avatars = self
            .client
            .bucket(&self.storage.avatar_bucket)
            .list("")
            .await?;

        Ok(StorageUsage::new(
            images.len(),
            documents.len(),
            avatars.len(),
        ))
    }

    pub async fn database_size(&self) -> DashboardResult<String> {
        let value: serde_json::Value = self.client.rpc("get_database_size", json!({})).await?;

        Ok(match value {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        })
    }

    pub async fn delete_events_before(&self, date: NaiveDate) -> DashboardResult<()> {
        Ok(self
            .client
            .table("events")
            .delete(vec![Filter::lt("date", date)])
            .await?)
    }

    pub async fn delete_rsvps_before(&self, cutoff: DateTime<Utc>) -> DashboardResult<()> {
        Ok(self
            .client
            .table("event_rsvps")
            .delete(vec![Filter::lt("created_at", cutoff.to_rfc3339())])
            .await?)
    }
}
