//! Repository for announcement data access against the remote store.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use ayf_store::{Filter, Order, StoreClient, StoreError};

use crate::entities::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest};
use crate::types::AnnouncementsResult;

const TABLE: &str = "announcements";

pub struct AnnouncementsRepository {
    client: StoreClient,
}

impl AnnouncementsRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        published_only: bool,
        limit: Option<u32>,
    ) -> AnnouncementsResult<Vec<Announcement>> {
        let mut query = self
            .client
            .table(TABLE)
            .select()
            .order("created_at", Order::Descending);

        if published_only {
            query = query.filter(Filter::eq("published", true));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        Ok(query.fetch().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> AnnouncementsResult<Option<Announcement>> {
        let result = self
            .client
            .table(TABLE)
            .select()
            .filter(Filter::eq("id", id))
            .fetch_one::<Announcement>()
            .await;

        match result {
            Ok(announcement) => Ok(Some(announcement)),
            Err(StoreError::NotFound) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn insert(
        &self,
        request: &CreateAnnouncementRequest,
        author_id: Uuid,
    ) -> AnnouncementsResult<Announcement> {
        let mut row = serde_json::to_value(request).map_err(StoreError::from)?;
        row["author_id"] = json!(author_id);

        Ok(self.client.table(TABLE).insert(&row).await?)
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateAnnouncementRequest,
    ) -> AnnouncementsResult<Announcement> {
        let mut changes = serde_json::to_value(request).map_err(StoreError::from)?;
        changes["updated_at"] = json!(Utc::now());

        Ok(self
            .client
            .table(TABLE)
            .update(vec![Filter::eq("id", id)], &changes)
            .await?)
    }

    pub async fn delete(&self, id: i64) -> AnnouncementsResult<()> {
        Ok(self
            .client
            .table(TABLE)
            .delete(vec![Filter::eq("id", id)])
            .await?)
    }

    /// Server-side view counter hook.
    pub async fn increment_views(&self, id: i64) -> AnnouncementsResult<()> {
        Ok(self
            .client
            .rpc_unit("increment_announcement_views", json!({ "announcement_id": id }))
            .await?)
    }

    /// Direct write of the view counter, used by the client-side fallback
    /// when the hook errors.
    pub async fn set_views(&self, id: i64, views: i64) -> AnnouncementsResult<()> {
        Ok(self
            .client
            .table(TABLE)
            .update_minimal(vec![Filter::eq("id", id)], &json!({ "views": views }))
            .await?)
    }
}
