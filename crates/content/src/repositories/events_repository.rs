//! Repository for event and RSVP data access against the remote store.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use ayf_store::{Filter, Order, StoreClient, StoreError};

use crate::entities::{CreateEventRequest, Event, EventStats, Rsvp, UpdateEventRequest};
use crate::types::{EventListFilter, EventsResult};

const EVENTS_TABLE: &str = "events";
const RSVPS_TABLE: &str = "event_rsvps";

/// Remote repository for the `events` and `event_rsvps` tables.
pub struct EventsRepository {
    client: StoreClient,
}

impl EventsRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &EventListFilter) -> EventsResult<Vec<Event>> {
        let mut query = self.client.table(EVENTS_TABLE).select();

        if let Some(date) = filter.on_or_after {
            query = query.filter(Filter::gte("date", date));
        }
        if let Some(date) = filter.on_or_before {
            query = query.filter(Filter::lte("date", date));
        }
        if let Some(date) = filter.before {
            query = query.filter(Filter::lt("date", date));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(Filter::eq("is_featured", featured));
        }
        if let Some(category) = &filter.category_contains {
            query = query.filter(Filter::contains("category", category));
        }
        if let Some(term) = &filter.search {
            query = query.any_of(vec![
                Filter::contains("title", term),
                Filter::contains("description", term),
                Filter::contains("location", term),
            ]);
        }

        let direction = if filter.newest_first {
            Order::Descending
        } else {
            Order::Ascending
        };
        query = query.order("date", direction);

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        Ok(query.fetch().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> EventsResult<Option<Event>> {
        let result = self
            .client
            .table(EVENTS_TABLE)
            .select()
            .filter(Filter::eq("id", id))
            .fetch_one::<Event>()
            .await;

        match result {
            Ok(event) => Ok(Some(event)),
            Err(StoreError::NotFound) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn insert(
        &self,
        request: &CreateEventRequest,
        created_by: Uuid,
    ) -> EventsResult<Event> {
        let mut row = serde_json::to_value(request).map_err(StoreError::from)?;
        row["created_by"] = json!(created_by);

        Ok(self.client.table(EVENTS_TABLE).insert(&row).await?)
    }

    pub async fn update(&self, id: i64, request: &UpdateEventRequest) -> EventsResult<Event> {
        let mut changes = serde_json::to_value(request).map_err(StoreError::from)?;
        changes["updated_at"] = json!(Utc::now());

        Ok(self
            .client
            .table(EVENTS_TABLE)
            .update(vec![Filter::eq("id", id)], &changes)
            .await?)
    }

    pub async fn delete(&self, id: i64) -> EventsResult<()> {
        Ok(self
            .client
            .table(EVENTS_TABLE)
            .delete(vec![Filter::eq("id", id)])
            .await?)
    }

    pub async fn insert_rsvp(&self, event_id: i64, user_id: Uuid) -> EventsResult<Rsvp> {
        Ok(self
            .client
            .table(RSVPS_TABLE)
            .insert(&json!({ "event_id": event_id, "user_id": user_id }))
            .await?)
    }

    pub async fn find_rsvp(&self, event_id: i64, user_id: Uuid) -> EventsResult<Option<Rsvp>> {
        let rows: Vec<Rsvp> = self
            .client
            .table(RSVPS_TABLE)
            .select()
            .filter(Filter::eq("event_id", event_id))
            .filter(Filter::eq("user_id", user_id))
            .limit(1)
            .fetch()
            .await?;

        Ok(rows.into_iter().next())
    }

    pub async fn list_rsvps(&self, event_id: i64) -> EventsResult<Vec<Rsvp>> {
        Ok(self
            .client
            .table(RSVPS_TABLE)
            .select()
            .filter(Filter::eq("event_id", event_id))
            .order("created_at", Order::Descending)
            .fetch()
            .await?)
    }

    pub async fn count_rsvps(&self, event_id: i64) -> EventsResult<u64> {
        Ok(self
            .client
            .table(RSVPS_TABLE)
            .count(vec![Filter::eq("event_id", event_id)])
            .await?)
    }

    pub async fn set_attendees_count(&self, event_id: i64, count: i64) -> EventsResult<()> {
        Ok(self
            .client
            .table(EVENTS_TABLE)
            .update_minimal(
                vec![Filter::eq("id", event_id)],
                &json!({ "attendees_count": count }),
            )
            .await?)
    }

    /// Server-side aggregate hook. Callers fall back to computing from the
    /// RSVP rows when this errors.
    pub async fn event_stats(&self, event_id: i64) -> EventsResult<EventStats> {
        Ok(self
            .client
            .rpc("get_event_stats", json!({ "event_id": event_id }))
            .await?)
    }
}
