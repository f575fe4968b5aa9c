//! Repository for yearly plan rows and their uploaded documents.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use ayf_store::{Filter, Order, StoreClient, StoreError};

use crate::entities::{CreatePlanRequest, UpdatePlanRequest, YearPlan};
use crate::types::PlansResult;

const TABLE: &str = "yearly_plans";

pub struct PlansRepository {
    client: StoreClient,
    document_bucket: String,
}

impl PlansRepository {
    pub fn new(client: StoreClient, document_bucket: &str) -> Self {
        Self {
            client,
            document_bucket: document_bucket.to_string(),
        }
    }

    pub async fn list_for_year(&self, year: i32) -> PlansResult<Vec<YearPlan>> {
        Ok(self
            .client
            .table(TABLE)
            .select()
            .filter(Filter::eq("year", year))
            .order("month", Order::Ascending)
            .fetch()
            .await?)
    }

    pub async fn find_by_id(&self, id: i64) -> PlansResult<Option<YearPlan>> {
        let result = self
            .client
            .table(TABLE)
            .select()
            .filter(Filter::eq("id", id))
            .fetch_one::<YearPlan>()
            .await;

        match result {
            Ok(plan) => Ok(Some(plan)),
            Err(StoreError::NotFound) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn find_by_year_month(
        &self,
        year: i32,
        month: u32,
    ) -> PlansResult<Option<YearPlan>> {
        let rows: Vec<YearPlan> = self
            .client
            .table(TABLE)
            .select()
            .filter(Filter::eq("year", year))
            .filter(Filter::eq("month", month))
            .limit(1)
            .fetch()
            .await?;

        Ok(rows.into_iter().next())
    }

    pub async fn insert(
        &self,
        request: &CreatePlanRequest,
        created_by: Uuid,
    ) -> PlansResult<YearPlan> {
        let mut row = serde_json::to_value(request).map_err(StoreError::from)?;
        row["created_by"] = json!(created_by);

        Ok(self.client.table(TABLE).insert(&row).await?)
    }

    pub async fn update(&self, id: i64, request: &UpdatePlanRequest) -> PlansResult<YearPlan> {
        let mut changes = serde_json::to_value(request).map_err(StoreError::from)?;
        changes["updated_at"] = json!(Utc::now());

        Ok(self
            .client
            .table(TABLE)
            .update(vec![Filter::eq("id", id)], &changes)
            .await?)
    }

    pub async fn delete(&self, id: i64) -> PlansResult<()> {
        Ok(self
            .client
            .table(TABLE)
            .delete(vec![Filter::eq("id", id)])
            .await?)
    }

    /// Store a plan document (replacing any previous upload at the same
    /// path) and return its public URL.
    pub async fn store_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlansResult<String> {
        let bucket = self.client.bucket(&self.document_bucket);
        bucket.upload(path, bytes, content_type, true).await?;
        Ok(bucket.public_url(path))
    }
}
