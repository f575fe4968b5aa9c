//! Yearly plan manager: monthly programme CRUD, document uploads, year
//! duplication.

use std::sync::Arc;

use tracing::info;

use ayf_auth::Identity;
use ayf_store::StoreClient;

use crate::entities::{CreatePlanRequest, PlanDocumentKind, UpdatePlanRequest, YearPlan};
use crate::repositories::PlansRepository;
use crate::types::{PlansError, PlansResult};

/// Data access for yearly plans.
pub trait PlansRepo {
    async fn list_for_year(&self, year: i32) -> PlansResult<Vec<YearPlan>>;
    async fn find_by_id(&self, id: i64) -> PlansResult<Option<YearPlan>>;
    async fn find_by_year_month(&self, year: i32, month: u32) -> PlansResult<Option<YearPlan>>;
    async fn insert(
        &self,
        request: &CreatePlanRequest,
        created_by: uuid::Uuid,
    ) -> PlansResult<YearPlan>;
    async fn update(&self, id: i64, request: &UpdatePlanRequest) -> PlansResult<YearPlan>;
    async fn delete(&self, id: i64) -> PlansResult<()>;
    async fn store_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlansResult<String>;
}

impl PlansRepo for PlansRepository {
    async fn list_for_year(&self, year: i32) -> PlansResult<Vec<YearPlan>> {
        self.list_for_year(year).await
    }

    async fn find_by_id(&self, id: i64) -> PlansResult<Option<YearPlan>> {
        self.find_by_id(id).await
    }

    async fn find_by_year_month(&self, year: i32, month: u32) -> PlansResult<Option<YearPlan>> {
        self.find_by_year_month(year, month).await
    }

    async fn insert(
        &self,
        request: &CreatePlanRequest,
        created_by: uuid::Uuid,
    ) -> PlansResult<YearPlan> {
        self.insert(request, created_by).await
    }

    async fn update(&self, id: i64, request: &UpdatePlanRequest) -> PlansResult<YearPlan> {
        self.update(id, request).await
    }

    async fn delete(&self, id: i64) -> PlansResult<()> {
        self.delete(id).await
    }

    async fn store_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlansResult<String> {
        self.store_document(path, bytes, content_type).await
    }
}

/// Service for managing yearly plan operations.
pub struct PlansService<R, I> {
    repository: R,
    identity: Arc<I>,
}

impl<I: Identity> PlansService<PlansRepository, I> {
    pub fn new(client: StoreClient, document_bucket: &str, identity: Arc<I>) -> Self {
        Self {
            repository: PlansRepository::new(client, document_bucket),
            identity,
        }
    }
}

impl<R, I> PlansService<R, I>
where
    R: PlansRepo,
    I: Identity,
{
    pub fn with_repository(repository: R, identity: Arc<I>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// The programme for one year, month ascending.
    pub async fn yearly_plan(&self, year: i32) -> PlansResult<Vec<YearPlan>> {
        self.repository.list_for_year(year).await
    }

    pub async fn plan_by_id(&self, id: i64) -> PlansResult<YearPlan> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(PlansError::PlanNotFound)
    }

    /// Create a month's plan. One plan per (year, month).
    pub async fn create_plan(&self, request: CreatePlanRequest) -> PlansResult<YearPlan> {
        let user = self.require_user()?;
        request.validate().map_err(PlansError::Validation)?;

        if self
            .repository
            .find_by_year_month(request.year, request.month)
            .await?
            .is_some()
        {
            return Err(PlansError::PlanExists {
                year: request.year,
                month: request.month,
            });
        }

        let plan = self.repository.insert(&request, user.id).await?;
        info!(plan_id = plan.id, year = plan.year, month = plan.month, "created plan");
        Ok(plan)
    }

    pub async fn update_plan(
        &self,
        id: i64,
        request: UpdatePlanRequest,
    ) -> PlansResult<YearPlan> {
        self.require_user()?;
        self.repository.update(id, &request).await
    }

    pub async fn delete_plan(&self, id: i64) -> PlansResult<()> {
        self.require_user()?;
        self.repository.delete(id).await
    }

    /// Upload a plan document and persist its URL on the owning plan row.
    /// The upload happens first; if it fails the row is never touched. The
    /// extension picks the slot (pdf or excel).
    pub async fn publish_plan_document(
        &self,
        plan_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlansResult<YearPlan> {
        self.require_user()?;
        let plan = self.plan_by_id(plan_id).await?;

        let extension = filename
            .rsplit_once('.')
            .map(|(_, extension)| extension)
            .filter(|extension| !extension.is_empty())
            .ok_or_else(|| PlansError::Validation(format!("no file extension: {filename}")))?;
        let kind = PlanDocumentKind::from_extension(extension).ok_or_else(|| {
            PlansError::Validation(format!("unsupported document type: {extension}"))
        })?;

        let path = format!("plans/yearly-plan-{}.{}", plan.year, extension);
        let url = self
            .repository
            .store_document(&path, bytes, content_type)
            .await?;

        let changes = match kind {
            PlanDocumentKind::Pdf => UpdatePlanRequest {
                pdf_url: Some(url),
                ..Default::default()
            },
            PlanDocumentKind::Excel => UpdatePlanRequest {
                excel_url: Some(url),
                ..Default::default()
            },
        };

        let updated = self.repository.update(plan_id, &changes).await?;
        info!(plan_id, year = updated.year, "attached plan document");
        Ok(updated)
    }

    /// Copy every plan of one year into another. Identity and audit
    /// timestamps are dropped; everything else carries over.
    pub async fn duplicate_year_plan(
        &self,
        source_year: i32,
        target_year: i32,
    ) -> PlansResult<Vec<YearPlan>> {
        let user = self.require_user()?;

        let source = self.repository.list_for_year(source_year).await?;
        if source.is_empty() {
            return Err(PlansError::EmptyPlanYear(source_year));
        }

        let existing = self.repository.list_for_year(target_year).await?;
        if let Some(taken) = source
            .iter()
            .find(|plan| existing.iter().any(|e| e.month == plan.month))
        {
            return Err(PlansError::PlanExists {
                year: target_year,
                month: taken.month,
            });
        }

        let mut copies = Vec::with_capacity(source.len());
        for plan in &source {
            let request = CreatePlanRequest {
                year: target_year,
                month: plan.month,
                theme: plan.theme.clone(),
                theme_scripture: plan.theme_scripture.clone(),
                activities: plan.activities.clone(),
                scriptures: plan.scriptures.clone(),
                goals: plan.goals.clone(),
                notes: plan.notes.clone(),
            };
            copies.push(self.repository.insert(&request, user.id).await?);
        }

        info!(source_year, target_year, copied = copies.len(), "duplicated year plan");
        Ok(copies)
    }

    fn require_user(&self) -> PlansResult<ayf_store::AuthUser> {
        self.identity
            .current_user()
            .ok_or(PlansError::AuthenticationRequired)
    }
}
