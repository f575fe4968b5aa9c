//! Announcements manager.

use std::sync::Arc;

use tracing::{info, warn};

use ayf_auth::Identity;
use ayf_store::StoreClient;

use crate::entities::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest};
use crate::repositories::AnnouncementsRepository;
use crate::types::{AnnouncementQuery, AnnouncementsError, AnnouncementsResult};

/// Data access for announcements.
pub trait AnnouncementsRepo {
    async fn list(
        &self,
        published_only: bool,
        limit: Option<u32>,
    ) -> AnnouncementsResult<Vec<Announcement>>;
    async fn find_by_id(&self, id: i64) -> AnnouncementsResult<Option<Announcement>>;
    async fn insert(
        &self,
        request: &CreateAnnouncementRequest,
        author_id: uuid::Uuid,
    ) -> AnnouncementsResult<Announcement>;
    async fn update(
        &self,
        id: i64,
        request: &UpdateAnnouncementRequest,
    ) -> AnnouncementsResult<Announcement>;
    async fn delete(&self, id: i64) -> AnnouncementsResult<()>;
    async fn increment_views(&self, id: i64) -> AnnouncementsResult<()>;
    async fn set_views(&self, id: i64, views: i64) -> AnnouncementsResult<()>;
}

impl AnnouncementsRepo for AnnouncementsRepository {
    async fn list(
        &self,
        published_only: bool,
        limit: Option<u32>,
    ) -> AnnouncementsResult<Vec<Announcement>> {
        self.list(published_only, limit).await
    }

    async fn find_by_id(&self, id: i64) -> AnnouncementsResult<Option<Announcement>> {
        self.find_by_id(id).await
    }

    async fn insert(
        &self,
        request: &CreateAnnouncementRequest,
        author_id: uuid::Uuid,
    ) -> AnnouncementsResult<Announcement> {
        self.insert(request, author_id).await
    }

    async fn update(
        &self,
        id: i64,
        request: &UpdateAnnouncementRequest,
    ) -> AnnouncementsResult<Announcement> {
        self.update(id, request).await
    }

    async fn delete(&self, id: i64) -> AnnouncementsResult<()> {
        self.delete(id).await
    }

    async fn increment_views(&self, id: i64) -> AnnouncementsResult<()> {
        self.increment_views(id).await
    }

    async fn set_views(&self, id: i64, views: i64) -> AnnouncementsResult<()> {
        self.set_views(id, views).await
    }
}

/// Service for managing announcement operations.
pub struct AnnouncementsService<R, I> {
    repository: R,
    identity: Arc<I>,
}

impl<I: Identity> AnnouncementsService<AnnouncementsRepository, I> {
    pub fn new(client: StoreClient, identity: Arc<I>) -> Self {
        Self {
            repository: AnnouncementsRepository::new(client),
            identity,
        }
    }
}

impl<R, I> AnnouncementsService<R, I>
where
    R: AnnouncementsRepo,
    I: Identity,
{
    pub fn with_repository(repository: R, identity: Arc<I>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// Announcements newest first; drafts only when asked for.
    pub async fn announcements(
        &self,
        options: AnnouncementQuery,
    ) -> AnnouncementsResult<Vec<Announcement>> {
        self.repository
            .list(options.published_only, options.limit)
            .await
    }

    pub async fn announcement_by_id(&self, id: i64) -> AnnouncementsResult<Announcement> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AnnouncementsError::AnnouncementNotFound)
    }

    pub async fn create_announcement(
        &self,
        request: CreateAnnouncementRequest,
    ) -> AnnouncementsResult<Announcement> {
        let user = self.require_user()?;
        request.validate().map_err(AnnouncementsError::Validation)?;

        let announcement = self.repository.insert(&request, user.id).await?;
        info!(
            announcement_id = announcement.id,
            title = %announcement.title,
            "created announcement"
        );
        Ok(announcement)
    }

    pub async fn update_announcement(
        &self,
        id: i64,
        request: UpdateAnnouncementRequest,
    ) -> AnnouncementsResult<Announcement> {
        self.require_user()?;
        self.repository.update(id, &request).await
    }

    pub async fn delete_announcement(&self, id: i64) -> AnnouncementsResult<()> {
        self.require_user()?;
        self.repository.delete(id).await?;
        info!(announcement_id = id, "deleted announcement");
        Ok(())
    }

    /// Bump the view counter through the server-side hook; when the hook
    /// errors, fall back to a read-then-write of the stored counter.
    pub async fn increment_views(&self, id: i64) -> AnnouncementsResult<()> {
        match self.repository.increment_views(id).await {
            Ok(()) => Ok(()),
            Err(error) => {
                warn!(announcement_id = id, %error, "view hook failed, writing counter directly");

                let announcement = self.announcement_by_id(id).await?;
                self.repository
                    .set_views(id, announcement.views + 1)
                    .await
            }
        }
    }

    fn require_user(&self) -> AnnouncementsResult<ayf_store::AuthUser> {
        self.identity
            .current_user()
            .ok_or(AnnouncementsError::AuthenticationRequired)
    }
}
