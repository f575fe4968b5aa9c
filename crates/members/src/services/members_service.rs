//! Members manager: profiles for the signed-in flow, plus the admin-only
//! account operations.

use std::sync::Arc;

use tracing::{info, warn};

use ayf_auth::Identity;
use ayf_store::{AuthUser, StoreClient, UserMetadata};
use uuid::Uuid;

use crate::entities::{
    CreateProfileRequest, DirectoryEntry, ProfileRole, UpdateProfileRequest, UserProfile,
};
use crate::repositories::ProfilesRepository;
use crate::types::{MembersError, MembersResult};

/// Data access for profiles and the privileged auth surface.
pub trait MembersRepo {
    async fn find_profile(&self, user_id: Uuid) -> MembersResult<Option<UserProfile>>;
    async fn insert_profile(
        &self,
        user_id: Uuid,
        request: &CreateProfileRequest,
    ) -> MembersResult<UserProfile>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        request: &UpdateProfileRequest,
    ) -> MembersResult<UserProfile>;
    async fn delete_profile(&self, user_id: Uuid) -> MembersResult<()>;
    async fn list_profiles(&self) -> MembersResult<Vec<UserProfile>>;
    async fn profiles_by_role(&self, role: ProfileRole) -> MembersResult<Vec<UserProfile>>;
    async fn search_profiles(&self, term: &str) -> MembersResult<Vec<UserProfile>>;
    async fn list_auth_users(&self) -> MembersResult<Vec<AuthUser>>;
    async fn create_auth_user(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> MembersResult<AuthUser>;
    async fn set_auth_role(&self, user_id: Uuid, role: ProfileRole) -> MembersResult<AuthUser>;
    async fn delete_auth_user(&self, user_id: Uuid) -> MembersResult<()>;
}

impl MembersRepo for ProfilesRepository {
    async fn find_profile(&self, user_id: Uuid) -> MembersResult<Option<UserProfile>> {
        self.find_profile(user_id).await
    }

    async fn insert_profile(
        &self,
        user_id: Uuid,
        request: &CreateProfileRequest,
    ) -> MembersResult<UserProfile> {
        self.insert_profile(user_id, request).await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        request: &UpdateProfileRequest,
    ) -> MembersResult<UserProfile> {
        self.update_profile(user_id, request).await
    }

    async fn delete_profile(&self, user_id: Uuid) -> MembersResult<()> {
        self.delete_profile(user_id).await
    }

    async fn list_profiles(&self) -> MembersResult<Vec<UserProfile>> {
        self.list_profiles().await
    }

    async fn profiles_by_role(&self, role: ProfileRole) -> MembersResult<Vec<UserProfile>> {
        self.profiles_by_role(role).await
    }

    async fn search_profiles(&self, term: &str) -> MembersResult<Vec<UserProfile>> {
        self.search_profiles(term).await
    }

    async fn list_auth_users(&self) -> MembersResult<Vec<AuthUser>> {
        self.list_auth_users().await
    }

    async fn create_auth_user(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> MembersResult<AuthUser> {
        self.create_auth_user(email, password, metadata).await
    }

    async fn set_auth_role(&self, user_id: Uuid, role: ProfileRole) -> MembersResult<AuthUser> {
        self.set_auth_role(user_id, role).await
    }

    async fn delete_auth_user(&self, user_id: Uuid) -> MembersResult<()> {
        self.delete_auth_user(user_id).await
    }
}

/// Service for managing member operations.
pub struct MembersService<R, I> {
    repository: R,
    identity: Arc<I>,
}

impl<I: Identity> MembersService<ProfilesRepository, I> {
    pub fn new(client: StoreClient, identity: Arc<I>) -> Self {
        Self {
            repository: ProfilesRepository::new(client),
            identity,
        }
    }
}

impl<R, I> MembersService<R, I>
where
    R: MembersRepo,
    I: Identity,
{
    pub fn with_repository(repository: R, identity: Arc<I>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> MembersResult<UserProfile> {
        self.repository
            .find_profile(user_id)
            .await?
            .ok_or(MembersError::ProfileNotFound)
    }

    /// Create the profile row for a freshly signed-up account.
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        request: CreateProfileRequest,
    ) -> MembersResult<UserProfile> {
        self.require_user()?;
        let profile = self.repository.insert_profile(user_id, &request).await?;
        info!(%user_id, "created member profile");
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> MembersResult<UserProfile> {
        self.require_user()?;
        self.repository.update_profile(user_id, &request).await
    }

    /// Active members holding a given role.
    pub async fn members_by_role(&self, role: ProfileRole) -> MembersResult<Vec<UserProfile>> {
        self.repository.profiles_by_role(role).await
    }

    /// Case-insensitive name search.
    pub async fn search_members(&self, term: &str) -> MembersResult<Vec<UserProfile>> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        self.repository.search_profiles(trimmed).await
    }

    /// Every auth account joined with its profile. Admin only.
    pub async fn directory(&self) -> MembersResult<Vec<DirectoryEntry>> {
        self.require_admin()?;

        let users = self.repository.list_auth_users().await?;
        let profiles = self.repository.list_profiles().await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let profile = profiles.iter().find(|p| p.id == user.id).cloned();
                DirectoryEntry { user, profile }
            })
            .collect())
    }

    /// Create a confirmed admin account with its profile row. Admin only.
    pub async fn create_admin_user(
        &self,
        email: &str,
        password: &str,
        mut request: CreateProfileRequest,
    ) -> MembersResult<AuthUser> {
        self.require_admin()?;

        if email.trim().is_empty() {
            return Err(MembersError::Validation("email is required".to_string()));
        }

        let metadata = UserMetadata {
            role: Some(ProfileRole::Admin.as_str().to_string()),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            ..Default::default()
        };

        let user = self
            .repository
            .create_auth_user(email, password, metadata)
            .await?;

        request.role = Some(ProfileRole::Admin);
        self.repository.insert_profile(user.id, &request).await?;

        info!(user_id = %user.id, email, "created admin account");
        Ok(user)
    }

    /// Change a member's role in both the auth metadata and the profile
    /// row. Admin only.
    pub async fn update_member_role(
        &self,
        user_id: Uuid,
        role: ProfileRole,
    ) -> MembersResult<UserProfile> {
        self.require_admin()?;

        self.repository.set_auth_role(user_id, role).await?;

        let changes = UpdateProfileRequest {
            role: Some(role),
            ..Default::default()
        };
        let profile = self.repository.update_profile(user_id, &changes).await?;

        info!(%user_id, role = role.as_str(), "updated member role");
        Ok(profile)
    }

    /// Delete a member's auth account and profile row. Admin only.
    pub async fn delete_member(&self, user_id: Uuid) -> MembersResult<()> {
        self.require_admin()?;

        self.repository.delete_auth_user(user_id).await?;
        self.repository.delete_profile(user_id).await?;

        warn!(%user_id, "deleted member account");
        Ok(())
    }

    fn require_user(&self) -> MembersResult<AuthUser> {
        self.identity
            .current_user()
            .ok_or(MembersError::AuthenticationRequired)
    }

    fn require_admin(&self) -> MembersResult<AuthUser> {
        let user = self.require_user()?;
        if !self.identity.is_admin() {
            return Err(MembersError::AdminRequired);
        }
        Ok(user)
    }
}
