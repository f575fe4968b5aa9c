//! Repository for profile rows and the auth admin API.

use serde_json::json;
use uuid::Uuid;

use ayf_store::{
    AdminCreateUser, AuthUser, Filter, StoreClient, StoreError, UserMetadata,
};

use crate::entities::{CreateProfileRequest, ProfileRole, UpdateProfileRequest, UserProfile};
use crate::types::MembersResult;

const TABLE: &str = "user_profiles";

/// Remote repository over the `user_profiles` table plus the privileged
/// auth admin endpoints.
pub struct ProfilesRepository {
    client: StoreClient,
}

impl ProfilesRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn find_profile(&self, user_id: Uuid) -> MembersResult<Option<UserProfile>> {
        let result = self
            .client
            .table(TABLE)
            .select()
            .filter(Filter::eq("id", user_id))
            .fetch_one::<UserProfile>()
            .await;

        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(StoreError::NotFound) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn insert_profile(
        &self,
        user_id: Uuid,
        request: &CreateProfileRequest,
    ) -> MembersResult<UserProfile> {
        let mut row = serde_json::to_value(request).map_err(StoreError::from)?;
        row["id"] = json!(user_id);
        if request.role.is_none() {
            row["role"] = json!(ProfileRole::Member);
        }

        Ok(self.client.table(TABLE).insert(&row).await?)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: &UpdateProfileRequest,
    ) -> MembersResult<UserProfile> {
        Ok(self
            .client
            .table(TABLE)
            .update(vec![Filter::eq("id", user_id)], request)
            .await?)
    }

    pub async fn delete_profile(&self, user_id: Uuid) -> MembersResult<()> {
        Ok(self
            .client
            .table(TABLE)
            .delete(vec![Filter::eq("id", user_id)])
            .await?)
    }

    pub async fn list_profiles(&self) -> MembersResult<Vec<UserProfile>> {
        Ok(self.client.table(TABLE).select().fetch().await?)
    }

    pub async fn profiles_by_role(&self, role: ProfileRole) -> MembersResult<Vec<UserProfile>> {
        Ok(self
            .client
            .table(TABLE)
            .select()
            .filter(Filter::eq("role", role.as_str()))
            .filter(Filter::eq("is_active", true))
            .fetch()
            .await?)
    }

    pub async fn search_profiles(&self, term: &str) -> MembersResult<Vec<UserProfile>> {
        Ok(self
            .client
            .table(TABLE)
            .select()
            .any_of(vec![
                Filter::contains("first_name", term),
                Filter::contains("last_name", term),
            ])
            .fetch()
            .await?)
    }

    // Privileged auth surface.

    pub async fn list_auth_users(&self) -> MembersResult<Vec<AuthUser>> {
        Ok(self.client.auth().admin_list_users().await?)
    }

    pub async fn create_auth_user(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> MembersResult<AuthUser> {
        let attributes = AdminCreateUser {
            email: email.to_string(),
            password: password.to_string(),
            email_confirm: true,
            user_metadata: metadata,
        };

        Ok(self.client.auth().admin_create_user(&attributes).await?)
    }

    pub async fn set_auth_role(
        &self,
        user_id: Uuid,
        role: ProfileRole,
    ) -> MembersResult<AuthUser> {
        let metadata = UserMetadata {
            role: Some(role.as_str().to_string()),
            ..Default::default()
        };

        Ok(self
            .client
            .auth()
            .admin_update_user_metadata(user_id, &metadata)
            .await?)
    }

    pub async fn delete_auth_user(&self, user_id: Uuid) -> MembersResult<()> {
        Ok(self.client.auth().admin_delete_user(user_id).await?)
    }
}
