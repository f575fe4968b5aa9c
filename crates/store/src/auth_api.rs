//! Client for the hosted auth subsystem.
//!
//! Covers the password grant, sign-up, sign-out, token refresh, password
//! recovery/update, user-metadata updates, and the service-role admin user
//! API. Session state is owned by the auth manager one crate up; this module
//! only speaks the wire protocol.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::client::StoreClient;
use crate::error::StoreResult;

/// Free-form metadata stored on the auth user. The portal keeps the role
/// claim and name fields here; anything else rides along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An authenticated account as reported by the auth subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// A signed-in user's credential bundle.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// Sign-up either yields a live session or a user awaiting email
/// confirmation, depending on project settings.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Changes applied to the signed-in user's own account.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UserMetadata>,
}

/// Attributes for an admin-created account.
#[derive(Debug, Clone, Serialize)]
pub struct AdminCreateUser {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            user: self.user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserList {
    users: Vec<AuthUser>,
}

/// Handle for the auth endpoints of the store.
pub struct AuthHandle<'a> {
    client: &'a StoreClient,
}

impl<'a> AuthHandle<'a> {
    pub(crate) fn new(client: &'a StoreClient) -> Self {
        Self { client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.client.base_url())
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> StoreResult<Session> {
        let request = self
            .client
            .authed(self.client.http().post(self.url("token?grant_type=password")))
            .json(&json!({ "email": email, "password": password }));

        let response = self.client.send_checked(request).await?;
        let token = response.json::<TokenResponse>().await?;
        debug!(email, "password sign-in succeeded");
        Ok(token.into_session())
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> StoreResult<SignUpResult> {
        let request = self
            .client
            .authed(self.client.http().post(self.url("signup")))
            .json(&json!({ "email": email, "password": password, "data": metadata }));

        let response = self.client.send_checked(request).await?;
        let body = response.json::<serde_json::Value>().await?;

        // With email confirmation enabled the endpoint returns the bare
        // user; with autoconfirm it returns a full token grant.
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            let session = token.into_session();
            Ok(SignUpResult {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: AuthUser = serde_json::from_value(body)?;
            Ok(SignUpResult {
                user,
                session: None,
            })
        }
    }

    /// Revoke the current session's tokens.
    pub async fn sign_out(&self) -> StoreResult<()> {
        let request = self
            .client
            .authed(self.client.http().post(self.url("logout")));

        self.client.send_checked(request).await?;
        Ok(())
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> StoreResult<Session> {
        let request = self
            .client
            .authed(
                self.client
                    .http()
                    .post(self.url("token?grant_type=refresh_token")),
            )
            .json(&json!({ "refresh_token": refresh_token }));

        let response = self.client.send_checked(request).await?;
        let token = response.json::<TokenResponse>().await?;
        Ok(token.into_session())
    }

    /// Ask the service to send a password recovery email.
    pub async fn reset_password_for_email(&self, email: &str) -> StoreResult<()> {
        let request = self
            .client
            .authed(self.client.http().post(self.url("recover")))
            .json(&json!({ "email": email }));

        self.client.send_checked(request).await?;
        Ok(())
    }

    /// Update the signed-in user (password and/or metadata). Requires the
    /// bearer token to be installed on the client.
    pub async fn update_user(&self, changes: &UserUpdate) -> StoreResult<AuthUser> {
        let request = self
            .client
            .authed(self.client.http().put(self.url("user")))
            .json(changes);

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<AuthUser>().await?)
    }

    // Admin surface. Every call below needs the service role key.

    pub async fn admin_list_users(&self) -> StoreResult<Vec<AuthUser>> {
        let request = self
            .client
            .admin_authed(self.client.http().get(self.url("admin/users")))?;

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<UserList>().await?.users)
    }

    pub async fn admin_create_user(&self, attributes: &AdminCreateUser) -> StoreResult<AuthUser> {
        let request = self
            .client
            .admin_authed(self.client.http().post(self.url("admin/users")))?
            .json(attributes);

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<AuthUser>().await?)
    }

    pub async fn admin_update_user_metadata(
        &self,
        user_id: Uuid,
        metadata: &UserMetadata,
    ) -> StoreResult<AuthUser> {
        let request = self
            .client
            .admin_authed(
                self.client
                    .http()
                    .put(self.url(&format!("admin/users/{user_id}"))),
            )?
            .json(&json!({ "user_metadata": metadata }));

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<AuthUser>().await?)
    }

    pub async fn admin_delete_user(&self, user_id: Uuid) -> StoreResult<()> {
        let request = self.client.admin_authed(
            self.client
                .http()
                .delete(self.url(&format!("admin/users/{user_id}"))),
        )?;

        self.client.send_checked(request).await?;
        Ok(())
    }
}

impl AuthUser {
    /// The role claim carried in metadata, if any.
    pub fn role(&self) -> Option<&str> {
        self.user_metadata.role.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips_extra_fields() {
        let json = serde_json::json!({
            "role": "editor",
            "first_name": "Ada",
            "department": "media"
        });

        let metadata: UserMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(metadata.role.as_deref(), Some("editor"));
        assert_eq!(metadata.first_name.as_deref(), Some("Ada"));
        assert_eq!(
            metadata.extra.get("department").and_then(|v| v.as_str()),
            Some("media")
        );

        let back = serde_json::to_value(&metadata).unwrap();
        assert_eq!(back.get("department").and_then(|v| v.as_str()), Some("media"));
    }

    #[test]
    fn user_update_skips_absent_fields() {
        let update = UserUpdate {
            password: Some("new-password".to_string()),
            data: None,
        };

        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("password").is_some());
        assert!(value.get("data").is_none());
    }
}
