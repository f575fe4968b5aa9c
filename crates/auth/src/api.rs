//! The auth backend seam: a narrow trait over the store's auth endpoints so
//! the manager can run against the real service or an in-memory double.

use ayf_store::{AuthUser, Session, SignUpResult, StoreClient, StoreResult, UserMetadata, UserUpdate};

/// Operations the auth state manager needs from the backend.
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session>;
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> StoreResult<SignUpResult>;
    async fn sign_out(&self) -> StoreResult<()>;
    async fn refresh(&self, refresh_token: &str) -> StoreResult<Session>;
    async fn reset_password(&self, email: &str) -> StoreResult<()>;
    async fn update_user(&self, changes: &UserUpdate) -> StoreResult<AuthUser>;
}

/// Production implementation backed by the remote store.
#[derive(Clone)]
pub struct RemoteAuthApi {
    client: StoreClient,
}

impl RemoteAuthApi {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

impl AuthApi for RemoteAuthApi {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        self.client.auth().sign_in_with_password(email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> StoreResult<SignUpResult> {
        self.client.auth().sign_up(email, password, metadata).await
    }

    async fn sign_out(&self) -> StoreResult<()> {
        self.client.auth().sign_out().await
    }

    async fn refresh(&self, refresh_token: &str) -> StoreResult<Session> {
        self.client.auth().refresh_session(refresh_token).await
    }

    async fn reset_password(&self, email: &str) -> StoreResult<()> {
        self.client.auth().reset_password_for_email(email).await
    }

    async fn update_user(&self, changes: &UserUpdate) -> StoreResult<AuthUser> {
        self.client.auth().update_user(changes).await
    }
}
