//! Single source of truth for "who is signed in".
//!
//! Every state transition publishes exactly one [`AuthChange`] on a
//! broadcast channel and re-installs the bearer token on the shared store
//! client. Observers must rely on the channel rather than polling; a
//! snapshot read is only guaranteed fresh after the matching notification.
//!
//! No method here returns `Err`: every remote failure is folded into an
//! outcome value so page-level callers never have to catch.

use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::{info, warn};

use ayf_config::AuthSettings;
use ayf_store::{AuthUser, Session, StoreClient, UserMetadata, UserUpdate};
use uuid::Uuid;

use crate::api::{AuthApi, RemoteAuthApi};
use crate::identity::Identity;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Payload of an auth-change notification.
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

/// Outcome of a sign-in attempt.
#[derive(Debug, Clone)]
pub enum SignIn {
    Granted { user: AuthUser },
    Denied { message: String },
}

/// Outcome of a sign-up attempt.
#[derive(Debug, Clone)]
pub enum SignUp {
    /// The service issued a session immediately.
    Active { user: AuthUser },
    /// The account exists but email confirmation is still pending; no
    /// session was stored.
    AwaitingConfirmation { user: AuthUser },
    Rejected { message: String },
}

/// Outcome of the remaining auth operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Ok,
    Failed { message: String },
}

impl AuthOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, AuthOutcome::Ok)
    }

    fn failed(error: impl std::fmt::Display) -> Self {
        AuthOutcome::Failed {
            message: error.to_string(),
        }
    }
}

/// Owns the current session and republishes every transition.
pub struct AuthManager<A = RemoteAuthApi> {
    api: A,
    store: Option<StoreClient>,
    session: RwLock<Option<Session>>,
    changes: broadcast::Sender<AuthChange>,
    admin_email_domain: String,
}

impl AuthManager<RemoteAuthApi> {
    /// Wire the manager to the shared store client. The client's bearer
    /// token is kept in lockstep with the session from here on.
    pub fn new(client: StoreClient, settings: &AuthSettings) -> Self {
        Self::build(
            RemoteAuthApi::new(client.clone()),
            Some(client),
            &settings.admin_email_domain,
        )
    }
}

impl<A: AuthApi> AuthManager<A> {
    /// Build against a custom auth backend (used by tests).
    pub fn with_api(api: A, admin_email_domain: &str) -> Self {
        Self::build(api, None, admin_email_domain)
    }

    fn build(api: A, store: Option<StoreClient>, admin_email_domain: &str) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            api,
            store,
            session: RwLock::new(None),
            changes,
            admin_email_domain: admin_email_domain.to_string(),
        }
    }

    /// Receive a notification for every subsequent state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> SignIn {
        match self.api.sign_in(email, password).await {
            Ok(session) => {
                let user = session.user.clone();
                info!(email, "user signed in");
                self.install(Some(session));
                SignIn::Granted { user }
            }
            Err(error) => {
                warn!(email, %error, "sign in failed");
                SignIn::Denied {
                    message: error.to_string(),
                }
            }
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> SignUp {
        match self.api.sign_up(email, password, &metadata).await {
            Ok(result) => match result.session {
                Some(session) => {
                    let user = session.user.clone();
                    info!(email, "user signed up with immediate session");
                    self.install(Some(session));
                    SignUp::Active { user }
                }
                None => {
                    info!(email, "user signed up, awaiting email confirmation");
                    SignUp::AwaitingConfirmation { user: result.user }
                }
            },
            Err(error) => {
                warn!(email, %error, "sign up failed");
                SignUp::Rejected {
                    message: error.to_string(),
                }
            }
        }
    }

    /// Clear the session. Safe to call with no session active; the remote
    /// revoke is only attempted when one exists, and a revoke failure still
    /// clears local state before being reported.
    pub async fn sign_out(&self) -> AuthOutcome {
        let had_session = self.current_session().is_some();

        let revoke_error = if had_session {
            self.api.sign_out().await.err()
        } else {
            None
        };

        if had_session {
            self.install(None);
        }

        match revoke_error {
            Some(error) => {
                warn!(%error, "remote sign-out failed; local session cleared");
                AuthOutcome::failed(error)
            }
            None => AuthOutcome::Ok,
        }
    }

    /// Exchange the refresh token for a fresh session. On failure the prior
    /// session is cleared and re-authentication is required.
    pub async fn refresh_session(&self) -> AuthOutcome {
        let refresh_token = match self.current_session() {
            Some(session) => session.refresh_token,
            None => {
                return AuthOutcome::Failed {
                    message: "no active session to refresh".to_string(),
                }
            }
        };

        match self.api.refresh(&refresh_token).await {
            Ok(session) => {
                self.install(Some(session));
                AuthOutcome::Ok
            }
            Err(error) => {
                warn!(%error, "session refresh failed; clearing session");
                self.install(None);
                AuthOutcome::failed(error)
            }
        }
    }

    pub async fn reset_password(&self, email: &str) -> AuthOutcome {
        match self.api.reset_password(email).await {
            Ok(()) => AuthOutcome::Ok,
            Err(error) => AuthOutcome::failed(error),
        }
    }

    pub async fn update_password(&self, new_password: &str) -> AuthOutcome {
        if self.current_session().is_none() {
            return AuthOutcome::Failed {
                message: "not authenticated".to_string(),
            };
        }

        let changes = UserUpdate {
            password: Some(new_password.to_string()),
            data: None,
        };

        match self.api.update_user(&changes).await {
            Ok(_) => AuthOutcome::Ok,
            Err(error) => AuthOutcome::failed(error),
        }
    }

    /// Update the signed-in user's metadata and refresh the cached user.
    pub async fn update_profile(&self, metadata: UserMetadata) -> AuthOutcome {
        if self.current_session().is_none() {
            return AuthOutcome::Failed {
                message: "not authenticated".to_string(),
            };
        }

        let changes = UserUpdate {
            password: None,
            data: Some(metadata),
        };

        match self.api.update_user(&changes).await {
            Ok(user) => {
                let updated = {
                    let mut guard = self.session.write().expect("session lock poisoned");
                    if let Some(session) = guard.as_mut() {
                        session.user = user;
                        Some(session.clone())
                    } else {
                        None
                    }
                };
                if let Some(session) = updated {
                    self.publish(&Some(session));
                }
                AuthOutcome::Ok
            }
            Err(error) => AuthOutcome::failed(error),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    pub fn user_email(&self) -> Option<String> {
        self.current_user().and_then(|user| user.email)
    }

    /// Swap the stored session, mirror it onto the store client, and
    /// publish one change notification.
    fn install(&self, session: Option<Session>) {
        {
            let mut guard = self.session.write().expect("session lock poisoned");
            *guard = session.clone();
        }

        if let Some(store) = &self.store {
            store.set_bearer(session.as_ref().map(|s| s.access_token.clone()));
        }

        self.publish(&session);
    }

    fn publish(&self, session: &Option<Session>) {
        let change = AuthChange {
            user: session.as_ref().map(|s| s.user.clone()),
            session: session.clone(),
        };
        // Nobody listening is fine.
        let _ = self.changes.send(change);
    }
}

impl<A: AuthApi> Identity for AuthManager<A> {
    fn current_user(&self) -> Option<AuthUser> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// Admins are role claims or accounts under the fellowship's own
    /// email domain.
    fn is_admin(&self) -> bool {
        let Some(user) = self.current_user() else {
            return false;
        };

        if user.role() == Some("admin") {
            return true;
        }

        user.email
            .as_deref()
            .map(|email| email.ends_with(&format!("@{}", self.admin_email_domain)))
            .unwrap_or(false)
    }

    /// Editors are explicit editor roles, plus every admin.
    fn is_editor(&self) -> bool {
        self.current_user()
            .map(|user| user.role() == Some("editor"))
            .unwrap_or(false)
            || self.is_admin()
    }

    fn user_id(&self) -> Option<Uuid> {
        self.current_user().map(|user| user.id)
    }
}
