//! In-memory doubles for the auth seam, shared by this crate's tests and
//! the domain crates downstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{Duration, Utc};
use uuid::Uuid;

use ayf_store::{
    AuthUser, Session, SignUpResult, StoreError, StoreResult, UserMetadata, UserUpdate,
};

use crate::api::AuthApi;
use crate::identity::Identity;

/// Mint a plausible auth user for tests.
pub fn sample_user(email: &str) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        user_metadata: UserMetadata::default(),
        created_at: Some(Utc::now()),
        email_confirmed_at: Some(Utc::now()),
    }
}

#[derive(Clone)]
struct MockAccount {
    password: String,
    user: AuthUser,
}

/// Scriptable in-memory auth backend.
#[derive(Default)]
pub struct MockAuthApi {
    accounts: Mutex<HashMap<String, MockAccount>>,
    current: Mutex<Option<AuthUser>>,
    require_confirmation: bool,
    fail_refresh: bool,
    fail_sign_out: bool,
    calls: AtomicUsize,
    token_seq: AtomicUsize,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str, metadata: UserMetadata) -> Self {
        let mut user = sample_user(email);
        user.user_metadata = metadata;
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            MockAccount {
                password: password.to_string(),
                user,
            },
        );
        self
    }

    /// Make sign-up behave as if email confirmation were enabled.
    pub fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    /// Total backend calls issued, across all operations.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn session_for(&self, user: AuthUser) -> Session {
        let seq = self.token_seq.fetch_add(1, Ordering::SeqCst);
        Session {
            access_token: format!("access-{seq}"),
            refresh_token: format!("refresh-{seq}"),
            expires_at: Utc::now() + Duration::hours(1),
            user,
        }
    }

    fn rejection(message: &str) -> StoreError {
        StoreError::Api {
            status: 400,
            message: message.to_string(),
        }
    }
}

impl AuthApi for MockAuthApi {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        self.record_call();
        let account = {
            let accounts = self.accounts.lock().unwrap();
            accounts.get(email).cloned()
        };

        match account {
            Some(account) if account.password == password => {
                *self.current.lock().unwrap() = Some(account.user.clone());
                Ok(self.session_for(account.user))
            }
            _ => Err(Self::rejection("Invalid login credentials")),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> StoreResult<SignUpResult> {
        self.record_call();

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(Self::rejection("User already registered"));
        }

        let mut user = sample_user(email);
        user.user_metadata = metadata.clone();
        if self.require_confirmation {
            user.email_confirmed_at = None;
        }
        accounts.insert(
            email.to_string(),
            MockAccount {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        drop(accounts);

        if self.require_confirmation {
            Ok(SignUpResult {
                user,
                session: None,
            })
        } else {
            *self.current.lock().unwrap() = Some(user.clone());
            Ok(SignUpResult {
                session: Some(self.session_for(user.clone())),
                user,
            })
        }
    }

    async fn sign_out(&self) -> StoreResult<()> {
        self.record_call();
        if self.fail_sign_out {
            return Err(Self::rejection("revoke failed"));
        }
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn refresh(&self, _refresh_token: &str) -> StoreResult<Session> {
        self.record_call();
        if self.fail_refresh {
            return Err(Self::rejection("refresh token expired"));
        }

        let current = self.current.lock().unwrap().clone();
        match current {
            Some(user) => Ok(self.session_for(user)),
            None => Err(Self::rejection("no session")),
        }
    }

    async fn reset_password(&self, _email: &str) -> StoreResult<()> {
        self.record_call();
        Ok(())
    }

    async fn update_user(&self, changes: &UserUpdate) -> StoreResult<AuthUser> {
        self.record_call();

        let mut current = self.current.lock().unwrap();
        let user = current
            .as_mut()
            .ok_or_else(|| Self::rejection("not authenticated"))?;

        if let Some(metadata) = &changes.data {
            user.user_metadata = metadata.clone();
        }

        let updated = user.clone();
        drop(current);

        let mut accounts = self.accounts.lock().unwrap();
        if let Some(email) = updated.email.as_deref() {
            if let Some(account) = accounts.get_mut(email) {
                account.user = updated.clone();
                if let Some(password) = &changes.password {
                    account.password = password.clone();
                }
            }
        }

        Ok(updated)
    }
}

/// A fixed identity for wiring domain-manager tests.
pub struct StaticIdentity {
    user: Option<AuthUser>,
    admin: bool,
    editor: bool,
}

impl StaticIdentity {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            admin: false,
            editor: false,
        }
    }

    pub fn member(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            admin: false,
            editor: false,
        }
    }

    pub fn editor(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            admin: false,
            editor: true,
        }
    }

    pub fn admin(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            admin: true,
            editor: true,
        }
    }
}

impl Identity for StaticIdentity {
    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn is_editor(&self) -> bool {
        self.editor
    }
}
