//! The context object domain managers are constructed with.
//!
//! Managers gate write operations on "is anyone signed in" and a couple of
//! role predicates; this trait is that narrow view of the auth manager, and
//! lets tests substitute a fixed identity.

use ayf_store::AuthUser;
use uuid::Uuid;

pub trait Identity: Send + Sync {
    /// Snapshot of the signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    fn is_admin(&self) -> bool;

    fn is_editor(&self) -> bool;

    fn user_id(&self) -> Option<Uuid> {
        self.current_user().map(|user| user.id)
    }
}
