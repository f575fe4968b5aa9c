//! AYF Portal Auth Crate
//!
//! Owns the one piece of shared mutable state in the client: the current
//! session. The [`AuthManager`] wraps the store's auth endpoints, converts
//! every failure into an outcome value (callers never catch), and publishes
//! an [`AuthChange`] for each transition on a broadcast channel. Domain
//! managers receive the manager through the narrow [`Identity`] trait.

pub mod api;
pub mod identity;
pub mod manager;
pub mod testing;

pub use api::{AuthApi, RemoteAuthApi};
pub use identity::Identity;
pub use manager::{AuthChange, AuthManager, AuthOutcome, SignIn, SignUp};
