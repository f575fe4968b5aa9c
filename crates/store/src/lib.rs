//! AYF Portal Store Crate
//!
//! Typed client for the hosted backend the portal runs on. Three surfaces:
//!
//! - **Tables**: select with filter/order/limit, insert, update, delete,
//!   exact counts ([`TableHandle`], [`SelectBuilder`]).
//! - **Storage**: per-bucket upload/list/remove and public URLs
//!   ([`BucketHandle`]).
//! - **Auth**: password grant, sign-up, refresh, recovery, metadata update,
//!   and the service-role admin user API ([`AuthHandle`]).
//!
//! Every persistence and auth operation in the portal is a pass-through
//! call issued here; the domain crates sequence these calls but own no
//! storage of their own.

pub mod auth_api;
pub mod client;
pub mod error;
pub mod query;
pub mod storage;

pub use auth_api::{
    AdminCreateUser, AuthHandle, AuthUser, Session, SignUpResult, UserMetadata, UserUpdate,
};
pub use client::{StoreClient, TableHandle};
pub use error::{StoreError, StoreResult};
pub use query::{Filter, Order, SelectBuilder};
pub use storage::{BucketHandle, ObjectInfo};
