//! Port abstraction for user persistence and its errors.
//!
//! Handlers only ever touch storage through [`UserStore`]. The MongoDB adapter
//! lives in [`crate::db`]; tests plug in an in-memory one.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{User, UserFields, UserId};

/// Errors raised by user store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The driver or server rejected the operation.
    #[error("{0}")]
    Driver(String),

    /// A stored document did not have the user shape.
    #[error("decoding user document: {0}")]
    Decode(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Returns the id it was stored under.
    async fn insert(&self, user: &User) -> Result<UserId, StoreError>;

    /// Fetch a user by primary key.
    async fn find(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Overwrite name, location and title. Returns the matched count (0 or 1).
    async fn update(&self, id: &UserId, fields: &UserFields) -> Result<u64, StoreError>;

    /// Remove a user. Returns the deleted count (0 or 1).
    async fn delete(&self, id: &UserId) -> Result<u64, StoreError>;

    /// Every user in the collection, in storage order. Documents that fail to
    /// decode are skipped, not fatal.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}
