//! MongoDB gateway.
//!
//! One [`Database`] is created at startup and owns the only
//! [`mongodb::Client`]. The client pools and multiplexes connections itself,
//! so handles derived from it are shared freely across requests.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{DATABASE_NAME, USERS_COLLECTION};
use crate::error::Error;
use crate::model::{User, UserFields, UserId};
use crate::store::{StoreError, UserStore};

/// Upper bound on the startup liveness ping.
pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// A connected client scoped to [`DATABASE_NAME`].
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    /// Connects and pings. Either failing is fatal for the caller; there is
    /// no retry.
    pub async fn connect(uri: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(DATABASE_NAME);

        let ping = async { db.run_command(doc! { "ping": 1 }).await };
        match tokio::time::timeout(PING_TIMEOUT, ping).await {
            Ok(res) => {
                res?;
            }
            Err(_) => return Err(Error::PingTimeout(PING_TIMEOUT)),
        }

        info!(database = DATABASE_NAME, "connected to MongoDB");
        Ok(Self { client, db })
    }

    /// A typed handle to `name` within the service database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// The user store backed by the `users` collection.
    pub fn users(&self) -> MongoUserStore {
        MongoUserStore { users: self.collection(USERS_COLLECTION) }
    }

    /// Closes pools and background monitors.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB client closed");
    }
}

// ── Storage document ──────────────────────────────────────────────────────────

/// The on-disk shape: the id is the document's own `_id`.
#[derive(Debug, Deserialize, Serialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    location: String,
    title: String,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_object_id(),
            name: user.name.clone(),
            location: user.location.clone(),
            title: user.title.clone(),
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User::new(UserId::from(doc.id), UserFields {
            name: doc.name,
            location: doc.location,
            title: doc.title,
        })
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        match *e.kind {
            ErrorKind::BsonDeserialization(_) => Self::Decode(e.to_string()),
            _ => Self::Driver(e.to_string()),
        }
    }
}

// ── MongoUserStore ────────────────────────────────────────────────────────────

/// [`UserStore`] over a MongoDB collection. Every filter is on `_id`.
#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<UserDocument>,
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: &User) -> Result<UserId, StoreError> {
        self.users.insert_one(UserDocument::from(user)).await?;
        Ok(user.id)
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let found = self.users.find_one(doc! { "_id": id.as_object_id() }).await?;
        Ok(found.map(User::from))
    }

    async fn update(&self, id: &UserId, fields: &UserFields) -> Result<u64, StoreError> {
        let update = doc! {
            "$set": {
                "name": fields.name.as_str(),
                "location": fields.location.as_str(),
                "title": fields.title.as_str(),
            }
        };
        let res = self.users.update_one(doc! { "_id": id.as_object_id() }, update).await?;
        Ok(res.matched_count)
    }

    async fn delete(&self, id: &UserId) -> Result<u64, StoreError> {
        let res = self.users.delete_one(doc! { "_id": id.as_object_id() }).await?;
        Ok(res.deleted_count)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut cursor = self.users.find(doc! {}).await?;
        let mut users = Vec::new();
        let mut skipped = 0usize;
        while cursor.advance().await? {
            match cursor.deserialize_current() {
                Ok(doc) => users.push(User::from(doc)),
                Err(e) => {
                    skipped += 1;
                    warn!(collection = USERS_COLLECTION, "skipping undecodable document: {e}");
                }
            }
        }
        if skipped > 0 {
            warn!(returned = users.len(), skipped, "listed users with decode errors");
        }
        Ok(users)
    }
}
