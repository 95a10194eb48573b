use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mongo_users::{
    Method, Response, Router, Status, StoreError, User, UserFields, UserId, UserStore, routes,
};
use serde_json::Value;
use tokio::sync::Mutex;

/// In-memory stand-in for MongoDB that counts every call it receives.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<String, User>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    fail_with: Option<String>,
    vanish_on_update: bool,
}

impl MemoryStore {
    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    pub fn failing(message: &str) -> Self {
        Self { fail_with: Some(message.to_owned()), ..Self::default() }
    }

    /// Reports every update as matched but drops the record, as if it were
    /// deleted before the follow-up read.
    pub fn vanishing() -> Self {
        Self { vanish_on_update: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(msg) => Err(StoreError::Driver(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<UserId, StoreError> {
        self.enter().await?;
        self.users.lock().await.insert(user.id.to_string(), user.clone());
        Ok(user.id)
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.enter().await?;
        Ok(self.users.lock().await.get(&id.to_string()).cloned())
    }

    async fn update(&self, id: &UserId, fields: &UserFields) -> Result<u64, StoreError> {
        self.enter().await?;
        let mut users = self.users.lock().await;
        if self.vanish_on_update {
            users.remove(&id.to_string());
            return Ok(1);
        }
        match users.get_mut(&id.to_string()) {
            Some(user) => {
                *user = User::new(*id, fields.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<u64, StoreError> {
        self.enter().await?;
        Ok(u64::from(self.users.lock().await.remove(&id.to_string()).is_some()))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.enter().await?;
        Ok(self.users.lock().await.values().cloned().collect())
    }
}

/// A router over `store`, plus helpers to drive it without a socket.
pub struct App {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl App {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::default())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let router = routes::router(Arc::clone(&store) as Arc<dyn UserStore>);
        Self { store, router }
    }

    pub async fn call(&self, method: Method, path: &str, body: &str) -> Response {
        self.router.dispatch(method, path, Bytes::from(body.to_owned())).await
    }

    /// Calls and decodes the JSON body. Panics on an empty body.
    pub async fn json(&self, method: Method, path: &str, body: &str) -> (Status, Value) {
        let res = self.call(method, path, body).await;
        let value = serde_json::from_slice(res.body()).expect("response body is JSON");
        (res.status_code(), value)
    }

    /// Creates a user and returns its id.
    pub async fn create(&self, name: &str, location: &str, title: &str) -> String {
        let body = serde_json::json!({ "name": name, "location": location, "title": title });
        let (status, value) = self.json(Method::Post, "/user", &body.to_string()).await;
        assert_eq!(status, Status::Created, "{value}");
        value["data"]["data"]["InsertedID"]
            .as_str()
            .expect("InsertedID is a string")
            .to_owned()
    }
}
