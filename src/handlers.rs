//! User resource handlers.
//!
//! Each handler is stateless: parse, validate, do its storage work under one
//! [`DB_DEADLINE`], and answer with an envelope. Input problems are rejected
//! before the store is touched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::envelope::{ApiError, Failure, Reply};
use crate::model::{User, UserId, UserInput};
use crate::request::Request;
use crate::response::Response;
use crate::routes::USER_ID;
use crate::status::Status;
use crate::store::UserStore;

/// Deadline for all the storage work of one request.
pub const DB_DEADLINE: Duration = Duration::from_secs(10);

pub const WELCOME: &str = "Hello World! Welcome to Mongo and Mux";
pub const USER_NOT_FOUND: &str = "User with specified ID not found!";
pub const USER_DELETED: &str = "User deleted successfully!";

/// Payload of a successful create.
#[derive(Debug, Serialize)]
pub struct Inserted {
    #[serde(rename = "InsertedID")]
    pub inserted_id: UserId,
}

type Store = Arc<dyn UserStore>;

/// `GET /` — static greeting, not enveloped.
pub async fn welcome(_req: Request) -> Response {
    Response::to_json(Status::Ok, &json!({ "data": WELCOME }))
}

/// `POST /user`
pub async fn create_user(store: Store, req: Request) -> Result<Reply<Inserted>, ApiError> {
    let fields = req.json::<UserInput>()?.validate()?;
    let user = User::new(UserId::generate(), fields);

    let id = within_deadline(async { Ok::<_, ApiError>(store.insert(&user).await?) }).await?;
    info!(user_id = %id, "user created");
    Ok(Reply::created("New user created", Inserted { inserted_id: id }))
}

/// `GET /user/{userId}`
pub async fn get_user(store: Store, req: Request) -> Result<Reply<User>, Failure> {
    find_user(&store, &req)
        .await
        .map(|user| Reply::ok("Success", user))
        .map_err(|e| e.with_message("Error in finding the user"))
}

async fn find_user(store: &Store, req: &Request) -> Result<User, ApiError> {
    let id = path_id(req)?;
    within_deadline(async { store.find(&id).await?.ok_or_else(not_found) }).await
}

/// `PUT /user/{userId}`
pub async fn edit_user(store: Store, req: Request) -> Result<Reply<User>, Failure> {
    update_user(&store, &req)
        .await
        .map(|user| Reply::ok("Success", user))
        .map_err(|e| e.with_message("Error"))
}

async fn update_user(store: &Store, req: &Request) -> Result<User, ApiError> {
    let id = path_id(req)?;
    let fields = req.json::<UserInput>()?.validate()?;

    let user = within_deadline(async {
        if store.update(&id, &fields).await? == 0 {
            return Err(not_found());
        }
        // Deleted between the update and the re-read.
        store.find(&id).await?.ok_or_else(not_found)
    })
    .await?;
    info!(user_id = %id, "user updated");
    Ok(user)
}

/// `DELETE /user/{userId}`
pub async fn delete_user(store: Store, req: Request) -> Result<Reply<&'static str>, ApiError> {
    let id = path_id(&req)?;
    within_deadline(async {
        match store.delete(&id).await? {
            0 => Err(not_found()),
            _ => Ok(()),
        }
    })
    .await?;
    info!(user_id = %id, "user deleted");
    Ok(Reply::ok("success", USER_DELETED))
}

/// `GET /users`
pub async fn list_users(store: Store, _req: Request) -> Result<Reply<Vec<User>>, ApiError> {
    let users = within_deadline(async { Ok::<_, ApiError>(store.list().await?) }).await?;
    Ok(Reply::ok("success", users))
}

fn path_id(req: &Request) -> Result<UserId, ApiError> {
    let raw = req
        .param(USER_ID)
        .ok_or_else(|| ApiError::BadRequest(format!("missing path parameter `{USER_ID}`")))?;
    Ok(raw.parse::<UserId>()?)
}

fn not_found() -> ApiError {
    ApiError::NotFound(USER_NOT_FOUND.to_owned())
}

/// Runs the whole storage sequence of a request under [`DB_DEADLINE`],
/// logging storage failures.
async fn within_deadline<T>(
    work: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(DB_DEADLINE, work).await {
        Ok(Err(ApiError::Storage(e))) => {
            error!("storage call failed: {e}");
            Err(ApiError::Storage(e))
        }
        Ok(res) => res,
        Err(_) => {
            error!(deadline = ?DB_DEADLINE, "storage work timed out");
            Err(ApiError::Storage("database operation timed out".to_owned()))
        }
    }
}
