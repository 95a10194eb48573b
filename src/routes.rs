//! Route table for the service.

use std::future::Future;
use std::sync::Arc;

use crate::handler::Handler;
use crate::handlers;
use crate::method::Method;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Router;
use crate::store::UserStore;

/// Path parameter naming the user in `/user/{userId}`.
pub const USER_ID: &str = "userId";

/// Builds the full router with every user handler bound to `store`.
///
/// | Method | Path | Handler |
/// |---|---|---|
/// | GET | `/` | [`handlers::welcome`] |
/// | POST | `/user` | [`handlers::create_user`] |
/// | GET | `/user/{userId}` | [`handlers::get_user`] |
/// | PUT | `/user/{userId}` | [`handlers::edit_user`] |
/// | DELETE | `/user/{userId}` | [`handlers::delete_user`] |
/// | GET | `/users` | [`handlers::list_users`] |
pub fn router(store: Arc<dyn UserStore>) -> Router {
    Router::new()
        .on(Method::Get,    "/",              handlers::welcome)
        .on(Method::Post,   "/user",          with_store(&store, handlers::create_user))
        .on(Method::Get,    "/user/{userId}", with_store(&store, handlers::get_user))
        .on(Method::Put,    "/user/{userId}", with_store(&store, handlers::edit_user))
        .on(Method::Delete, "/user/{userId}", with_store(&store, handlers::delete_user))
        .on(Method::Get,    "/users",         with_store(&store, handlers::list_users))
}

/// Closes a `(store, request)` handler over a shared store, yielding a plain
/// request handler the router can hold.
fn with_store<F, Fut, R>(store: &Arc<dyn UserStore>, f: F) -> impl Handler
where
    F: Fn(Arc<dyn UserStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let store = Arc::clone(store);
    move |req| f(Arc::clone(&store), req)
}
