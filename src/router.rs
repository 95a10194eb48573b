//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. Unmatched paths get a bodiless `404`, unknown method tokens a
//! bodiless `405`.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route template or conflicts with one
    /// already registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one fully-read request to its handler and awaits the response.
    ///
    /// This is what the server calls per request; tests call it directly to
    /// exercise the whole HTTP contract without a socket.
    pub async fn dispatch(&self, method: Method, path: &str, body: Bytes) -> Response {
        match self.lookup(method, path) {
            Some((handler, params)) => {
                handler.call(Request::new(body, params)).await
            }
            None => Response::status(Status::NotFound),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(req: Request) -> Response {
        let id = req.param("userId").unwrap_or_default().to_owned();
        Response::to_json(Status::Ok, &id)
    }

    #[tokio::test]
    async fn extracts_named_params() {
        let router = Router::new().on(Method::Get, "/user/{userId}", echo_id);
        let res = router.dispatch(Method::Get, "/user/abc", Bytes::new()).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(res.body(), br#""abc""#);
    }

    #[tokio::test]
    async fn method_must_match_exactly() {
        let router = Router::new().on(Method::Get, "/user/{userId}", echo_id);
        let res = router.dispatch(Method::Put, "/user/abc", Bytes::new()).await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let router = Router::new().on(Method::Get, "/users", echo_id);
        let res = router.dispatch(Method::Get, "/users/extra", Bytes::new()).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }
}
