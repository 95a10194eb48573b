//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it, or return anything that
//! implements [`IntoResponse`] (an envelope, a `Result` of two of them, a bare
//! [`Status`]).

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::status::Status;

const JSON: &str = "application/json";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use mongo_users::{Response, Status};
///
/// Response::status(Status::NotFound);
///
/// Response::builder()
///     .status(Status::Created)
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Status,
}

impl Response {
    /// Serializes `value` with serde_json. A serialization failure becomes a
    /// bodiless `500`.
    pub fn to_json<T: Serialize + ?Sized>(status: Status, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::builder().status(status).json(bytes),
            Err(e) => {
                error!("response serialization failed: {e}");
                Self::status(Status::InternalServerError)
            }
        }
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code }
    }

    /// Builder for responses that need a custom status.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: Status::Ok }
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Converts into the hyper response written to the wire.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(http::StatusCode::from(self.status));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                error!("invalid response head: {e}");
                let mut fallback = http::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
pub struct ResponseBuilder {
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        let headers = vec![("content-type".to_owned(), JSON.to_owned())];
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

/// Handlers written with `?` return `Result<Reply, ApiError>`; both arms
/// render themselves.
impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_status_and_content_type() {
        let res = Response::builder()
            .status(Status::Created)
            .json(b"{}".to_vec());
        assert_eq!(res.status_code(), Status::Created);
        assert_eq!(res.headers, vec![("content-type".to_owned(), JSON.to_owned())]);
    }

    #[test]
    fn into_inner_keeps_head_and_body() {
        let inner = Response::to_json(Status::NotFound, &serde_json::json!({"a": 1})).into_inner();
        assert_eq!(inner.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(inner.headers()["content-type"], JSON);
    }

    #[test]
    fn result_dispatches_to_either_arm() {
        let ok: Result<Status, Status> = Ok(Status::Ok);
        let err: Result<Status, Status> = Err(Status::BadRequest);
        assert_eq!(ok.into_response().status_code(), Status::Ok);
        assert_eq!(err.into_response().status_code(), Status::BadRequest);
    }
}
