//! The uniform JSON envelope wrapped around every user-resource response.
//!
//! ```text
//! {"status": 201, "message": "New user created", "data": {"data": {...}}}
//! {"status": 404, "message": "error", "data": {"data": "User with specified ID not found!"}}
//! ```
//!
//! Handlers return `Result<Reply<T>, ApiError>` (or [`Failure`] when the
//! failure message is not the default `"error"`); both sides render the same
//! shape through [`IntoResponse`].

use serde::Serialize;
use thiserror::Error;

use crate::model::{InvalidUserId, ValidationError};
use crate::response::{IntoResponse, Response};
use crate::status::Status;
use crate::store::StoreError;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize + ?Sized> {
    status: u16,
    message: &'a str,
    data: Data<'a, T>,
}

#[derive(Serialize)]
struct Data<'a, T: Serialize + ?Sized> {
    data: &'a T,
}

fn render<T: Serialize + ?Sized>(status: Status, message: &str, payload: &T) -> Response {
    let envelope = Envelope {
        status: status.as_u16(),
        message,
        data: Data { data: payload },
    };
    Response::to_json(status, &envelope)
}

/// A successful outcome carrying its payload.
#[derive(Debug)]
pub struct Reply<T> {
    status: Status,
    message: &'static str,
    payload: T,
}

impl<T: Serialize> Reply<T> {
    /// `200` with `payload`.
    pub fn ok(message: &'static str, payload: T) -> Self {
        Self { status: Status::Ok, message, payload }
    }

    /// `201` with `payload`.
    pub fn created(message: &'static str, payload: T) -> Self {
        Self { status: Status::Created, message, payload }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        render(self.status, self.message, &self.payload)
    }
}

/// A failed outcome. The variant picks the status code; the display text
/// becomes the envelope payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed body, failed validation, or unparseable identifier.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The storage call failed or missed its deadline.
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::BadRequest(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Storage(_) => Status::InternalServerError,
        }
    }

    /// Replaces the default `"error"` envelope message.
    pub fn with_message(self, message: &'static str) -> Failure {
        Failure { message, error: self }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.with_message("error").into_response()
    }
}

/// An [`ApiError`] with a handler-specific envelope message.
#[derive(Debug, PartialEq, Eq)]
pub struct Failure {
    message: &'static str,
    error: ApiError,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        render(self.error.status(), self.message, &self.error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<InvalidUserId> for ApiError {
    fn from(e: InvalidUserId) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}
