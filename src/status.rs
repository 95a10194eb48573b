//! HTTP status codes as a typed enum.
//!
//! Only the codes this service answers with. Use [`Status`] anywhere a status
//! code is accepted: `Response::status()`, `Response::builder().status()`, or
//! inside an envelope.

/// The HTTP status codes the service emits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    Created,             // 201
    BadRequest,          // 400
    NotFound,            // 404
    MethodNotAllowed,    // 405
    InternalServerError, // 500
}

impl Status {
    pub fn as_u16(self) -> u16 {
        self.into()
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Created             => 201,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                  => http::StatusCode::OK,
            Status::Created             => http::StatusCode::CREATED,
            Status::BadRequest          => http::StatusCode::BAD_REQUEST,
            Status::NotFound            => http::StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => http::StatusCode::METHOD_NOT_ALLOWED,
            Status::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_http_codes_agree() {
        for s in [
            Status::Ok,
            Status::Created,
            Status::BadRequest,
            Status::NotFound,
            Status::MethodNotAllowed,
            Status::InternalServerError,
        ] {
            assert_eq!(http::StatusCode::from(s).as_u16(), s.as_u16());
        }
    }
}
