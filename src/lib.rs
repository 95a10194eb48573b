//! # mongo-users
//!
//! A minimal JSON CRUD service for a single `user` resource stored in MongoDB.
//!
//! ## Surface
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/` | 200 `{"data":"Hello World! Welcome to Mongo and Mux"}` |
//! | POST | `/user` | 201 envelope with `{"InsertedID": …}` |
//! | GET | `/user/{userId}` | 200 envelope with the user |
//! | PUT | `/user/{userId}` | 200 envelope with the updated user |
//! | DELETE | `/user/{userId}` | 200 envelope with a confirmation |
//! | GET | `/users` | 200 envelope with every user |
//!
//! Every user-resource response, success or failure, is wrapped as
//! `{"status": <code>, "message": <text>, "data": {"data": <payload | error>}}`.
//! Bad input is a 400, a missing user a 404, a storage failure or a storage
//! call slower than 10 s a 500.
//!
//! ## Layout
//!
//! - Radix-tree routing via [`matchit`], hyper for the wire, graceful
//!   shutdown on SIGTERM / Ctrl-C ([`Router`], [`Server`]).
//! - Storage behind the [`UserStore`] trait; [`Database`] provides the
//!   MongoDB implementation.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mongo_users::{Config, Database, Server, routes};
//!
//! # async fn run() -> Result<(), mongo_users::Error> {
//! let config = Config::load()?;
//! let db = Database::connect(&config.mongo_uri).await?;
//! let served = Server::bind(config.listen_addr)
//!     .serve(routes::router(Arc::new(db.users())))
//!     .await;
//! db.shutdown().await;
//! served
//! # }
//! ```

mod config;
mod db;
mod envelope;
mod error;
mod handler;
mod method;
mod model;
mod request;
mod response;
mod router;
mod server;
mod status;
mod store;

pub mod handlers;
pub mod routes;

pub use config::{Config, DATABASE_NAME, LISTEN_ADDR, MONGO_URI_VAR, USERS_COLLECTION};
pub use db::{Database, MongoUserStore};
pub use envelope::{ApiError, Failure, Reply};
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use model::{InvalidUserId, User, UserFields, UserId, UserInput, ValidationError};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{StoreError, UserStore};
