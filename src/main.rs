//! Service entrypoint.
//!
//! Run with:
//!   MONGOURI=mongodb://localhost:27017 RUST_LOG=info cargo run
//!
//! Try:
//!   curl -X POST http://localhost:8080/user \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"Ann","location":"NYC","title":"Eng"}'
//!   curl http://localhost:8080/users

use std::process::ExitCode;
use std::sync::Arc;

use mongo_users::{Config, Database, Error, Server, UserStore, routes};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::load()?;
    let db = Database::connect(&config.mongo_uri).await?;

    let store: Arc<dyn UserStore> = Arc::new(db.users());
    let served = Server::bind(config.listen_addr)
        .serve(routes::router(store))
        .await;

    db.shutdown().await;
    served
}
