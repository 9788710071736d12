//! # skydelay-server
//!
//! Serves the skydelay model bundles over HTTP.

use server::{ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();
    server::init_tracing();

    let config = ServerConfig::from_env()?;
    server::run(config).await
}
