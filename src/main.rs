use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rust_catalog::config::Config;
use rust_catalog::entities::{seed_admin, setup_schema};
use rust_catalog::middleware::auth::TokenKeys;
use rust_catalog::{build_app, connect};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;

    let db = connect(&config.database_url).await?;
    setup_schema(&db).await?;
    if let Some(admin) = &config.admin {
        seed_admin(&db, &admin.email, &admin.password).await?;
    }

    let app = build_app(db, TokenKeys::new(config.secret, config.token_ttl_hours));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
