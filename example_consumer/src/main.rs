//! Example consumer: serves `all` and `findone` routes for every schema in a JSON config.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Environment: DATABASE_URL, CONFIG_PATH (default `easyapi.json`), BIND_ADDR (default `127.0.0.1:3000`).

use easyapi_sdk::{build_route_config, common_routes, load_from_path, router, synthesize};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("easyapi_sdk=info,example_consumer=info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/easyapi".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "easyapi.json".into());
    let config = load_from_path(&config_path).await?;
    let routes = synthesize(&build_route_config(&config, pool))?;
    for route in &routes {
        tracing::info!(method = %route.method(), path = %route.path(), "route");
    }

    let app = common_routes().merge(router(routes)?);
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
