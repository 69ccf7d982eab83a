//! Backend entry-point: configuration, migrations, pool, and HTTP server.

mod server;

use actix_web::web;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{AppSettings, ServerConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Run pending migrations on a dedicated blocking thread.
///
/// `AsyncConnectionWrapper` adapts the async connection to the synchronous
/// interface the migration harness expects.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;

        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&database_url)
            .map_err(|err| format!("failed to connect for migrations: {err}"))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| format!("failed to run migrations: {err}"))?;
        info!(count = applied.len(), "database migrations applied");
        Ok::<(), String>(())
    })
    .await
    .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
    .map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::from_env().map_err(std::io::Error::other)?;

    run_migrations(settings.database_url().to_owned()).await?;
    let pool = DbPool::new(PoolConfig::new(settings.database_url()))
        .await
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(&settings).with_db_pool(pool);
    let server = server::create_server(health_state, config)?;

    info!("server started");
    server.await
}
