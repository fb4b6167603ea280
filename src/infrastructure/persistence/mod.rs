//! User repository implementations.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - PostgreSQL storage via SQLx
//! - [`MemoryUserRepository`] - In-process storage for tests and tooling

pub mod memory_user_repository;
pub mod pg_user_repository;

pub use memory_user_repository::MemoryUserRepository;
pub use pg_user_repository::PgUserRepository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Opens a connection pool.
///
/// # Errors
///
/// Returns the SQLx error if the database is unreachable.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    tracing::info!("Connected to database");
    Ok(pool)
}

/// Applies the bundled SQL migrations.
///
/// # Errors
///
/// Returns the migration error if a script fails or history diverged.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
