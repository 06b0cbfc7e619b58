//! Database connection pool initialization.
//!
//! Reads `DATABASE_URL` and builds a SQLx PostgreSQL pool. Embedded
//! migrations under `migrations/` are applied on startup.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;

/// Initializes the PostgreSQL connection pool and runs pending migrations.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset, the connection fails, or a migration
/// cannot be applied. Called once during startup.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    pool
}
