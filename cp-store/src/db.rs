use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use log::LevelFilter;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, Pool, Sqlite};
use tracing::{event, Level};

pub async fn get_sqlite_connection_pool(database_path: &Path) -> Result<Pool<Sqlite>> {
    let database_connection_options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .log_slow_statements(LevelFilter::Warn, Duration::from_secs(60));

    let sqlite_connection_pool: Pool<Sqlite> = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(database_connection_options)
        .await?;

    Ok(sqlite_connection_pool)
}

/// Pool over a shared in-memory database. Capped at a single connection that
/// is never recycled, so the database outlives individual acquires.
pub async fn get_in_memory_connection_pool() -> Result<Pool<Sqlite>> {
    let database_connection_options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let sqlite_connection_pool: Pool<Sqlite> = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(database_connection_options)
        .await?;

    Ok(sqlite_connection_pool)
}

/// Drops and recreates both tables. Prior state is discarded wholesale; the
/// caller must treat a failure here as fatal.
pub async fn recreate_schema(pool: &Pool<Sqlite>) -> Result<()> {
    event!(Level::INFO, "Recreating brands and models tables");

    sqlx::query("drop table if exists models").execute(pool).await?;
    sqlx::query("drop table if exists brands").execute(pool).await?;

    sqlx::query(
        r#"
create table brands
( id   integer primary key autoincrement
, name text unique not null
)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
create table models
( id            integer primary key
, name          text not null
, average_price integer
, brand_id      integer
, foreign key (brand_id) references brands (id)
)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
