//! # SQLite Database methods
//!
//! "Low-level" SQLite interactions. They are plain functions that accept a `&mut SqliteConnection`, so callers can pass
//! a pooled connection or `&mut *tx` for a transaction without any other changes.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod catalog;
pub mod customers;
pub mod orders;

const SQLITE_DB_URL: &str = "sqlite://data/zoo_tickets.db";
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

pub fn db_url() -> String {
    let result = env::var("DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub(crate) fn is_unique_violation(e: &SqlxError) -> bool {
    match e {
        SqlxError::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
