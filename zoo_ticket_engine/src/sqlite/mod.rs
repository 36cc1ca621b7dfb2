//! SQLite backend for the order flow.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
