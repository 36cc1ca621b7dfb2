use std::path::Path;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::Cents,
    sqlite_db::catalog::{insert_ticket_group, insert_ticket_variant},
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/ztg_test_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// The catalog the tests order from.
#[derive(Debug, Clone, Copy)]
pub struct TestCatalog {
    pub family_pass: i64,
    pub adult: i64,
    pub child: i64,
    pub night_safari: i64,
    pub night_adult: i64,
}

/// Seeds "Family Pass" (Adult 35.00, Child 17.50) and "Night Safari" (Adult 50.00).
pub async fn seed_catalog(db: &SqliteDatabase) -> TestCatalog {
    let mut conn = db.pool().acquire().await.expect("Error acquiring connection");
    let family_pass = insert_ticket_group("Family Pass", Some("Day entry"), &mut conn).await.unwrap();
    let adult = insert_ticket_variant(family_pass, "Adult", Cents::from(3500), &mut conn).await.unwrap();
    let child = insert_ticket_variant(family_pass, "Child", Cents::from(1750), &mut conn).await.unwrap();
    let night_safari = insert_ticket_group("Night Safari", None, &mut conn).await.unwrap();
    let night_adult = insert_ticket_variant(night_safari, "Adult", Cents::from(5000), &mut conn).await.unwrap();
    TestCatalog { family_pass, adult, child, night_safari, night_adult }
}
