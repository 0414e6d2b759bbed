//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{AppSetting, app_setting};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://vehicle_dashboard.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a local `SQLite` file (created on first use) if not found.
pub fn get_database_url() -> Result<String> {
    Ok(std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()))
}

/// Establishes a connection to the `SQLite` database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url()?;
    debug!("Connecting to database at {}", database_url);

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the `app_setting` table and its `(parent_code, code)` unique index.
///
/// Both statements use `IF NOT EXISTS`, so this is safe to call on every startup.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let app_setting_table = schema
        .create_table_from_entity(AppSetting)
        .if_not_exists()
        .to_owned();

    let group_code_index = Index::create()
        .name("idx_app_setting_parent_code_code")
        .table(AppSetting)
        .col(app_setting::Column::ParentCode)
        .col(app_setting::Column::Code)
        .unique()
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&app_setting_table)).await?;
    db.execute(builder.build(&group_code_index)).await?;
    info!("Database tables ensured.");

    Ok(())
}
