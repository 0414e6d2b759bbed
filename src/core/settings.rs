//! Settings store - grouped key-value settings backed by the `app_setting` table.
//!
//! Provides the CRUD operations used by seeding and by any outer surface, plus the
//! narrow [`SettingsStore`] interface the telemetry engine reads and writes through.
//! The engine only ever updates existing rows; rows are created by seeding or CRUD.

use crate::{
    config::settings::SettingSeed,
    entities::{AppSetting, app_setting},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// One `code -> value` pair of a settings group, as seen by the telemetry core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingEntry {
    /// Setting key within its group
    pub code: String,
    /// Raw stored value
    pub value: String,
}

impl From<app_setting::Model> for SettingEntry {
    fn from(model: app_setting::Model) -> Self {
        Self {
            code: model.code,
            value: model.config_value,
        }
    }
}

/// Input for [`create_setting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSetting {
    /// Group the setting belongs to
    pub parent_code: String,
    /// Setting key within its group
    pub code: String,
    /// Initial value
    pub value: String,
    /// Optional display name
    pub name: Option<String>,
    /// Optional free-form note
    pub memo: Option<String>,
    /// Whether the setting is enabled
    pub enabled: bool,
}

impl NewSetting {
    /// Creates an enabled setting with no name or memo.
    pub fn new(
        parent_code: impl Into<String>,
        code: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            parent_code: parent_code.into(),
            code: code.into(),
            value: value.into(),
            name: None,
            memo: None,
            enabled: true,
        }
    }
}

impl From<&SettingSeed> for NewSetting {
    fn from(seed: &SettingSeed) -> Self {
        Self {
            parent_code: seed.parent_code.clone(),
            code: seed.code.clone(),
            value: seed.value.clone(),
            name: seed.name.clone(),
            memo: seed.memo.clone(),
            enabled: seed.enabled,
        }
    }
}

/// The two operations the telemetry core needs from a settings backend.
pub trait SettingsStore {
    /// Returns every setting of `group_code`; an unknown group yields an empty list.
    fn get_group(&self, group_code: &str)
    -> impl Future<Output = Result<Vec<SettingEntry>>> + Send;

    /// Overwrites the value of an existing `(group_code, code)` row and returns the stored value.
    ///
    /// # Errors
    /// Returns `Error::SettingNotFound` when no such row exists; rows are never created here.
    fn update_by_group_and_code(
        &self,
        group_code: &str,
        code: &str,
        value: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

impl SettingsStore for DatabaseConnection {
    async fn get_group(&self, group_code: &str) -> Result<Vec<SettingEntry>> {
        let rows = get_settings_by_group(self, group_code).await?;
        Ok(rows.into_iter().map(SettingEntry::from).collect())
    }

    async fn update_by_group_and_code(
        &self,
        group_code: &str,
        code: &str,
        value: &str,
    ) -> Result<String> {
        let updated = update_setting_value(self, group_code, code, value).await?;
        Ok(updated.config_value)
    }
}

impl SettingsStore for DatabaseTransaction {
    async fn get_group(&self, group_code: &str) -> Result<Vec<SettingEntry>> {
        let rows = get_settings_by_group(self, group_code).await?;
        Ok(rows.into_iter().map(SettingEntry::from).collect())
    }

    async fn update_by_group_and_code(
        &self,
        group_code: &str,
        code: &str,
        value: &str,
    ) -> Result<String> {
        let updated = update_setting_value(self, group_code, code, value).await?;
        Ok(updated.config_value)
    }
}

/// Retrieves all settings of a group, ordered by id.
pub async fn get_settings_by_group<C>(db: &C, group_code: &str) -> Result<Vec<app_setting::Model>>
where
    C: ConnectionTrait,
{
    AppSetting::find()
        .filter(app_setting::Column::ParentCode.eq(group_code))
        .order_by_asc(app_setting::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a single setting by its `(group_code, code)` key.
pub async fn get_setting<C>(
    db: &C,
    group_code: &str,
    code: &str,
) -> Result<Option<app_setting::Model>>
where
    C: ConnectionTrait,
{
    AppSetting::find()
        .filter(app_setting::Column::ParentCode.eq(group_code))
        .filter(app_setting::Column::Code.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a setting by its primary key.
pub async fn get_setting_by_id<C>(db: &C, id: i64) -> Result<Option<app_setting::Model>>
where
    C: ConnectionTrait,
{
    AppSetting::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Creates a new setting row.
///
/// Group and code are trimmed and must not be blank. A row that already exists for
/// the same `(group_code, code)` pair is reported as `Error::DuplicateSetting`.
pub async fn create_setting<C>(db: &C, new_setting: NewSetting) -> Result<app_setting::Model>
where
    C: ConnectionTrait,
{
    let parent_code = new_setting.parent_code.trim().to_string();
    let code = new_setting.code.trim().to_string();

    if parent_code.is_empty() || code.is_empty() {
        return Err(Error::Config {
            message: "Setting group and code cannot be empty".to_string(),
        });
    }

    if get_setting(db, &parent_code, &code).await?.is_some() {
        return Err(Error::DuplicateSetting {
            group_code: parent_code,
            code,
        });
    }

    let now = Utc::now().naive_utc();
    let setting = app_setting::ActiveModel {
        parent_code: Set(parent_code),
        code: Set(code),
        config_value: Set(new_setting.value),
        name: Set(new_setting.name),
        memo: Set(new_setting.memo),
        enabled: Set(new_setting.enabled),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = setting.insert(db).await?;
    debug!(
        "Created setting {}-{} = {}",
        result.parent_code, result.code, result.config_value
    );
    Ok(result)
}

/// Overwrites the value of an existing setting and bumps its `updated_at`.
///
/// # Errors
/// Returns `Error::SettingNotFound` if no row exists for `(group_code, code)`.
#[instrument(skip(db))]
pub async fn update_setting_value<C>(
    db: &C,
    group_code: &str,
    code: &str,
    value: &str,
) -> Result<app_setting::Model>
where
    C: ConnectionTrait,
{
    let setting = get_setting(db, group_code, code)
        .await?
        .ok_or_else(|| Error::SettingNotFound {
            group_code: group_code.to_string(),
            code: code.to_string(),
        })?;

    let mut active_model: app_setting::ActiveModel = setting.into();
    active_model.config_value = Set(value.to_string());
    active_model.updated_at = Set(Utc::now().naive_utc());
    let updated = active_model.update(db).await?;

    debug!("Updated setting {}-{} = {}", group_code, code, value);
    Ok(updated)
}

/// Deletes a setting by its primary key.
///
/// # Errors
/// Returns `Error::SettingIdNotFound` if no row has that id.
pub async fn delete_setting<C>(db: &C, id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = AppSetting::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::SettingIdNotFound { id });
    }

    info!("Deleted setting {}", id);
    Ok(())
}

/// Inserts every seed whose `(parent_code, code)` pair is not yet present.
///
/// Existing rows keep their current value. Returns the number of rows inserted.
pub async fn seed_settings<C>(db: &C, seeds: &[SettingSeed]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut inserted = 0;

    for seed in seeds {
        if get_setting(db, &seed.parent_code, &seed.code).await?.is_some() {
            debug!("Setting {}-{} already present", seed.parent_code, seed.code);
            continue;
        }

        create_setting(db, NewSetting::from(seed)).await?;
        inserted += 1;
    }

    info!("Seeded {} of {} settings", inserted, seeds.len());
    Ok(inserted)
}
