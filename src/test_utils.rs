//! Shared test utilities.
//!
//! This module provides helpers for setting up in-memory test databases, seeding
//! the telemetry group, and an in-memory [`RecordingStore`] that remembers the
//! order of every write it receives.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        settings::{NewSetting, SettingEntry, SettingsStore, create_setting, get_setting},
        snapshot::{
            SETTING_BATTERY, SETTING_GEAR_RATIO, SETTING_GROUP, SETTING_IS_CHARGING,
            SETTING_POWER, SETTING_RPM, SETTING_TEMPERATURE,
        },
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Seeds the `APP_SETTING` telemetry group with the given raw values and a fixed gear ratio.
pub async fn seed_telemetry_group(
    db: &DatabaseConnection,
    rpm: &str,
    power: &str,
    battery: &str,
    temperature: &str,
    is_charging: &str,
) -> Result<()> {
    for (code, value) in [
        (SETTING_RPM, rpm),
        (SETTING_POWER, power),
        (SETTING_BATTERY, battery),
        (SETTING_TEMPERATURE, temperature),
        (SETTING_IS_CHARGING, is_charging),
        (SETTING_GEAR_RATIO, "3.5:1"),
    ] {
        create_setting(db, NewSetting::new(SETTING_GROUP, code, value)).await?;
    }
    Ok(())
}

/// Reads the raw value of one `APP_SETTING` code.
pub async fn setting_value(db: &DatabaseConnection, code: &str) -> Result<String> {
    get_setting(db, SETTING_GROUP, code)
        .await?
        .map(|s| s.config_value)
        .ok_or_else(|| Error::SettingNotFound {
            group_code: SETTING_GROUP.to_string(),
            code: code.to_string(),
        })
}

/// In-memory settings store that records every successful write in order.
#[derive(Default)]
pub struct RecordingStore {
    rows: Mutex<Vec<(String, String, String)>>,
    writes: Mutex<Vec<(String, String)>>,
    rejected_code: Mutex<Option<String>>,
}

impl RecordingStore {
    /// Builds a store holding one full telemetry group.
    pub fn with_group(
        group_code: &str,
        rpm: &str,
        power: &str,
        battery: &str,
        temperature: &str,
        is_charging: &str,
    ) -> Self {
        let rows = [
            (SETTING_RPM, rpm),
            (SETTING_POWER, power),
            (SETTING_BATTERY, battery),
            (SETTING_TEMPERATURE, temperature),
            (SETTING_IS_CHARGING, is_charging),
        ]
        .into_iter()
        .map(|(code, value)| (group_code.to_string(), code.to_string(), value.to_string()))
        .collect();

        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Makes every later write to `code` fail as if the row did not exist.
    pub fn reject_writes_to(&self, code: &str) {
        *self.rejected_code.lock().unwrap() = Some(code.to_string());
    }

    /// Successful writes so far, as `(code, value)` pairs.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// Current value of a row.
    pub fn value(&self, group_code: &str, code: &str) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|(g, c, _)| g == group_code && c == code)
            .map(|(_, _, v)| v.clone())
    }
}

impl SettingsStore for RecordingStore {
    async fn get_group(&self, group_code: &str) -> Result<Vec<SettingEntry>> {
        let entries = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _, _)| g == group_code)
            .map(|(_, code, value)| SettingEntry {
                code: code.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(entries)
    }

    async fn update_by_group_and_code(
        &self,
        group_code: &str,
        code: &str,
        value: &str,
    ) -> Result<String> {
        let not_found = || Error::SettingNotFound {
            group_code: group_code.to_string(),
            code: code.to_string(),
        };

        if self.rejected_code.lock().unwrap().as_deref() == Some(code) {
            return Err(not_found());
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|(g, c, _)| g == group_code && c == code)
            .ok_or_else(not_found)?;
        row.2 = value.to_string();
        drop(rows);

        self.writes
            .lock()
            .unwrap()
            .push((code.to_string(), value.to_string()));
        Ok(value.to_string())
    }
}
