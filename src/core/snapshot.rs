//! Telemetry snapshot assembly.
//!
//! Folds every setting of the telemetry group into one [`TelemetrySnapshot`], the
//! composite vehicle state the evolution engine reads at the start of each tick.

use crate::{
    core::{
        numeric::parse_int,
        settings::{SettingEntry, SettingsStore},
    },
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Parent code of the vehicle telemetry group
pub const SETTING_GROUP: &str = "APP_SETTING";
/// Motor RPM, integer
pub const SETTING_RPM: &str = "APP_SETTING_RPM";
/// Power output, integer
pub const SETTING_POWER: &str = "APP_SETTING_POWER";
/// Battery percentage, integer
pub const SETTING_BATTERY: &str = "APP_SETTING_BATTERY";
/// Charging indicator, `"1"` means charging
pub const SETTING_IS_CHARGING: &str = "APP_SETTING_IS_CHARGING";
/// Temperature, integer
pub const SETTING_TEMPERATURE: &str = "APP_SETTING_TEMPERATURE";
/// Gear ratio, opaque string
pub const SETTING_GEAR_RATIO: &str = "APP_SETTING_GEAR_RATIO";

/// Composite vehicle state built from one settings group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Motor revolutions per minute
    pub rpm: i32,
    /// Power output
    pub power: i32,
    /// Battery percentage
    pub battery: i32,
    /// Temperature
    pub temperature: i32,
    /// Whether the vehicle is plugged in
    pub is_charging: bool,
    /// Gear ratio, never touched by the engine
    pub gear_ratio: Option<String>,
}

#[derive(Default)]
struct RawSnapshot {
    rpm: Option<String>,
    power: Option<String>,
    battery: Option<String>,
    temperature: Option<String>,
    is_charging: Option<String>,
    gear_ratio: Option<String>,
}

impl RawSnapshot {
    fn fold(entries: Vec<SettingEntry>) -> Self {
        let mut raw = Self::default();
        for entry in entries {
            let slot = match entry.code.as_str() {
                SETTING_RPM => &mut raw.rpm,
                SETTING_POWER => &mut raw.power,
                SETTING_BATTERY => &mut raw.battery,
                SETTING_TEMPERATURE => &mut raw.temperature,
                SETTING_IS_CHARGING => &mut raw.is_charging,
                SETTING_GEAR_RATIO => &mut raw.gear_ratio,
                other => {
                    debug!("Ignoring unrecognized setting code {}", other);
                    continue;
                }
            };
            *slot = Some(entry.value);
        }
        raw
    }
}

fn require(group_code: &str, code: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| Error::SettingNotFound {
        group_code: group_code.to_string(),
        code: code.to_string(),
    })
}

/// Builds the snapshot from raw group entries.
///
/// # Errors
/// * `Error::GroupNotFound` if `entries` is empty
/// * `Error::SettingNotFound` if one of the evolved fields or the charging flag is missing
pub fn snapshot_from_entries(group_code: &str, entries: Vec<SettingEntry>) -> Result<TelemetrySnapshot> {
    if entries.is_empty() {
        return Err(Error::GroupNotFound {
            group_code: group_code.to_string(),
        });
    }

    let raw = RawSnapshot::fold(entries);
    let rpm = require(group_code, SETTING_RPM, raw.rpm)?;
    let power = require(group_code, SETTING_POWER, raw.power)?;
    let battery = require(group_code, SETTING_BATTERY, raw.battery)?;
    let temperature = require(group_code, SETTING_TEMPERATURE, raw.temperature)?;
    let is_charging = require(group_code, SETTING_IS_CHARGING, raw.is_charging)?;

    Ok(TelemetrySnapshot {
        rpm: parse_int(rpm.as_str()),
        power: parse_int(power.as_str()),
        battery: parse_int(battery.as_str()),
        temperature: parse_int(temperature.as_str()),
        is_charging: is_charging == "1",
        gear_ratio: raw.gear_ratio,
    })
}

/// Reads the whole group from the store and assembles its snapshot.
#[instrument(skip(store))]
pub async fn assemble_snapshot<S>(store: &S, group_code: &str) -> Result<TelemetrySnapshot>
where
    S: SettingsStore + Sync,
{
    let entries = store.get_group(group_code).await?;
    let snapshot = snapshot_from_entries(group_code, entries)?;
    debug!(?snapshot, "Assembled telemetry snapshot");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn entry(code: &str, value: &str) -> SettingEntry {
        SettingEntry {
            code: code.to_string(),
            value: value.to_string(),
        }
    }

    fn full_group(is_charging: &str) -> Vec<SettingEntry> {
        vec![
            entry(SETTING_RPM, "1600"),
            entry(SETTING_POWER, "1000"),
            entry(SETTING_BATTERY, "42"),
            entry(SETTING_TEMPERATURE, "35"),
            entry(SETTING_IS_CHARGING, is_charging),
            entry(SETTING_GEAR_RATIO, "3.5:1"),
        ]
    }

    #[test]
    fn test_snapshot_from_full_group() {
        let snapshot = snapshot_from_entries(SETTING_GROUP, full_group("1")).unwrap();
        assert_eq!(
            snapshot,
            TelemetrySnapshot {
                rpm: 1600,
                power: 1000,
                battery: 42,
                temperature: 35,
                is_charging: true,
                gear_ratio: Some("3.5:1".to_string()),
            }
        );
    }

    #[test]
    fn test_is_charging_only_accepts_exact_one() {
        for value in ["0", "true", "TRUE", "yes", " 1", "1 ", ""] {
            let snapshot = snapshot_from_entries(SETTING_GROUP, full_group(value)).unwrap();
            assert!(!snapshot.is_charging, "{value:?} must not count as charging");
        }
    }

    #[test]
    fn test_empty_group_is_group_not_found() {
        let result = snapshot_from_entries("NO_SUCH_GROUP", Vec::new());
        assert!(matches!(
            result,
            Err(Error::GroupNotFound { ref group_code }) if group_code == "NO_SUCH_GROUP"
        ));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let entries: Vec<_> = full_group("0")
            .into_iter()
            .filter(|e| e.code != SETTING_BATTERY)
            .collect();

        let result = snapshot_from_entries(SETTING_GROUP, entries);
        assert!(matches!(
            result,
            Err(Error::SettingNotFound { ref code, .. }) if code == SETTING_BATTERY
        ));
    }

    #[test]
    fn test_gear_ratio_is_optional_and_unknown_codes_ignored() {
        let mut entries: Vec<_> = full_group("0")
            .into_iter()
            .filter(|e| e.code != SETTING_GEAR_RATIO)
            .collect();
        entries.push(entry("APP_SETTING_ODOMETER", "123456"));

        let snapshot = snapshot_from_entries(SETTING_GROUP, entries).unwrap();
        assert!(snapshot.gear_ratio.is_none());
        assert_eq!(snapshot.battery, 42);
    }

    #[test]
    fn test_malformed_numbers_become_zero() {
        let entries = vec![
            entry(SETTING_RPM, "fast"),
            entry(SETTING_POWER, ""),
            entry(SETTING_BATTERY, "12.5"),
            entry(SETTING_TEMPERATURE, "hot"),
            entry(SETTING_IS_CHARGING, "0"),
        ];

        let snapshot = snapshot_from_entries(SETTING_GROUP, entries).unwrap();
        assert_eq!((snapshot.rpm, snapshot.power, snapshot.battery, snapshot.temperature), (0, 0, 0, 0));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = snapshot_from_entries(SETTING_GROUP, full_group("1")).unwrap();
        let rendered = to_toml(&snapshot);
        assert!(rendered.contains("isCharging = true"));
        assert!(rendered.contains("gearRatio = \"3.5:1\""));
    }

    fn to_toml(snapshot: &TelemetrySnapshot) -> String {
        toml::to_string(snapshot).unwrap()
    }

    #[tokio::test]
    async fn test_assemble_snapshot_from_database() -> Result<()> {
        let db = setup_test_db().await?;
        seed_telemetry_group(&db, "800", "0", "1", "20", "0").await?;

        let snapshot = assemble_snapshot(&db, SETTING_GROUP).await?;
        assert_eq!(snapshot.rpm, 800);
        assert_eq!(snapshot.battery, 1);
        assert!(!snapshot.is_charging);

        Ok(())
    }

    #[tokio::test]
    async fn test_assemble_snapshot_missing_group() -> Result<()> {
        let db = setup_test_db().await?;
        seed_telemetry_group(&db, "0", "0", "50", "20", "1").await?;

        let result = assemble_snapshot(&db, "NO_SUCH_GROUP").await;
        assert!(matches!(result, Err(Error::GroupNotFound { .. })));

        Ok(())
    }
}
