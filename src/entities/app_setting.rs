//! App setting entity - Stores grouped key-value configuration pairs.
//!
//! Every telemetry value of the simulated vehicle lives in one row, grouped by
//! `parent_code`. Values are always stored as strings; callers parse them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// App setting database model - one `(parent_code, code)` keyed value
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_setting")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group the setting belongs to (e.g., `"APP_SETTING"`)
    pub parent_code: String,
    /// Setting key within its group (e.g., `"APP_SETTING_RPM"`)
    pub code: String,
    /// Setting value stored as string
    pub config_value: String,
    /// Optional display name
    pub name: Option<String>,
    /// Optional free-form note
    pub memo: Option<String>,
    /// Whether the setting is enabled
    pub enabled: bool,
    /// When this row was created
    pub created_at: DateTime,
    /// When this row's value was last modified
    pub updated_at: DateTime,
}

/// `AppSetting` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
