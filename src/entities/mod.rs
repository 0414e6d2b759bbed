//! Entity module - Contains the SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod app_setting;

pub use app_setting::Entity as AppSetting;
