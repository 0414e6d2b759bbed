//! Core logic - framework-agnostic settings store and telemetry evolution.

/// Serialized, periodic host for telemetry ticks
pub mod engine;
/// Best-effort string to number parsing
pub mod numeric;
/// Grouped key-value settings store
pub mod settings;
/// Composite telemetry snapshot assembly
pub mod snapshot;
/// Per-tick telemetry state transition
pub mod telemetry;
