//! Telemetry evolution - the per-tick state transition of the simulated vehicle.
//!
//! A tick reads the current [`TelemetrySnapshot`], decides which update rules apply
//! from two predicates evaluated once on the tick-start values, and replays the
//! resulting field writes one by one through the [`SettingsStore`]:
//!
//! 1. **Charging** (`is_charging`): battery +1 (max 100), power from battery,
//!    temperature +1 (max 120) while the battery is not yet full.
//! 2. **Running** (`rpm > 0`): battery -1 (min 0), rpm forced to 0 when the battery
//!    is depleted, power from the rpm left after that, temperature +2 (max 120).
//! 3. **Idle** (neither): temperature reset to 20.
//!
//! Charging and running can both fire in the same tick. Running sees the values the
//! charging rule produced, and its power write is the one that sticks.

use crate::{
    core::{
        settings::SettingsStore,
        snapshot::{
            SETTING_BATTERY, SETTING_POWER, SETTING_RPM, SETTING_TEMPERATURE, TelemetrySnapshot,
            assemble_snapshot,
        },
    },
    errors::Result,
};
use tracing::{error, info, instrument};

/// Upper bound of the battery percentage
pub const MAX_BATTERY: i32 = 100;
/// Lower bound of the battery percentage
pub const MIN_BATTERY: i32 = 0;
/// Power reported at full battery or per full RPM step
pub const MAX_POWER: i32 = 1000;
/// Upper bound of the temperature
pub const MAX_TEMPERATURE: i32 = 120;
/// Temperature an idle vehicle settles back to
pub const DEFAULT_TEMPERATURE: i32 = 20;

const RPM_PER_POWER_STEP: i32 = 800;

/// A snapshot field the engine is allowed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryField {
    /// Motor RPM
    Rpm,
    /// Power output
    Power,
    /// Battery percentage
    Battery,
    /// Temperature
    Temperature,
}

impl TelemetryField {
    /// Setting code the field is persisted under.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Rpm => SETTING_RPM,
            Self::Power => SETTING_POWER,
            Self::Battery => SETTING_BATTERY,
            Self::Temperature => SETTING_TEMPERATURE,
        }
    }
}

/// One persisted write of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldWrite {
    /// Field being written
    pub field: TelemetryField,
    /// New value
    pub value: i32,
}

/// The two predicates that select the update rules, taken from tick-start values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConditions {
    /// The vehicle is plugged in
    pub charging: bool,
    /// The motor is turning
    pub running: bool,
}

impl TickConditions {
    /// Evaluates both predicates on a snapshot.
    #[must_use]
    pub const fn of(snapshot: &TelemetrySnapshot) -> Self {
        Self {
            charging: snapshot.is_charging,
            running: snapshot.rpm > 0,
        }
    }

    /// Neither charging nor turning. A negative rpm is neither running nor idle.
    #[must_use]
    pub const fn idle(self, snapshot: &TelemetrySnapshot) -> bool {
        !self.charging && snapshot.rpm == 0
    }
}

/// The ordered writes of one tick and the state they lead to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickPlan {
    /// Which rules fired
    pub conditions: TickConditions,
    /// Whether the idle reset fired
    pub idle: bool,
    /// Writes in the order they must be persisted
    pub writes: Vec<FieldWrite>,
    /// Snapshot after every write has been applied
    pub next: TelemetrySnapshot,
}

impl TickPlan {
    fn record(&mut self, field: TelemetryField, value: i32) {
        match field {
            TelemetryField::Rpm => self.next.rpm = value,
            TelemetryField::Power => self.next.power = value,
            TelemetryField::Battery => self.next.battery = value,
            TelemetryField::Temperature => self.next.temperature = value,
        }
        self.writes.push(FieldWrite { field, value });
    }
}

/// Computes the writes of one tick. Pure; nothing is persisted.
#[must_use]
pub fn plan_tick(current: &TelemetrySnapshot) -> TickPlan {
    let conditions = TickConditions::of(current);
    let idle = conditions.idle(current);
    let mut plan = TickPlan {
        conditions,
        idle,
        writes: Vec::new(),
        next: current.clone(),
    };

    if conditions.charging {
        let battery = plan.next.battery.saturating_add(1).min(MAX_BATTERY);
        plan.record(TelemetryField::Battery, battery);

        // Integer division: only a full battery reports power.
        plan.record(
            TelemetryField::Power,
            (battery / MAX_BATTERY).saturating_mul(MAX_POWER),
        );

        if battery < MAX_BATTERY {
            let temperature = plan.next.temperature.saturating_add(1).min(MAX_TEMPERATURE);
            plan.record(TelemetryField::Temperature, temperature);
        }
    }

    if conditions.running {
        let battery = plan.next.battery.saturating_sub(1).max(MIN_BATTERY);
        plan.record(TelemetryField::Battery, battery);

        if battery == MIN_BATTERY {
            plan.record(TelemetryField::Rpm, 0);
        }

        // A motor stopped above reports no power.
        plan.record(
            TelemetryField::Power,
            (plan.next.rpm / RPM_PER_POWER_STEP).saturating_mul(MAX_POWER),
        );

        let temperature = plan.next.temperature.saturating_add(2).min(MAX_TEMPERATURE);
        plan.record(TelemetryField::Temperature, temperature);
    }

    if idle {
        plan.record(TelemetryField::Temperature, DEFAULT_TEMPERATURE);
    }

    plan
}

/// Persists a plan's writes in order.
///
/// Each write commits on its own. The first failure aborts the remaining writes,
/// so earlier writes of the same tick stay applied.
pub async fn apply_plan<S>(store: &S, group_code: &str, plan: &TickPlan) -> Result<usize>
where
    S: SettingsStore + Sync,
{
    for (applied, write) in plan.writes.iter().enumerate() {
        store
            .update_by_group_and_code(group_code, write.field.code(), &write.value.to_string())
            .await
            .inspect_err(|e| {
                error!(
                    field = write.field.code(),
                    value = write.value,
                    applied,
                    "Telemetry write failed, dropping rest of tick: {}",
                    e
                );
            })?;
    }

    Ok(plan.writes.len())
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// State read at tick start
    pub previous: TelemetrySnapshot,
    /// Which rules fired and the writes they produced
    pub plan: TickPlan,
    /// Number of writes persisted
    pub writes_applied: usize,
}

/// Runs one full tick: assemble the snapshot, plan, and persist.
///
/// # Errors
/// * `Error::GroupNotFound` / `Error::SettingNotFound` from assembly, before any write
/// * `Error::SettingNotFound` or a database error from the first failing write
#[instrument(skip(store))]
pub async fn run_tick<S>(store: &S, group_code: &str) -> Result<TickReport>
where
    S: SettingsStore + Sync,
{
    let previous = assemble_snapshot(store, group_code).await?;
    let plan = plan_tick(&previous);

    if plan.conditions.charging {
        info!("Device is charging. Increasing battery level from {}", previous.battery);
    }
    if plan.conditions.running {
        info!(
            "Device is running. RPM: {}, decreasing battery and adjusting power/temperature",
            previous.rpm
        );
    }
    if plan.idle {
        info!("Device is idle. Resetting temperature to {}", DEFAULT_TEMPERATURE);
    }

    let writes_applied = apply_plan(store, group_code, &plan).await?;

    Ok(TickReport {
        previous,
        plan,
        writes_applied,
    })
}
