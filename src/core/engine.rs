//! Telemetry engine host - serializes ticks and drives them on a fixed period.

use crate::{
    config::engine::EngineConfig,
    core::telemetry::{TickReport, run_tick},
    errors::Result,
};
use chrono::Local;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::future::Future;
use tokio::sync::Mutex;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument};

/// Owns the settings database and guarantees that at most one tick runs at a time.
///
/// The REST-facing settings surface may still write the same rows concurrently;
/// those writes race with a tick on a last-writer-wins basis.
pub struct TelemetryEngine {
    database: DatabaseConnection,
    config: EngineConfig,
    tick_lock: Mutex<()>,
}

impl TelemetryEngine {
    /// Creates an engine over an initialized settings database.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: EngineConfig) -> Self {
        Self {
            database,
            config,
            tick_lock: Mutex::new(()),
        }
    }

    /// The settings database the engine reads and writes.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Runs one tick, waiting for any tick already in progress to finish first.
    ///
    /// In transactional mode every write of the tick commits together, and a failed
    /// tick leaves the group untouched. Otherwise each write commits on its own.
    #[instrument(skip(self), fields(group = %self.config.group_code))]
    pub async fn tick(&self) -> Result<TickReport> {
        let _guard = self.tick_lock.lock().await;
        let group_code = self.config.group_code.as_str();

        if self.config.transactional {
            let txn = self.database.begin().await?;
            let report = run_tick(&txn, group_code).await?;
            txn.commit().await?;
            Ok(report)
        } else {
            run_tick(&self.database, group_code).await
        }
    }

    /// Fires a tick every period until `shutdown` resolves; returns how many ticks fired.
    ///
    /// The first tick fires immediately. A failed tick is logged and the next period
    /// retries from scratch. Periods missed by a slow tick are skipped, not replayed.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            group = %self.config.group_code,
            period_ms = u64::try_from(self.config.tick_interval.as_millis()).unwrap_or(u64::MAX),
            transactional = self.config.transactional,
            "Telemetry engine started"
        );

        let mut fired: u64 = 0;
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    fired += 1;
                    info!("The time is now {}", Local::now().format("%H:%M:%S"));

                    match self.tick().await {
                        Ok(report) => debug!(
                            writes = report.writes_applied,
                            snapshot = ?report.plan.next,
                            "Telemetry tick complete"
                        ),
                        Err(e) => error!("Telemetry tick {} failed: {}", fired, e),
                    }
                }
            }
        }

        info!(ticks = fired, "Telemetry engine stopped");
        fired
    }
}
