// Update service - Fetches consumption, normalizes it and refreshes the sensor store
use crate::application::consumption_repository::{ConsumptionRepository, Endpoint, FetchError};
use crate::application::sensor_store::SensorStore;
use crate::domain::account::AccountContext;
use crate::domain::consumption::{
    normalize_daily, normalize_hourly, DailySummary, DateRange, HourlyCurve, NormalizeError,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

const NOTIFICATION_CAPACITY: usize = 16;

/// What to do with the sensors when a cycle cannot complete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the previous values and skip the cycle
    #[default]
    Retain,
    /// Reset every sensor to its zero/empty value
    Reset,
}

/// Signal sent once per cycle that changed the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorsUpdated;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("{endpoint} fetch failed: {source}")]
    Fetch { endpoint: Endpoint, source: FetchError },
    #[error("{endpoint} normalization failed: {source}")]
    Normalize { endpoint: Endpoint, source: NormalizeError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum CycleOutcome {
    Applied,
    Skipped(String),
    Reset(String),
}

pub struct UpdateService {
    repository: Arc<dyn ConsumptionRepository>,
    account: Arc<AccountContext>,
    store: Arc<SensorStore>,
    failure_policy: FailurePolicy,
    notifier: broadcast::Sender<SensorsUpdated>,
    cycle_lock: Mutex<()>,
}

impl UpdateService {
    pub fn new(
        repository: Arc<dyn ConsumptionRepository>,
        account: Arc<AccountContext>,
        store: Arc<SensorStore>,
        failure_policy: FailurePolicy,
    ) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            repository,
            account,
            store,
            failure_policy,
            notifier,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<SensorStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SensorsUpdated> {
        self.notifier.subscribe()
    }

    /// Run cycles forever: once immediately, then every `period`
    pub async fn run_periodic(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let outcome = self.run_cycle().await;
            tracing::debug!(
                ?outcome,
                next_in_secs = period.as_secs(),
                "Scheduled update cycle done"
            );
        }
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        self.run_cycle_for(Local::now().date_naive()).await
    }

    /// Run one update cycle with `today` as the end of both date ranges.
    ///
    /// Cycles are serialized; a call made while another cycle runs waits
    /// for it to finish. Errors never escape, they are logged and turned
    /// into the returned outcome.
    pub async fn run_cycle_for(&self, today: NaiveDate) -> CycleOutcome {
        let _guard = self.cycle_lock.lock().await;
        tracing::info!(
            %today,
            point_id = self.account.point_id(),
            "Starting consumption update cycle"
        );

        let (daily, hourly) = tokio::join!(self.fetch_daily(today), self.fetch_hourly(today));

        match (daily, hourly) {
            (Ok(summary), Ok(curve)) => {
                let [last, month] = summary.to_updates();
                self.store.replace_all([last, month, curve.to_update()]).await;
                self.notify();

                tracing::info!(
                    last_kwh = summary.last_kwh,
                    month_kwh = summary.month_kwh,
                    curve_points = curve.readings.len(),
                    "Linky sensors update has completed successfully"
                );
                CycleOutcome::Applied
            }
            (daily, hourly) => {
                let errors: Vec<CycleError> =
                    [daily.err(), hourly.err()].into_iter().flatten().collect();
                for e in &errors {
                    tracing::error!(error = %e, "Linky sensors update has failed");
                }
                let reason = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");

                match self.failure_policy {
                    FailurePolicy::Retain => {
                        tracing::warn!("Keeping previous sensor values until the next cycle");
                        CycleOutcome::Skipped(reason)
                    }
                    FailurePolicy::Reset => {
                        self.store.reset().await;
                        self.notify();
                        tracing::warn!("Sensor values reset after failed cycle");
                        CycleOutcome::Reset(reason)
                    }
                }
            }
        }
    }

    async fn fetch_daily(&self, today: NaiveDate) -> Result<DailySummary, CycleError> {
        let endpoint = Endpoint::DailyConsumption;
        let readings = self
            .repository
            .fetch(endpoint, &self.account, DateRange::month_to_date(today))
            .await
            .map_err(|source| CycleError::Fetch { endpoint, source })?;

        normalize_daily(&readings).map_err(|source| CycleError::Normalize { endpoint, source })
    }

    async fn fetch_hourly(&self, today: NaiveDate) -> Result<HourlyCurve, CycleError> {
        let endpoint = Endpoint::LoadCurve;
        let readings = self
            .repository
            .fetch(endpoint, &self.account, DateRange::since_yesterday(today))
            .await
            .map_err(|source| CycleError::Fetch { endpoint, source })?;

        let fetched_at = Local::now().naive_local();
        normalize_hourly(readings, fetched_at)
            .map_err(|source| CycleError::Normalize { endpoint, source })
    }

    fn notify(&self) {
        // No subscribers is fine
        let receivers = self.notifier.send(SensorsUpdated).unwrap_or(0);
        tracing::debug!(receivers, "Sent linky_update notification");
    }
}
