//! Sync engine - periodic feed polling and dataset replacement
//!
//! Owns the in-memory dataset and the polling cadence. Each cycle fetches
//! both feeds, parses and maps them, and replaces the dataset wholesale; on
//! any transport failure the fixed demo dataset is substituted instead and
//! the failure is surfaced as the dataset's `error` string. `last_updated_at`
//! advances on both outcomes.
//!
//! Manual refreshes and timer ticks run the same cycle. Overlapping cycles
//! are not mutually excluded; each settled cycle replaces the dataset
//! wholesale, so the last completion wins.

use crate::csv::parse_csv;
use crate::demo::demo_dataset;
use crate::error::Result;
use crate::fetcher::{fetch_both, FeedSource};
use crate::records::{map_appointments, map_inventory, AppointmentRecord, DatasetState, InventorySnapshot};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Sync engine - owns the dataset and the polling loop
pub struct SyncEngine {
    source: Arc<dyn FeedSource>,
    state: Arc<RwLock<DatasetState>>,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
}

/// Engine status information
#[derive(Debug, Clone)]
pub struct SyncStatus {
    pub running: bool,
    pub poll_interval_ms: u64,
}

impl SyncEngine {
    /// Create a new engine; the dataset starts empty.
    pub fn new(source: Arc<dyn FeedSource>, poll_interval: Duration) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(DatasetState::default())),
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
            poll_interval,
        }
    }

    /// Run the polling loop until `stop` is called.
    ///
    /// The first tick fires immediately (initial activation), then every
    /// `poll_interval`.
    pub async fn run(&self) {
        if self.running.load(Ordering::Relaxed) {
            warn!("Sync engine already running");
            return;
        }

        self.running.store(true, Ordering::Relaxed);
        info!("Starting feed sync with interval {:?}", self.poll_interval);

        let mut tick_interval = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.refresh().await;
                }
                _ = self.shutdown.notified() => {
                    info!("Sync engine received shutdown signal");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::Relaxed);
        info!("Sync engine stopped");
    }

    /// Stop the polling loop.
    pub fn stop(&self) {
        info!("Stopping sync engine...");
        self.shutdown.notify_one();
    }

    /// Check if the polling loop is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Engine status.
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            running: self.is_running(),
            poll_interval_ms: self.poll_interval.as_millis() as u64,
        }
    }

    /// Run one sync cycle (manual trigger and timer tick share this path).
    pub async fn refresh(&self) {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let cycle = self.fetch_cycle().await;
        let now = Utc::now();

        let mut state = self.state.write().await;
        match cycle {
            Ok((records, inventory)) => {
                debug!("Sync cycle fetched {} appointment records", records.len());
                state.donor_records = records;
                state.inventory = inventory;
                state.error = None;
            }
            Err(e) => {
                warn!("Feed fetch failed, serving demo dataset: {}", e);
                let (records, inventory) = demo_dataset(now);
                state.donor_records = records;
                state.inventory = inventory;
                state.error = Some(e.to_string());
            }
        }
        state.last_updated_at = Some(now);
        state.is_loading = false;
    }

    async fn fetch_cycle(&self) -> Result<(Vec<AppointmentRecord>, InventorySnapshot)> {
        let (appointments_csv, inventory_csv) = fetch_both(self.source.as_ref()).await?;
        let records = map_appointments(&parse_csv(&appointments_csv));
        let inventory = map_inventory(&parse_csv(&inventory_csv), Utc::now());
        Ok((records, inventory))
    }

    /// Clone of the current dataset.
    pub async fn snapshot(&self) -> DatasetState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DonorSrvError;
    use crate::fetcher::FeedKind;
    use async_trait::async_trait;

    struct StaticSource {
        appointments: &'static str,
        inventory: &'static str,
    }

    #[async_trait]
    impl FeedSource for StaticSource {
        async fn fetch(&self, kind: FeedKind) -> Result<String> {
            match kind {
                FeedKind::Appointments => Ok(self.appointments.to_string()),
                FeedKind::Inventory => Ok(self.inventory.to_string()),
            }
        }
    }

    struct FailingSource;

    #[async_trait]
    impl FeedSource for FailingSource {
        async fn fetch(&self, kind: FeedKind) -> Result<String> {
            Err(DonorSrvError::transport(kind, Some(403), "forbidden"))
        }
    }

    fn engine_with(source: Arc<dyn FeedSource>) -> SyncEngine {
        SyncEngine::new(source, Duration::from_secs(300))
    }

    const APPOINTMENTS_CSV: &str = "Timestamp,Name,Phone,Channel,Type,Date,Time,Status\n\
         2024-12-29,John Smith,555-1234,Website,Whole Blood,30/12/2024,10:00,Confirmed";
    const INVENTORY_CSV: &str = "Blood,Plasma,Platelets,Updated\n245,78,32,2024-12-29";

    #[tokio::test]
    async fn test_refresh_success_replaces_dataset() {
        let engine = engine_with(Arc::new(StaticSource {
            appointments: APPOINTMENTS_CSV,
            inventory: INVENTORY_CSV,
        }));

        engine.refresh().await;

        let state = engine.snapshot().await;
        assert_eq!(state.donor_records.len(), 1);
        assert_eq!(state.donor_records[0].donor_name, "John Smith");
        assert_eq!(state.inventory.blood_units_available, 245);
        assert!(state.error.is_none());
        assert!(!state.is_loading);
        assert!(state.last_updated_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_falls_back_to_demo_dataset() {
        let engine = engine_with(Arc::new(FailingSource));

        engine.refresh().await;

        let state = engine.snapshot().await;
        let (expected_records, _) = demo_dataset(Utc::now());
        assert_eq!(state.donor_records, expected_records);
        assert_eq!(state.inventory.blood_units_available, 245);
        let error = state.error.expect("error surfaced");
        assert!(!error.is_empty());
        // The clock still advances on failure.
        assert!(state.last_updated_at.is_some());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_repeated_refresh_is_idempotent_on_stable_feed() {
        let engine = engine_with(Arc::new(StaticSource {
            appointments: APPOINTMENTS_CSV,
            inventory: INVENTORY_CSV,
        }));

        engine.refresh().await;
        let first = engine.snapshot().await;
        engine.refresh().await;
        let second = engine.snapshot().await;

        assert_eq!(first.donor_records, second.donor_records);
        assert_eq!(first.inventory.blood_units_available, second.inventory.blood_units_available);
    }

    #[tokio::test]
    async fn test_run_and_stop() {
        let engine = Arc::new(engine_with(Arc::new(StaticSource {
            appointments: APPOINTMENTS_CSV,
            inventory: INVENTORY_CSV,
        })));

        let runner = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run().await })
        };

        // Give the loop its immediate first tick.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(engine.is_running());
        assert_eq!(engine.snapshot().await.donor_records.len(), 1);

        engine.stop();
        runner.await.expect("runner joins");
        assert!(!engine.is_running());
    }
}
