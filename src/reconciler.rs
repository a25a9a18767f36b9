//! Update reconciler - edit request/acknowledge/resync protocol
//!
//! Encapsulates the two write flows (donor status, inventory quantities).
//! Each flow marks its own pending flag, performs the write through the
//! `SheetWriter` channel, and on success invokes a caller-supplied resync so
//! the dashboard reflects the authoritative post-write state rather than the
//! locally-entered value. On failure the dataset is left untouched and the
//! rejection is surfaced to the caller.

use crate::error::{DonorSrvError, Result};
use crate::records::AppointmentRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Donor status edit request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    /// Destination row in the external sheet (1-based, header-offset)
    pub row_index: usize,
    pub new_status: String,
    pub donor_name: String,
}

/// Inventory edit request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdateRequest {
    #[serde(default)]
    pub blood_units: Option<u32>,
    #[serde(default)]
    pub plasma_units: Option<u32>,
    #[serde(default)]
    pub platelet_units: Option<u32>,
}

/// Result of a write flow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}

/// Write channel to the external data store.
///
/// The real store expects PUT semantics keyed by row and column with a
/// `{ "values": [[newValue]] }` payload; an authenticated implementation
/// plugs in here without changing the reconciler protocol.
#[async_trait]
pub trait SheetWriter: Send + Sync {
    async fn write_status(&self, request: &StatusUpdateRequest) -> Result<()>;
    async fn write_inventory(&self, request: &InventoryUpdateRequest) -> Result<()>;
}

/// Stub write channel: waits a fixed delay and always succeeds.
///
/// Stands in for the real authenticated write-back, which this deployment
/// does not have credentials for.
pub struct StubSheetWriter {
    delay: Duration,
}

impl StubSheetWriter {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(1000),
        }
    }

    /// Stub with a custom delay (tests).
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for StubSheetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetWriter for StubSheetWriter {
    async fn write_status(&self, request: &StatusUpdateRequest) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        info!(
            "Stub write: {} (row {}) status -> {}",
            request.donor_name, request.row_index, request.new_status
        );
        Ok(())
    }

    async fn write_inventory(&self, request: &InventoryUpdateRequest) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        info!("Stub write: inventory update {:?}", request);
        Ok(())
    }
}

/// Update reconciler with independent pending state per flow
pub struct UpdateReconciler {
    writer: Box<dyn SheetWriter>,
    status_pending: AtomicBool,
    inventory_pending: AtomicBool,
    status_error: RwLock<Option<String>>,
    inventory_error: RwLock<Option<String>>,
}

impl UpdateReconciler {
    pub fn new(writer: Box<dyn SheetWriter>) -> Self {
        Self {
            writer,
            status_pending: AtomicBool::new(false),
            inventory_pending: AtomicBool::new(false),
            status_error: RwLock::new(None),
            inventory_error: RwLock::new(None),
        }
    }

    /// Resolve a donor name to its destination row in the external sheet.
    ///
    /// The sheet is 1-based and carries a header row, hence the +2 offset
    /// from the record's position in the unfiltered sequence. Duplicate
    /// names resolve to the first match; the name is only a reliable key
    /// within a single fetch cycle.
    pub fn row_index_for(records: &[AppointmentRecord], donor_name: &str) -> Option<usize> {
        records
            .iter()
            .position(|r| r.donor_name == donor_name)
            .map(|index| index + 2)
    }

    /// Run the donor status write flow.
    ///
    /// `resync` is invoked exactly once, only on success.
    pub async fn update_donor_status<F, Fut>(
        &self,
        request: StatusUpdateRequest,
        resync: F,
    ) -> UpdateOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.status_pending.store(true, Ordering::SeqCst);
        *self.status_error.write().await = None;

        let outcome = match self.writer.write_status(&request).await {
            Ok(()) => {
                resync().await;
                UpdateOutcome::ok()
            }
            Err(e) => {
                warn!("Status update for {} failed: {}", request.donor_name, e);
                let message = describe_write_failure(&e);
                *self.status_error.write().await = Some(message.clone());
                UpdateOutcome::failed(message)
            }
        };

        self.status_pending.store(false, Ordering::SeqCst);
        outcome
    }

    /// Run the inventory write flow.
    pub async fn update_inventory<F, Fut>(
        &self,
        request: InventoryUpdateRequest,
        resync: F,
    ) -> UpdateOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.inventory_pending.store(true, Ordering::SeqCst);
        *self.inventory_error.write().await = None;

        let outcome = match self.writer.write_inventory(&request).await {
            Ok(()) => {
                resync().await;
                UpdateOutcome::ok()
            }
            Err(e) => {
                warn!("Inventory update failed: {}", e);
                let message = describe_write_failure(&e);
                *self.inventory_error.write().await = Some(message.clone());
                UpdateOutcome::failed(message)
            }
        };

        self.inventory_pending.store(false, Ordering::SeqCst);
        outcome
    }

    /// True while the status write flow is in flight.
    pub fn is_updating_status(&self) -> bool {
        self.status_pending.load(Ordering::SeqCst)
    }

    /// True while the inventory write flow is in flight.
    pub fn is_updating_inventory(&self) -> bool {
        self.inventory_pending.load(Ordering::SeqCst)
    }

    /// Last rejection message of the status flow, if any.
    pub async fn status_error(&self) -> Option<String> {
        self.status_error.read().await.clone()
    }

    /// Last rejection message of the inventory flow, if any.
    pub async fn inventory_error(&self) -> Option<String> {
        self.inventory_error.read().await.clone()
    }
}

fn describe_write_failure(err: &DonorSrvError) -> String {
    match err {
        DonorSrvError::WriteError(msg) => msg.clone(),
        other => other.to_string(),
    }
}
