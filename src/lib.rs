//! donorsrv - Blood donation dashboard synchronization service
//!
//! Polls two publicly exported spreadsheet CSV feeds (donor appointments and
//! blood inventory), maps them into typed records held in an in-memory
//! dataset, and reconciles operator edits through a pluggable write channel
//! followed by a forced resync.

pub mod api;
pub mod config;
pub mod csv;
pub mod demo;
pub mod error;
pub mod fetcher;
pub mod reconciler;
pub mod records;
pub mod sync;

pub use error::{DonorSrvError, Result};

/// Service information
pub const SERVICE_NAME: &str = "donorsrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
