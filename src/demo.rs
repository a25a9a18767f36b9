//! Built-in demo dataset
//!
//! Substituted wholesale when a feed fetch fails so the dashboard never shows
//! an unrecoverable empty state. A warning banner driven by the dataset's
//! `error` field tells the operator the data is not live.

use crate::records::{AppointmentRecord, InventorySnapshot};
use chrono::{DateTime, Utc};

/// Fixed demo dataset: three sample appointments and an inventory snapshot.
///
/// `now` stamps the inventory's `last_updated` at fallback time.
pub fn demo_dataset(now: DateTime<Utc>) -> (Vec<AppointmentRecord>, InventorySnapshot) {
    let records = vec![
        AppointmentRecord {
            timestamp: "2024-12-29 10:30:00".to_string(),
            donor_name: "John Smith".to_string(),
            phone_number: "+1 (555) 123-4567".to_string(),
            channel: "Website".to_string(),
            donation_type: "Whole Blood".to_string(),
            appointment_date: "2024-12-30".to_string(),
            time: "10:00".to_string(),
            status: "Confirmed".to_string(),
        },
        AppointmentRecord {
            timestamp: "2024-12-29 11:15:00".to_string(),
            donor_name: "Sarah Johnson".to_string(),
            phone_number: "+1 (555) 987-6543".to_string(),
            channel: "Phone".to_string(),
            donation_type: "Plasma".to_string(),
            appointment_date: "2024-12-31".to_string(),
            time: "14:30".to_string(),
            status: "Pending".to_string(),
        },
        AppointmentRecord {
            timestamp: "2024-12-29 09:45:00".to_string(),
            donor_name: "Michael Brown".to_string(),
            phone_number: "+1 (555) 456-7890".to_string(),
            channel: "Walk-in".to_string(),
            donation_type: "Platelets".to_string(),
            appointment_date: "2024-12-29".to_string(),
            time: "09:00".to_string(),
            status: "Completed".to_string(),
        },
    ];

    let inventory = InventorySnapshot {
        blood_units_available: 245,
        plasma_units_available: 78,
        platelet_units_available: 32,
        last_updated: now.to_rfc3339(),
    };

    (records, inventory)
}
