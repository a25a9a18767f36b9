//! Typed records and row mapping for the two spreadsheet feeds
//!
//! Mapping is positional and infallible: missing or malformed cells degrade
//! to defaults, never to an error. Column order is a contract with the
//! external sheet (see the feed configuration docs).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One donor appointment row from the appointment feed.
///
/// Records are positionally identified by their index in the fetched
/// sequence. `donor_name` serves as a natural key only within one fetch
/// cycle; it is re-resolved to a row position by linear search at edit time
/// and is not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub timestamp: String,
    pub donor_name: String,
    pub phone_number: String,
    pub channel: String,
    pub donation_type: String,
    /// `dd/MM/yyyy`-family date, or the literal sentinel `"Queued"`
    pub appointment_date: String,
    pub time: String,
    pub status: String,
}

/// Current blood inventory levels from the inventory feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub blood_units_available: u32,
    pub plasma_units_available: u32,
    pub platelet_units_available: u32,
    pub last_updated: String,
}

/// In-memory dataset replaced wholesale on every settled sync cycle
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetState {
    pub donor_records: Vec<AppointmentRecord>,
    pub inventory: InventorySnapshot,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// Headline numbers derived from a dataset snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_donors: usize,
    pub confirmed_appointments: usize,
    pub total_units: u32,
}

impl DashboardMetrics {
    /// Derive metrics from the current dataset.
    ///
    /// "Confirmed" counts records whose status contains `confirmed` or
    /// `completed`, case-insensitively.
    pub fn from_state(state: &DatasetState) -> Self {
        let confirmed = state
            .donor_records
            .iter()
            .filter(|r| {
                let status = r.status.to_lowercase();
                status.contains("confirmed") || status.contains("completed")
            })
            .count();

        Self {
            total_donors: state.donor_records.len(),
            confirmed_appointments: confirmed,
            total_units: state.inventory.blood_units_available
                + state.inventory.plasma_units_available
                + state.inventory.platelet_units_available,
        }
    }
}

/// Display badge classification for a status string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "label")]
pub enum StatusBadge {
    Confirmed,
    Pending,
    Critical,
    /// Unrecognized status, displayed verbatim on a generic badge
    Other(String),
}

/// Classify a raw status string for display.
pub fn classify_status(status: &str) -> StatusBadge {
    let lower = status.to_lowercase();
    if lower.contains("confirmed") || lower.contains("completed") {
        StatusBadge::Confirmed
    } else if lower.contains("pending") {
        StatusBadge::Pending
    } else if lower.contains("cancelled") || lower.contains("missed") {
        StatusBadge::Critical
    } else {
        StatusBadge::Other(status.to_string())
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn numeric_cell(row: &[String], index: usize) -> u32 {
    row.get(index)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Map parsed appointment feed rows into appointment records.
///
/// Row 0 is the header and is discarded. Columns 0-7 map positionally;
/// missing trailing cells default to the empty string, a missing status
/// defaults to `"Pending"`, and rows with an empty donor name are dropped as
/// noise.
pub fn map_appointments(rows: &[Vec<String>]) -> Vec<AppointmentRecord> {
    rows.iter()
        .skip(1)
        .map(|row| {
            let status = cell(row, 7);
            AppointmentRecord {
                timestamp: cell(row, 0),
                donor_name: cell(row, 1),
                phone_number: cell(row, 2),
                channel: cell(row, 3),
                donation_type: cell(row, 4),
                appointment_date: cell(row, 5),
                time: cell(row, 6),
                status: if status.is_empty() {
                    "Pending".to_string()
                } else {
                    status
                },
            }
        })
        .filter(|record| !record.donor_name.is_empty())
        .collect()
}

/// Map parsed inventory feed rows into a single snapshot.
///
/// Row 0 is the header; row 1 is the current snapshot (further data rows are
/// ignored). Numeric cells default to 0 when unparsable and `last_updated`
/// defaults to `now` when absent.
pub fn map_inventory(rows: &[Vec<String>], now: DateTime<Utc>) -> InventorySnapshot {
    let empty = Vec::new();
    let row = rows.get(1).unwrap_or(&empty);
    let last_updated = cell(row, 3);

    InventorySnapshot {
        blood_units_available: numeric_cell(row, 0),
        plasma_units_available: numeric_cell(row, 1),
        platelet_units_available: numeric_cell(row, 2),
        last_updated: if last_updated.is_empty() {
            now.to_rfc3339()
        } else {
            last_updated
        },
    }
}

/// Render a `dd/MM/yyyy` (or `dd-MM-yyyy`) date as day, abbreviated month,
/// year (`30/12/2024` → `30 Dec 2024`).
///
/// Empty input and the `"Queued"` sentinel pass through unchanged, as does
/// anything that fails to parse as a calendar date.
pub fn format_display_date(raw: &str) -> String {
    if raw.is_empty() || raw == "Queued" {
        return raw.to_string();
    }

    let parts: Vec<&str> = raw.split(['/', '-']).collect();
    if parts.len() == 3 {
        if let (Ok(day), Ok(month), Ok(year)) = (
            parts[0].parse::<u32>(),
            parts[1].parse::<u32>(),
            parts[2].parse::<i32>(),
        ) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return date.format("%-d %b %Y").to_string();
            }
        }
    }
    raw.to_string()
}

/// Filter records by a search term (donor name, phone number or channel
/// substring) and a status filter (`"all"` or a case-insensitive exact
/// status match).
pub fn filter_records<'a>(
    records: &'a [AppointmentRecord],
    search: &str,
    status_filter: &str,
) -> Vec<&'a AppointmentRecord> {
    let search_lower = search.to_lowercase();
    records
        .iter()
        .filter(|record| {
            let matches_search = search.is_empty()
                || record.donor_name.to_lowercase().contains(&search_lower)
                || record.phone_number.contains(search)
                || record.channel.to_lowercase().contains(&search_lower);

            let matches_status = status_filter.eq_ignore_ascii_case("all")
                || record.status.eq_ignore_ascii_case(status_filter);

            matches_search && matches_status
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_csv;

    fn rows(raw: &str) -> Vec<Vec<String>> {
        parse_csv(raw)
    }

    #[test]
    fn test_map_appointments_end_to_end() {
        let raw = "Timestamp,Name,Phone,Channel,Type,Date,Time,Status\n\
                   2024-12-29,John Smith,555-1234,Website,Whole Blood,30/12/2024,10:00,Confirmed";
        let records = map_appointments(&rows(raw));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].donor_name, "John Smith");
        assert_eq!(records[0].status, "Confirmed");
        assert_eq!(records[0].appointment_date, "30/12/2024");
    }

    #[test]
    fn test_short_row_fills_trailing_defaults() {
        let raw = "h1,h2\n2024-12-29,Jane Doe,555-9999";
        let records = map_appointments(&rows(raw));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].donor_name, "Jane Doe");
        assert_eq!(records[0].channel, "");
        assert_eq!(records[0].appointment_date, "");
        // Missing status defaults to Pending
        assert_eq!(records[0].status, "Pending");
    }

    #[test]
    fn test_row_without_donor_name_is_dropped() {
        let raw = "h\n2024-12-29,,555-1234,Website";
        assert!(map_appointments(&rows(raw)).is_empty());
    }

    #[test]
    fn test_map_inventory_defaults_on_unparsable_cells() {
        let now = Utc::now();
        let raw = "Blood,Plasma,Platelets,Updated\nN/A,78,-5";
        let snapshot = map_inventory(&rows(raw), now);
        assert_eq!(snapshot.blood_units_available, 0);
        assert_eq!(snapshot.plasma_units_available, 78);
        assert_eq!(snapshot.platelet_units_available, 0);
        assert_eq!(snapshot.last_updated, now.to_rfc3339());
    }

    #[test]
    fn test_map_inventory_reads_first_data_row_only() {
        let now = Utc::now();
        let raw = "h\n245,78,32,2024-12-29\n999,999,999";
        let snapshot = map_inventory(&rows(raw), now);
        assert_eq!(snapshot.blood_units_available, 245);
        assert_eq!(snapshot.last_updated, "2024-12-29");
    }

    #[test]
    fn test_map_inventory_without_data_row() {
        let now = Utc::now();
        let snapshot = map_inventory(&rows("header only"), now);
        assert_eq!(snapshot.blood_units_available, 0);
        assert_eq!(snapshot.last_updated, now.to_rfc3339());
    }

    #[test]
    fn test_format_display_date() {
        assert_eq!(format_display_date("30/12/2024"), "30 Dec 2024");
        assert_eq!(format_display_date("01-02-2025"), "1 Feb 2025");
        assert_eq!(format_display_date("Queued"), "Queued");
        assert_eq!(format_display_date(""), "");
        assert_eq!(format_display_date("not a date"), "not a date");
        // 31/02 is not a calendar date; pass through untouched
        assert_eq!(format_display_date("31/02/2024"), "31/02/2024");
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status("Confirmed"), StatusBadge::Confirmed);
        assert_eq!(classify_status("completed today"), StatusBadge::Confirmed);
        assert_eq!(classify_status("Pending"), StatusBadge::Pending);
        assert_eq!(classify_status("Cancelled"), StatusBadge::Critical);
        assert_eq!(classify_status("missed"), StatusBadge::Critical);
        assert_eq!(
            classify_status("Rescheduled"),
            StatusBadge::Other("Rescheduled".to_string())
        );
    }

    #[test]
    fn test_metrics_from_state() {
        let raw = "h\n\
                   t,A,p,c,d,dt,tm,Confirmed\n\
                   t,B,p,c,d,dt,tm,Completed\n\
                   t,C,p,c,d,dt,tm,Cancelled";
        let state = DatasetState {
            donor_records: map_appointments(&rows(raw)),
            inventory: InventorySnapshot {
                blood_units_available: 245,
                plasma_units_available: 78,
                platelet_units_available: 32,
                last_updated: String::new(),
            },
            ..Default::default()
        };
        let metrics = DashboardMetrics::from_state(&state);
        assert_eq!(metrics.total_donors, 3);
        assert_eq!(metrics.confirmed_appointments, 2);
        assert_eq!(metrics.total_units, 355);
    }

    #[test]
    fn test_filter_records() {
        let raw = "h\n\
                   t,John Smith,555-1234,Website,d,dt,tm,Confirmed\n\
                   t,Sarah Johnson,555-9876,Phone,d,dt,tm,Pending";
        let records = map_appointments(&rows(raw));

        let by_name = filter_records(&records, "john", "all");
        assert_eq!(by_name.len(), 2); // John Smith and Sarah Johnson both match

        let by_phone = filter_records(&records, "555-1234", "all");
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].donor_name, "John Smith");

        let by_status = filter_records(&records, "", "pending");
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].donor_name, "Sarah Johnson");
    }
}
