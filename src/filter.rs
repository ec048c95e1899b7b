//! Read-only derived views over snapshot copies. Matching is always
//! case-insensitive substring, never prefix or exact.

use crate::system::records::{ProcessRecord, ServiceRecord};

/// Empty text returns the full set. Otherwise a process matches when its
/// name or its decimal PID contains the text as a substring.
pub fn filter_processes(records: &[ProcessRecord], text: &str) -> Vec<ProcessRecord> {
    if text.is_empty() {
        return records.to_vec();
    }
    let needle = text.to_lowercase();
    records
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.pid.to_string().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Analogous to [`filter_processes`], matching against the service name,
/// display name, or the decimal status code.
pub fn filter_services(records: &[ServiceRecord], text: &str) -> Vec<ServiceRecord> {
    if text.is_empty() {
        return records.to_vec();
    }
    let needle = text.to_lowercase();
    records
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.display_name.to_lowercase().contains(&needle)
                || s.status.code().to_string().contains(&needle)
        })
        .cloned()
        .collect()
}
