//! Utility functions for data processing and formatting

use time::{format_description, OffsetDateTime};

use crate::history::DataHistory;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Summary statistics over the values currently held in a history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub samples: usize,
}

/// Summarize a sensor history, rounding the average to 2 decimal places
///
/// Returns `None` for an empty history.
pub fn summarize(history: &DataHistory) -> Option<HistorySummary> {
    let values = history.values();
    if values.is_empty() {
        return None;
    }

    let count = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(HistorySummary {
        min,
        max,
        average: (sum / count * 100.0).round() / 100.0, // 2 decimal places
        samples: values.len(),
    })
}
