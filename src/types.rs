//! Core types for the Synheart Fit engine
//!
//! This module defines the values that come out of each stage: HRV metrics,
//! the flattened activity summary, data type descriptors and the encoded report.
//! All of them are plain serializable data with no behavior attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded message: field name → scalar, timestamp or numeric array
pub type Message = serde_json::Map<String, serde_json::Value>;

/// Time-domain HRV statistics derived from RR intervals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvMetrics {
    /// Root mean square of successive differences (ms)
    pub rmssd: f64,
    /// Population standard deviation of NN intervals (ms)
    pub sdnn: f64,
    /// Percentage of successive differences above the NN50 threshold
    pub pnn50: f64,
    /// Mean NN interval (ms)
    #[serde(rename = "meanNN")]
    pub mean_nn: f64,
    /// Shortest NN interval (ms)
    #[serde(rename = "minNN")]
    pub min_nn: f64,
    /// Longest NN interval (ms)
    #[serde(rename = "maxNN")]
    pub max_nn: f64,
    /// Number of intervals used
    pub total_intervals: usize,
}

/// Flattened activity summary.
///
/// Every field is independently optional; `None` means the value could not be
/// derived from the file, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Wall-clock duration (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elapsed_time: Option<f64>,
    /// Moving/timer duration (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_timer_time: Option<f64>,
    /// Distance (meters)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
    /// Energy (kcal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_heart_rate: Option<f64>,

    /// Average speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,
    /// Maximum speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// Average pace (minutes per km)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cadence: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_power: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_descent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<f64>,

    /// Breaths per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_respiration_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_respiration_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_respiration_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_training_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_anaerobic_training_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_load: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv_analysis: Option<HrvMetrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv_message_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiration_message_count: Option<usize>,
}

/// One non-empty message group, as listed for downstream display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTypeDescriptor<'a> {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub data: &'a [Message],
}

impl DataTypeDescriptor<'_> {
    /// Drop the message data, keeping only the listing fields
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            key: self.key.to_string(),
            label: self.label.to_string(),
            count: self.count,
        }
    }
}

/// Data type listing without message data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete report for one decoded file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub summary: ActivitySummary,
    pub data_types: Vec<CatalogEntry>,
    pub warnings: Vec<String>,
}
