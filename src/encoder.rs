//! Report encoding
//!
//! This module wraps an activity summary and its data type listing into a
//! report payload stamped with producer metadata and the computation time.

use crate::error::ComputeError;
use crate::types::{ActivityReport, ActivitySummary, CatalogEntry, ReportProducer};
use crate::{FIT_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing activity report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Instance ID stamped on every report
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a summary, its catalog entries and any decoder warnings
    pub fn encode(
        &self,
        summary: ActivitySummary,
        data_types: Vec<CatalogEntry>,
        warnings: Vec<String>,
    ) -> ActivityReport {
        ActivityReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: FIT_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            summary,
            data_types,
            warnings,
        }
    }

    /// Serialize a report to pretty-printed JSON
    pub fn to_json(report: &ActivityReport) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(report)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> ActivitySummary {
        ActivitySummary {
            sport: Some("running".to_string()),
            avg_heart_rate: Some(148.0),
            total_distance: Some(10_000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_report() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(
            sample_summary(),
            vec![CatalogEntry {
                key: "session".to_string(),
                label: "Sessions".to_string(),
                count: 1,
            }],
            vec![],
        );

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, FIT_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert!(chrono::DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
        assert_eq!(report.data_types.len(), 1);
    }

    #[test]
    fn test_report_json_shape() {
        let encoder = ReportEncoder::new();
        let warnings = vec!["Decoder error: x".to_string()];
        let report = encoder.encode(sample_summary(), vec![], warnings);
        let json = ReportEncoder::to_json(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reportVersion"], "1.0.0");
        assert_eq!(value["producer"]["instanceId"], encoder.instance_id());
        assert_eq!(value["summary"]["sport"], "running");
        assert_eq!(value["summary"]["avgHeartRate"], 148.0);
        assert!(value["summary"].get("avgPace").is_none());
        assert_eq!(value["warnings"][0], "Decoder error: x");
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(ReportEncoder::new().instance_id(), ReportEncoder::new().instance_id());
    }
}
