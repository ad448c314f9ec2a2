//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Fit.
//! It runs decoder JSON through normalization, summary extraction and catalog
//! listing, then encodes the result as a report.

use crate::catalog::DataCatalog;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::hrv::{HrvAnalyzer, HrvOptions, RrIntervalExtractor};
use crate::normalizer::{MessageNormalizer, NormalizedGroups};
use crate::schema::DecoderOutput;
use crate::summary::SummaryExtractor;
use crate::types::{ActivityReport, ActivitySummary, CatalogEntry, HrvMetrics};
use tracing::{debug, warn};

/// Convert decoder JSON output into an activity report JSON.
///
/// # Arguments
/// * `raw_json` - Decoder output: either the bare message collections
///   (`{"sessionMesgs": [...], ...}`) or an envelope with `messages`,
///   `errors` and `integrityOk`
///
/// # Returns
/// Pretty-printed report JSON
///
/// # Example
/// ```ignore
/// let report = summarize_decoded_json(decoded_json)?;
/// ```
pub fn summarize_decoded_json(raw_json: String) -> Result<String, ComputeError> {
    let processor = FitProcessor::new();
    processor.process_to_json(&raw_json)
}

/// Compute HRV metrics from a JSON array of RR intervals in milliseconds.
///
/// Out-of-range intervals are discarded first. Returns the metrics as JSON, or
/// `null` when fewer than two valid intervals remain.
pub fn hrv_from_rr_json(raw_json: String) -> Result<String, ComputeError> {
    let intervals: Vec<f64> = serde_json::from_str(&raw_json)?;
    let options = HrvOptions::default();
    let valid = RrIntervalExtractor::filter_ms(&intervals, &options);
    let metrics = HrvAnalyzer::analyze_with(&valid, &options);
    Ok(serde_json::to_string(&metrics)?)
}

/// Processor holding the HRV options and encoder used for every file.
///
/// Each call is independent; nothing carries over between files.
pub struct FitProcessor {
    options: HrvOptions,
    encoder: ReportEncoder,
}

impl Default for FitProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FitProcessor {
    /// Create a processor with default options
    pub fn new() -> Self {
        Self::with_options(HrvOptions::default())
    }

    /// Create a processor with specific HRV options
    pub fn with_options(options: HrvOptions) -> Self {
        Self {
            options,
            encoder: ReportEncoder::new(),
        }
    }

    /// HRV options in use
    pub fn options(&self) -> &HrvOptions {
        &self.options
    }

    /// Parse and normalize decoder JSON, returning the groups and any warnings
    pub fn normalize(
        &self,
        raw_json: &str,
    ) -> Result<(NormalizedGroups, Vec<String>), ComputeError> {
        let output = DecoderOutput::from_json(raw_json)?;
        let warnings = output.warnings();
        for warning in &warnings {
            warn!(%warning, "decoder reported a problem; extracting what was decoded");
        }

        let groups = MessageNormalizer::normalize_owned(output.bundle);
        debug!(messages = groups.total_messages(), "normalized decoder output");
        Ok((groups, warnings))
    }

    /// Summarize already-normalized groups
    pub fn summarize(&self, groups: &NormalizedGroups) -> ActivitySummary {
        SummaryExtractor::extract_with(groups, &self.options)
    }

    /// List the non-empty groups
    pub fn catalog(&self, groups: &NormalizedGroups) -> Vec<CatalogEntry> {
        DataCatalog::entries(groups)
    }

    /// HRV metrics from RR intervals in milliseconds, ignoring out-of-range values
    pub fn hrv_from_rr(&self, intervals: &[f64]) -> Option<HrvMetrics> {
        let valid = RrIntervalExtractor::filter_ms(intervals, &self.options);
        HrvAnalyzer::analyze_with(&valid, &self.options)
    }

    /// Run the full pipeline on decoder JSON
    pub fn process(&self, raw_json: &str) -> Result<ActivityReport, ComputeError> {
        let (groups, warnings) = self.normalize(raw_json)?;

        let summary = self.summarize(&groups);
        let data_types = self.catalog(&groups);
        debug!(
            data_types = data_types.len(),
            has_hrv = summary.hrv_analysis.is_some(),
            "extracted activity summary"
        );

        Ok(self.encoder.encode(summary, data_types, warnings))
    }

    /// Run the full pipeline and serialize the report
    pub fn process_to_json(&self, raw_json: &str) -> Result<String, ComputeError> {
        let report = self.process(raw_json)?;
        ReportEncoder::to_json(&report)
    }
}
