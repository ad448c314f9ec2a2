//! Heart rate variability
//!
//! Beat-to-beat intervals arrive in hrv messages as arrays of seconds. This
//! module pulls them out in temporal order, drops sensor artifacts, and derives
//! the time-domain statistics:
//! - mean NN and population SDNN
//! - RMSSD over successive differences
//! - pNN50 over the N-1 successive differences

use crate::types::{HrvMetrics, Message};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Successive-difference threshold for pNN50 (ms)
pub const DEFAULT_NN50_THRESHOLD_MS: f64 = 50.0;

/// Exclusive upper bound for a beat interval (seconds); larger values are decoder sentinels
pub const DEFAULT_MAX_RR_SECONDS: f64 = 65.535;

/// Field carrying the beat intervals in an hrv message
const HRV_TIME_FIELD: &str = "time";

/// Tunables for HRV derivation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvOptions {
    /// Differences strictly above this count toward pNN50 (ms)
    pub nn50_threshold_ms: f64,
    /// Intervals must be strictly below this (seconds)
    pub max_rr_seconds: f64,
}

impl Default for HrvOptions {
    fn default() -> Self {
        Self {
            nn50_threshold_ms: DEFAULT_NN50_THRESHOLD_MS,
            max_rr_seconds: DEFAULT_MAX_RR_SECONDS,
        }
    }
}

/// Extracts RR intervals from hrv messages
pub struct RrIntervalExtractor;

impl RrIntervalExtractor {
    /// Collect valid intervals in milliseconds, in message then array order
    pub fn extract(messages: &[Message], options: &HrvOptions) -> Vec<f64> {
        let mut intervals = Vec::new();
        let mut dropped = 0usize;

        for message in messages {
            let values: &[Value] = match message.get(HRV_TIME_FIELD) {
                Some(Value::Array(values)) => values,
                Some(single @ Value::Number(_)) => std::slice::from_ref(single),
                _ => continue,
            };

            for value in values {
                match value.as_f64() {
                    Some(secs) if is_valid_interval(secs, options.max_rr_seconds) => {
                        intervals.push(secs * 1000.0);
                    }
                    _ => dropped += 1,
                }
            }
        }

        if dropped > 0 {
            trace!(dropped, kept = intervals.len(), "discarded out-of-range RR samples");
        }

        intervals
    }

    /// Keep only plausible intervals from a caller-supplied series (ms), preserving order
    pub fn filter_ms(intervals: &[f64], options: &HrvOptions) -> Vec<f64> {
        let kept: Vec<f64> = intervals
            .iter()
            .copied()
            .filter(|&ms| is_valid_interval_ms(ms, options.max_rr_seconds))
            .collect();

        let dropped = intervals.len() - kept.len();
        if dropped > 0 {
            trace!(dropped, kept = kept.len(), "discarded out-of-range RR samples");
        }

        kept
    }
}

fn is_valid_interval(secs: f64, max_secs: f64) -> bool {
    secs.is_finite() && secs > 0.0 && secs < max_secs
}

fn is_valid_interval_ms(ms: f64, max_secs: f64) -> bool {
    is_valid_interval(ms / 1000.0, max_secs)
}

/// Computes time-domain HRV statistics
pub struct HrvAnalyzer;

impl HrvAnalyzer {
    /// Analyze intervals (ms) with default options
    pub fn analyze(intervals: &[f64]) -> Option<HrvMetrics> {
        Self::analyze_with(intervals, &HrvOptions::default())
    }

    /// Analyze intervals (ms). Returns `None` when fewer than two intervals
    /// are available, since no successive difference can be formed.
    pub fn analyze_with(intervals: &[f64], options: &HrvOptions) -> Option<HrvMetrics> {
        if intervals.len() < 2 {
            return None;
        }

        let n = intervals.len() as f64;
        let mean_nn = intervals.iter().sum::<f64>() / n;

        let variance = intervals
            .iter()
            .map(|rr| (rr - mean_nn).powi(2))
            .sum::<f64>()
            / n;
        let sdnn = variance.sqrt();

        let mut sum_sq_diff = 0.0;
        let mut nn50 = 0usize;
        for pair in intervals.windows(2) {
            let diff = (pair[1] - pair[0]).abs();
            sum_sq_diff += diff * diff;
            if diff > options.nn50_threshold_ms {
                nn50 += 1;
            }
        }

        let diff_count = (intervals.len() - 1) as f64;
        let rmssd = (sum_sq_diff / diff_count).sqrt();
        let pnn50 = round_to_tenth(nn50 as f64 / diff_count * 100.0);

        let min_nn = intervals.iter().copied().fold(f64::INFINITY, f64::min);
        let max_nn = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(HrvMetrics {
            rmssd,
            sdnn,
            pnn50,
            mean_nn,
            min_nn,
            max_nn,
            total_intervals: intervals.len(),
        })
    }

    /// Extract intervals from hrv messages and analyze them
    pub fn from_messages(messages: &[Message], options: &HrvOptions) -> Option<HrvMetrics> {
        let intervals = RrIntervalExtractor::extract(messages, options);
        Self::analyze_with(&intervals, options)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
