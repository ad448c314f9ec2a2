//! Field access and fallback aggregation
//!
//! Small pure helpers shared by the summary extractor: reading typed values out
//! of decoded messages, reducing per-record samples, and the session-first
//! fallback rule.

use crate::types::Message;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z)
const FIT_EPOCH_OFFSET_SECS: i64 = 631_065_600;

/// Reduction applied to per-record samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Mean,
    Max,
    Min,
    /// Minimum over strictly positive samples; zero/negative readings are dropouts
    MinPositive,
    Sum,
}

impl Stat {
    /// Reduce samples, `None` when nothing qualifies
    pub fn apply(self, samples: &[f64]) -> Option<f64> {
        match self {
            Stat::Mean => {
                if samples.is_empty() {
                    None
                } else {
                    Some(samples.iter().sum::<f64>() / samples.len() as f64)
                }
            }
            Stat::Max => samples.iter().copied().reduce(f64::max),
            Stat::Min => samples.iter().copied().reduce(f64::min),
            Stat::MinPositive => samples.iter().copied().filter(|v| *v > 0.0).reduce(f64::min),
            Stat::Sum => {
                if samples.is_empty() {
                    None
                } else {
                    Some(samples.iter().sum())
                }
            }
        }
    }
}

/// Session value if present, else the statistic over record samples
pub fn resolve(session_value: Option<f64>, samples: &[f64], stat: Stat) -> Option<f64> {
    session_value.or_else(|| stat.apply(samples))
}

/// Finite numeric field value
pub fn field_f64(message: &Message, field: &str) -> Option<f64> {
    message
        .get(field)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

/// First alias that carries a numeric value, probed in the given order
pub fn first_f64(message: &Message, aliases: &[&str]) -> Option<f64> {
    aliases.iter().find_map(|field| field_f64(message, field))
}

/// Numeric field of an optional message, probing aliases in order
pub fn optional_f64(message: Option<&Message>, aliases: &[&str]) -> Option<f64> {
    message.and_then(|m| first_f64(m, aliases))
}

/// One sample per message: the first alias present in each
pub fn collect_samples(messages: &[Message], aliases: &[&str]) -> Vec<f64> {
    messages
        .iter()
        .filter_map(|message| first_f64(message, aliases))
        .collect()
}

/// Textual field; numeric enum values are rendered as their number
pub fn field_string(message: &Message, field: &str) -> Option<String> {
    match message.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Timestamp field: RFC 3339 text or seconds since the FIT epoch
pub fn field_timestamp(message: &Message, field: &str) -> Option<DateTime<Utc>> {
    match message.get(field)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = FIT_EPOCH_OFFSET_SECS.checked_add(n.as_i64()?)?;
            Utc.timestamp_opt(secs, 0).single()
        }
        _ => None,
    }
}

/// Cumulative climb and drop over successive altitude samples (both positive)
pub fn elevation_changes(altitudes: &[f64]) -> Option<(f64, f64)> {
    if altitudes.len() < 2 {
        return None;
    }

    let mut ascent = 0.0;
    let mut descent = 0.0;
    for pair in altitudes.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            ascent += delta;
        } else {
            descent -= delta;
        }
    }
    Some((ascent, descent))
}
