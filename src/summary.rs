//! Activity summary extraction
//!
//! Builds the flattened activity summary from normalized message groups. For
//! each metric the first session message wins when it carries the field;
//! otherwise the value is recomputed from per-record samples; otherwise it is
//! left absent. Each field falls back on its own, so a file may supply session
//! heart rate while cadence is computed from records.

use crate::aggregate::{
    collect_samples, elevation_changes, field_string, field_timestamp, optional_f64, resolve,
    Stat,
};
use crate::hrv::{HrvAnalyzer, HrvOptions};
use crate::normalizer::NormalizedGroups;
use crate::types::{ActivitySummary, Message};
use chrono::{DateTime, Utc};
use tracing::debug;

const HEART_RATE_FIELDS: &[&str] = &["heartRate"];
const SPEED_FIELDS: &[&str] = &["enhancedSpeed", "speed"];
const CADENCE_FIELDS: &[&str] = &["cadence"];
const POWER_FIELDS: &[&str] = &["power"];
const ALTITUDE_FIELDS: &[&str] = &["enhancedAltitude", "altitude"];
const TEMPERATURE_FIELDS: &[&str] = &["temperature"];
const DISTANCE_FIELDS: &[&str] = &["distance"];
const TIMESTAMP_FIELD: &str = "timestamp";

/// Respiration aliases seen across devices, in preference order
const RESPIRATION_FIELDS: &[&str] = &[
    "enhancedRespirationRate",
    "respirationRate",
    "respiratoryRate",
    "breathingRate",
];

/// Session-level field names for one avg/max/min metric family
struct SessionFields {
    avg: &'static [&'static str],
    max: &'static [&'static str],
    min: &'static [&'static str],
}

const SESSION_HEART_RATE: SessionFields = SessionFields {
    avg: &["avgHeartRate"],
    max: &["maxHeartRate"],
    min: &["minHeartRate"],
};

const SESSION_ALTITUDE: SessionFields = SessionFields {
    avg: &["enhancedAvgAltitude", "avgAltitude"],
    max: &["enhancedMaxAltitude", "maxAltitude"],
    min: &["enhancedMinAltitude", "minAltitude"],
};

const SESSION_TEMPERATURE: SessionFields = SessionFields {
    avg: &["avgTemperature"],
    max: &["maxTemperature"],
    min: &["minTemperature"],
};

const SESSION_RESPIRATION: SessionFields = SessionFields {
    avg: &["enhancedAvgRespirationRate", "avgRespirationRate"],
    max: &["enhancedMaxRespirationRate", "maxRespirationRate"],
    min: &["enhancedMinRespirationRate", "minRespirationRate"],
};

/// Resolved avg/max/min for one family
#[derive(Debug, Default)]
struct FamilyStats {
    avg: Option<f64>,
    max: Option<f64>,
    min: Option<f64>,
}

/// Summary extractor for decoded activity files
pub struct SummaryExtractor;

impl SummaryExtractor {
    /// Extract a summary using default HRV options
    pub fn extract(groups: &NormalizedGroups) -> ActivitySummary {
        Self::extract_with(groups, &HrvOptions::default())
    }

    /// Extract a summary. Never fails; missing data leaves fields absent.
    pub fn extract_with(groups: &NormalizedGroups, options: &HrvOptions) -> ActivitySummary {
        let session = groups.session.first();
        let records = groups.record.as_slice();

        let heart_rate = resolve_family(
            session,
            &SESSION_HEART_RATE,
            &collect_samples(records, HEART_RATE_FIELDS),
            true,
        );

        let altitude_samples = collect_samples(records, ALTITUDE_FIELDS);
        let altitude = resolve_family(session, &SESSION_ALTITUDE, &altitude_samples, false);
        let (ascent, descent) = compute_elevation(session, &altitude_samples);

        let temperature = resolve_family(
            session,
            &SESSION_TEMPERATURE,
            &collect_samples(records, TEMPERATURE_FIELDS),
            true,
        );

        let respiration = resolve_family(
            session,
            &SESSION_RESPIRATION,
            &pool_respiration(records, &groups.respiration_rate),
            true,
        );

        let speed_samples = collect_samples(records, SPEED_FIELDS);
        let avg_speed = resolve(
            optional_f64(session, &["enhancedAvgSpeed", "avgSpeed"]),
            &speed_samples,
            Stat::Mean,
        );
        let max_speed = resolve(
            optional_f64(session, &["enhancedMaxSpeed", "maxSpeed"]),
            &speed_samples,
            Stat::Max,
        );

        let cadence_samples = collect_samples(records, CADENCE_FIELDS);
        let power_samples = collect_samples(records, POWER_FIELDS);

        let hrv_analysis = HrvAnalyzer::from_messages(&groups.hrv, options);
        if !groups.hrv.is_empty() && hrv_analysis.is_none() {
            debug!(
                messages = groups.hrv.len(),
                "hrv messages present but too few valid intervals"
            );
        }

        ActivitySummary {
            sport: text_with_fallback(session, groups.sport.first(), "sport"),
            sub_sport: text_with_fallback(session, groups.sport.first(), "subSport"),
            start_time: compute_start_time(session, records),
            manufacturer: groups
                .file_id
                .first()
                .and_then(|m| field_string(m, "manufacturer")),
            product: groups.file_id.first().and_then(|m| {
                field_string(m, "garminProduct").or_else(|| field_string(m, "product"))
            }),

            total_elapsed_time: compute_elapsed_time(session, records),
            total_timer_time: optional_f64(session, &["totalTimerTime"]),
            total_distance: resolve(
                optional_f64(session, &["totalDistance"]),
                &collect_samples(records, DISTANCE_FIELDS),
                Stat::Max,
            ),
            total_calories: optional_f64(session, &["totalCalories"]),

            avg_heart_rate: heart_rate.avg,
            max_heart_rate: heart_rate.max,
            min_heart_rate: heart_rate.min,

            avg_speed,
            max_speed,
            avg_pace: compute_pace(avg_speed),

            avg_cadence: resolve(
                optional_f64(session, &["avgCadence"]),
                &cadence_samples,
                Stat::Mean,
            ),
            max_cadence: resolve(
                optional_f64(session, &["maxCadence"]),
                &cadence_samples,
                Stat::Max,
            ),

            avg_power: resolve(
                optional_f64(session, &["avgPower"]),
                &power_samples,
                Stat::Mean,
            ),
            max_power: resolve(
                optional_f64(session, &["maxPower"]),
                &power_samples,
                Stat::Max,
            ),
            normalized_power: optional_f64(session, &["normalizedPower"]),

            avg_altitude: altitude.avg,
            min_altitude: altitude.min,
            max_altitude: altitude.max,
            total_ascent: ascent,
            total_descent: descent,

            avg_temperature: temperature.avg,
            min_temperature: temperature.min,
            max_temperature: temperature.max,

            avg_respiration_rate: respiration.avg,
            min_respiration_rate: respiration.min,
            max_respiration_rate: respiration.max,

            total_training_effect: optional_f64(session, &["totalTrainingEffect"]),
            total_anaerobic_training_effect: optional_f64(
                session,
                &["totalAnaerobicTrainingEffect"],
            ),
            training_load: optional_f64(session, &["trainingLoadPeak", "trainingLoad"]),

            hrv_analysis,

            record_count: non_zero(groups.record.len()),
            lap_count: non_zero(groups.lap.len()),
            event_count: non_zero(groups.event.len()),
            hrv_message_count: non_zero(groups.hrv.len()),
            respiration_message_count: non_zero(groups.respiration_rate.len()),
        }
    }
}

/// Apply the session-first rule to an avg/max/min family.
///
/// With `positive_min`, zero or negative readings never count as a minimum,
/// whether they come from the session or from records.
fn resolve_family(
    session: Option<&Message>,
    fields: &SessionFields,
    samples: &[f64],
    positive_min: bool,
) -> FamilyStats {
    let (session_min, min_stat) = if positive_min {
        (
            optional_f64(session, fields.min).filter(|v| *v > 0.0),
            Stat::MinPositive,
        )
    } else {
        (optional_f64(session, fields.min), Stat::Min)
    };

    FamilyStats {
        avg: resolve(optional_f64(session, fields.avg), samples, Stat::Mean),
        max: resolve(optional_f64(session, fields.max), samples, Stat::Max),
        min: resolve(session_min, samples, min_stat),
    }
}

/// Respiration samples from records and dedicated respiration messages, pooled.
///
/// Each message contributes at most one value (its first present alias). The
/// two sources are concatenated without de-duplication.
fn pool_respiration(records: &[Message], respiration: &[Message]) -> Vec<f64> {
    let mut pooled = collect_samples(records, RESPIRATION_FIELDS);
    pooled.extend(collect_samples(respiration, RESPIRATION_FIELDS));
    pooled
}

/// Minutes per kilometer from meters per second
fn compute_pace(avg_speed: Option<f64>) -> Option<f64> {
    match avg_speed {
        Some(speed) if speed > 0.0 => Some(1000.0 / (speed * 60.0)),
        _ => None,
    }
}

fn compute_start_time(session: Option<&Message>, records: &[Message]) -> Option<DateTime<Utc>> {
    session
        .and_then(|s| field_timestamp(s, "startTime"))
        .or_else(|| records.iter().find_map(|r| field_timestamp(r, TIMESTAMP_FIELD)))
}

/// Session elapsed time, else the span between first and last record timestamps
fn compute_elapsed_time(session: Option<&Message>, records: &[Message]) -> Option<f64> {
    if let Some(elapsed) = optional_f64(session, &["totalElapsedTime"]) {
        return Some(elapsed);
    }

    let first = records.iter().find_map(|r| field_timestamp(r, TIMESTAMP_FIELD))?;
    let last = records
        .iter()
        .rev()
        .find_map(|r| field_timestamp(r, TIMESTAMP_FIELD))?;
    let span = (last - first).num_milliseconds() as f64 / 1000.0;

    (span > 0.0).then_some(span)
}

fn compute_elevation(
    session: Option<&Message>,
    altitude_samples: &[f64],
) -> (Option<f64>, Option<f64>) {
    let computed = elevation_changes(altitude_samples);
    (
        optional_f64(session, &["totalAscent"]).or(computed.map(|(up, _)| up)),
        optional_f64(session, &["totalDescent"]).or(computed.map(|(_, down)| down)),
    )
}

fn text_with_fallback(
    session: Option<&Message>,
    fallback: Option<&Message>,
    field: &str,
) -> Option<String> {
    session
        .and_then(|s| field_string(s, field))
        .or_else(|| fallback.and_then(|m| field_string(m, field)))
}

fn non_zero(count: usize) -> Option<usize> {
    (count > 0).then_some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::MessageNormalizer;
    use crate::schema::DecoderOutput;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn groups(value: Value) -> NormalizedGroups {
        MessageNormalizer::normalize_owned(DecoderOutput::from_value(value).unwrap().bundle)
    }

    #[test]
    fn test_empty_bundle_has_no_fields() {
        let summary = SummaryExtractor::extract(&groups(json!({})));
        assert_eq!(summary, ActivitySummary::default());
        assert_eq!(serde_json::to_value(&summary).unwrap(), json!({}));
    }

    #[test]
    fn test_extreme_numeric_timestamps_are_ignored() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "startTime": i64::MAX }],
            "recordMesgs": [
                { "timestamp": i64::MAX, "heartRate": 100 },
                { "timestamp": i64::MIN, "heartRate": 120 }
            ]
        })));

        assert_eq!(summary.start_time, None);
        assert_eq!(summary.total_elapsed_time, None);
        assert_eq!(summary.avg_heart_rate, Some(110.0));
        assert_eq!(summary.record_count, Some(2));
    }

    #[test]
    fn test_session_takes_precedence() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "avgHeartRate": 150 }],
            "recordMesgs": [{ "heartRate": 130 }, { "heartRate": 150 }]
        })));

        assert_eq!(summary.avg_heart_rate, Some(150.0));
        // Only avg came from the session; extrema fall back to records
        assert_eq!(summary.max_heart_rate, Some(150.0));
        assert_eq!(summary.min_heart_rate, Some(130.0));
    }

    #[test]
    fn test_heart_rate_from_records() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "sport": "running" }],
            "recordMesgs": [{ "heartRate": 100 }, { "heartRate": 110 }, { "heartRate": 120 }]
        })));

        assert_eq!(summary.avg_heart_rate, Some(110.0));
        assert_eq!(summary.max_heart_rate, Some(120.0));
        assert_eq!(summary.min_heart_rate, Some(100.0));
        assert_eq!(summary.record_count, Some(3));
    }

    #[test]
    fn test_only_first_session_is_used() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "avgHeartRate": 150 }, { "avgHeartRate": 90, "avgCadence": 80 }]
        })));

        assert_eq!(summary.avg_heart_rate, Some(150.0));
        assert_eq!(summary.avg_cadence, None);
    }

    #[test]
    fn test_fallback_is_per_field() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "avgHeartRate": 145, "maxHeartRate": 171, "avgCadence": null }],
            "recordMesgs": [
                { "heartRate": 120, "cadence": 84, "power": 200 },
                { "heartRate": 130, "cadence": 88, "power": 260 }
            ]
        })));

        assert_eq!(summary.avg_heart_rate, Some(145.0));
        assert_eq!(summary.max_heart_rate, Some(171.0));
        assert_eq!(summary.avg_cadence, Some(86.0));
        assert_eq!(summary.max_cadence, Some(88.0));
        assert_eq!(summary.avg_power, Some(230.0));
        assert_eq!(summary.max_power, Some(260.0));
        assert_eq!(summary.normalized_power, None);
    }

    #[test]
    fn test_minimum_ignores_non_positive_readings() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "minHeartRate": 0 }],
            "recordMesgs": [
                { "heartRate": 0, "temperature": -1, "altitude": -5 },
                { "heartRate": 95, "temperature": 21 },
                { "heartRate": 105, "temperature": 23, "altitude": 10 }
            ]
        })));

        assert_eq!(summary.min_heart_rate, Some(95.0));
        assert_eq!(summary.min_temperature, Some(21.0));
        // Altitude is a signed quantity, so below sea level is a real minimum
        assert_eq!(summary.min_altitude, Some(-5.0));
    }

    #[test]
    fn test_respiration_pooled_from_records_and_messages() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "recordMesgs": [
                { "respirationRate": 15 },
                { "enhancedRespirationRate": 20, "respirationRate": 99 },
                { "heartRate": 120 }
            ],
            "respirationRateMesgs": [
                { "respirationRate": 16 },
                { "breathingRate": 13 }
            ]
        })));

        // Pool: 15, 20 (preferred alias), 16, 13
        assert_eq!(summary.avg_respiration_rate, Some(16.0));
        assert_eq!(summary.max_respiration_rate, Some(20.0));
        assert_eq!(summary.min_respiration_rate, Some(13.0));
        assert_eq!(summary.respiration_message_count, Some(2));
    }

    #[test]
    fn test_respiration_pool_keeps_duplicates() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "recordMesgs": [{ "respirationRate": 15 }],
            "respirationRateMesgs": [{ "respirationRate": 15 }, { "respirationRate": 18 }]
        })));

        // 15 appears in both sources and counts twice: (15 + 15 + 18) / 3
        assert_eq!(summary.avg_respiration_rate, Some(16.0));
    }

    #[test]
    fn test_respiration_session_value_wins() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "enhancedAvgRespirationRate": 17.2 }],
            "respirationRateMesgs": [{ "respirationRate": 30 }, { "respirationRate": 0 }]
        })));

        assert_eq!(summary.avg_respiration_rate, Some(17.2));
        assert_eq!(summary.max_respiration_rate, Some(30.0));
        assert_eq!(summary.min_respiration_rate, Some(30.0));
    }

    #[test]
    fn test_pace_from_speed() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{ "enhancedAvgSpeed": 3.3333333333, "avgSpeed": 1.0 }]
        })));

        assert_eq!(summary.avg_speed, Some(3.3333333333));
        assert!((summary.avg_pace.unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_pace_absent_for_zero_speed() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "recordMesgs": [{ "speed": 0.0 }, { "speed": 0.0 }]
        })));

        assert_eq!(summary.avg_speed, Some(0.0));
        assert_eq!(summary.avg_pace, None);
    }

    #[test]
    fn test_speed_prefers_enhanced_record_field() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "recordMesgs": [
                { "enhancedSpeed": 4.0, "speed": 1.0 },
                { "speed": 2.0 }
            ]
        })));

        assert_eq!(summary.avg_speed, Some(3.0));
        assert_eq!(summary.max_speed, Some(4.0));
    }

    #[test]
    fn test_duration_distance_and_elevation_from_records() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "recordMesgs": [
                { "timestamp": "2024-03-02T08:00:00.000Z", "distance": 0.0, "altitude": 100.0 },
                { "timestamp": "2024-03-02T08:10:00.000Z", "distance": 1800.0, "altitude": 130.0 },
                { "timestamp": "2024-03-02T08:20:00.000Z", "distance": 3600.0, "altitude": 110.0 }
            ]
        })));

        assert_eq!(summary.total_elapsed_time, Some(1200.0));
        assert_eq!(summary.total_distance, Some(3600.0));
        assert_eq!(summary.total_ascent, Some(30.0));
        assert_eq!(summary.total_descent, Some(20.0));
        assert_eq!(summary.avg_altitude, Some(340.0 / 3.0));
        assert_eq!(
            summary.start_time.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-03-02T08:00:00+00:00")
        );
    }

    #[test]
    fn test_session_identity_and_training_fields() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sessionMesgs": [{
                "sport": "cycling",
                "subSport": "road",
                "startTime": "2024-03-02T07:55:00Z",
                "totalElapsedTime": 3725.5,
                "totalTimerTime": 3600.0,
                "totalDistance": 30250.0,
                "totalCalories": 812,
                "totalAscent": 410,
                "totalTrainingEffect": 3.4,
                "totalAnaerobicTrainingEffect": 1.1,
                "trainingLoadPeak": 142.0,
                "normalizedPower": 231
            }],
            "fileIdMesgs": [{ "manufacturer": "garmin", "garminProduct": "edge530" }],
            "lapMesgs": [{}, {}],
            "eventMesgs": [{}, {}, {}]
        })));

        assert_eq!(summary.sport.as_deref(), Some("cycling"));
        assert_eq!(summary.sub_sport.as_deref(), Some("road"));
        assert_eq!(summary.manufacturer.as_deref(), Some("garmin"));
        assert_eq!(summary.product.as_deref(), Some("edge530"));
        assert_eq!(summary.total_elapsed_time, Some(3725.5));
        assert_eq!(summary.total_timer_time, Some(3600.0));
        assert_eq!(summary.total_distance, Some(30250.0));
        assert_eq!(summary.total_calories, Some(812.0));
        assert_eq!(summary.total_ascent, Some(410.0));
        assert_eq!(summary.total_descent, None);
        assert_eq!(summary.total_training_effect, Some(3.4));
        assert_eq!(summary.total_anaerobic_training_effect, Some(1.1));
        assert_eq!(summary.training_load, Some(142.0));
        assert_eq!(summary.normalized_power, Some(231.0));
        assert_eq!(summary.lap_count, Some(2));
        assert_eq!(summary.event_count, Some(3));
        assert_eq!(summary.record_count, None);
    }

    #[test]
    fn test_sport_falls_back_to_sport_message() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "sportMesgs": [{ "sport": "swimming", "subSport": "lapSwimming" }]
        })));

        assert_eq!(summary.sport.as_deref(), Some("swimming"));
        assert_eq!(summary.sub_sport.as_deref(), Some("lapSwimming"));
    }

    #[test]
    fn test_hrv_analysis_embedded() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "hrvMesgs": [{ "time": [0.8, 0.85, 0.82] }, { "time": [0.9, 0.78, 65.535] }]
        })));

        let hrv = summary.hrv_analysis.unwrap();
        assert_eq!(hrv.total_intervals, 5);
        assert!((hrv.mean_nn - 830.0).abs() < 1e-6);
        assert_eq!(hrv.pnn50, 50.0);
        assert_eq!(summary.hrv_message_count, Some(2));
    }

    #[test]
    fn test_hrv_analysis_omitted_when_insufficient() {
        let summary = SummaryExtractor::extract(&groups(json!({
            "hrvMesgs": [{ "time": [0.8, 0.0] }]
        })));

        assert!(summary.hrv_analysis.is_none());
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("hrvAnalysis").is_none());
    }
}
