//! Decoder output model
//!
//! The decoder hands over a grab-bag of optional message collections. Each
//! known collection gets its own field here; anything that is missing, `null`
//! or not an array deserializes to `None`, and array elements that are not
//! objects are skipped.

use crate::error::ComputeError;
use crate::schema::MessageKind;
use crate::types::Message;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Raw decoder output: one optional collection per known message type.
///
/// Serialized under the decoder's collection names (`sessionMesgs`, ...);
/// absent collections are omitted and unknown collections are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedMessageBundle {
    pub session: Option<Vec<Message>>,
    pub lap: Option<Vec<Message>>,
    pub record: Option<Vec<Message>>,
    pub event: Option<Vec<Message>>,
    pub hrv: Option<Vec<Message>>,
    pub respiration_rate: Option<Vec<Message>>,
    pub length: Option<Vec<Message>>,
    pub split: Option<Vec<Message>>,
    pub time_in_zone: Option<Vec<Message>>,
    pub hr_zone: Option<Vec<Message>>,
    pub power_zone: Option<Vec<Message>>,
    pub stress_level: Option<Vec<Message>>,
    pub activity: Option<Vec<Message>>,
    pub sport: Option<Vec<Message>>,
    pub workout: Option<Vec<Message>>,
    pub workout_step: Option<Vec<Message>>,
    pub zones_target: Option<Vec<Message>>,
    pub user_profile: Option<Vec<Message>>,
    pub device_settings: Option<Vec<Message>>,
    pub device_info: Option<Vec<Message>>,
    pub file_id: Option<Vec<Message>>,
    pub file_creator: Option<Vec<Message>>,
    pub developer_data_id: Option<Vec<Message>>,
    pub field_description: Option<Vec<Message>>,
}

impl DecodedMessageBundle {
    /// Borrow the collection for a message kind, if the decoder supplied one
    pub fn get(&self, kind: MessageKind) -> Option<&Vec<Message>> {
        let slot = match kind {
            MessageKind::Session => &self.session,
            MessageKind::Lap => &self.lap,
            MessageKind::Record => &self.record,
            MessageKind::Event => &self.event,
            MessageKind::Hrv => &self.hrv,
            MessageKind::RespirationRate => &self.respiration_rate,
            MessageKind::Length => &self.length,
            MessageKind::Split => &self.split,
            MessageKind::TimeInZone => &self.time_in_zone,
            MessageKind::HrZone => &self.hr_zone,
            MessageKind::PowerZone => &self.power_zone,
            MessageKind::StressLevel => &self.stress_level,
            MessageKind::Activity => &self.activity,
            MessageKind::Sport => &self.sport,
            MessageKind::Workout => &self.workout,
            MessageKind::WorkoutStep => &self.workout_step,
            MessageKind::ZonesTarget => &self.zones_target,
            MessageKind::UserProfile => &self.user_profile,
            MessageKind::DeviceSettings => &self.device_settings,
            MessageKind::DeviceInfo => &self.device_info,
            MessageKind::FileId => &self.file_id,
            MessageKind::FileCreator => &self.file_creator,
            MessageKind::DeveloperDataId => &self.developer_data_id,
            MessageKind::FieldDescription => &self.field_description,
        };
        slot.as_ref()
    }

    fn slot_mut(&mut self, kind: MessageKind) -> &mut Option<Vec<Message>> {
        match kind {
            MessageKind::Session => &mut self.session,
            MessageKind::Lap => &mut self.lap,
            MessageKind::Record => &mut self.record,
            MessageKind::Event => &mut self.event,
            MessageKind::Hrv => &mut self.hrv,
            MessageKind::RespirationRate => &mut self.respiration_rate,
            MessageKind::Length => &mut self.length,
            MessageKind::Split => &mut self.split,
            MessageKind::TimeInZone => &mut self.time_in_zone,
            MessageKind::HrZone => &mut self.hr_zone,
            MessageKind::PowerZone => &mut self.power_zone,
            MessageKind::StressLevel => &mut self.stress_level,
            MessageKind::Activity => &mut self.activity,
            MessageKind::Sport => &mut self.sport,
            MessageKind::Workout => &mut self.workout,
            MessageKind::WorkoutStep => &mut self.workout_step,
            MessageKind::ZonesTarget => &mut self.zones_target,
            MessageKind::UserProfile => &mut self.user_profile,
            MessageKind::DeviceSettings => &mut self.device_settings,
            MessageKind::DeviceInfo => &mut self.device_info,
            MessageKind::FileId => &mut self.file_id,
            MessageKind::FileCreator => &mut self.file_creator,
            MessageKind::DeveloperDataId => &mut self.developer_data_id,
            MessageKind::FieldDescription => &mut self.field_description,
        }
    }
}

impl Serialize for DecodedMessageBundle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let present: Vec<(MessageKind, &Vec<Message>)> = MessageKind::ALL
            .iter()
            .filter_map(|&kind| self.get(kind).map(|messages| (kind, messages)))
            .collect();

        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (kind, messages) in present {
            map.serialize_entry(kind.decoder_key(), messages)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DecodedMessageBundle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BundleVisitor;

        impl<'de> Visitor<'de> for BundleVisitor {
            type Value = DecodedMessageBundle;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of decoder message collections")
            }

            fn visit_map<V>(self, mut map: V) -> Result<DecodedMessageBundle, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut bundle = DecodedMessageBundle::default();
                while let Some(key) = map.next_key::<String>()? {
                    match MessageKind::from_decoder_key(&key) {
                        Some(kind) => {
                            let value: Value = map.next_value()?;
                            *bundle.slot_mut(kind) = lenient_messages(value);
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(bundle)
            }
        }

        deserializer.deserialize_map(BundleVisitor)
    }
}

/// Accept any JSON value; only arrays of objects produce messages
fn lenient_messages(value: Value) -> Option<Vec<Message>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Decoder errors as text. A lone string counts as one error; anything else
/// that is not an array carries no errors. Null entries are skipped.
fn lenient_errors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::String(s) => vec![Value::String(s)],
        _ => Vec::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}

/// Integrity flag; anything other than a boolean is treated as not reported
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

/// Decoder output together with whatever integrity information came with it.
///
/// Accepts either the bare bundle or an envelope of the form
/// `{ "messages": {...}, "errors": [...], "integrityOk": bool }`.
#[derive(Debug, Clone, Default)]
pub struct DecoderOutput {
    /// Decoded message collections
    pub bundle: DecodedMessageBundle,
    /// Errors reported by the decoder, rendered as text
    pub errors: Vec<String>,
    /// Result of the decoder's integrity check, when it ran one
    pub integrity_ok: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecoderEnvelope {
    messages: DecodedMessageBundle,
    #[serde(default, deserialize_with = "lenient_errors")]
    errors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    integrity_ok: Option<bool>,
}

impl DecoderOutput {
    /// Parse decoder output from a JSON string
    pub fn from_json(raw_json: &str) -> Result<Self, ComputeError> {
        let value: Value = serde_json::from_str(raw_json)?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed JSON value as decoder output
    pub fn from_value(value: Value) -> Result<Self, ComputeError> {
        let Value::Object(map) = value else {
            return Err(ComputeError::ParseError(
                "expected a JSON object of message collections".to_string(),
            ));
        };

        if matches!(map.get("messages"), Some(Value::Object(_))) {
            let envelope: DecoderEnvelope = serde_json::from_value(Value::Object(map))?;
            return Ok(Self {
                bundle: envelope.messages,
                errors: envelope.errors,
                integrity_ok: envelope.integrity_ok,
            });
        }

        let bundle: DecodedMessageBundle = serde_json::from_value(Value::Object(map))?;
        Ok(Self {
            bundle,
            errors: Vec::new(),
            integrity_ok: None,
        })
    }

    /// Warnings worth surfacing to the caller. Extraction proceeds regardless.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.integrity_ok == Some(false) {
            warnings.push("File integrity check failed; summary may be incomplete".to_string());
        }
        for error in &self.errors {
            warnings.push(format!("Decoder error: {error}"));
        }
        warnings
    }
}
