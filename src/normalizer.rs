//! Message normalization
//!
//! This module maps the decoder's optional collections onto a fixed set of
//! named groups. Every known group is always present; anything the decoder did
//! not supply becomes an empty sequence. Message content is not inspected.

use crate::schema::{DecodedMessageBundle, MessageKind};
use crate::types::Message;
use serde::{Deserialize, Serialize};

/// Decoder output with every known message group present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedGroups {
    #[serde(rename = "sessionMesgs", default)]
    pub session: Vec<Message>,
    #[serde(rename = "lapMesgs", default)]
    pub lap: Vec<Message>,
    #[serde(rename = "recordMesgs", default)]
    pub record: Vec<Message>,
    #[serde(rename = "eventMesgs", default)]
    pub event: Vec<Message>,
    #[serde(rename = "hrvMesgs", default)]
    pub hrv: Vec<Message>,
    #[serde(rename = "respirationRateMesgs", default)]
    pub respiration_rate: Vec<Message>,
    #[serde(rename = "lengthMesgs", default)]
    pub length: Vec<Message>,
    #[serde(rename = "splitMesgs", default)]
    pub split: Vec<Message>,
    #[serde(rename = "timeInZoneMesgs", default)]
    pub time_in_zone: Vec<Message>,
    #[serde(rename = "hrZoneMesgs", default)]
    pub hr_zone: Vec<Message>,
    #[serde(rename = "powerZoneMesgs", default)]
    pub power_zone: Vec<Message>,
    #[serde(rename = "stressLevelMesgs", default)]
    pub stress_level: Vec<Message>,
    #[serde(rename = "activityMesgs", default)]
    pub activity: Vec<Message>,
    #[serde(rename = "sportMesgs", default)]
    pub sport: Vec<Message>,
    #[serde(rename = "workoutMesgs", default)]
    pub workout: Vec<Message>,
    #[serde(rename = "workoutStepMesgs", default)]
    pub workout_step: Vec<Message>,
    #[serde(rename = "zonesTargetMesgs", default)]
    pub zones_target: Vec<Message>,
    #[serde(rename = "userProfileMesgs", default)]
    pub user_profile: Vec<Message>,
    #[serde(rename = "deviceSettingsMesgs", default)]
    pub device_settings: Vec<Message>,
    #[serde(rename = "deviceInfoMesgs", default)]
    pub device_info: Vec<Message>,
    #[serde(rename = "fileIdMesgs", default)]
    pub file_id: Vec<Message>,
    #[serde(rename = "fileCreatorMesgs", default)]
    pub file_creator: Vec<Message>,
    #[serde(rename = "developerDataIdMesgs", default)]
    pub developer_data_id: Vec<Message>,
    #[serde(rename = "fieldDescriptionMesgs", default)]
    pub field_description: Vec<Message>,
}

impl NormalizedGroups {
    /// Messages for a kind (possibly empty)
    pub fn get(&self, kind: MessageKind) -> &[Message] {
        match kind {
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
        }
    }

    /// Total number of messages across all groups
    pub fn total_messages(&self) -> usize {
        MessageKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }
}

/// Normalizer for turning decoder output into fully-populated groups
pub struct MessageNormalizer;

impl MessageNormalizer {
    /// Normalize a borrowed bundle. The bundle itself is left untouched.
    pub fn normalize(bundle: &DecodedMessageBundle) -> NormalizedGroups {
        Self::normalize_owned(bundle.clone())
    }

    /// Normalize a bundle, taking ownership of its message collections
    pub fn normalize_owned(bundle: DecodedMessageBundle) -> NormalizedGroups {
        NormalizedGroups {
            session: bundle.session.unwrap_or_default(),
            lap: bundle.lap.unwrap_or_default(),
            record: bundle.record.unwrap_or_default(),
            event: bundle.event.unwrap_or_default(),
            hrv: bundle.hrv.unwrap_or_default(),
            respiration_rate: bundle.respiration_rate.unwrap_or_default(),
            length: bundle.length.unwrap_or_default(),
            split: bundle.split.unwrap_or_default(),
            time_in_zone: bundle.time_in_zone.unwrap_or_default(),
            hr_zone: bundle.hr_zone.unwrap_or_default(),
            power_zone: bundle.power_zone.unwrap_or_default(),
            stress_level: bundle.stress_level.unwrap_or_default(),
            activity: bundle.activity.unwrap_or_default(),
            sport: bundle.sport.unwrap_or_default(),
            workout: bundle.workout.unwrap_or_default(),
            workout_step: bundle.workout_step.unwrap_or_default(),
            zones_target: bundle.zones_target.unwrap_or_default(),
            user_profile: bundle.user_profile.unwrap_or_default(),
            device_settings: bundle.device_settings.unwrap_or_default(),
            device_info: bundle.device_info.unwrap_or_default(),
            file_id: bundle.file_id.unwrap_or_default(),
            file_creator: bundle.file_creator.unwrap_or_default(),
            developer_data_id: bundle.developer_data_id.unwrap_or_default(),
            field_description: bundle.field_description.unwrap_or_default(),
        }
    }
}

impl From<DecodedMessageBundle> for NormalizedGroups {
    fn from(bundle: DecodedMessageBundle) -> Self {
        MessageNormalizer::normalize_owned(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DecoderOutput;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_bundle() -> DecodedMessageBundle {
        DecoderOutput::from_value(json!({
            "sessionMesgs": [{ "sport": "running", "avgHeartRate": 150 }],
            "recordMesgs": [{ "heartRate": 140 }, { "heartRate": 141 }],
            "deviceInfoMesgs": "not an array",
            "hrvMesgs": [{ "time": [0.8, 0.82] }]
        }))
        .unwrap()
        .bundle
    }

    #[test]
    fn test_every_group_present() {
        let groups = MessageNormalizer::normalize(&DecodedMessageBundle::default());

        for kind in MessageKind::ALL {
            assert!(groups.get(kind).is_empty(), "{} should be empty", kind.key());
        }
        assert_eq!(groups.total_messages(), 0);

        let value = serde_json::to_value(&groups).unwrap();
        for kind in MessageKind::ALL {
            assert_eq!(value[kind.decoder_key()], json!([]));
        }
    }

    #[test]
    fn test_maps_decoder_keys() {
        let groups = MessageNormalizer::normalize(&sample_bundle());

        assert_eq!(groups.get(MessageKind::Session).len(), 1);
        assert_eq!(groups.get(MessageKind::Record).len(), 2);
        assert_eq!(groups.get(MessageKind::Hrv).len(), 1);
        assert!(groups.get(MessageKind::DeviceInfo).is_empty());
        assert_eq!(groups.total_messages(), 4);
    }

    #[test]
    fn test_input_left_untouched() {
        let bundle = sample_bundle();
        let before = bundle.clone();
        let _ = MessageNormalizer::normalize(&bundle);
        assert_eq!(bundle, before);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let groups = MessageNormalizer::normalize(&sample_bundle());

        let reparsed = DecoderOutput::from_value(serde_json::to_value(&groups).unwrap())
            .unwrap()
            .bundle;
        let again = MessageNormalizer::normalize_owned(reparsed);

        assert_eq!(again, groups);
    }
}
