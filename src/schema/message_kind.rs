//! Known decoder message types
//!
//! The decoder names its output collections by suffixing the message type
//! (`session` → `sessionMesgs`). This table owns that translation along with the
//! display label and the priority order used when listing data types.

use serde::{Deserialize, Serialize};

/// Message types the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    Session,
    Lap,
    Record,
    Event,
    Hrv,
    RespirationRate,
    Length,
    Split,
    TimeInZone,
    HrZone,
    PowerZone,
    StressLevel,
    Activity,
    Sport,
    Workout,
    WorkoutStep,
    ZonesTarget,
    UserProfile,
    DeviceSettings,
    DeviceInfo,
    FileId,
    FileCreator,
    DeveloperDataId,
    FieldDescription,
}

impl MessageKind {
    /// Every known kind, activity-centric types first
    pub const ALL: [MessageKind; 24] = [
        MessageKind::Session,
        MessageKind::Lap,
        MessageKind::Record,
        MessageKind::Event,
        MessageKind::Hrv,
        MessageKind::RespirationRate,
        MessageKind::Length,
        MessageKind::Split,
        MessageKind::TimeInZone,
        MessageKind::HrZone,
        MessageKind::PowerZone,
        MessageKind::StressLevel,
        MessageKind::Activity,
        MessageKind::Sport,
        MessageKind::Workout,
        MessageKind::WorkoutStep,
        MessageKind::ZonesTarget,
        MessageKind::UserProfile,
        MessageKind::DeviceSettings,
        MessageKind::DeviceInfo,
        MessageKind::FileId,
        MessageKind::FileCreator,
        MessageKind::DeveloperDataId,
        MessageKind::FieldDescription,
    ];

    /// Normalized key (e.g. "session")
    pub fn key(&self) -> &'static str {
        match self {
            MessageKind::Session => "session",
            MessageKind::Lap => "lap",
            MessageKind::Record => "record",
            MessageKind::Event => "event",
            MessageKind::Hrv => "hrv",
            MessageKind::RespirationRate => "respirationRate",
            MessageKind::Length => "length",
            MessageKind::Split => "split",
            MessageKind::TimeInZone => "timeInZone",
            MessageKind::HrZone => "hrZone",
            MessageKind::PowerZone => "powerZone",
            MessageKind::StressLevel => "stressLevel",
            MessageKind::Activity => "activity",
            MessageKind::Sport => "sport",
            MessageKind::Workout => "workout",
            MessageKind::WorkoutStep => "workoutStep",
            MessageKind::ZonesTarget => "zonesTarget",
            MessageKind::UserProfile => "userProfile",
            MessageKind::DeviceSettings => "deviceSettings",
            MessageKind::DeviceInfo => "deviceInfo",
            MessageKind::FileId => "fileId",
            MessageKind::FileCreator => "fileCreator",
            MessageKind::DeveloperDataId => "developerDataId",
            MessageKind::FieldDescription => "fieldDescription",
        }
    }

    /// Collection name used by the decoder (e.g. "sessionMesgs")
    pub fn decoder_key(&self) -> &'static str {
        match self {
            MessageKind::Session => "sessionMesgs",
            MessageKind::Lap => "lapMesgs",
            MessageKind::Record => "recordMesgs",
            MessageKind::Event => "eventMesgs",
            MessageKind::Hrv => "hrvMesgs",
            MessageKind::RespirationRate => "respirationRateMesgs",
            MessageKind::Length => "lengthMesgs",
            MessageKind::Split => "splitMesgs",
            MessageKind::TimeInZone => "timeInZoneMesgs",
            MessageKind::HrZone => "hrZoneMesgs",
            MessageKind::PowerZone => "powerZoneMesgs",
            MessageKind::StressLevel => "stressLevelMesgs",
            MessageKind::Activity => "activityMesgs",
            MessageKind::Sport => "sportMesgs",
            MessageKind::Workout => "workoutMesgs",
            MessageKind::WorkoutStep => "workoutStepMesgs",
            MessageKind::ZonesTarget => "zonesTargetMesgs",
            MessageKind::UserProfile => "userProfileMesgs",
            MessageKind::DeviceSettings => "deviceSettingsMesgs",
            MessageKind::DeviceInfo => "deviceInfoMesgs",
            MessageKind::FileId => "fileIdMesgs",
            MessageKind::FileCreator => "fileCreatorMesgs",
            MessageKind::DeveloperDataId => "developerDataIdMesgs",
            MessageKind::FieldDescription => "fieldDescriptionMesgs",
        }
    }

    /// Human-readable label for data type listings
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::Session => "Sessions",
            MessageKind::Lap => "Laps",
            MessageKind::Record => "Records",
            MessageKind::Event => "Events",
            MessageKind::Hrv => "HRV",
            MessageKind::RespirationRate => "Respiration Rate",
            MessageKind::Length => "Lengths",
            MessageKind::Split => "Splits",
            MessageKind::TimeInZone => "Time in Zone",
            MessageKind::HrZone => "HR Zones",
            MessageKind::PowerZone => "Power Zones",
            MessageKind::StressLevel => "Stress Level",
            MessageKind::Activity => "Activity",
            MessageKind::Sport => "Sport",
            MessageKind::Workout => "Workout",
            MessageKind::WorkoutStep => "Workout Steps",
            MessageKind::ZonesTarget => "Zones Target",
            MessageKind::UserProfile => "User Profile",
            MessageKind::DeviceSettings => "Device Settings",
            MessageKind::DeviceInfo => "Device Info",
            MessageKind::FileId => "File ID",
            MessageKind::FileCreator => "File Creator",
            MessageKind::DeveloperDataId => "Developer Data",
            MessageKind::FieldDescription => "Field Descriptions",
        }
    }

    /// Look up a kind by its decoder collection name
    pub fn from_decoder_key(name: &str) -> Option<MessageKind> {
        MessageKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.decoder_key() == name)
    }
}
