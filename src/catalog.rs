//! Data type catalog
//!
//! Lists the non-empty message groups in a fixed priority order so a consumer
//! can build one view per data type. Activity-centric groups come first,
//! auxiliary ones (device info, file metadata) last.

use crate::normalizer::NormalizedGroups;
use crate::schema::MessageKind;
use crate::types::{CatalogEntry, DataTypeDescriptor};

/// Catalog of available message groups
pub struct DataCatalog;

impl DataCatalog {
    /// Descriptors for every non-empty group, in priority order
    pub fn describe(groups: &NormalizedGroups) -> Vec<DataTypeDescriptor<'_>> {
        MessageKind::ALL
            .iter()
            .filter_map(|kind| {
                let data = groups.get(*kind);
                if data.is_empty() {
                    return None;
                }
                Some(DataTypeDescriptor {
                    key: kind.key(),
                    label: kind.label(),
                    count: data.len(),
                    data,
                })
            })
            .collect()
    }

    /// Listing entries without the message data
    pub fn entries(groups: &NormalizedGroups) -> Vec<CatalogEntry> {
        Self::describe(groups)
            .iter()
            .map(DataTypeDescriptor::to_entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::MessageNormalizer;
    use crate::schema::DecoderOutput;
    use serde_json::json;

    fn groups(value: serde_json::Value) -> NormalizedGroups {
        MessageNormalizer::normalize_owned(DecoderOutput::from_value(value).unwrap().bundle)
    }

    #[test]
    fn test_excludes_empty_groups() {
        let groups = groups(json!({
            "recordMesgs": [{ "heartRate": 120 }, { "heartRate": 121 }, { "heartRate": 119 }],
            "lapMesgs": [],
            "deviceInfoMesgs": [{ "manufacturer": "garmin" }]
        }));

        let descriptors = DataCatalog::describe(&groups);
        let keys: Vec<_> = descriptors.iter().map(|d| d.key).collect();
        assert_eq!(keys, vec!["record", "deviceInfo"]);
        assert_eq!(descriptors[0].count, 3);
        assert_eq!(descriptors[0].data.len(), 3);
        assert_eq!(descriptors[1].label, "Device Info");
    }

    #[test]
    fn test_priority_order_not_alphabetical() {
        let groups = groups(json!({
            "fileIdMesgs": [{}],
            "deviceInfoMesgs": [{}],
            "activityMesgs": [{}],
            "recordMesgs": [{}],
            "lapMesgs": [{}],
            "sessionMesgs": [{}]
        }));

        let keys: Vec<_> = DataCatalog::describe(&groups).iter().map(|d| d.key).collect();
        assert_eq!(
            keys,
            vec!["session", "lap", "record", "activity", "deviceInfo", "fileId"]
        );
    }

    #[test]
    fn test_empty_groups_give_empty_catalog() {
        assert!(DataCatalog::describe(&NormalizedGroups::default()).is_empty());
    }

    #[test]
    fn test_entries_and_descriptor_serialization() {
        let groups = groups(json!({ "hrvMesgs": [{ "time": [0.8] }] }));

        let entries = DataCatalog::entries(&groups);
        assert_eq!(
            entries,
            vec![CatalogEntry {
                key: "hrv".to_string(),
                label: "HRV".to_string(),
                count: 1,
            }]
        );

        let descriptors = DataCatalog::describe(&groups);
        assert_eq!(descriptors[0].key, MessageKind::Hrv.key());
        let value = serde_json::to_value(&descriptors).unwrap();
        assert_eq!(value[0]["data"][0]["time"], json!([0.8]));
    }
}
