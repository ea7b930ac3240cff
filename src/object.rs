//! Typed read-side views over raw store documents.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub creation_timestamp: Option<String>,
}

impl ObjectMeta {
    /// Name for display and sorting; a missing name sorts first.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Creation instant as whole seconds since the epoch. Missing or unparsable
/// timestamps collapse to epoch 0, matching the host's age rendering.
pub fn creation_epoch(meta: &ObjectMeta) -> i64 {
    meta.creation_timestamp
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|instant| instant.timestamp())
        .unwrap_or(0)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pod {
    pub metadata: ObjectMeta,
    pub status: PodStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodStatus {
    pub phase: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_epoch_parses_rfc3339() {
        let meta = ObjectMeta {
            creation_timestamp: Some("2020-05-04T18:31:05Z".to_string()),
            ..ObjectMeta::default()
        };
        assert_eq!(creation_epoch(&meta), 1_588_617_065);
    }

    #[test]
    fn epoch_zero_timestamp_renders_zero() {
        let meta = ObjectMeta {
            creation_timestamp: Some("1970-01-01T00:00:00Z".to_string()),
            ..ObjectMeta::default()
        };
        assert_eq!(creation_epoch(&meta), 0);
    }

    #[test]
    fn missing_timestamp_behaves_like_epoch_zero() {
        assert_eq!(creation_epoch(&ObjectMeta::default()), 0);
        let meta = ObjectMeta {
            creation_timestamp: Some("not-a-date".to_string()),
            ..ObjectMeta::default()
        };
        assert_eq!(creation_epoch(&meta), 0);
    }
}
