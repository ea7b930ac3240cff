//! Readiness conditions as reported in resource status blocks.

use serde::Deserialize;

use crate::component::{self, Component, STATUS_ERROR, STATUS_OK, STATUS_WARNING};

pub const READY: &str = "Ready";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub ty: String,
    pub status: String,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub last_transition_time: Option<String>,
}

pub fn find<'a>(conditions: &'a [Condition], ty: &str) -> Option<&'a Condition> {
    conditions.iter().find(|condition| condition.ty == ty)
}

/// Host status indicator derived from a condition: True is ok, False is an
/// error, anything else (including a missing condition) is a warning.
pub fn status(conditions: &[Condition], ty: &str) -> u8 {
    match find(conditions, ty).map(|condition| condition.status.as_str()) {
        Some("True") => STATUS_OK,
        Some("False") => STATUS_ERROR,
        _ => STATUS_WARNING,
    }
}

/// Detail popover text shown behind a status-annotated link.
pub fn summary(conditions: &[Condition], ty: &str) -> Component {
    let Some(condition) = find(conditions, ty) else {
        return component::text(format!("{ty}: Unknown"));
    };
    let mut value = format!("{ty}: {}", condition.status);
    if let Some(reason) = condition.reason.as_deref() {
        value.push_str(&format!(" ({reason})"));
    }
    if let Some(message) = condition.message.as_deref() {
        value.push_str(&format!(" {message}"));
    }
    component::text(value)
}

/// Bare status value for summary sections: "True", "False", or "Unknown".
pub fn status_text(conditions: &[Condition], ty: &str) -> Component {
    let value = find(conditions, ty)
        .map(|condition| condition.status.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    component::text(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Config;

    fn ready(value: &str) -> Vec<Condition> {
        vec![Condition {
            ty: READY.to_string(),
            status: value.to_string(),
            reason: None,
            message: None,
            last_transition_time: None,
        }]
    }

    #[test]
    fn status_maps_onto_host_indicators() {
        assert_eq!(status(&ready("True"), READY), STATUS_OK);
        assert_eq!(status(&ready("False"), READY), STATUS_ERROR);
        assert_eq!(status(&ready("Unknown"), READY), STATUS_WARNING);
        assert_eq!(status(&[], READY), STATUS_WARNING);
    }

    #[test]
    fn summary_includes_reason_and_message() {
        let conditions = vec![Condition {
            ty: READY.to_string(),
            status: "False".to_string(),
            reason: Some("RevisionMissing".to_string()),
            message: Some("Revision not found.".to_string()),
            last_transition_time: None,
        }];
        let component = summary(&conditions, READY);
        match component.config {
            Config::Text { value } => {
                assert_eq!(value, "Ready: False (RevisionMissing) Revision not found.")
            }
            other => panic!("expected text config, found {other:?}"),
        }
    }

    #[test]
    fn missing_condition_reads_unknown() {
        match status_text(&[], READY).config {
            Config::Text { value } => assert_eq!(value, "Unknown"),
            other => panic!("expected text config, found {other:?}"),
        }
    }
}
