//! Metadata summary shared by every detail view.

use crate::component::{Component, SummarySection, section, summary, text, timestamp};
use crate::object::{ObjectMeta, creation_epoch};

/// Created timestamp, labels, and annotations of an object.
pub fn metadata_summary(meta: &ObjectMeta) -> Component {
    let mut sections: Vec<SummarySection> =
        vec![section("Created", timestamp(creation_epoch(meta)))];
    if !meta.labels.is_empty() {
        sections.push(section("Labels", key_value_list(&meta.labels)));
    }
    if !meta.annotations.is_empty() {
        sections.push(section("Annotations", key_value_list(&meta.annotations)));
    }
    summary(sections)
}

fn key_value_list(entries: &std::collections::BTreeMap<String, String>) -> Component {
    let rendered = entries
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n");
    text(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Config;

    #[test]
    fn labels_render_as_key_value_pairs() {
        let mut meta = ObjectMeta::default();
        meta.labels
            .insert("serving.knative.dev/service".to_string(), "greeter".to_string());
        let component = metadata_summary(&meta);
        let Config::Summary { sections } = &component.config else {
            panic!("expected summary config");
        };
        assert_eq!(sections[0].header, "Created");
        let labels = sections.iter().find(|s| s.header == "Labels").unwrap();
        match &labels.content.config {
            Config::Text { value } => {
                assert_eq!(value, "serving.knative.dev/service=greeter")
            }
            other => panic!("expected text config, found {other:?}"),
        }
    }

    #[test]
    fn empty_metadata_keeps_only_created() {
        let component = metadata_summary(&ObjectMeta::default());
        let Config::Summary { sections } = &component.config else {
            panic!("expected summary config");
        };
        assert_eq!(sections.len(), 1);
    }
}
