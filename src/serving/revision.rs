//! Revision documents: immutable snapshots owned by a configuration.

use serde::Deserialize;

use crate::component::{
    self, Component, TableRow, flex_item, flex_layout, link_with_status, section, summary, table,
    text, timestamp,
};
use crate::conditions::{self, Condition, READY};
use crate::linker::Linker;
use crate::object::{ObjectMeta, Pod, creation_epoch};
use crate::reference::{GENERATION_LABEL, Kind, ObjectRef, SERVING_API_VERSION};
use crate::serving::delete_grid_action;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Revision {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: RevisionSpec,
    pub status: RevisionStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionSpec {
    pub containers: Vec<Container>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Container {
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionStatus {
    pub conditions: Vec<Condition>,
    pub image_digest: Option<String>,
}

/// Creation ordinal within the owning configuration. Missing or unparsable
/// labels sort behind every real generation.
pub fn generation(meta: &ObjectMeta) -> i64 {
    meta.labels
        .get(GENERATION_LABEL)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(-1)
}

/// Revisions table shown on service and configuration detail views; rows
/// link through the owning context so breadcrumbs stay navigable.
pub fn revision_table(revisions: &[Revision], context: &ObjectRef, linker: &Linker) -> Component {
    let rows = revisions
        .iter()
        .map(|revision| {
            let mut row = TableRow::new();
            row.insert(
                "_action".to_string(),
                component::grid_actions(vec![delete_grid_action(
                    SERVING_API_VERSION,
                    Kind::Revision.as_str(),
                    &revision.metadata,
                )]),
            );
            row.insert(
                "Name".to_string(),
                link_with_status(
                    revision.metadata.display_name(),
                    linker.path(
                        &ObjectRef::named(Kind::Revision, revision.metadata.display_name()),
                        Some(context),
                    ),
                    conditions::status(&revision.status.conditions, READY),
                    conditions::summary(&revision.status.conditions, READY),
                ),
            );
            row.insert(
                "Generation".to_string(),
                text(generation(&revision.metadata).to_string()),
            );
            row.insert(
                "Age".to_string(),
                timestamp(creation_epoch(&revision.metadata)),
            );
            row
        })
        .collect();
    table(&["Name", "Generation", "Age"], rows, "There are no revisions!")
        .titled(vec![text("Revisions")])
}

/// Detail body: summary with pods, metadata, raw document.
pub fn detail(revision: &Revision, document: &serde_json::Value, pods: &[Pod]) -> Vec<Component> {
    vec![
        summary_layout(revision, pods)
            .titled(vec![text("Summary")])
            .with_accessor("summary"),
        crate::metadata::metadata_summary(&revision.metadata)
            .titled(vec![text("Metadata")])
            .with_accessor("metadata"),
        crate::serving::editor_for(document, &revision.metadata)
            .titled(vec![text("YAML")])
            .with_accessor("yaml"),
    ]
}

fn summary_layout(revision: &Revision, pods: &[Pod]) -> Component {
    flex_layout(vec![
        vec![
            flex_item(spec_summary(revision), 12),
            flex_item(status_summary(&revision.status), 12),
        ],
        vec![flex_item(pods_table(pods), 24)],
    ])
}

fn spec_summary(revision: &Revision) -> Component {
    let image = revision
        .spec
        .containers
        .first()
        .and_then(|container| container.image.as_deref())
        .unwrap_or("<unknown>");
    summary(vec![section("Image", text(image))]).titled(vec![text("Spec")])
}

fn status_summary(status: &RevisionStatus) -> Component {
    let mut sections = vec![section("Ready", conditions::status_text(&status.conditions, READY))];
    if let Some(digest) = status.image_digest.as_deref() {
        sections.push(section("Image Digest", text(digest)));
    }
    summary(sections).titled(vec![text("Status")])
}

fn pods_table(pods: &[Pod]) -> Component {
    let rows = pods
        .iter()
        .map(|pod| {
            let mut row = TableRow::new();
            row.insert("Name".to_string(), text(pod.metadata.display_name()));
            row.insert(
                "Phase".to_string(),
                text(pod.status.phase.as_deref().unwrap_or("<unknown>")),
            );
            row.insert("Age".to_string(), timestamp(creation_epoch(&pod.metadata)));
            row
        })
        .collect();
    table(&["Name", "Phase", "Age"], rows, "There are no pods!")
        .titled(vec![text("Pods")])
}
