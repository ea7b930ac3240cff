//! Configuration documents: the revision-producing side of a service.

use serde::Deserialize;

use crate::component::{
    self, Component, TableRow, flex_item, flex_layout, link_with_status, section, summary, table,
    text, timestamp,
};
use crate::conditions::{self, Condition, READY};
use crate::linker::Linker;
use crate::object::{ObjectMeta, creation_epoch};
use crate::reference::{Kind, ObjectRef, SERVING_API_VERSION};
use crate::serving::delete_grid_action;
use crate::serving::revision::{Revision, revision_table};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub status: ConfigurationStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigurationStatus {
    pub conditions: Vec<Condition>,
    pub latest_created_revision_name: Option<String>,
    pub latest_ready_revision_name: Option<String>,
}

/// Listing table: name (ready-annotated), latest revisions, age.
pub fn listing_table(configurations: &[Configuration], linker: &Linker) -> Component {
    let rows = configurations
        .iter()
        .map(|configuration| {
            let mut row = TableRow::new();
            row.insert(
                "_action".to_string(),
                component::grid_actions(vec![delete_grid_action(
                    SERVING_API_VERSION,
                    Kind::Configuration.as_str(),
                    &configuration.metadata,
                )]),
            );
            row.insert(
                "Name".to_string(),
                link_with_status(
                    configuration.metadata.display_name(),
                    linker.path(
                        &ObjectRef::named(
                            Kind::Configuration,
                            configuration.metadata.display_name(),
                        ),
                        None,
                    ),
                    conditions::status(&configuration.status.conditions, READY),
                    conditions::summary(&configuration.status.conditions, READY),
                ),
            );
            row.insert(
                "Latest Created".to_string(),
                text(
                    configuration
                        .status
                        .latest_created_revision_name
                        .as_deref()
                        .unwrap_or("<unknown>"),
                ),
            );
            row.insert(
                "Latest Ready".to_string(),
                text(
                    configuration
                        .status
                        .latest_ready_revision_name
                        .as_deref()
                        .unwrap_or("<unknown>"),
                ),
            );
            row.insert(
                "Age".to_string(),
                timestamp(creation_epoch(&configuration.metadata)),
            );
            row
        })
        .collect();
    table(
        &["Name", "Latest Created", "Latest Ready", "Age"],
        rows,
        "There are no configurations!",
    )
}

/// Detail body: summary with owned revisions, metadata, raw document.
pub fn detail(
    configuration: &Configuration,
    document: &serde_json::Value,
    revisions: &[Revision],
    linker: &Linker,
) -> Vec<Component> {
    vec![
        summary_layout(configuration, revisions, linker)
            .titled(vec![text("Summary")])
            .with_accessor("summary"),
        crate::metadata::metadata_summary(&configuration.metadata)
            .titled(vec![text("Metadata")])
            .with_accessor("metadata"),
        crate::serving::editor_for(document, &configuration.metadata)
            .titled(vec![text("YAML")])
            .with_accessor("yaml"),
    ]
}

fn summary_layout(
    configuration: &Configuration,
    revisions: &[Revision],
    linker: &Linker,
) -> Component {
    let context = ObjectRef::named(Kind::Configuration, configuration.metadata.display_name());
    flex_layout(vec![vec![
        flex_item(revision_table(revisions, &context, linker), 12),
        flex_item(status_summary(&configuration.status), 12),
    ]])
}

fn status_summary(status: &ConfigurationStatus) -> Component {
    let unknown = || text("<unknown>");
    summary(vec![
        section("Ready", conditions::status_text(&status.conditions, READY)),
        section(
            "Latest Created Revision",
            status
                .latest_created_revision_name
                .as_deref()
                .map_or_else(unknown, |name| text(name)),
        ),
        section(
            "Latest Ready Revision",
            status
                .latest_ready_revision_name
                .as_deref()
                .map_or_else(unknown, |name| text(name)),
        ),
    ])
    .titled(vec![text("Status")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Config;
    use serde_json::json;

    #[test]
    fn listing_shows_latest_revisions() {
        let linker = Linker::new("");
        let configurations: Vec<Configuration> = vec![serde_json::from_value(json!({
            "metadata": {"name": "greeter", "namespace": "default"},
            "status": {
                "conditions": [{"type": "Ready", "status": "True"}],
                "latestCreatedRevisionName": "greeter-00002",
                "latestReadyRevisionName": "greeter-00001",
            },
        }))
        .unwrap()];
        let listing = listing_table(&configurations, &linker);
        let Config::Table { rows, .. } = &listing.config else {
            panic!("expected table config");
        };
        match &rows[0]["Latest Created"].config {
            Config::Text { value } => assert_eq!(value, "greeter-00002"),
            other => panic!("expected text config, found {other:?}"),
        }
        match &rows[0]["Latest Ready"].config {
            Config::Text { value } => assert_eq!(value, "greeter-00001"),
            other => panic!("expected text config, found {other:?}"),
        }
    }
}
