//! Service documents: the top-level serving resource.

use serde::Deserialize;

use crate::component::{
    self, Component, TableRow, flex_item, flex_layout, link, link_with_status, section, summary,
    table, text, timestamp,
};
use crate::conditions::{self, Condition, READY};
use crate::linker::Linker;
use crate::object::{ObjectMeta, creation_epoch};
use crate::reference::{Kind, ObjectRef, SERVING_API_VERSION};
use crate::serving::revision::{Revision, revision_table};
use crate::serving::{Address, delete_grid_action};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub status: ServiceStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceStatus {
    pub conditions: Vec<Condition>,
    pub address: Address,
    pub url: Option<String>,
    pub latest_created_revision_name: Option<String>,
    pub latest_ready_revision_name: Option<String>,
}

/// Listing table: name (ready-annotated), URL, age.
pub fn listing_table(services: &[Service], linker: &Linker) -> Component {
    let rows = services
        .iter()
        .map(|service| {
            let mut row = TableRow::new();
            row.insert(
                "_action".to_string(),
                component::grid_actions(vec![delete_grid_action(
                    SERVING_API_VERSION,
                    Kind::Service.as_str(),
                    &service.metadata,
                )]),
            );
            row.insert(
                "Name".to_string(),
                link_with_status(
                    service.metadata.display_name(),
                    linker.path(
                        &ObjectRef::named(Kind::Service, service.metadata.display_name()),
                        None,
                    ),
                    conditions::status(&service.status.conditions, READY),
                    conditions::summary(&service.status.conditions, READY),
                ),
            );
            row.insert(
                "URL".to_string(),
                match service.status.url.as_deref() {
                    Some(url) => link(url, url),
                    None => text("<not found>"),
                },
            );
            row.insert(
                "Age".to_string(),
                timestamp(creation_epoch(&service.metadata)),
            );
            row
        })
        .collect();
    table(&["Name", "URL", "Age"], rows, "There are no services!")
}

/// Detail body: summary with owned revisions, metadata, raw document.
pub fn detail(
    service: &Service,
    document: &serde_json::Value,
    revisions: &[Revision],
    linker: &Linker,
) -> Vec<Component> {
    vec![
        summary_layout(service, revisions, linker)
            .titled(vec![text("Summary")])
            .with_accessor("summary"),
        crate::metadata::metadata_summary(&service.metadata)
            .titled(vec![text("Metadata")])
            .with_accessor("metadata"),
        crate::serving::editor_for(document, &service.metadata)
            .titled(vec![text("YAML")])
            .with_accessor("yaml"),
    ]
}

fn summary_layout(service: &Service, revisions: &[Revision], linker: &Linker) -> Component {
    let context = ObjectRef::named(Kind::Service, service.metadata.display_name());
    flex_layout(vec![vec![
        flex_item(revision_table(revisions, &context, linker), 12),
        flex_item(status_summary(&service.status), 12),
    ]])
}

fn status_summary(status: &ServiceStatus) -> Component {
    let unknown = || text("<unknown>");
    summary(vec![
        section("Ready", conditions::status_text(&status.conditions, READY)),
        section(
            "Address",
            match status.address.url.as_deref() {
                Some(url) => link(url, url),
                None => unknown(),
            },
        ),
        section(
            "URL",
            match status.url.as_deref() {
                Some(url) => link(url, url),
                None => unknown(),
            },
        ),
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
    fn listing_links_carry_readiness_status() {
        let linker = Linker::new("");
        let services: Vec<Service> = vec![serde_json::from_value(json!({
            "metadata": {"name": "greeter", "namespace": "default"},
            "status": {
                "conditions": [{"type": "Ready", "status": "False", "reason": "RevisionFailed"}],
                "url": "http://greeter.default.example.com",
            },
        }))
        .unwrap()];
        let listing = listing_table(&services, &linker);
        let Config::Table { rows, empty_content, .. } = &listing.config else {
            panic!("expected table config");
        };
        assert_eq!(empty_content, "There are no services!");
        match &rows[0]["Name"].config {
            Config::Link { reference, status, .. } => {
                assert_eq!(reference, "/services/greeter");
                assert_eq!(*status, Some(component::STATUS_ERROR));
            }
            other => panic!("expected link config, found {other:?}"),
        }
    }

    #[test]
    fn status_summary_falls_back_to_unknown() {
        let component = status_summary(&ServiceStatus::default());
        let Config::Summary { sections } = &component.config else {
            panic!("expected summary config");
        };
        let url = sections.iter().find(|s| s.header == "URL").unwrap();
        match &url.content.config {
            Config::Text { value } => assert_eq!(value, "<unknown>"),
            other => panic!("expected text config, found {other:?}"),
        }
    }
}
