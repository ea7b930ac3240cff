//! Route documents: traffic policy over configurations and revisions.

use serde::Deserialize;

use crate::component::{
    self, Component, TableRow, flex_item, flex_layout, link, link_with_status, section, summary,
    table, text, timestamp,
};
use crate::conditions::{self, Condition, READY};
use crate::linker::Linker;
use crate::object::{ObjectMeta, creation_epoch};
use crate::reference::{Kind, ObjectRef, SERVING_API_VERSION};
use crate::serving::{Address, delete_grid_action};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Route {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: RouteSpec,
    pub status: RouteStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteSpec {
    pub traffic: Vec<TrafficTarget>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteStatus {
    pub conditions: Vec<Condition>,
    pub address: Address,
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrafficTarget {
    pub configuration_name: Option<String>,
    pub revision_name: Option<String>,
    pub latest_revision: Option<bool>,
    pub percent: Option<i64>,
}

/// Listing table: name (ready-annotated), assigned URL, age.
pub fn listing_table(routes: &[Route], linker: &Linker) -> Component {
    let rows = routes
        .iter()
        .map(|route| {
            let mut row = TableRow::new();
            row.insert(
                "_action".to_string(),
                component::grid_actions(vec![delete_grid_action(
                    SERVING_API_VERSION,
                    Kind::Route.as_str(),
                    &route.metadata,
                )]),
            );
            row.insert(
                "Name".to_string(),
                link_with_status(
                    route.metadata.display_name(),
                    linker.path(
                        &ObjectRef::named(Kind::Route, route.metadata.display_name()),
                        None,
                    ),
                    conditions::status(&route.status.conditions, READY),
                    conditions::summary(&route.status.conditions, READY),
                ),
            );
            row.insert(
                "URL".to_string(),
                match route.status.url.as_deref() {
                    Some(url) => link(url, url),
                    None => text("<not found>"),
                },
            );
            row.insert(
                "Age".to_string(),
                timestamp(creation_epoch(&route.metadata)),
            );
            row
        })
        .collect();
    table(&["Name", "URL", "Age"], rows, "There are no routes!")
}

/// Detail body: summary, metadata, raw document.
pub fn detail(
    route: &Route,
    document: &serde_json::Value,
    linker: &Linker,
) -> Vec<Component> {
    vec![
        summary_layout(route, linker)
            .titled(vec![text("Summary")])
            .with_accessor("summary"),
        crate::metadata::metadata_summary(&route.metadata)
            .titled(vec![text("Metadata")])
            .with_accessor("metadata"),
        crate::serving::editor_for(document, &route.metadata)
            .titled(vec![text("YAML")])
            .with_accessor("yaml"),
    ]
}

fn summary_layout(route: &Route, linker: &Linker) -> Component {
    flex_layout(vec![vec![
        flex_item(traffic_table(&route.spec.traffic, linker), 12),
        flex_item(status_summary(&route.status), 12),
    ]])
}

/// Traffic split across configurations and revisions. A target naming
/// neither rides the latest revision.
pub fn traffic_table(traffic: &[TrafficTarget], linker: &Linker) -> Component {
    let rows = traffic
        .iter()
        .map(|target| {
            let (display_type, name): (&str, Component) =
                if let Some(configuration) = target.configuration_name.as_deref() {
                    (
                        Kind::Configuration.as_str(),
                        link(
                            configuration,
                            linker.path(
                                &ObjectRef::named(Kind::Configuration, configuration),
                                None,
                            ),
                        ),
                    )
                } else if let Some(revision) = target.revision_name.as_deref() {
                    // the owning configuration is not recoverable from the
                    // traffic entry; link through the placeholder context
                    (
                        Kind::Revision.as_str(),
                        link(
                            revision,
                            linker.path(
                                &ObjectRef::named(Kind::Revision, revision),
                                Some(&ObjectRef::named(Kind::Configuration, "_")),
                            ),
                        ),
                    )
                } else {
                    ("Latest Revision", text("n/a"))
                };
            let mut row = TableRow::new();
            row.insert("Name".to_string(), name);
            row.insert("Type".to_string(), text(display_type));
            row.insert(
                "Percent".to_string(),
                text(format!("{}%", target.percent.unwrap_or(0))),
            );
            row
        })
        .collect();
    table(&["Name", "Type", "Percent"], rows, "There are no traffic rules!")
        .titled(vec![text("Traffic Policy")])
}

fn status_summary(status: &RouteStatus) -> Component {
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
    ])
    .titled(vec![text("Status")])
}
