//! Typed access to the object store, imposing this module's ordering and
//! selector policy. The store itself guarantees neither.

use std::cmp::Reverse;

use anyhow::{Context, Result, anyhow, bail};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::object::Pod;
use crate::reference::{
    CONFIGURATION_LABEL, Kind, ObjectRef, REVISION_LABEL, SERVICE_LABEL, Selector,
};
use crate::serving::revision::generation;
use crate::serving::{Configuration, Revision, Route, Service};
use crate::store::DashboardClient;

pub fn list_services(client: &dyn DashboardClient, namespace: &str) -> Result<Vec<Service>> {
    let mut services: Vec<Service> = list_kind(client, Kind::Service, namespace, None)?;
    services.sort_by(|a, b| a.metadata.display_name().cmp(b.metadata.display_name()));
    Ok(services)
}

pub fn list_configurations(
    client: &dyn DashboardClient,
    namespace: &str,
) -> Result<Vec<Configuration>> {
    let mut configurations: Vec<Configuration> =
        list_kind(client, Kind::Configuration, namespace, None)?;
    configurations.sort_by(|a, b| a.metadata.display_name().cmp(b.metadata.display_name()));
    Ok(configurations)
}

pub fn list_routes(client: &dyn DashboardClient, namespace: &str) -> Result<Vec<Route>> {
    let mut routes: Vec<Route> = list_kind(client, Kind::Route, namespace, None)?;
    routes.sort_by(|a, b| a.metadata.display_name().cmp(b.metadata.display_name()));
    Ok(routes)
}

/// Revisions owned by a service or configuration, newest generation first.
pub fn list_revisions(
    client: &dyn DashboardClient,
    namespace: &str,
    owner: Kind,
    owner_name: &str,
) -> Result<Vec<Revision>> {
    let label = match owner {
        Kind::Service => SERVICE_LABEL,
        Kind::Configuration => CONFIGURATION_LABEL,
        other => bail!("{} does not own revisions", other.as_str()),
    };
    let mut selector = Selector::new();
    selector.insert(label.to_string(), owner_name.to_string());
    let mut revisions: Vec<Revision> =
        list_kind(client, Kind::Revision, namespace, Some(&selector))?;
    revisions.sort_by_key(|revision| Reverse(generation(&revision.metadata)));
    Ok(revisions)
}

/// Pods backing a revision, by name.
pub fn list_pods(
    client: &dyn DashboardClient,
    namespace: &str,
    revision_name: &str,
) -> Result<Vec<Pod>> {
    let mut selector = Selector::new();
    selector.insert(REVISION_LABEL.to_string(), revision_name.to_string());
    let documents = client.list(&ObjectRef::pods(namespace), Some(&selector))?;
    let mut pods = documents
        .into_iter()
        .map(|document| serde_json::from_value(document).context("malformed pod document"))
        .collect::<Result<Vec<Pod>>>()?;
    pods.sort_by(|a, b| a.metadata.display_name().cmp(b.metadata.display_name()));
    Ok(pods)
}

pub fn get_service(
    client: &dyn DashboardClient,
    namespace: &str,
    name: &str,
) -> Result<(Service, JsonValue)> {
    get_kind(client, Kind::Service, namespace, name)
}

pub fn get_configuration(
    client: &dyn DashboardClient,
    namespace: &str,
    name: &str,
) -> Result<(Configuration, JsonValue)> {
    get_kind(client, Kind::Configuration, namespace, name)
}

pub fn get_revision(
    client: &dyn DashboardClient,
    namespace: &str,
    name: &str,
) -> Result<(Revision, JsonValue)> {
    get_kind(client, Kind::Revision, namespace, name)
}

pub fn get_route(
    client: &dyn DashboardClient,
    namespace: &str,
    name: &str,
) -> Result<(Route, JsonValue)> {
    get_kind(client, Kind::Route, namespace, name)
}

fn list_kind<T: DeserializeOwned>(
    client: &dyn DashboardClient,
    kind: Kind,
    namespace: &str,
    selector: Option<&Selector>,
) -> Result<Vec<T>> {
    let mut target = ObjectRef::collection(kind);
    target.namespace = Some(namespace.to_string());
    let documents = client.list(&target, selector)?;
    documents
        .into_iter()
        .map(|document| {
            serde_json::from_value(document)
                .with_context(|| format!("malformed {} document", kind.as_str()))
        })
        .collect()
}

// A missing object is fatal to the current render; there is no fallback view.
fn get_kind<T: DeserializeOwned>(
    client: &dyn DashboardClient,
    kind: Kind,
    namespace: &str,
    name: &str,
) -> Result<(T, JsonValue)> {
    let document = client
        .get(&ObjectRef::namespaced(kind, namespace, name))?
        .ok_or_else(|| {
            anyhow!(
                "{} `{name}` not found in namespace `{namespace}`",
                kind.as_str()
            )
        })?;
    let typed = serde_json::from_value(document.clone())
        .with_context(|| format!("malformed {} document", kind.as_str()))?;
    Ok((typed, document))
}
