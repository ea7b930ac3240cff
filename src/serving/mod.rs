//! Per-kind document views and their view assemblies.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use crate::actions::DELETE_OBJECT;
use crate::component::{Component, GridAction, editor};
use crate::object::ObjectMeta;
use crate::yaml;

pub mod configuration;
pub mod revision;
pub mod route;
pub mod service;

pub use configuration::Configuration;
pub use revision::Revision;
pub use route::Route;
pub use service::Service;

/// Addressable endpoint in a status block.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Address {
    pub url: Option<String>,
}

/// Row-level delete action carried by every listing table.
pub(crate) fn delete_grid_action(api_version: &str, kind: &str, meta: &ObjectMeta) -> GridAction {
    GridAction {
        name: "Delete".to_string(),
        action_path: DELETE_OBJECT.to_string(),
        payload: json!({
            "action": DELETE_OBJECT,
            "apiVersion": api_version,
            "kind": kind,
            "namespace": meta.namespace.as_deref().unwrap_or_default(),
            "name": meta.display_name(),
        }),
        confirmation: None,
    }
}

/// Raw-document editor node for a detail view: the document re-serialized
/// with sorted keys behind a `---` marker, plus the identity block the host
/// echoes back on save.
pub(crate) fn editor_for(document: &JsonValue, meta: &ObjectMeta) -> Component {
    let mut identity = BTreeMap::new();
    identity.insert(
        "apiVersion".to_string(),
        document["apiVersion"].as_str().unwrap_or_default().to_string(),
    );
    identity.insert(
        "kind".to_string(),
        document["kind"].as_str().unwrap_or_default().to_string(),
    );
    identity.insert(
        "namespace".to_string(),
        meta.namespace.clone().unwrap_or_default(),
    );
    identity.insert("name".to_string(), meta.display_name().to_string());
    editor(yaml::emit_document(document), identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Config;
    use crate::reference::SERVING_API_VERSION;

    #[test]
    fn delete_action_names_the_object() {
        let meta = ObjectMeta {
            name: Some("greeter".to_string()),
            namespace: Some("default".to_string()),
            ..ObjectMeta::default()
        };
        let action = delete_grid_action(SERVING_API_VERSION, "Service", &meta);
        assert_eq!(action.payload["action"], "action.octant.dev/deleteObject");
        assert_eq!(action.payload["kind"], "Service");
        assert_eq!(action.payload["name"], "greeter");
    }

    #[test]
    fn editor_carries_identity_and_marker() {
        let document = json!({
            "apiVersion": SERVING_API_VERSION,
            "kind": "Service",
            "metadata": {"name": "greeter", "namespace": "default"},
        });
        let meta = ObjectMeta {
            name: Some("greeter".to_string()),
            namespace: Some("default".to_string()),
            ..ObjectMeta::default()
        };
        match editor_for(&document, &meta).config {
            Config::Editor { value, read_only, metadata } => {
                assert!(value.starts_with("---\n"));
                assert!(!read_only);
                assert_eq!(metadata["kind"], "Service");
                assert_eq!(metadata["namespace"], "default");
            }
            other => panic!("expected editor config, found {other:?}"),
        }
    }
}
