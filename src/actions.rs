//! Action dispatch: store mutations and navigation events triggered by the
//! host on the user's behalf.

use anyhow::{Result, anyhow};
use serde_json::{Value as JsonValue, json};

use crate::linker::Linker;
use crate::reference::{Kind, ObjectRef, SERVING_API_VERSION};
use crate::store::DashboardClient;
use crate::yaml;

// Wire identifiers of the host action/event protocol.
pub const SET_NAMESPACE: &str = "action.octant.dev/setNamespace";
pub const EDIT_SERVICE: &str = "knative.dev/editService";
pub const EDIT_CONFIGURATION: &str = "knative.dev/editConfiguration";
pub const NEW_SERVICE: &str = "knative.dev/newService";
pub const SET_CONTENT_PATH: &str = "knative.dev/setContentPath";
pub const DELETE_OBJECT: &str = "action.octant.dev/deleteObject";
pub const CONTENT_PATH_EVENT: &str = "event.octant.dev/contentPath";

/// Dispatch one action. Unrecognized action names are a no-op, not an
/// error; a malformed payload fails before any mutation is submitted.
pub fn dispatch(
    client: &dyn DashboardClient,
    linker: &Linker,
    namespace: &mut String,
    action: &str,
    payload: &JsonValue,
) -> Result<()> {
    match action {
        SET_NAMESPACE => {
            *namespace = required_str(payload, "namespace")?.to_string();
            Ok(())
        }
        EDIT_SERVICE => edit_resource(client, payload, "service"),
        EDIT_CONFIGURATION => edit_resource(client, payload, "configuration"),
        NEW_SERVICE => new_service(client, linker, namespace, payload),
        SET_CONTENT_PATH => {
            let client_id = required_str(payload, "clientID")?;
            let content_path = required_str(payload, "contentPath")?;
            send_content_path(client, client_id, content_path)
        }
        _ => Ok(()),
    }
}

/// Navigate one client to a content path.
pub fn send_content_path(
    client: &dyn DashboardClient,
    client_id: &str,
    content_path: &str,
) -> Result<()> {
    client.send_event(
        client_id,
        CONTENT_PATH_EVENT,
        json!({ "contentPath": content_path }),
    )
}

// Shared edit-merge path for services and configurations: reparse the
// document, drop server-managed metadata, pin or release the template name,
// and swap the first container's image. The mutation is submitted only once
// every edit has applied cleanly.
fn edit_resource(client: &dyn DashboardClient, payload: &JsonValue, field: &str) -> Result<()> {
    let raw = required_str(payload, field)?;
    let mut document = yaml::parse_document(raw)?;

    metadata_object(&mut document)?.remove("managedFields");

    let parent = document["metadata"]["name"]
        .as_str()
        .ok_or_else(|| anyhow!("document has no metadata.name"))?
        .to_string();
    let template_metadata = template_metadata_object(&mut document)?;
    match optional_str(payload, "revisionName") {
        Some(revision) => {
            template_metadata.insert("name".to_string(), json!(format!("{parent}-{revision}")));
        }
        None => {
            template_metadata.remove("name");
        }
    }

    let image = required_str(payload, "image")?;
    first_container(&mut document)?.insert("image".to_string(), json!(image));

    let namespace = document["metadata"]["namespace"]
        .as_str()
        .ok_or_else(|| anyhow!("document has no metadata.namespace"))?
        .to_string();
    client.update(&namespace, &document)
}

// Create the minimal service document and redirect the requesting client to
// it. The redirect is not conditioned on the store's asynchronous
// acceptance of the mutation.
fn new_service(
    client: &dyn DashboardClient,
    linker: &Linker,
    namespace: &str,
    payload: &JsonValue,
) -> Result<()> {
    let name = required_str(payload, "name")?;
    let image = required_str(payload, "image")?;
    let client_id = required_str(payload, "clientID")?;

    let mut template_metadata = serde_json::Map::new();
    if let Some(revision) = optional_str(payload, "revisionName") {
        template_metadata.insert("name".to_string(), json!(revision));
    }
    let document = json!({
        "apiVersion": SERVING_API_VERSION,
        "kind": Kind::Service.as_str(),
        "metadata": {
            "namespace": namespace,
            "name": name,
        },
        "spec": {
            "template": {
                "metadata": template_metadata,
                "spec": {
                    "containers": [
                        { "image": image },
                    ],
                },
            },
        },
    });
    client.update(namespace, &document)?;

    let content_path = linker.path(&ObjectRef::named(Kind::Service, name), None);
    send_content_path(client, client_id, &content_path)
}

fn required_str<'a>(payload: &'a JsonValue, field: &str) -> Result<&'a str> {
    payload[field]
        .as_str()
        .ok_or_else(|| anyhow!("action payload is missing `{field}`"))
}

// Absent and empty both mean "not supplied".
fn optional_str<'a>(payload: &'a JsonValue, field: &str) -> Option<&'a str> {
    payload[field].as_str().filter(|value| !value.is_empty())
}

fn metadata_object(document: &mut JsonValue) -> Result<&mut serde_json::Map<String, JsonValue>> {
    document["metadata"]
        .as_object_mut()
        .ok_or_else(|| anyhow!("document has no metadata object"))
}

fn template_metadata_object(
    document: &mut JsonValue,
) -> Result<&mut serde_json::Map<String, JsonValue>> {
    let template = document
        .pointer_mut("/spec/template")
        .and_then(JsonValue::as_object_mut)
        .ok_or_else(|| anyhow!("document has no spec.template object"))?;
    let entry = template.entry("metadata").or_insert_with(|| json!({}));
    if entry.is_null() {
        // a bare `metadata:` key parses to null
        *entry = json!({});
    }
    entry
        .as_object_mut()
        .ok_or_else(|| anyhow!("spec.template.metadata is not an object"))
}

fn first_container(document: &mut JsonValue) -> Result<&mut serde_json::Map<String, JsonValue>> {
    document
        .pointer_mut("/spec/template/spec/containers/0")
        .and_then(JsonValue::as_object_mut)
        .ok_or_else(|| anyhow!("document has no spec.template.spec.containers"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service_yaml(template_name: Option<&str>) -> String {
        let name_line = template_name
            .map(|name| format!("      name: {name}\n"))
            .unwrap_or_default();
        format!(
            "apiVersion: serving.knative.dev/v1\n\
             kind: Service\n\
             metadata:\n\
             \x20 name: greeter\n\
             \x20 namespace: default\n\
             \x20 managedFields:\n\
             \x20   - manager: controller\n\
             spec:\n\
             \x20 template:\n\
             \x20   metadata:\n{name_line}\
             \x20   spec:\n\
             \x20     containers:\n\
             \x20       - image: example.com/old:1\n"
        )
    }

    fn dispatch_to(store: &MemoryStore, action: &str, payload: JsonValue) -> Result<String> {
        let linker = Linker::new("");
        let mut namespace = "default".to_string();
        dispatch(store, &linker, &mut namespace, action, &payload)?;
        Ok(namespace)
    }

    #[test]
    fn set_namespace_updates_state_only() -> Result<()> {
        let store = MemoryStore::new();
        let namespace = dispatch_to(&store, SET_NAMESPACE, json!({"namespace": "staging"}))?;
        assert_eq!(namespace, "staging");
        assert!(store.updates().is_empty());
        assert!(store.events().is_empty());
        Ok(())
    }

    #[test]
    fn edit_with_revision_name_pins_the_template() -> Result<()> {
        let store = MemoryStore::new();
        dispatch_to(
            &store,
            EDIT_SERVICE,
            json!({
                "service": service_yaml(None),
                "revisionName": "v2",
                "image": "example.com/new:2",
            }),
        )?;
        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        let (namespace, document) = &updates[0];
        assert_eq!(namespace, "default");
        assert_eq!(document["spec"]["template"]["metadata"]["name"], "greeter-v2");
        assert_eq!(
            document["spec"]["template"]["spec"]["containers"][0]["image"],
            "example.com/new:2"
        );
        assert!(document["metadata"]["managedFields"].is_null());
        Ok(())
    }

    #[test]
    fn edit_without_revision_name_releases_the_template() -> Result<()> {
        let store = MemoryStore::new();
        dispatch_to(
            &store,
            EDIT_SERVICE,
            json!({
                "service": service_yaml(Some("greeter-v1")),
                "image": "example.com/new:2",
            }),
        )?;
        let (_, document) = &store.updates()[0];
        assert!(document["spec"]["template"]["metadata"]["name"].is_null());
        Ok(())
    }

    #[test]
    fn edit_configuration_reads_its_own_payload_field() -> Result<()> {
        let store = MemoryStore::new();
        let yaml = service_yaml(None).replace("kind: Service", "kind: Configuration");
        dispatch_to(
            &store,
            EDIT_CONFIGURATION,
            json!({"configuration": yaml, "image": "example.com/new:2"}),
        )?;
        assert_eq!(store.updates().len(), 1);
        Ok(())
    }

    #[test]
    fn malformed_edit_submits_nothing() {
        let store = MemoryStore::new();
        let result = dispatch_to(
            &store,
            EDIT_SERVICE,
            json!({"service": "kind: Service\n", "image": "x"}),
        );
        assert!(result.is_err());
        assert!(store.updates().is_empty());
        assert!(store.events().is_empty());
    }

    #[test]
    fn new_service_creates_and_redirects() -> Result<()> {
        let store = MemoryStore::new();
        dispatch_to(
            &store,
            NEW_SERVICE,
            json!({"name": "foo", "image": "img:tag", "clientID": "c1"}),
        )?;

        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        let (namespace, document) = &updates[0];
        assert_eq!(namespace, "default");
        assert_eq!(
            *document,
            json!({
                "apiVersion": "serving.knative.dev/v1",
                "kind": "Service",
                "metadata": {"namespace": "default", "name": "foo"},
                "spec": {
                    "template": {
                        "metadata": {},
                        "spec": {"containers": [{"image": "img:tag"}]},
                    },
                },
            })
        );

        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].client_id, "c1");
        assert_eq!(events[0].event, CONTENT_PATH_EVENT);
        assert_eq!(events[0].payload, json!({"contentPath": "/services/foo"}));
        Ok(())
    }

    #[test]
    fn new_service_pins_template_when_revision_supplied() -> Result<()> {
        let store = MemoryStore::new();
        dispatch_to(
            &store,
            NEW_SERVICE,
            json!({
                "name": "foo",
                "image": "img:tag",
                "revisionName": "foo-v1",
                "clientID": "c1",
            }),
        )?;
        let (_, document) = &store.updates()[0];
        assert_eq!(document["spec"]["template"]["metadata"]["name"], "foo-v1");
        Ok(())
    }

    #[test]
    fn set_content_path_only_emits_the_event() -> Result<()> {
        let store = MemoryStore::new();
        dispatch_to(
            &store,
            SET_CONTENT_PATH,
            json!({"clientID": "c9", "contentPath": "/services/_new"}),
        )?;
        assert!(store.updates().is_empty());
        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["contentPath"], "/services/_new");
        Ok(())
    }

    #[test]
    fn unknown_action_is_a_no_op() -> Result<()> {
        let store = MemoryStore::new();
        let namespace = dispatch_to(&store, "knative.dev/somethingElse", json!({"x": 1}))?;
        assert_eq!(namespace, "default");
        assert!(store.updates().is_empty());
        assert!(store.events().is_empty());
        Ok(())
    }

    #[test]
    fn missing_namespace_field_leaves_state_untouched() {
        let store = MemoryStore::new();
        let linker = Linker::new("");
        let mut namespace = "default".to_string();
        let result = dispatch(&store, &linker, &mut namespace, SET_NAMESPACE, &json!({}));
        assert!(result.is_err());
        assert_eq!(namespace, "default");
    }
}
