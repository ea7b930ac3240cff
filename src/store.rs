//! Capability interface to the host's object store, plus the in-memory
//! stand-in used by tests and the preview binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value as JsonValue;

use crate::reference::{ObjectRef, Selector};
use crate::yaml;

/// The host dashboard's object-store and event capabilities. All reads and
/// mutations this module performs go through here; the store itself is
/// externally owned.
pub trait DashboardClient {
    /// Objects of the referenced kind, optionally narrowed by a label
    /// selector. Order is not guaranteed; callers impose their own.
    fn list(&self, target: &ObjectRef, selector: Option<&Selector>) -> Result<Vec<JsonValue>>;

    /// A single object, `None` when the store has no match.
    fn get(&self, target: &ObjectRef) -> Result<Option<JsonValue>>;

    /// Create or overwrite an object from its JSON document.
    fn update(&self, namespace: &str, document: &JsonValue) -> Result<()>;

    /// Fire-and-forget event delivery to one client.
    fn send_event(&self, client_id: &str, event: &str, payload: JsonValue) -> Result<()>;
}

/// Event captured by [`MemoryStore::send_event`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedEvent {
    pub client_id: String,
    pub event: String,
    pub payload: JsonValue,
}

type ObjectKey = (String, String, String); // kind, namespace, name

/// In-memory [`DashboardClient`] keyed by (kind, namespace, name). Updates
/// and events are recorded so tests can assert on exactly what was sent.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<ObjectKey, JsonValue>>,
    updates: RwLock<Vec<(String, JsonValue)>>,
    events: RwLock<Vec<RecordedEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Insert documents without recording them as updates.
    pub fn seed(&self, documents: Vec<JsonValue>) -> Result<()> {
        let mut objects = self.objects.write().expect("object store poisoned");
        for document in documents {
            let key = document_key(&document, None)?;
            objects.insert(key, document);
        }
        Ok(())
    }

    /// Mutations submitted through [`DashboardClient::update`], in order.
    pub fn updates(&self) -> Vec<(String, JsonValue)> {
        self.updates.read().expect("update log poisoned").clone()
    }

    /// Events sent through [`DashboardClient::send_event`], in order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().expect("event log poisoned").clone()
    }
}

impl DashboardClient for MemoryStore {
    fn list(&self, target: &ObjectRef, selector: Option<&Selector>) -> Result<Vec<JsonValue>> {
        let kind = target
            .kind
            .as_deref()
            .ok_or_else(|| anyhow!("list requires a kind"))?;
        let objects = self.objects.read().expect("object store poisoned");
        Ok(objects
            .iter()
            .filter(|((object_kind, namespace, _), _)| {
                object_kind == kind
                    && target
                        .namespace
                        .as_deref()
                        .is_none_or(|wanted| wanted == namespace)
            })
            .filter(|(_, document)| selector.is_none_or(|sel| matches_selector(document, sel)))
            .map(|(_, document)| document.clone())
            .collect())
    }

    fn get(&self, target: &ObjectRef) -> Result<Option<JsonValue>> {
        let kind = target
            .kind
            .as_deref()
            .ok_or_else(|| anyhow!("get requires a kind"))?;
        let name = target
            .name
            .as_deref()
            .ok_or_else(|| anyhow!("get requires a name"))?;
        let namespace = target.namespace.as_deref().unwrap_or_default();
        let objects = self.objects.read().expect("object store poisoned");
        Ok(objects
            .get(&(kind.to_string(), namespace.to_string(), name.to_string()))
            .cloned())
    }

    fn update(&self, namespace: &str, document: &JsonValue) -> Result<()> {
        let key = document_key(document, Some(namespace))?;
        self.objects
            .write()
            .expect("object store poisoned")
            .insert(key, document.clone());
        self.updates
            .write()
            .expect("update log poisoned")
            .push((namespace.to_string(), document.clone()));
        Ok(())
    }

    fn send_event(&self, client_id: &str, event: &str, payload: JsonValue) -> Result<()> {
        self.events
            .write()
            .expect("event log poisoned")
            .push(RecordedEvent {
                client_id: client_id.to_string(),
                event: event.to_string(),
                payload,
            });
        Ok(())
    }
}

fn document_key(document: &JsonValue, namespace: Option<&str>) -> Result<ObjectKey> {
    let kind = document["kind"]
        .as_str()
        .ok_or_else(|| anyhow!("document has no kind"))?;
    let name = document["metadata"]["name"]
        .as_str()
        .ok_or_else(|| anyhow!("document has no metadata.name"))?;
    let namespace = namespace
        .or_else(|| document["metadata"]["namespace"].as_str())
        .unwrap_or_default();
    Ok((kind.to_string(), namespace.to_string(), name.to_string()))
}

fn matches_selector(document: &JsonValue, selector: &Selector) -> bool {
    let labels = &document["metadata"]["labels"];
    selector
        .iter()
        .all(|(key, value)| labels[key].as_str() == Some(value))
}

/// Load seed documents from a YAML file holding a sequence of resources (or
/// a single resource mapping).
pub fn load_seed(path: &Path) -> Result<Vec<JsonValue>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    match yaml::parse_document(&contents)? {
        JsonValue::Array(documents) => Ok(documents),
        JsonValue::Object(map) => Ok(vec![JsonValue::Object(map)]),
        JsonValue::Null => Ok(Vec::new()),
        other => bail!("seed file must hold resource documents, found {other}"),
    }
}
