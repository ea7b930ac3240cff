//! Object identities and the fixed literals of the serving protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// API group/version for serving resources.
pub const SERVING_API_VERSION: &str = "serving.knative.dev/v1";
/// API version for core resources reached through ownership (pods).
pub const CORE_API_VERSION: &str = "v1";
pub const POD_KIND: &str = "Pod";

// Label selector keys used to walk ownership relations. These are wire
// literals of the external resource schema, not ours to rename.
pub const SERVICE_LABEL: &str = "serving.knative.dev/service";
pub const CONFIGURATION_LABEL: &str = "serving.knative.dev/configuration";
pub const REVISION_LABEL: &str = "serving.knative.dev/revision";
pub const GENERATION_LABEL: &str = "serving.knative.dev/configurationGeneration";

/// Name segment that addresses the new-resource form instead of a resource.
pub const NEW_NAME: &str = "_new";

/// Label selector passed to list calls.
pub type Selector = BTreeMap<String, String>;

/// The closed set of serving kinds this module renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Service,
    Configuration,
    Revision,
    Route,
}

impl Kind {
    /// Canonical kind string as it appears in cluster documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Service => "Service",
            Kind::Configuration => "Configuration",
            Kind::Revision => "Revision",
            Kind::Route => "Route",
        }
    }

    /// Parse a canonical kind string.
    pub fn from_name(name: &str) -> Option<Kind> {
        match name {
            "Service" => Some(Kind::Service),
            "Configuration" => Some(Kind::Configuration),
            "Revision" => Some(Kind::Revision),
            "Route" => Some(Kind::Route),
            _ => None,
        }
    }

    /// Collection segment of the content path for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Kind::Service => "services",
            Kind::Configuration => "configurations",
            Kind::Revision => "revisions",
            Kind::Route => "routes",
        }
    }

    /// True when this kind may own revisions.
    pub fn owns_revisions(self) -> bool {
        matches!(self, Kind::Service | Kind::Configuration)
    }
}

/// Identity of an object in the cluster store. `kind` absent means the
/// plugin root, `name` absent means the collection of that kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub api_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectRef {
    /// The serving plugin root.
    pub fn root() -> Self {
        ObjectRef {
            api_version: SERVING_API_VERSION.to_string(),
            ..ObjectRef::default()
        }
    }

    /// The collection of a serving kind.
    pub fn collection(kind: Kind) -> Self {
        ObjectRef {
            api_version: SERVING_API_VERSION.to_string(),
            kind: Some(kind.as_str().to_string()),
            ..ObjectRef::default()
        }
    }

    /// A named serving resource.
    pub fn named(kind: Kind, name: impl Into<String>) -> Self {
        ObjectRef {
            api_version: SERVING_API_VERSION.to_string(),
            kind: Some(kind.as_str().to_string()),
            name: Some(name.into()),
            ..ObjectRef::default()
        }
    }

    /// A named serving resource scoped to a namespace, as used for store queries.
    pub fn namespaced(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ObjectRef {
            api_version: SERVING_API_VERSION.to_string(),
            kind: Some(kind.as_str().to_string()),
            namespace: Some(namespace.into()),
            name: Some(name.into()),
        }
    }

    /// The pod collection in a namespace.
    pub fn pods(namespace: impl Into<String>) -> Self {
        ObjectRef {
            api_version: CORE_API_VERSION.to_string(),
            kind: Some(POD_KIND.to_string()),
            namespace: Some(namespace.into()),
            name: None,
        }
    }

    /// Kind variant when the reference names one of the serving kinds.
    pub fn serving_kind(&self) -> Option<Kind> {
        self.kind.as_deref().and_then(Kind::from_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_names() {
        for kind in [Kind::Service, Kind::Configuration, Kind::Revision, Kind::Route] {
            assert_eq!(Kind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::from_name("Deployment"), None);
    }

    #[test]
    fn named_ref_serializes_without_empty_fields() {
        let reference = ObjectRef::named(Kind::Service, "greeter");
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "apiVersion": "serving.knative.dev/v1",
                "kind": "Service",
                "name": "greeter",
            })
        );
    }
}
