//! Plugin session: one namespace-scoped view over the cluster, dispatching
//! content paths to view assemblies and actions to the store.

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use crate::accessor;
use crate::actions::{self, DELETE_OBJECT, NEW_SERVICE, SET_CONTENT_PATH};
use crate::component::{
    Button, Component, Confirmation, FormField, button_group, form, link, list, text,
};
use crate::linker::Linker;
use crate::reference::{Kind, NEW_NAME, ObjectRef, SERVING_API_VERSION};
use crate::router::{self, Handler, Params};
use crate::store::DashboardClient;

/// Rendered view tree handed back to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContentResponse {
    pub title: Vec<Component>,
    pub body: Vec<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Component>,
}

impl ContentResponse {
    fn new(title: Vec<Component>, body: Vec<Component>) -> Self {
        ContentResponse {
            title,
            body,
            buttons: None,
        }
    }

    fn with_buttons(mut self, buttons: Component) -> Self {
        self.buttons = Some(buttons);
        self
    }
}

/// Module navigation entry exposed to the host's sidebar.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub title: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Navigation>,
}

pub struct Plugin<'c> {
    client: &'c dyn DashboardClient,
    linker: Linker,
    namespace: String,
}

impl<'c> Plugin<'c> {
    pub fn new(client: &'c dyn DashboardClient) -> Self {
        Plugin::with_root(client, "")
    }

    /// Root the module under a host-assigned content-path prefix.
    pub fn with_root(client: &'c dyn DashboardClient, root: impl Into<String>) -> Self {
        Plugin {
            client,
            linker: Linker::new(root),
            namespace: "default".to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sidebar tree: the module root and one entry per collection.
    pub fn navigation(&self) -> Navigation {
        let child = |title: &str, kind: Kind| Navigation {
            title: title.to_string(),
            path: self.linker.path(&ObjectRef::collection(kind), None),
            icon_name: None,
            children: Vec::new(),
        };
        Navigation {
            title: "Knative".to_string(),
            path: self.linker.path(&ObjectRef::root(), None),
            icon_name: Some("cloud".to_string()),
            children: vec![
                child("Services", Kind::Service),
                child("Configurations", Kind::Configuration),
                child("Routes", Kind::Route),
            ],
        }
    }

    /// Dispatch one action request.
    pub fn handle_action(&mut self, action: &str, payload: &JsonValue) -> Result<()> {
        actions::dispatch(self.client, &self.linker, &mut self.namespace, action, payload)
    }

    /// Render the view for a content path. The empty path (and the bare
    /// root) is the overview; an unroutable path renders an inline
    /// not-found message rather than failing.
    pub fn handle_content(&self, path: &str, client_id: &str) -> Result<ContentResponse> {
        if path.is_empty() || path == "/" {
            return self.overview(client_id);
        }
        let Some((handler, params)) = router::resolve(path) else {
            return Ok(not_found(path));
        };
        match handler {
            Handler::ServiceListing => self.service_listing_page(client_id),
            Handler::NewServiceForm => self.new_service_page(client_id),
            Handler::ServiceDetail => self.service_detail_page(param(&params, "serviceName")?),
            Handler::RevisionListRedirect => self.revision_list_redirect(&params, client_id),
            Handler::RevisionDetail => self.revision_detail_page(&params),
            Handler::ConfigurationListing => self.configuration_listing_page(),
            Handler::ConfigurationDetail => {
                self.configuration_detail_page(param(&params, "configurationName")?)
            }
            Handler::RouteListing => self.route_listing_page(),
            Handler::RouteDetail => self.route_detail_page(param(&params, "routeName")?),
        }
    }

    fn overview(&self, client_id: &str) -> Result<ContentResponse> {
        let title = vec![text("Knative")];
        let services = accessor::list_services(self.client, &self.namespace)?;
        let configurations = accessor::list_configurations(self.client, &self.namespace)?;
        let routes = accessor::list_routes(self.client, &self.namespace)?;
        let body = list(vec![
            crate::serving::service::listing_table(&services, &self.linker)
                .titled(vec![text("Services")]),
            crate::serving::configuration::listing_table(&configurations, &self.linker)
                .titled(vec![text("Configurations")]),
            crate::serving::route::listing_table(&routes, &self.linker)
                .titled(vec![text("Routes")]),
        ])
        .titled(title.clone());
        Ok(ContentResponse::new(title, vec![body])
            .with_buttons(self.new_service_button(client_id)))
    }

    fn service_listing_page(&self, client_id: &str) -> Result<ContentResponse> {
        let title = vec![self.overview_crumb(), text("Services")];
        let services = accessor::list_services(self.client, &self.namespace)?;
        let body = list(vec![
            crate::serving::service::listing_table(&services, &self.linker)
                .titled(vec![text("Services")]),
        ])
        .titled(title.clone());
        Ok(ContentResponse::new(title, vec![body])
            .with_buttons(self.new_service_button(client_id)))
    }

    fn new_service_page(&self, client_id: &str) -> Result<ContentResponse> {
        let title = vec![
            self.overview_crumb(),
            self.collection_crumb(Kind::Service, "Services"),
            text("New Service"),
        ];
        let fields = vec![
            FormField {
                name: "name".to_string(),
                label: "Name".to_string(),
                field_type: "text",
                value: None,
            },
            FormField {
                name: "revisionName".to_string(),
                label: "Revision Name".to_string(),
                field_type: "text",
                value: None,
            },
            FormField {
                name: "image".to_string(),
                label: "Image".to_string(),
                field_type: "text",
                value: None,
            },
            FormField {
                name: "clientID".to_string(),
                label: String::new(),
                field_type: "hidden",
                value: Some(client_id.to_string()),
            },
        ];
        let body = form(NEW_SERVICE, fields).titled(title.clone());
        Ok(ContentResponse::new(title, vec![body]))
    }

    fn service_detail_page(&self, name: &str) -> Result<ContentResponse> {
        let title = vec![
            self.overview_crumb(),
            self.collection_crumb(Kind::Service, "Services"),
            text(name),
        ];
        let (service, document) = accessor::get_service(self.client, &self.namespace, name)?;
        let revisions =
            accessor::list_revisions(self.client, &self.namespace, Kind::Service, name)?;
        let body = crate::serving::service::detail(&service, &document, &revisions, &self.linker);
        Ok(ContentResponse::new(title, body)
            .with_buttons(self.delete_button(Kind::Service, name)))
    }

    fn configuration_listing_page(&self) -> Result<ContentResponse> {
        let title = vec![self.overview_crumb(), text("Configurations")];
        let configurations = accessor::list_configurations(self.client, &self.namespace)?;
        let body = list(vec![
            crate::serving::configuration::listing_table(&configurations, &self.linker)
                .titled(vec![text("Configurations")]),
        ])
        .titled(title.clone());
        Ok(ContentResponse::new(title, vec![body]))
    }

    fn configuration_detail_page(&self, name: &str) -> Result<ContentResponse> {
        let title = vec![
            self.overview_crumb(),
            self.collection_crumb(Kind::Configuration, "Configurations"),
            text(name),
        ];
        let (configuration, document) =
            accessor::get_configuration(self.client, &self.namespace, name)?;
        let revisions =
            accessor::list_revisions(self.client, &self.namespace, Kind::Configuration, name)?;
        let body = crate::serving::configuration::detail(
            &configuration,
            &document,
            &revisions,
            &self.linker,
        );
        Ok(ContentResponse::new(title, body)
            .with_buttons(self.delete_button(Kind::Configuration, name)))
    }

    // `/…/revisions` has no view of its own; redirect to the owner detail.
    fn revision_list_redirect(&self, params: &Params, client_id: &str) -> Result<ContentResponse> {
        let target = if let Some(service) = params.get("serviceName") {
            self.linker.path(&ObjectRef::named(Kind::Service, service), None)
        } else if let Some(configuration) = params.get("configurationName") {
            self.linker
                .path(&ObjectRef::named(Kind::Configuration, configuration), None)
        } else {
            self.linker.path(&ObjectRef::root(), None)
        };
        actions::send_content_path(self.client, client_id, &target)?;
        Ok(ContentResponse::new(Vec::new(), Vec::new()))
    }

    fn revision_detail_page(&self, params: &Params) -> Result<ContentResponse> {
        let name = param(params, "revisionName")?;
        let mut title = Vec::new();
        if let Some(service) = params.get("serviceName") {
            let context = ObjectRef::named(Kind::Service, service);
            title.extend([
                self.overview_crumb(),
                self.collection_crumb(Kind::Service, "Services"),
                link(service, self.linker.path(&context, None)),
                link(
                    "Revisions",
                    self.linker
                        .path(&ObjectRef::collection(Kind::Revision), Some(&context)),
                ),
                text(name),
            ]);
        } else if let Some(configuration) = params.get("configurationName") {
            let context = ObjectRef::named(Kind::Configuration, configuration);
            title.extend([
                self.overview_crumb(),
                self.collection_crumb(Kind::Configuration, "Configurations"),
                link(configuration, self.linker.path(&context, None)),
                link(
                    "Revisions",
                    self.linker
                        .path(&ObjectRef::collection(Kind::Revision), Some(&context)),
                ),
                text(name),
            ]);
        }
        let (revision, document) = accessor::get_revision(self.client, &self.namespace, name)?;
        let pods = accessor::list_pods(self.client, &self.namespace, name)?;
        let body = crate::serving::revision::detail(&revision, &document, &pods);
        Ok(ContentResponse::new(title, body)
            .with_buttons(self.delete_button(Kind::Revision, name)))
    }

    fn route_listing_page(&self) -> Result<ContentResponse> {
        let title = vec![self.overview_crumb(), text("Routes")];
        let routes = accessor::list_routes(self.client, &self.namespace)?;
        let body = list(vec![
            crate::serving::route::listing_table(&routes, &self.linker)
                .titled(vec![text("Routes")]),
        ])
        .titled(title.clone());
        Ok(ContentResponse::new(title, vec![body]))
    }

    fn route_detail_page(&self, name: &str) -> Result<ContentResponse> {
        let title = vec![
            self.overview_crumb(),
            self.collection_crumb(Kind::Route, "Routes"),
            text(name),
        ];
        let (route, document) = accessor::get_route(self.client, &self.namespace, name)?;
        let body = crate::serving::route::detail(&route, &document, &self.linker);
        Ok(ContentResponse::new(title, body).with_buttons(self.delete_button(Kind::Route, name)))
    }

    fn overview_crumb(&self) -> Component {
        link("Knative", self.linker.path(&ObjectRef::root(), None))
    }

    fn collection_crumb(&self, kind: Kind, label: &str) -> Component {
        link(label, self.linker.path(&ObjectRef::collection(kind), None))
    }

    fn new_service_button(&self, client_id: &str) -> Component {
        button_group(vec![Button {
            name: "New Service".to_string(),
            payload: json!({
                "action": SET_CONTENT_PATH,
                "clientID": client_id,
                "contentPath": self
                    .linker
                    .path(&ObjectRef::named(Kind::Service, NEW_NAME), None),
            }),
            confirmation: None,
        }])
    }

    fn delete_button(&self, kind: Kind, name: &str) -> Component {
        button_group(vec![Button {
            name: "Delete".to_string(),
            payload: json!({
                "action": DELETE_OBJECT,
                "apiVersion": SERVING_API_VERSION,
                "kind": kind.as_str(),
                "namespace": self.namespace.as_str(),
                "name": name,
            }),
            confirmation: Some(Confirmation {
                title: format!("Delete {}", kind.as_str()),
                body: format!(
                    "Are you sure you want to delete *{}* **{name}**? \
                     This action is permanent and cannot be recovered.",
                    kind.as_str()
                ),
            }),
        }])
    }
}

fn not_found(path: &str) -> ContentResponse {
    let message = text(format!("Not Found - {path}"));
    ContentResponse::new(vec![message.clone()], vec![message])
}

fn param<'p>(params: &'p Params, name: &str) -> Result<&'p str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("route bound no `{name}` parameter"))
}
