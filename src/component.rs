//! Data contracts for the host renderer's component tree. Factories stay
//! thin; nothing here inspects another component's config.

use std::collections::BTreeMap;

use serde::Serialize;

/// Link annotation statuses understood by the host.
pub const STATUS_OK: u8 = 1;
pub const STATUS_WARNING: u8 = 2;
pub const STATUS_ERROR: u8 = 3;

/// One node of the view tree the host renders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Component {
    pub metadata: Metadata,
    pub config: Config,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub component_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<Component>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessor: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Config {
    Text {
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    Link {
        value: String,
        #[serde(rename = "ref")]
        reference: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_detail: Option<Box<Component>>,
    },
    Timestamp {
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Table {
        columns: Vec<TableColumn>,
        rows: Vec<TableRow>,
        empty_content: String,
        loading: bool,
        filters: BTreeMap<String, String>,
    },
    Summary {
        sections: Vec<SummarySection>,
    },
    FlexLayout {
        options: FlexOptions,
    },
    List {
        items: Vec<Component>,
    },
    #[serde(rename_all = "camelCase")]
    Editor {
        value: String,
        read_only: bool,
        metadata: BTreeMap<String, String>,
    },
    ButtonGroup {
        buttons: Vec<Button>,
    },
    GridActions {
        actions: Vec<GridAction>,
    },
    Form {
        action: String,
        fields: Vec<FormField>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub accessor: String,
}

pub type TableRow = BTreeMap<String, Component>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummarySection {
    pub header: String,
    pub content: Component,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlexOptions {
    pub sections: Vec<Vec<FlexItem>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlexItem {
    pub view: Component,
    pub width: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Button {
    pub name: String,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Confirmation {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridAction {
    pub name: String,
    #[serde(rename = "actionPath")]
    pub action_path: String,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Component {
    fn new(component_type: &'static str, config: Config) -> Self {
        Component {
            metadata: Metadata {
                component_type,
                title: None,
                accessor: None,
            },
            config,
        }
    }

    /// Attach a factory title, shown by the host above the component.
    pub fn titled(mut self, title: Vec<Component>) -> Self {
        self.metadata.title = Some(title);
        self
    }

    /// Attach the accessor the host uses to address a detail-view tab.
    pub fn with_accessor(mut self, accessor: &'static str) -> Self {
        self.metadata.accessor = Some(accessor);
        self
    }
}

pub fn text(value: impl Into<String>) -> Component {
    Component::new("text", Config::Text { value: value.into() })
}

pub fn link(value: impl Into<String>, reference: impl Into<String>) -> Component {
    Component::new(
        "link",
        Config::Link {
            value: value.into(),
            reference: reference.into(),
            status: None,
            status_detail: None,
        },
    )
}

/// A link annotated with a readiness status indicator and its detail popover.
pub fn link_with_status(
    value: impl Into<String>,
    reference: impl Into<String>,
    status: u8,
    detail: Component,
) -> Component {
    Component::new(
        "link",
        Config::Link {
            value: value.into(),
            reference: reference.into(),
            status: Some(status),
            status_detail: Some(Box::new(detail)),
        },
    )
}

pub fn timestamp(epoch_seconds: i64) -> Component {
    Component::new("timestamp", Config::Timestamp { timestamp: epoch_seconds })
}

pub fn table(
    columns: &[&str],
    rows: Vec<TableRow>,
    empty_content: impl Into<String>,
) -> Component {
    Component::new(
        "table",
        Config::Table {
            columns: columns
                .iter()
                .map(|&name| TableColumn {
                    name: name.to_string(),
                    accessor: name.to_string(),
                })
                .collect(),
            rows,
            empty_content: empty_content.into(),
            loading: false,
            filters: BTreeMap::new(),
        },
    )
}

pub fn summary(sections: Vec<SummarySection>) -> Component {
    Component::new("summary", Config::Summary { sections })
}

pub fn section(header: impl Into<String>, content: Component) -> SummarySection {
    SummarySection {
        header: header.into(),
        content,
    }
}

pub fn flex_layout(sections: Vec<Vec<FlexItem>>) -> Component {
    Component::new(
        "flexlayout",
        Config::FlexLayout {
            options: FlexOptions { sections },
        },
    )
}

pub fn flex_item(view: Component, width: u8) -> FlexItem {
    FlexItem { view, width }
}

pub fn list(items: Vec<Component>) -> Component {
    Component::new("list", Config::List { items })
}

pub fn editor(value: impl Into<String>, metadata: BTreeMap<String, String>) -> Component {
    Component::new(
        "editor",
        Config::Editor {
            value: value.into(),
            read_only: false,
            metadata,
        },
    )
}

pub fn button_group(buttons: Vec<Button>) -> Component {
    Component::new("buttonGroup", Config::ButtonGroup { buttons })
}

pub fn grid_actions(actions: Vec<GridAction>) -> Component {
    Component::new("gridActions", Config::GridActions { actions })
}

pub fn form(action: impl Into<String>, fields: Vec<FormField>) -> Component {
    Component::new(
        "form",
        Config::Form {
            action: action.into(),
            fields,
        },
    )
}
