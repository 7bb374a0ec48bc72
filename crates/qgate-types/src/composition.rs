use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canvas position of an element, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Rendered size of an element, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A single interactive element inside a composition.
///
/// `config` is an open map at the serialization layer; its schema is owned
/// by the [`crate::ElementDescriptor`] registered for `type_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier within the composition (e.g. "el-3").
    pub id: String,
    /// The registered element type (e.g. "slider", "chart").
    pub type_id: String,
    pub position: Position,
    pub size: Size,
    /// Per-element configuration, keyed by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

impl Element {
    /// Create an element with default geometry and empty config.
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            position: Position::default(),
            size: Size::default(),
            config: BTreeMap::new(),
            z_index: 0,
            visible: true,
            locked: false,
        }
    }

    pub fn with_config(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(field.into(), value);
        self
    }
}

/// A directed wire from one element's output port to another's input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source_element_id: String,
    pub source_port: String,
    pub target_element_id: String,
    pub target_port: String,
}

impl Connection {
    pub fn new(
        source_element_id: impl Into<String>,
        source_port: impl Into<String>,
        target_element_id: impl Into<String>,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source_element_id: source_element_id.into(),
            source_port: source_port.into(),
            target_element_id: target_element_id.into(),
            target_port: target_port.into(),
        }
    }

    /// Stable display label, used in findings and fix descriptions.
    pub fn label(&self) -> String {
        format!(
            "{}:{} -> {}:{}",
            self.source_element_id, self.source_port, self.target_element_id, self.target_port
        )
    }
}

/// The element/connection graph defining one generated tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Composition {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.connections.is_empty()
    }

    /// Look up an element by id. Ids are expected to be unique; when they
    /// are not, the validator reports it and this returns the first match.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }
}
