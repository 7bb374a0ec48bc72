//! Element-type registry.
//!
//! Every composition element names a `type_id`; the registry resolves it to
//! a typed descriptor (config schema, declared ports, reentrancy) at
//! startup, so validation never dispatches on raw strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The value domain of a single config field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigKind {
    /// Free-form text.
    Text,
    /// A number, optionally bounded on either side.
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// A boolean flag.
    Flag,
    /// One of a fixed set of options.
    Choice { options: Vec<String> },
}

impl ConfigKind {
    /// Whether `value` lies inside this field's domain.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ConfigKind::Text => value.is_string(),
            ConfigKind::Number { min, max } => match value.as_f64() {
                Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
                None => false,
            },
            ConfigKind::Flag => value.is_boolean(),
            ConfigKind::Choice { options } => value
                .as_str()
                .map_or(false, |s| options.iter().any(|o| o == s)),
        }
    }

    /// The deterministic default used when an auto-fix fills a missing or
    /// out-of-domain field.
    pub fn default_value(&self) -> Value {
        match self {
            ConfigKind::Text => Value::String(String::new()),
            ConfigKind::Number { min, .. } => {
                serde_json::json!(min.unwrap_or(0.0))
            }
            ConfigKind::Flag => Value::Bool(false),
            ConfigKind::Choice { options } => {
                Value::String(options.first().cloned().unwrap_or_default())
            }
        }
    }
}

/// One field of an element type's config schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    pub kind: ConfigKind,
    #[serde(default)]
    pub required: bool,
}

impl ConfigField {
    pub fn required(name: impl Into<String>, kind: ConfigKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ConfigKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}

/// Static description of a registered element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub type_id: String,
    pub display_name: String,
    #[serde(default)]
    pub config_fields: Vec<ConfigField>,
    /// Input port names this type accepts connections on.
    #[serde(default)]
    pub input_ports: Vec<String>,
    /// Output port names this type emits on.
    #[serde(default)]
    pub output_ports: Vec<String>,
    /// Reentrant types may legally sit on a feedback loop; non-reentrant
    /// types participating in a cycle are a structural error.
    #[serde(default)]
    pub reentrant: bool,
}

impl ElementDescriptor {
    pub fn config_field(&self, name: &str) -> Option<&ConfigField> {
        self.config_fields.iter().find(|f| f.name == name)
    }

    pub fn has_input_port(&self, port: &str) -> bool {
        self.input_ports.iter().any(|p| p == port)
    }

    pub fn has_output_port(&self, port: &str) -> bool {
        self.output_ports.iter().any(|p| p == port)
    }
}

/// `type_id -> descriptor` lookup, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    descriptors: HashMap<String, ElementDescriptor>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous entry for the type.
    pub fn register(&mut self, descriptor: ElementDescriptor) {
        self.descriptors
            .insert(descriptor.type_id.clone(), descriptor);
    }

    pub fn get(&self, type_id: &str) -> Option<&ElementDescriptor> {
        self.descriptors.get(type_id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The built-in element set shipped with the platform.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(ElementDescriptor {
            type_id: "text".into(),
            display_name: "Text".into(),
            config_fields: vec![ConfigField::required("content", ConfigKind::Text)],
            input_ports: vec!["value".into()],
            output_ports: vec![],
            reentrant: false,
        });
        registry.register(ElementDescriptor {
            type_id: "slider".into(),
            display_name: "Slider".into(),
            config_fields: vec![
                ConfigField::required(
                    "min",
                    ConfigKind::Number {
                        min: None,
                        max: None,
                    },
                ),
                ConfigField::required(
                    "max",
                    ConfigKind::Number {
                        min: None,
                        max: None,
                    },
                ),
                ConfigField::optional(
                    "step",
                    ConfigKind::Number {
                        min: Some(0.0),
                        max: None,
                    },
                ),
            ],
            input_ports: vec![],
            output_ports: vec!["value".into()],
            reentrant: false,
        });
        registry.register(ElementDescriptor {
            type_id: "button".into(),
            display_name: "Button".into(),
            config_fields: vec![ConfigField::required("label", ConfigKind::Text)],
            input_ports: vec![],
            output_ports: vec!["clicked".into()],
            reentrant: false,
        });
        registry.register(ElementDescriptor {
            type_id: "chart".into(),
            display_name: "Chart".into(),
            config_fields: vec![ConfigField::required(
                "chart_type",
                ConfigKind::Choice {
                    options: vec!["line".into(), "bar".into(), "scatter".into()],
                },
            )],
            input_ports: vec!["data".into()],
            output_ports: vec![],
            reentrant: false,
        });
        registry.register(ElementDescriptor {
            type_id: "formula".into(),
            display_name: "Formula".into(),
            config_fields: vec![ConfigField::required("expression", ConfigKind::Text)],
            input_ports: vec!["a".into(), "b".into()],
            output_ports: vec!["result".into()],
            reentrant: false,
        });
        registry.register(ElementDescriptor {
            type_id: "timer".into(),
            display_name: "Timer".into(),
            config_fields: vec![
                ConfigField::required(
                    "interval_ms",
                    ConfigKind::Number {
                        min: Some(10.0),
                        max: Some(3_600_000.0),
                    },
                ),
                ConfigField::optional("autostart", ConfigKind::Flag),
            ],
            input_ports: vec!["reset".into()],
            output_ports: vec!["tick".into()],
            // A timer may legally close a feedback loop.
            reentrant: true,
        });
        registry.register(ElementDescriptor {
            type_id: "store".into(),
            display_name: "Value Store".into(),
            config_fields: vec![ConfigField::optional("initial", ConfigKind::Text)],
            input_ports: vec!["set".into()],
            output_ports: vec!["value".into()],
            reentrant: true,
        });
        registry
    }
}
