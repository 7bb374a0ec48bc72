//! Structural validation of candidate compositions.
//!
//! [`validate`] is pure and deterministic: no I/O, no suspension points,
//! bounded by [`CapacityLimits`]. It accumulates every finding instead of
//! stopping at the first failure, so the gate can score the whole picture.

use qgate_types::{
    Composition, CompositionError, CompositionWarning, ElementRegistry, ErrorCode,
    ValidationResult, WarningCode,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Hard ceilings on composition size. These exist to bound worst-case
/// validation cost, not as a style preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLimits {
    pub max_elements: usize,
    pub max_connections: usize,
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self {
            max_elements: 100,
            max_connections: 200,
        }
    }
}

/// Validate a composition against the element registry and capacity limits.
pub fn validate(
    composition: &Composition,
    registry: &ElementRegistry,
    limits: &CapacityLimits,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_duplicate_ids(composition, &mut errors);
    check_element_schemas(composition, registry, &mut errors);
    check_connections(composition, registry, &mut errors, &mut warnings);
    check_cycles(composition, registry, &mut errors);
    check_capacity(composition, limits, &mut errors);
    check_soft(composition, registry, &mut warnings);

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "validation finished"
    );
    ValidationResult::new(errors, warnings)
}

fn check_duplicate_ids(composition: &Composition, errors: &mut Vec<CompositionError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for element in &composition.elements {
        if !seen.insert(element.id.as_str()) && reported.insert(element.id.as_str()) {
            errors.push(CompositionError::new(
                ErrorCode::DuplicateId,
                format!("element id '{}' is used more than once", element.id),
                Some(element.id.clone()),
            ));
        }
    }
}

fn check_element_schemas(
    composition: &Composition,
    registry: &ElementRegistry,
    errors: &mut Vec<CompositionError>,
) {
    for element in &composition.elements {
        let Some(descriptor) = registry.get(&element.type_id) else {
            errors.push(CompositionError::unfixable(
                ErrorCode::UnknownElementType,
                format!(
                    "element '{}' has unregistered type '{}'",
                    element.id, element.type_id
                ),
                Some(element.id.clone()),
            ));
            continue;
        };

        for field in &descriptor.config_fields {
            match element.config.get(&field.name) {
                Some(value) => {
                    if !field.kind.accepts(value) {
                        errors.push(CompositionError::new(
                            ErrorCode::InvalidConfig,
                            format!(
                                "element '{}' config '{}' is out of domain",
                                element.id, field.name
                            ),
                            Some(element.id.clone()),
                        ));
                    }
                }
                None if field.required => {
                    errors.push(CompositionError::new(
                        ErrorCode::InvalidConfig,
                        format!(
                            "element '{}' is missing required config '{}'",
                            element.id, field.name
                        ),
                        Some(element.id.clone()),
                    ));
                }
                None => {}
            }
        }
    }
}

fn check_connections(
    composition: &Composition,
    registry: &ElementRegistry,
    errors: &mut Vec<CompositionError>,
    warnings: &mut Vec<CompositionWarning>,
) {
    let mut seen = HashSet::new();
    for connection in &composition.connections {
        let label = connection.label();

        if connection.source_element_id == connection.target_element_id {
            errors.push(CompositionError::new(
                ErrorCode::SelfConnection,
                format!(
                    "element '{}' is connected to itself",
                    connection.source_element_id
                ),
                Some(label.clone()),
            ));
            continue;
        }

        let source = composition.element(&connection.source_element_id);
        let target = composition.element(&connection.target_element_id);
        let mut dangling = false;

        match source {
            None => {
                errors.push(CompositionError::new(
                    ErrorCode::DanglingConnection,
                    format!(
                        "connection references missing source element '{}'",
                        connection.source_element_id
                    ),
                    Some(label.clone()),
                ));
                dangling = true;
            }
            Some(element) => {
                // An unknown element type is already reported; only check
                // the port when the descriptor exists.
                if let Some(descriptor) = registry.get(&element.type_id) {
                    if !descriptor.has_output_port(&connection.source_port) {
                        errors.push(CompositionError::new(
                            ErrorCode::DanglingConnection,
                            format!(
                                "element '{}' has no output port '{}'",
                                element.id, connection.source_port
                            ),
                            Some(label.clone()),
                        ));
                        dangling = true;
                    }
                }
            }
        }

        match target {
            None => {
                errors.push(CompositionError::new(
                    ErrorCode::DanglingConnection,
                    format!(
                        "connection references missing target element '{}'",
                        connection.target_element_id
                    ),
                    Some(label.clone()),
                ));
                dangling = true;
            }
            Some(element) => {
                if let Some(descriptor) = registry.get(&element.type_id) {
                    if !descriptor.has_input_port(&connection.target_port) {
                        errors.push(CompositionError::new(
                            ErrorCode::DanglingConnection,
                            format!(
                                "element '{}' has no input port '{}'",
                                element.id, connection.target_port
                            ),
                            Some(label.clone()),
                        ));
                        dangling = true;
                    }
                }
            }
        }

        if !dangling && !seen.insert(connection.clone()) {
            warnings.push(CompositionWarning::new(
                WarningCode::DuplicateConnection,
                format!("connection '{label}' is wired twice"),
                Some(label),
            ));
        }
    }
}

/// Detect cycles on the subgraph of non-reentrant element types.
///
/// Reentrant types (timers, stores) may legally close a feedback loop, so
/// any cycle containing one is fine; a cycle made purely of non-reentrant
/// elements would re-enter synchronously at runtime and is an error.
fn check_cycles(
    composition: &Composition,
    registry: &ElementRegistry,
    errors: &mut Vec<CompositionError>,
) {
    let non_reentrant: HashSet<&str> = composition
        .elements
        .iter()
        .filter(|e| {
            registry
                .get(&e.type_id)
                .map(|d| !d.reentrant)
                .unwrap_or(false)
        })
        .map(|e| e.id.as_str())
        .collect();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for connection in &composition.connections {
        let source = connection.source_element_id.as_str();
        let target = connection.target_element_id.as_str();
        if non_reentrant.contains(source) && non_reentrant.contains(target) {
            adjacency.entry(source).or_default().push(target);
        }
    }

    // Iterative three-color DFS. One error per distinct back edge; nodes in
    // sorted order so repeated validation reports cycles identically.
    let mut color: HashMap<&str, u8> = HashMap::new();
    let mut roots: Vec<&str> = non_reentrant.iter().copied().collect();
    roots.sort_unstable();

    for root in roots {
        if color.get(root).copied().unwrap_or(0) != 0 {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        color.insert(root, 1);
        while let Some(&(node, edge_index)) = stack.last() {
            let next = adjacency
                .get(node)
                .and_then(|targets| targets.get(edge_index))
                .copied();
            match next {
                Some(target) => {
                    stack.last_mut().unwrap().1 += 1;
                    match color.get(target).copied().unwrap_or(0) {
                        0 => {
                            color.insert(target, 1);
                            stack.push((target, 0));
                        }
                        1 => {
                            errors.push(CompositionError::unfixable(
                                ErrorCode::IllegalCycle,
                                format!(
                                    "elements '{target}' and '{node}' form a cycle of non-reentrant components"
                                ),
                                Some(target.to_string()),
                            ));
                        }
                        _ => {}
                    }
                }
                None => {
                    color.insert(node, 2);
                    stack.pop();
                }
            }
        }
    }
}

fn check_capacity(
    composition: &Composition,
    limits: &CapacityLimits,
    errors: &mut Vec<CompositionError>,
) {
    if composition.elements.len() > limits.max_elements {
        errors.push(CompositionError::unfixable(
            ErrorCode::CompositionTooLarge,
            format!(
                "{} elements exceeds the limit of {}",
                composition.elements.len(),
                limits.max_elements
            ),
            None,
        ));
    }
    if composition.connections.len() > limits.max_connections {
        errors.push(CompositionError::unfixable(
            ErrorCode::CompositionTooLarge,
            format!(
                "{} connections exceeds the limit of {}",
                composition.connections.len(),
                limits.max_connections
            ),
            None,
        ));
    }
}

fn check_soft(
    composition: &Composition,
    registry: &ElementRegistry,
    warnings: &mut Vec<CompositionWarning>,
) {
    if composition.is_empty() {
        warnings.push(CompositionWarning::new(
            WarningCode::EmptyComposition,
            "composition has no elements",
            None,
        ));
        return;
    }

    let used_outputs: HashSet<(&str, &str)> = composition
        .connections
        .iter()
        .map(|c| (c.source_element_id.as_str(), c.source_port.as_str()))
        .collect();

    for element in &composition.elements {
        let Some(descriptor) = registry.get(&element.type_id) else {
            continue;
        };
        for port in &descriptor.output_ports {
            if !used_outputs.contains(&(element.id.as_str(), port.as_str())) {
                warnings.push(CompositionWarning::new(
                    WarningCode::DeadOutput,
                    format!("output '{}:{}' is never consumed", element.id, port),
                    Some(element.id.clone()),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qgate_types::{Connection, Element};

    fn slider(id: &str) -> Element {
        Element::new(id, "slider")
            .with_config("min", serde_json::json!(0))
            .with_config("max", serde_json::json!(100))
    }

    fn chart(id: &str) -> Element {
        Element::new(id, "chart").with_config("chart_type", serde_json::json!("line"))
    }

    #[test]
    fn empty_composition_is_valid_with_warning() {
        let result = validate(
            &Composition::default(),
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::EmptyComposition);
    }

    #[test]
    fn missing_required_config_is_invalid_config() {
        let composition = Composition {
            elements: vec![Element::new("el-1", "slider")],
            connections: vec![],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .all(|e| e.code == ErrorCode::InvalidConfig));
        // min and max are both missing.
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn out_of_domain_config_is_invalid_config() {
        let element = Element::new("el-1", "chart").with_config("chart_type", serde_json::json!("pie"));
        let composition = Composition {
            elements: vec![element],
            connections: vec![],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert_eq!(result.error_codes(), vec![ErrorCode::InvalidConfig]);
    }

    #[test]
    fn dangling_connection_reported_exactly_once() {
        let composition = Composition {
            elements: vec![slider("el-1")],
            connections: vec![Connection::new("el-1", "value", "el-9", "data")],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(!result.valid);
        assert_eq!(result.error_codes(), vec![ErrorCode::DanglingConnection]);
        // The slider's consumed output does not warn, and the missing
        // target never double-reports.
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn undeclared_port_is_dangling() {
        let composition = Composition {
            elements: vec![slider("el-1"), chart("el-2")],
            connections: vec![Connection::new("el-1", "bogus", "el-2", "data")],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert_eq!(result.error_codes(), vec![ErrorCode::DanglingConnection]);
    }

    #[test]
    fn self_connection_is_an_error() {
        let mut formula = Element::new("el-1", "formula");
        formula
            .config
            .insert("expression".into(), serde_json::json!("a + b"));
        let composition = Composition {
            elements: vec![formula],
            connections: vec![Connection::new("el-1", "result", "el-1", "a")],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert_eq!(result.error_codes(), vec![ErrorCode::SelfConnection]);
    }

    #[test]
    fn non_reentrant_cycle_is_illegal() {
        let mut f1 = Element::new("el-1", "formula");
        f1.config
            .insert("expression".into(), serde_json::json!("a * 2"));
        let mut f2 = Element::new("el-2", "formula");
        f2.config
            .insert("expression".into(), serde_json::json!("a + 1"));
        let composition = Composition {
            elements: vec![f1, f2],
            connections: vec![
                Connection::new("el-1", "result", "el-2", "a"),
                Connection::new("el-2", "result", "el-1", "a"),
            ],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(result
            .error_codes()
            .contains(&ErrorCode::IllegalCycle));
        assert!(result.has_unfixable_error());
    }

    #[test]
    fn cycle_through_reentrant_element_is_legal() {
        let mut formula = Element::new("el-1", "formula");
        formula
            .config
            .insert("expression".into(), serde_json::json!("a + 1"));
        let store = Element::new("el-2", "store");
        let composition = Composition {
            elements: vec![formula, store],
            connections: vec![
                Connection::new("el-1", "result", "el-2", "set"),
                Connection::new("el-2", "value", "el-1", "a"),
            ],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(!result.error_codes().contains(&ErrorCode::IllegalCycle));
    }

    #[test]
    fn duplicate_ids_error_once_per_id() {
        let composition = Composition {
            elements: vec![slider("el-1"), slider("el-1"), slider("el-1")],
            connections: vec![],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        let duplicates: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.code == ErrorCode::DuplicateId)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].offending_id.as_deref(), Some("el-1"));
    }

    #[test]
    fn capacity_limit_is_unfixable() {
        let elements: Vec<Element> = (0..5).map(|i| slider(&format!("el-{i}"))).collect();
        let composition = Composition {
            elements,
            connections: vec![],
        };
        let limits = CapacityLimits {
            max_elements: 3,
            max_connections: 10,
        };
        let result = validate(&composition, &ElementRegistry::standard(), &limits);
        assert!(result
            .error_codes()
            .contains(&ErrorCode::CompositionTooLarge));
        assert!(result.has_unfixable_error());
    }

    #[test]
    fn dead_output_is_a_warning_only() {
        let composition = Composition {
            elements: vec![slider("el-1")],
            connections: vec![],
        };
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::DeadOutput);
    }

    #[test]
    fn validation_is_deterministic() {
        let composition = Composition {
            elements: vec![slider("el-1"), Element::new("el-2", "mystery"), chart("el-3")],
            connections: vec![
                Connection::new("el-1", "value", "el-3", "data"),
                Connection::new("el-1", "value", "el-9", "data"),
            ],
        };
        let registry = ElementRegistry::standard();
        let limits = CapacityLimits::default();
        let first = validate(&composition, &registry, &limits);
        for _ in 0..10 {
            assert_eq!(validate(&composition, &registry, &limits), first);
        }
    }
}
