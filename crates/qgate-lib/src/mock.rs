//! Deterministic mock generator for tests and offline benchmarks.
//!
//! Seeded from the prompt text, so the same prompt always yields the same
//! composition. Prompts can opt into specific defects with markers such as
//! "broken wire" or "mystery component"; the benchmark suite uses these to
//! exercise every gate path without a live model.

use crate::pipeline::{GenerationConstraints, Generator, GeneratorError};
use async_trait::async_trait;
use qgate_types::{Composition, Connection, Element, Position, Size};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Offline stand-in for the generative model.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    fn seed_for(prompt: &str) -> u64 {
        // FNV-1a keeps the generator free of platform-dependent hashing.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in prompt.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }

    fn build(&self, prompt: &str, constraints: &GenerationConstraints) -> Composition {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(prompt));
        let prompt_lower = prompt.to_lowercase();

        if prompt_lower.contains("blank canvas") {
            return Composition::default();
        }

        if prompt_lower.contains("sprawling") {
            // Deliberately one over the element limit.
            let elements = (0..=constraints.max_elements)
                .map(|i| {
                    Element::new(format!("el-{i}"), "text")
                        .with_config("content", serde_json::json!(format!("block {i}")))
                })
                .collect();
            return Composition {
                elements,
                connections: vec![],
            };
        }

        let mut composition = self.well_formed(&mut rng);

        if prompt_lower.contains("broken wire") {
            composition
                .connections
                .push(Connection::new("el-slider", "value", "el-ghost", "data"));
        }
        if prompt_lower.contains("mystery component") {
            composition
                .elements
                .push(Element::new("el-mystery", "hologram"));
        }
        if prompt_lower.contains("forgotten settings") {
            if let Some(element) = composition
                .elements
                .iter_mut()
                .find(|e| e.id == "el-slider")
            {
                element.config.clear();
            }
        }
        if prompt_lower.contains("tangled loop") {
            let mut f1 = Element::new("el-loop-a", "formula");
            f1.config
                .insert("expression".into(), serde_json::json!("a * 2"));
            let mut f2 = Element::new("el-loop-b", "formula");
            f2.config
                .insert("expression".into(), serde_json::json!("a - 1"));
            composition.elements.push(f1);
            composition.elements.push(f2);
            composition
                .connections
                .push(Connection::new("el-loop-a", "result", "el-loop-b", "a"));
            composition
                .connections
                .push(Connection::new("el-loop-b", "result", "el-loop-a", "a"));
        }
        if prompt_lower.contains("twin blocks") {
            let duplicate = composition.elements[0].clone();
            composition.elements.push(duplicate);
        }

        composition
    }

    /// A small valid tool: an input, a formula, and a display, wired up.
    fn well_formed(&self, rng: &mut StdRng) -> Composition {
        let max = rng.gen_range(50..=200);
        let slider = Element {
            id: "el-slider".into(),
            type_id: "slider".into(),
            position: Position { x: 40.0, y: 40.0 },
            size: Size {
                width: 200.0,
                height: 40.0,
            },
            config: [
                ("min".to_string(), serde_json::json!(0)),
                ("max".to_string(), serde_json::json!(max)),
            ]
            .into_iter()
            .collect(),
            z_index: 0,
            visible: true,
            locked: false,
        };
        let mut formula = Element::new("el-formula", "formula");
        formula
            .config
            .insert("expression".into(), serde_json::json!("a * a"));
        formula.position = Position { x: 300.0, y: 40.0 };
        let mut chart = Element::new("el-chart", "chart");
        chart
            .config
            .insert("chart_type".into(), serde_json::json!("line"));
        chart.position = Position { x: 560.0, y: 40.0 };
        chart.size = Size {
            width: 320.0,
            height: 240.0,
        };

        Composition {
            elements: vec![slider, formula, chart],
            connections: vec![
                Connection::new("el-slider", "value", "el-formula", "a"),
                Connection::new("el-formula", "result", "el-chart", "data"),
            ],
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        constraints: &GenerationConstraints,
    ) -> Result<Composition, GeneratorError> {
        if prompt.to_lowercase().contains("unavailable model") {
            return Err(GeneratorError::Failed("model unavailable".into()));
        }
        Ok(self.build(prompt, constraints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{validate, CapacityLimits};
    use qgate_types::{ElementRegistry, ErrorCode};

    async fn generate(prompt: &str) -> Composition {
        MockGenerator::new()
            .generate(prompt, &GenerationConstraints::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn same_prompt_same_composition() {
        let a = generate("build a compound interest calculator").await;
        let b = generate("build a compound interest calculator").await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn plain_prompt_is_valid() {
        let composition = generate("build a squared-value plotter").await;
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(result.valid, "errors: {:?}", result.errors);
    }

    #[tokio::test]
    async fn broken_wire_marker_produces_dangling_connection() {
        let composition = generate("a plotter with a broken wire").await;
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert_eq!(result.error_codes(), vec![ErrorCode::DanglingConnection]);
    }

    #[tokio::test]
    async fn sprawling_marker_exceeds_capacity() {
        let composition = generate("a sprawling mega dashboard").await;
        let result = validate(
            &composition,
            &ElementRegistry::standard(),
            &CapacityLimits::default(),
        );
        assert!(result
            .error_codes()
            .contains(&ErrorCode::CompositionTooLarge));
    }
}
