//! The quality gate: score, decide, repair.
//!
//! Scoring starts at 100 and subtracts configured penalties per finding.
//! The decision runs as an explicit two-pass loop (validate, maybe fix,
//! validate once more), so "fix once, never twice" is structural rather
//! than a recursion-depth promise. Fix application is transactional: either
//! every remaining error has a registered fix and all of them apply, or the
//! composition and its errors are returned untouched.

use crate::error::{PipelineError, Result};
use crate::validator::{validate, CapacityLimits};
use qgate_types::{
    AutoFix, AutoFixKind, Composition, CompositionError, ElementRegistry, ErrorCode, GateDecision,
    GateResult, GateThresholds, ValidationResult,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// A deterministic repair for one error. Returns the fixed composition and
/// a description of what changed, or `None` when the error is not one this
/// fix can address (the gate then rejects).
type FixFn = fn(&Composition, &CompositionError, &ElementRegistry) -> Option<(Composition, AutoFix)>;

/// Registered auto-fixes, keyed by error code.
pub struct FixRegistry {
    fixes: HashMap<ErrorCode, FixFn>,
}

impl Default for FixRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FixRegistry {
    pub fn empty() -> Self {
        Self {
            fixes: HashMap::new(),
        }
    }

    /// The standard repair set: drop bad wires, fill missing config with
    /// registry defaults, rename colliding ids.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(ErrorCode::DanglingConnection, fix_drop_connection);
        registry.register(ErrorCode::SelfConnection, fix_drop_connection);
        registry.register(ErrorCode::InvalidConfig, fix_fill_default_config);
        registry.register(ErrorCode::DuplicateId, fix_reassign_id);
        registry
    }

    pub fn register(&mut self, code: ErrorCode, fix: FixFn) {
        self.fixes.insert(code, fix);
    }

    pub fn has_fix_for(&self, code: ErrorCode) -> bool {
        self.fixes.contains_key(&code)
    }

    fn get(&self, code: ErrorCode) -> Option<FixFn> {
        self.fixes.get(&code).copied()
    }
}

/// Score a validation result against the thresholds. Floors at 0.
pub fn score(validation: &ValidationResult, thresholds: &GateThresholds) -> f64 {
    let mut score = 100.0;
    for error in &validation.errors {
        score -= thresholds.error_penalty(error.code);
    }
    score -= thresholds.warning_penalty * validation.warnings.len() as f64;
    score.max(0.0)
}

/// Gate a validated composition: accept, auto-fix, or reject.
///
/// The input composition is never mutated; repairs build a new value. An
/// `Err` here means a misconfigured fix registry, not a property of the
/// composition.
pub fn gate(
    composition: &Composition,
    validation: &ValidationResult,
    thresholds: &GateThresholds,
    fixes: &FixRegistry,
    registry: &ElementRegistry,
    limits: &CapacityLimits,
) -> Result<GateResult> {
    let mut current = composition.clone();
    let mut current_validation = validation.clone();
    let mut applied_fixes: Vec<AutoFix> = Vec::new();

    // Pass 0 decides on the raw composition; pass 1 runs at most once, on
    // the repaired one.
    for pass in 0..2 {
        let current_score = score(&current_validation, thresholds);

        if current_validation.has_unfixable_error() {
            debug!(pass, score = current_score, "unfixable error, rejecting");
            return Ok(rejected(current_score, current_validation.errors));
        }

        if current_score >= thresholds.min_accept_score && current_validation.errors.is_empty() {
            let decision = if applied_fixes.is_empty() {
                GateDecision::Accept
            } else {
                GateDecision::AutoFix
            };
            info!(pass, score = current_score, %decision, "gate passed");
            return Ok(GateResult {
                decision,
                score: current_score,
                applied_fixes,
                remaining_issues: vec![],
            });
        }

        let all_fixable = !current_validation.errors.is_empty()
            && current_validation
                .errors
                .iter()
                .all(|e| fixes.has_fix_for(e.code));

        if pass == 0 && current_score >= thresholds.auto_fix_score && all_fixable {
            let (fixed, fix_log) = apply_fixes(&current, &current_validation.errors, fixes, registry)?;
            debug!(fixes = fix_log.len(), "applied auto-fixes, re-validating");
            current = fixed;
            applied_fixes = fix_log;
            current_validation = validate(&current, registry, limits);
            continue;
        }

        warn!(
            pass,
            score = current_score,
            errors = current_validation.errors.len(),
            "gate rejected composition"
        );
        return Ok(rejected(current_score, current_validation.errors));
    }

    unreachable!("gate loop always returns within two passes")
}

fn rejected(score: f64, remaining: Vec<CompositionError>) -> GateResult {
    GateResult {
        decision: GateDecision::Reject,
        score,
        applied_fixes: vec![],
        remaining_issues: remaining,
    }
}

/// Apply registered fixes in error-discovery order.
///
/// All-or-nothing. A fix may find its error already repaired by an earlier
/// fix of the same batch (two missing fields on one element fill together),
/// which is fine. A second fix that would modify an already-modified target
/// is a conflict in the registry configuration and aborts the whole
/// application; precedence is never guessed.
fn apply_fixes(
    composition: &Composition,
    errors: &[CompositionError],
    fixes: &FixRegistry,
    registry: &ElementRegistry,
) -> Result<(Composition, Vec<AutoFix>)> {
    let mut current = composition.clone();
    let mut applied = Vec::new();
    let mut touched: HashSet<String> = HashSet::new();

    for error in errors {
        let Some(fix) = fixes.get(error.code) else {
            return Err(PipelineError::Generation {
                message: format!("no registered fix for error '{}'", error.code),
            });
        };
        match fix(&current, error, registry) {
            Some((next, record)) => {
                if !touched.insert(record.target_id.clone()) {
                    return Err(PipelineError::FixConflict {
                        target_id: record.target_id,
                    });
                }
                current = next;
                applied.push(record);
            }
            None => {
                let already_repaired = error
                    .offending_id
                    .as_deref()
                    .map(|id| touched.contains(id))
                    .unwrap_or(false);
                if !already_repaired {
                    return Err(PipelineError::Generation {
                        message: format!("registered fix declined error '{}'", error.code),
                    });
                }
            }
        }
    }

    Ok((current, applied))
}

/// Drop the connection named by the error's offending id.
fn fix_drop_connection(
    composition: &Composition,
    error: &CompositionError,
    _registry: &ElementRegistry,
) -> Option<(Composition, AutoFix)> {
    let label = error.offending_id.as_deref()?;
    let mut fixed = composition.clone();
    let before = fixed.connections.len();
    fixed.connections.retain(|c| c.label() != label);
    if fixed.connections.len() == before {
        return None;
    }
    Some((
        fixed,
        AutoFix {
            kind: AutoFixKind::DropConnection,
            target_id: label.to_string(),
            description: format!("removed broken connection '{label}'"),
        },
    ))
}

/// Fill every missing or out-of-domain config field of the offending
/// element with the registry default.
fn fix_fill_default_config(
    composition: &Composition,
    error: &CompositionError,
    registry: &ElementRegistry,
) -> Option<(Composition, AutoFix)> {
    let element_id = error.offending_id.as_deref()?;
    let mut fixed = composition.clone();
    let element = fixed.elements.iter_mut().find(|e| e.id == element_id)?;
    let descriptor = registry.get(&element.type_id)?;

    let mut filled = Vec::new();
    for field in &descriptor.config_fields {
        let needs_fill = match element.config.get(&field.name) {
            Some(value) => !field.kind.accepts(value),
            None => field.required,
        };
        if needs_fill {
            element
                .config
                .insert(field.name.clone(), field.kind.default_value());
            filled.push(field.name.clone());
        }
    }
    if filled.is_empty() {
        return None;
    }
    Some((
        fixed,
        AutoFix {
            kind: AutoFixKind::FillDefaultConfig,
            target_id: element_id.to_string(),
            description: format!(
                "filled default config for '{}': {}",
                element_id,
                filled.join(", ")
            ),
        },
    ))
}

/// Give every duplicate occurrence after the first a deterministic
/// suffixed id. Connections keep pointing at the first occurrence.
fn fix_reassign_id(
    composition: &Composition,
    error: &CompositionError,
    _registry: &ElementRegistry,
) -> Option<(Composition, AutoFix)> {
    let duplicate_id = error.offending_id.as_deref()?;
    let mut fixed = composition.clone();
    let mut occurrence = 0usize;
    let mut renamed = Vec::new();
    for element in fixed.elements.iter_mut() {
        if element.id == duplicate_id {
            if occurrence > 0 {
                let new_id = format!("{duplicate_id}-dup{occurrence}");
                renamed.push(new_id.clone());
                element.id = new_id;
            }
            occurrence += 1;
        }
    }
    if renamed.is_empty() {
        return None;
    }
    Some((
        fixed,
        AutoFix {
            kind: AutoFixKind::ReassignId,
            target_id: duplicate_id.to_string(),
            description: format!(
                "renamed duplicate element id '{}' to {}",
                duplicate_id,
                renamed.join(", ")
            ),
        },
    ))
}
