use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter};

/// Closed failure-type taxonomy used for trend aggregation.
///
/// `Other` exists only so snapshots written by a newer pipeline version can
/// still be deserialized and counted; the in-process classifier never
/// produces it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureType {
    InvalidConfig,
    BrokenGraph,
    Cycle,
    OversizedComposition,
    DuplicateIdentity,
    Cosmetic,
    /// The external generator threw or returned garbage.
    GenerationError,
    /// The external generator exceeded its deadline.
    Timeout,
    Other,
}

// Hand-written so unknown tags from newer pipeline versions land on
// `Other` instead of failing the whole snapshot.
impl<'de> Deserialize<'de> for FailureType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "invalid_config" => Self::InvalidConfig,
            "broken_graph" => Self::BrokenGraph,
            "cycle" => Self::Cycle,
            "oversized_composition" => Self::OversizedComposition,
            "duplicate_identity" => Self::DuplicateIdentity,
            "cosmetic" => Self::Cosmetic,
            "generation_error" => Self::GenerationError,
            "timeout" => Self::Timeout,
            _ => Self::Other,
        })
    }
}

/// Derived failure counts over a set of tracked generations. Never
/// authoritative state; recomputed by folding over history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FailureStats {
    pub counts: BTreeMap<FailureType, u64>,
    pub total: u64,
}

impl FailureStats {
    pub fn bump(&mut self, failure: FailureType) {
        *self.counts.entry(failure).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, failure: FailureType) -> u64 {
        self.counts.get(&failure).copied().unwrap_or(0)
    }
}
