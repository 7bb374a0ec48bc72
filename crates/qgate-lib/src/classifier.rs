//! Failure classification and trend aggregation.
//!
//! Every finding code maps to exactly one [`FailureType`]; both matches are
//! total over closed enums, so an unmapped code cannot be represented.
//! Aggregation is a pure fold over tracked history and can be recomputed at
//! any time.

use qgate_types::{
    ErrorCode, FailureStats, FailureType, GenerationTrackingData, WarningCode,
};

/// Classify a structural error code.
pub fn classify_error(code: ErrorCode) -> FailureType {
    match code {
        ErrorCode::InvalidConfig => FailureType::InvalidConfig,
        ErrorCode::UnknownElementType => FailureType::InvalidConfig,
        ErrorCode::DanglingConnection => FailureType::BrokenGraph,
        ErrorCode::SelfConnection => FailureType::BrokenGraph,
        ErrorCode::IllegalCycle => FailureType::Cycle,
        ErrorCode::CompositionTooLarge => FailureType::OversizedComposition,
        ErrorCode::DuplicateId => FailureType::DuplicateIdentity,
    }
}

/// Classify a soft finding code.
pub fn classify_warning(code: WarningCode) -> FailureType {
    match code {
        WarningCode::EmptyComposition => FailureType::Cosmetic,
        WarningCode::DeadOutput => FailureType::Cosmetic,
        WarningCode::DuplicateConnection => FailureType::Cosmetic,
    }
}

/// Fold tracked generations into failure counts.
///
/// Collaborator faults count through the record's `failure` marker;
/// otherwise every remaining structural issue is classified. Clean accepted
/// records contribute nothing.
pub fn aggregate(records: &[GenerationTrackingData]) -> FailureStats {
    let mut stats = FailureStats::default();
    for record in records {
        if let Some(failure) = record.failure {
            stats.bump(failure);
            continue;
        }
        for issue in &record.gate_result.remaining_issues {
            stats.bump(classify_error(issue.code));
        }
    }
    stats
}
