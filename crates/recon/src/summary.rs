use crate::affiliate::AffiliationTally;
use crate::infer::Inference;
use crate::model::{Households, RunSummary};
use crate::normalize::Normalized;

/// Compute summary statistics from the per-stage outcomes of a run.
pub fn compute_summary(
    households: &Households,
    normalized: &[Normalized],
    inferences: &[Inference],
    affiliations: AffiliationTally,
) -> RunSummary {
    let mut summary = RunSummary {
        rows_read: normalized.len(),
        households: households.len(),
        affiliation_updates: affiliations.updated,
        affiliation_unchanged: affiliations.unchanged,
        affiliation_unknown_contacts: affiliations.unknown,
        ..RunSummary::default()
    };

    for outcome in normalized {
        if let Normalized::Excluded(reason) = outcome {
            summary.excluded_rows += 1;
            *summary.exclusions.entry(reason.key().to_string()).or_insert(0) += 1;
        }
    }

    for inference in inferences {
        match inference {
            Inference::NotApplicable => {}
            Inference::Skipped(reason) => {
                summary.conjunction_households += 1;
                *summary
                    .skipped_inference
                    .entry(reason.key().to_string())
                    .or_insert(0) += 1;
            }
            Inference::AlreadyListed { .. } => {
                summary.conjunction_households += 1;
                *summary
                    .skipped_inference
                    .entry("already_listed".to_string())
                    .or_insert(0) += 1;
            }
            Inference::Created { matched, .. } => {
                summary.conjunction_households += 1;
                summary.inferred_occupants += 1;
                if *matched {
                    summary.inferred_matched += 1;
                } else {
                    summary.inferred_unmatched += 1;
                }
            }
        }
    }

    summary
}
