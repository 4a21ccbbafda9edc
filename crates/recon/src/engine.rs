use crate::affiliate::{build_all_affiliations, AffiliationTally};
use crate::config::HouseholdRules;
use crate::directory::{AffiliationStore, DirectoryIndex};
use crate::group::group_households;
use crate::infer::infer_occupants;
use crate::model::{HouseholdResult, Row, RunMeta};
use crate::normalize::{normalize, Normalized};
use crate::summary::compute_summary;

/// Link input rows to directory contacts by case-insensitive full name.
/// Rows that already carry a contact are left alone. Returns the number linked.
pub fn attach_contacts(rows: &mut [Row], index: &DirectoryIndex) -> usize {
    let mut linked = 0;
    for row in rows.iter_mut().filter(|r| r.contact.is_none()) {
        if let Some(contact) = index.get(&row.full_name) {
            row.contact = Some(contact.to_ref());
            linked += 1;
        }
    }
    linked
}

/// Normalize and group only. No directory is consulted.
pub fn canonicalize(rules: &HouseholdRules, mut rows: Vec<Row>) -> HouseholdResult {
    let normalized = normalize_all(rules, &mut rows);
    let households = group_households(rows);
    let summary = compute_summary(&households, &normalized, &[], AffiliationTally::default());

    HouseholdResult {
        meta: RunMeta::now(),
        summary,
        households,
    }
}

/// Full pipeline: link contacts, normalize, group, infer occupants, build
/// affiliations. Affiliation writes go through `store`; the first write
/// failure aborts the run.
pub fn run<S: AffiliationStore>(
    rules: &HouseholdRules,
    mut rows: Vec<Row>,
    index: &mut DirectoryIndex,
    store: &mut S,
) -> Result<HouseholdResult, S::Error> {
    let linked = attach_contacts(&mut rows, index);
    log::info!("{} of {} rows matched a directory contact", linked, rows.len());

    let normalized = normalize_all(rules, &mut rows);
    let mut households = group_households(rows);

    let inferences = infer_occupants(rules, index, &mut households);
    let tally = build_all_affiliations(rules, &mut households, index, store)?;

    let summary = compute_summary(&households, &normalized, &inferences, tally);
    log::info!(
        "Inferred {} occupants ({} matched, {} unmatched) across {} two-person households",
        summary.inferred_occupants,
        summary.inferred_matched,
        summary.inferred_unmatched,
        summary.conjunction_households,
    );
    log::info!(
        "Affiliations: {} updated, {} unchanged, {} unknown contacts",
        summary.affiliation_updates,
        summary.affiliation_unchanged,
        summary.affiliation_unknown_contacts,
    );

    Ok(HouseholdResult {
        meta: RunMeta::now(),
        summary,
        households,
    })
}

fn normalize_all(rules: &HouseholdRules, rows: &mut [Row]) -> Vec<Normalized> {
    let outcomes: Vec<Normalized> = rows.iter_mut().map(|row| normalize(rules, row)).collect();
    let excluded = outcomes
        .iter()
        .filter(|o| matches!(o, Normalized::Excluded(_)))
        .count();
    log::info!("Normalized {} rows, {} excluded", outcomes.len(), excluded);
    outcomes
}
