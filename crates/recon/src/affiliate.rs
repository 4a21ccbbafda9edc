use crate::config::HouseholdRules;
use crate::directory::{AffiliationStore, DirectoryIndex, MergeOutcome};
use crate::model::{ContactRef, Household, Households};

/// Directory write counts for one or more households.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AffiliationTally {
    pub updated: usize,
    pub unchanged: usize,
    pub unknown: usize,
}

impl AffiliationTally {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Unchanged => self.unchanged += 1,
            MergeOutcome::UnknownContact => self.unknown += 1,
        }
    }

    fn add(&mut self, other: AffiliationTally) {
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.unknown += other.unknown;
    }
}

/// Build affiliations for every two-person household, one household at a time.
///
/// Each household's writes complete before the next household is read, so
/// later households see earlier updates in `index`.
pub fn build_all_affiliations<S: AffiliationStore>(
    rules: &HouseholdRules,
    households: &mut Households,
    index: &mut DirectoryIndex,
    store: &mut S,
) -> Result<AffiliationTally, S::Error> {
    let mut tally = AffiliationTally::default();
    for household in households.iter_mut() {
        if household.name.contains(rules.conjunction.as_str()) {
            tally.add(build_affiliations(household, index, store)?);
        }
    }
    Ok(tally)
}

/// Link every member that has a directory contact to every other member that
/// has one.
///
/// Members without a contact cannot be linked; each linked member gets a note
/// naming them instead. Single-member households are skipped.
pub fn build_affiliations<S: AffiliationStore>(
    household: &mut Household,
    index: &mut DirectoryIndex,
    store: &mut S,
) -> Result<AffiliationTally, S::Error> {
    let mut tally = AffiliationTally::default();
    if household.members.len() < 2 {
        return Ok(tally);
    }

    let snapshot: Vec<(Option<ContactRef>, String)> = household
        .members
        .iter()
        .map(|m| (m.contact.clone(), m.full_name.clone()))
        .collect();

    for (i, member) in household.members.iter_mut().enumerate() {
        let Some(own) = member.contact.as_ref() else {
            continue;
        };

        let mut ids = Vec::new();
        let mut names = Vec::new();
        for (j, (contact, full_name)) in snapshot.iter().enumerate() {
            if j == i {
                continue;
            }
            match contact {
                Some(other) if other.id == own.id => {}
                Some(other) => {
                    ids.push(other.id.clone());
                    names.push(other.name.clone());
                }
                None => member
                    .fix_notes
                    .push(format!("No contact for affiliate {full_name}")),
            }
        }

        let outcome = index.merge_update(&own.id, &ids, store)?;
        if outcome == MergeOutcome::UnknownContact {
            log::warn!("contact {} ({}) is not in the directory index", own.name, own.id);
        }
        tally.record(outcome);
        member.affiliated_names = Some(names);
    }

    Ok(tally)
}
