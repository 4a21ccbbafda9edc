//! Occupant inference.
//!
//! A canonical household name like `John and Mary Smith` names two people.
//! When only one of them has a row, the other one is synthesized from the
//! name text and, where possible, linked to an existing directory contact.
//!
//! # Invariants
//! - Households whose name lacks the conjunction are never inferred on.
//! - An excluded reference row never seeds inference.
//! - At most one row is synthesized per household, and it always carries a
//!   fix note.

use crate::config::HouseholdRules;
use crate::directory::DirectoryIndex;
use crate::model::{Household, Households, Row};

/// Why no occupant was inferred for a two-person household name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The reference row was excluded during normalization.
    ReferenceExcluded,
    /// The reference row's own name equals the household name or names several people.
    SuspiciousReferenceName,
    /// More than two occupants implied.
    TooManyConjunctions,
    /// Several members already have directory contacts.
    AlreadyAffiliated,
    /// Both sides of the conjunction name the reference contact.
    SameContactTwice,
    /// The reference contact's name is not part of the household name.
    ReferenceNotInName,
    /// The side of the conjunction naming the other occupant is blank.
    EmptyOccupant,
}

impl SkipReason {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ReferenceExcluded => "reference_excluded",
            Self::SuspiciousReferenceName => "suspicious_reference_name",
            Self::TooManyConjunctions => "too_many_conjunctions",
            Self::AlreadyAffiliated => "already_affiliated",
            Self::SameContactTwice => "same_contact_twice",
            Self::ReferenceNotInName => "reference_not_in_name",
            Self::EmptyOccupant => "empty_occupant",
        }
    }

    fn note(&self, rules: &HouseholdRules) -> String {
        match self {
            Self::ReferenceExcluded => {
                "Ignoring household because its first contact was excluded".into()
            }
            Self::SuspiciousReferenceName => {
                "Ignoring because existing contact has a suspicious name".into()
            }
            Self::TooManyConjunctions => {
                format!("Ignoring because too many '{}s'", rules.conjunction_word())
            }
            Self::AlreadyAffiliated => {
                "Ignoring because several household members already have directory contacts".into()
            }
            Self::SameContactTwice => "Ignoring because the same contact appears twice".into(),
            Self::ReferenceNotInName => {
                "Ignoring because contact doesn't appear in household name".into()
            }
            Self::EmptyOccupant => "Ignoring because the other occupant's name is empty".into(),
        }
    }
}

/// What inference did for one household.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inference {
    /// Name has no conjunction.
    NotApplicable,
    Skipped(SkipReason),
    /// The inferred occupant already has a row in the household.
    AlreadyListed { full_name: String },
    /// A row was synthesized; `matched` tells whether it found a directory contact.
    Created { full_name: String, matched: bool },
}

/// Run inference over every household, in order.
///
/// Households without the conjunction are left alone, except that a warning
/// is noted on the first member when several rows share the name.
pub fn infer_occupants(
    rules: &HouseholdRules,
    index: &DirectoryIndex,
    households: &mut Households,
) -> Vec<Inference> {
    households
        .iter_mut()
        .map(|household| {
            if household.name.contains(rules.conjunction.as_str()) {
                infer_household(rules, index, household)
            } else {
                flag_crowded(household);
                Inference::NotApplicable
            }
        })
        .collect()
}

/// Infer the second occupant of one household, if it is safe to.
pub fn infer_household(
    rules: &HouseholdRules,
    index: &DirectoryIndex,
    household: &mut Household,
) -> Inference {
    let Some(at) = household.name.find(rules.conjunction.as_str()) else {
        return Inference::NotApplicable;
    };
    if household.members.is_empty() {
        return Inference::NotApplicable;
    }

    match occupant_text(rules, household, at) {
        Ok(text) => synthesize(index, household, &text),
        Err(reason) => {
            log::debug!("no inference for '{}': {}", household.name, reason.key());
            household.members[0].ignore_notes.push(reason.note(rules));
            Inference::Skipped(reason)
        }
    }
}

/// Decide whether inference may proceed and extract the other occupant's name text.
fn occupant_text(
    rules: &HouseholdRules,
    household: &Household,
    at: usize,
) -> Result<String, SkipReason> {
    let name = household.name.as_str();
    let reference = &household.members[0];

    if reference.is_excluded() {
        return Err(SkipReason::ReferenceExcluded);
    }
    if reference.full_name == name || rules.names_several(&reference.full_name) {
        return Err(SkipReason::SuspiciousReferenceName);
    }

    let before = &name[..at];
    let after = &name[at + rules.conjunction.len()..];
    if after.contains(rules.conjunction.as_str()) {
        return Err(SkipReason::TooManyConjunctions);
    }
    if household.contact_count() > 1 {
        return Err(SkipReason::AlreadyAffiliated);
    }

    let last_name_suffix = format!(" {}", reference.last_name);
    let first = before.to_lowercase();
    let second = after
        .strip_suffix(last_name_suffix.as_str())
        .unwrap_or(after)
        .to_lowercase();
    if first == second
        && (first == reference.first_name.to_lowercase()
            || first == reference.full_name.to_lowercase())
    {
        return Err(SkipReason::SameContactTwice);
    }

    let position = |needle: &str| {
        if needle.is_empty() {
            None
        } else {
            name.find(needle)
        }
    };
    let at_full = position(&reference.full_name);
    let at_first = position(&reference.first_name);
    if at_full.is_none() && at_first.is_none() {
        return Err(SkipReason::ReferenceNotInName);
    }

    let reference_is_second =
        at_full.is_some_and(|i| i > at) || at_first.is_some_and(|i| i > at);
    let text = if reference_is_second { before } else { after }.trim();
    if text.is_empty() {
        return Err(SkipReason::EmptyOccupant);
    }
    Ok(text.to_string())
}

fn synthesize(index: &DirectoryIndex, household: &mut Household, text: &str) -> Inference {
    let reference = &household.members[0];
    let (first_name, last_name, full_name) = match text.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string(), text.to_string()),
        None => {
            let full = format!("{} {}", text, reference.last_name);
            (
                text.to_string(),
                reference.last_name.clone(),
                full.trim_end().to_string(),
            )
        }
    };

    let lowered = full_name.to_lowercase();
    if household
        .members
        .iter()
        .any(|m| m.full_name.to_lowercase() == lowered)
    {
        household.members[0]
            .fix_notes
            .push(format!("Occupant {full_name} is already listed in this household"));
        return Inference::AlreadyListed { full_name };
    }

    let mut row = Row::inferred(first_name, last_name, full_name.clone(), reference);
    row.fix_notes.push(format!("Created contact {full_name}"));

    let matched = match index.get(&full_name) {
        Some(contact) => {
            row.contact = Some(contact.to_ref());
            row.fix_notes
                .push(format!("Guessed affiliate contact {}", contact.name));
            true
        }
        None => {
            row.fix_notes.push(format!(
                "Warning: guessed affiliate {full_name} has no directory match"
            ));
            false
        }
    };

    log::debug!(
        "inferred {} in '{}' (directory match: {})",
        full_name,
        household.name,
        matched
    );
    household.members.push(row);
    Inference::Created { full_name, matched }
}

fn flag_crowded(household: &mut Household) {
    let count = household.members.len();
    if count > 1 {
        let note = format!("Warning: {} contacts in this household: {}", count, household.name);
        household.members[0].fix_notes.push(note);
    }
}
