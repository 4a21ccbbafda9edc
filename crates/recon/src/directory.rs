//! In-memory projection of the contact directory.
//!
//! The index is filled once before inference and afterwards only changes
//! through [`DirectoryIndex::merge_update`], which writes through an
//! [`AffiliationStore`] before touching the in-memory copy.

use std::collections::{BTreeSet, HashMap};
use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::model::ContactRef;

/// An existing contact in the external directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    /// Ids of affiliated contacts.
    pub affiliations: Vec<String>,
}

impl Contact {
    pub fn to_ref(&self) -> ContactRef {
        ContactRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Contacts keyed by lowercased full name (and by id for updates).
#[derive(Debug, Clone, Default)]
pub struct DirectoryIndex {
    contacts: Vec<Contact>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

/// What a merge-update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Proposed ids were new; the union was written.
    Updated,
    /// Proposed ids were already present; nothing written.
    Unchanged,
    /// The contact id is not in this index.
    UnknownContact,
}

/// Write side of the directory.
pub trait AffiliationStore {
    type Error;

    /// Replace `contact`'s affiliation list with `affiliations` (sorted, deduplicated).
    fn write_affiliations(
        &mut self,
        contact: &Contact,
        affiliations: &[String],
    ) -> Result<(), Self::Error>;
}

/// Store that never writes. Used for offline and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl AffiliationStore for DryRun {
    type Error = Infallible;

    fn write_affiliations(&mut self, _: &Contact, _: &[String]) -> Result<(), Infallible> {
        Ok(())
    }
}

impl DirectoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let mut index = Self::new();
        for contact in contacts {
            index.insert(contact);
        }
        index
    }

    /// Add a contact. A later contact with the same name shadows the earlier
    /// one for name lookups; both stay reachable by id.
    pub fn insert(&mut self, contact: Contact) {
        let slot = self.contacts.len();
        self.by_name.insert(contact.name.to_lowercase(), slot);
        self.by_id.insert(contact.id.clone(), slot);
        self.contacts.push(contact);
    }

    /// Number of distinct names that can be looked up.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Case-insensitive lookup by full name.
    pub fn get(&self, full_name: &str) -> Option<&Contact> {
        self.by_name
            .get(&full_name.to_lowercase())
            .map(|&i| &self.contacts[i])
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Contact> {
        self.by_id.get(id).map(|&i| &self.contacts[i])
    }

    /// Merge `proposed` into the contact's affiliations.
    ///
    /// The store is called only when `proposed` adds an id the contact does
    /// not already have; the in-memory contact is refreshed after a
    /// successful write.
    pub fn merge_update<S: AffiliationStore>(
        &mut self,
        contact_id: &str,
        proposed: &[String],
        store: &mut S,
    ) -> Result<MergeOutcome, S::Error> {
        let Some(&slot) = self.by_id.get(contact_id) else {
            return Ok(MergeOutcome::UnknownContact);
        };

        let contact = &self.contacts[slot];
        let Some(merged) = merge_affiliations(&contact.affiliations, proposed) else {
            return Ok(MergeOutcome::Unchanged);
        };

        store.write_affiliations(contact, &merged)?;
        log::debug!(
            "affiliations for {} ({}) now {}",
            contact.name,
            contact.id,
            merged.len()
        );
        self.contacts[slot].affiliations = merged;
        Ok(MergeOutcome::Updated)
    }
}

/// Sorted union of `existing` and `proposed`, or `None` when `proposed` adds
/// nothing (as sets) to `existing`.
pub fn merge_affiliations(existing: &[String], proposed: &[String]) -> Option<Vec<String>> {
    let current: BTreeSet<&str> = existing.iter().map(String::as_str).collect();
    if proposed.iter().all(|id| current.contains(id.as_str())) {
        return None;
    }

    let union: BTreeSet<&str> = current
        .into_iter()
        .chain(proposed.iter().map(String::as_str))
        .collect();
    Some(union.into_iter().map(String::from).collect())
}
