use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Id-based copy of a directory contact attached to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRef {
    pub id: String,
    pub name: String,
}

/// Where a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    /// 1-based data line in the input file (header excluded).
    Input(usize),
    /// Synthesized from a household name by occupant inference.
    Inferred,
}

/// One person's account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    /// Canonical household name once normalized.
    pub household_name: String,
    /// Household name as read, kept for export.
    pub original_household_name: String,
    pub fix_notes: Vec<String>,
    pub ignore_notes: Vec<String>,
    pub contact: Option<ContactRef>,
    pub affiliated_names: Option<Vec<String>>,
    pub origin: RowOrigin,
    #[serde(skip)]
    pub(crate) normalized: bool,
}

impl Row {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        full_name: impl Into<String>,
        household_name: impl Into<String>,
        line: usize,
    ) -> Self {
        let household_name = household_name.into();
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            full_name: full_name.into(),
            original_household_name: household_name.clone(),
            household_name,
            fix_notes: Vec::new(),
            ignore_notes: Vec::new(),
            contact: None,
            affiliated_names: None,
            origin: RowOrigin::Input(line),
            normalized: false,
        }
    }

    /// Row created by occupant inference. Its household name is already canonical.
    pub(crate) fn inferred(
        first_name: String,
        last_name: String,
        full_name: String,
        reference: &Row,
    ) -> Self {
        Self {
            first_name,
            last_name,
            full_name,
            household_name: reference.household_name.clone(),
            original_household_name: reference.original_household_name.clone(),
            fix_notes: Vec::new(),
            ignore_notes: Vec::new(),
            contact: None,
            affiliated_names: None,
            origin: RowOrigin::Inferred,
            normalized: true,
        }
    }

    /// Excluded rows never seed occupant inference.
    pub fn is_excluded(&self) -> bool {
        !self.ignore_notes.is_empty()
    }

    pub fn is_inferred(&self) -> bool {
        self.origin == RowOrigin::Inferred
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Fix notes followed by ignore notes, `; `-joined.
    pub fn notes(&self) -> String {
        self.fix_notes
            .iter()
            .chain(self.ignore_notes.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Affiliated display names, comma-joined. Empty when never computed.
    pub fn affiliations_column(&self) -> String {
        self.affiliated_names
            .as_ref()
            .map(|names| names.join(","))
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Households
// ---------------------------------------------------------------------------

/// All rows sharing one canonical household name.
#[derive(Debug, Clone, Serialize)]
pub struct Household {
    pub name: String,
    pub members: Vec<Row>,
}

impl Household {
    /// First member in input order; the basis for occupant inference.
    pub fn reference(&self) -> Option<&Row> {
        self.members.first()
    }

    pub fn contact_count(&self) -> usize {
        self.members.iter().filter(|r| r.contact.is_some()).count()
    }
}

/// Households keyed by canonical name, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Households {
    groups: Vec<Household>,
    index: HashMap<String, usize>,
}

impl Households {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `row` to the household named by its current household name.
    pub fn insert(&mut self, row: Row) {
        match self.index.get(&row.household_name) {
            Some(&i) => self.groups[i].members.push(row),
            None => {
                self.index.insert(row.household_name.clone(), self.groups.len());
                self.groups.push(Household {
                    name: row.household_name.clone(),
                    members: vec![row],
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Household> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Household> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Household> {
        self.groups.iter_mut()
    }

    /// Every row, household by household.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.groups.iter().flat_map(|h| h.members.iter())
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|h| h.members.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub households: usize,
    pub excluded_rows: usize,
    pub exclusions: BTreeMap<String, usize>,
    pub conjunction_households: usize,
    pub inferred_occupants: usize,
    pub inferred_matched: usize,
    pub inferred_unmatched: usize,
    pub skipped_inference: BTreeMap<String, usize>,
    pub affiliation_updates: usize,
    pub affiliation_unchanged: usize,
    pub affiliation_unknown_contacts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
}

impl RunMeta {
    pub fn now() -> Self {
        Self {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HouseholdResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub households: Households,
}
