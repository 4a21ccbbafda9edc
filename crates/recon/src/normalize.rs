use crate::config::HouseholdRules;
use crate::model::Row;

/// Why a row was excluded during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Name carries an organizational marker ("Account", "Foundation").
    Organization,
    /// Name does not end with the household suffix.
    BadlyFormatted,
}

impl Exclusion {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::BadlyFormatted => "badly_formatted",
        }
    }
}

/// Result of normalizing one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalized {
    Canonical,
    Excluded(Exclusion),
    /// Row had already been normalized; nothing changed.
    Unchanged,
}

/// Canonicalize `row.household_name` in place.
///
/// Separators are rewritten first, then organizational accounts are excluded,
/// then the household suffix is stripped. Anything else is excluded as badly
/// formatted. Every change and every exclusion leaves a note on the row.
pub fn normalize(rules: &HouseholdRules, row: &mut Row) -> Normalized {
    if row.normalized {
        return Normalized::Unchanged;
    }
    row.normalized = true;

    let mut name = row.household_name.clone();
    for sep in &rules.separators {
        if let Some(at) = name.find(sep.as_str()) {
            name.replace_range(at..at + sep.len(), &rules.conjunction);
            row.fix_notes.push(format!(
                "Converted '{}' to '{}'",
                sep.trim(),
                rules.conjunction_word()
            ));
        }
    }

    let outcome = if rules.excluded_markers.iter().any(|m| name.contains(m.as_str())) {
        row.ignore_notes.push(format!(
            "Ignoring household name with {}",
            quoted_list(&rules.excluded_markers)
        ));
        Normalized::Excluded(Exclusion::Organization)
    } else if let Some(stripped) = name.strip_suffix(rules.household_suffix.as_str()) {
        name = stripped.trim_end().to_string();
        row.fix_notes.push(format!(
            "Trimmed '{}' from end",
            rules.household_suffix.trim()
        ));
        Normalized::Canonical
    } else {
        row.ignore_notes
            .push("Ignoring badly-formatted household name".to_string());
        Normalized::Excluded(Exclusion::BadlyFormatted)
    };

    row.household_name = name;
    outcome
}

/// `'A'`, `'A' or 'B'`, `'A', 'B' or 'C'`.
fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}
