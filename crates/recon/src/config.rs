use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Household naming rules.
///
/// The defaults describe the "Alice and Bob Smith Household" convention:
/// `&` and `/` are treated as spellings of `and`, organizational accounts are
/// recognized by marker words, and canonical names drop the ` Household`
/// suffix. A rules file only needs to list the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseholdRules {
    /// Suffix stripped from well-formed household names (leading space included).
    pub household_suffix: String,
    /// Case-sensitive substrings that mark an organizational account.
    pub excluded_markers: Vec<String>,
    /// Alternate separators rewritten to the conjunction, first occurrence only.
    pub separators: Vec<String>,
    /// The conjunction joining two occupants (surrounding spaces included).
    pub conjunction: String,
}

impl Default for HouseholdRules {
    fn default() -> Self {
        Self {
            household_suffix: " Household".into(),
            excluded_markers: vec!["Account".into(), "Foundation".into()],
            separators: vec![" & ".into(), " / ".into()],
            conjunction: " and ".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl HouseholdRules {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let rules: HouseholdRules =
            toml::from_str(input).map_err(|e| ReconError::RulesParse(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.household_suffix.trim().is_empty() {
            return Err(ReconError::RulesValidation(
                "household_suffix must not be blank".into(),
            ));
        }

        if self.conjunction.trim().is_empty() {
            return Err(ReconError::RulesValidation(
                "conjunction must not be blank".into(),
            ));
        }

        for marker in &self.excluded_markers {
            if marker.is_empty() {
                return Err(ReconError::RulesValidation(
                    "excluded_markers must not contain empty strings".into(),
                ));
            }
        }

        for sep in &self.separators {
            if sep.trim().is_empty() {
                return Err(ReconError::RulesValidation(
                    "separators must not be blank".into(),
                ));
            }
            if sep == &self.conjunction {
                return Err(ReconError::RulesValidation(format!(
                    "separator '{sep}' is the conjunction itself"
                )));
            }
        }

        Ok(())
    }

    /// The conjunction word without surrounding spaces, for notes.
    pub fn conjunction_word(&self) -> &str {
        self.conjunction.trim()
    }

    /// True if `name` names more than one person under these rules.
    pub fn names_several(&self, name: &str) -> bool {
        name.contains(&self.conjunction) || self.separators.iter().any(|s| name.contains(s.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
