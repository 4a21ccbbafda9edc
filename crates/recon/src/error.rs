use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    RulesParse(String),
    /// Rules validation error (empty suffix, separator equal to conjunction, etc.).
    RulesValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RulesParse(msg) => write!(f, "rules parse error: {msg}"),
            Self::RulesValidation(msg) => write!(f, "rules validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
