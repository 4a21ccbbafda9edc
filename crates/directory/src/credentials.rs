//! Directory credentials: flag > environment > error.
//!
//! The caller loads any `.env` file before resolving; this module only reads
//! the process environment.

use crate::error::DirectoryError;

pub const TOKEN_ENV: &str = "AIRTABLE_ACCESS_TOKEN";
pub const BASE_ENV: &str = "AIRTABLE_BASE_ID";
pub const TABLE_ENV: &str = "AIRTABLE_CONTACTS_TABLE_ID";
pub const API_BASE_ENV: &str = "AIRTABLE_API_BASE";

pub const AIRTABLE_API_BASE: &str = "https://api.airtable.com";

/// Everything needed to reach the contacts table.
#[derive(Clone)]
pub struct AirtableCredentials {
    pub token: String,
    pub base_id: String,
    pub table_id: String,
    pub api_base: String,
}

impl std::fmt::Debug for AirtableCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableCredentials")
            .field("token", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("table_id", &self.table_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AirtableCredentials {
    pub fn new(token: impl Into<String>, base_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_id: base_id.into(),
            table_id: table_id.into(),
            api_base: AIRTABLE_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// `{api_base}/v0/{base}/{table}`
    pub fn table_url(&self) -> String {
        format!("{}/v0/{}/{}", self.api_base, self.base_id, self.table_id)
    }
}

/// Values given on the command line, if any.
#[derive(Debug, Clone, Default)]
pub struct CredentialFlags {
    pub token: Option<String>,
    pub base_id: Option<String>,
    pub table_id: Option<String>,
}

/// Resolve all three settings. The first missing one is reported.
pub fn resolve_credentials(flags: CredentialFlags) -> Result<AirtableCredentials, DirectoryError> {
    let token = resolve_value(flags.token, TOKEN_ENV, "--token")?;
    let base_id = resolve_value(flags.base_id, BASE_ENV, "--base")?;
    let table_id = resolve_value(flags.table_id, TABLE_ENV, "--table")?;

    let mut creds = AirtableCredentials::new(token, base_id, table_id);
    if let Some(api_base) = non_blank(std::env::var(API_BASE_ENV).ok()) {
        log::debug!("using directory API base {api_base}");
        creds = creds.with_api_base(api_base);
    }
    Ok(creds)
}

fn resolve_value(
    flag: Option<String>,
    env_var: &'static str,
    flag_name: &'static str,
) -> Result<String, DirectoryError> {
    let missing = DirectoryError::MissingConfig {
        env_var,
        flag: flag_name,
    };
    match flag {
        // An explicit but blank flag does not fall through to the environment.
        Some(value) => non_blank(Some(value)).ok_or(missing),
        None => non_blank(std::env::var(env_var).ok()).ok_or(missing),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
