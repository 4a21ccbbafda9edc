//! Airtable contacts table client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Reads the whole table page by page, and writes one contact's
//! affiliation list per PATCH.

use std::thread;
use std::time::Duration;

use householder_recon::{AffiliationStore, Contact, DirectoryIndex};
use serde_json::Value;

use crate::credentials::AirtableCredentials;
use crate::error::DirectoryError;

pub const PAGE_SIZE: u32 = 100;
const USER_AGENT: &str = concat!("householder/", env!("CARGO_PKG_VERSION"));

const FIELD_NAME: &str = "Name";
const FIELD_FIRST_NAME: &str = "First Name";
const FIELD_LAST_NAME: &str = "Last Name";
const FIELD_AFFILIATIONS: &str = "Contact Affiliations";

// ── Retry policy ────────────────────────────────────────────────────

/// How often and how patiently to retry 429, 5xx and network failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Doubled after every retry. A 429 `Retry-After` header takes precedence.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

pub struct AirtableDirectory {
    http: reqwest::blocking::Client,
    credentials: AirtableCredentials,
    retry: RetryPolicy,
}

impl AirtableDirectory {
    pub fn new(credentials: AirtableCredentials) -> Result<Self, DirectoryError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DirectoryError::Upstream(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            credentials,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch every contact with a non-empty name, following `offset` pagination.
    pub fn load_contacts(&self) -> Result<Vec<Contact>, DirectoryError> {
        let url = self.credentials.table_url();
        let page_size = PAGE_SIZE.to_string();
        let mut contacts = Vec::new();
        let mut offset: Option<String> = None;
        let mut page = 0u32;

        loop {
            page += 1;
            let body = self.send_with_retry(|http| {
                let mut req = http
                    .get(&url)
                    .bearer_auth(&self.credentials.token)
                    .query(&[
                        ("fields[]", FIELD_NAME),
                        ("fields[]", FIELD_FIRST_NAME),
                        ("fields[]", FIELD_LAST_NAME),
                        ("fields[]", FIELD_AFFILIATIONS),
                        ("pageSize", page_size.as_str()),
                    ]);
                if let Some(ref o) = offset {
                    req = req.query(&[("offset", o.as_str())]);
                }
                req
            })?;

            let records = body["records"]
                .as_array()
                .ok_or_else(|| DirectoryError::Parse("response missing 'records' array".into()))?;
            contacts.extend(records.iter().filter_map(parse_contact));
            log::debug!("page {page}: {} records", records.len());

            match body["offset"].as_str() {
                Some(next) if offset.as_deref() == Some(next) => {
                    return Err(DirectoryError::Parse(format!(
                        "pagination did not advance past offset {next}"
                    )));
                }
                Some(next) => offset = Some(next.to_string()),
                None => break,
            }
        }

        log::info!("Loaded {} directory contacts ({} pages)", contacts.len(), page);
        Ok(contacts)
    }

    pub fn load_index(&self) -> Result<DirectoryIndex, DirectoryError> {
        Ok(DirectoryIndex::from_contacts(self.load_contacts()?))
    }

    /// Replace one contact's `Contact Affiliations` with `affiliations`.
    pub fn update_affiliations(
        &self,
        contact_id: &str,
        affiliations: &[String],
    ) -> Result<(), DirectoryError> {
        let url = format!("{}/{}", self.credentials.table_url(), contact_id);
        let body = serde_json::json!({ "fields": { FIELD_AFFILIATIONS: affiliations } });
        self.send_with_retry(|http| {
            http.patch(&url)
                .bearer_auth(&self.credentials.token)
                .json(&body)
        })?;
        Ok(())
    }

    /// Send with retry + exponential backoff and classify the failure.
    ///
    /// `build_request` is called once per attempt.
    fn send_with_retry(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<Value, DirectoryError> {
        let max = self.retry.max_retries;
        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let wait = match build_request(&self.http).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if resp.status().is_success() {
                        let text = resp.text().map_err(|e| {
                            DirectoryError::Upstream(format!("failed to read response body: {e}"))
                        })?;
                        return serde_json::from_str(&text).map_err(|e| {
                            let head: String = text.chars().take(200).collect();
                            DirectoryError::Parse(format!("{e} (body: {head})"))
                        });
                    }

                    if status != 429 && status < 500 {
                        let message = error_message(resp.json().unwrap_or(Value::Null), status);
                        return Err(match status {
                            401 | 403 => DirectoryError::Auth { status, message },
                            400 | 422 => DirectoryError::Rejected { status, message },
                            _ => DirectoryError::Upstream(format!("HTTP {status}: {message}")),
                        });
                    }

                    if attempt > max {
                        return Err(if status == 429 {
                            DirectoryError::RateLimited { attempts: attempt }
                        } else {
                            DirectoryError::Upstream(format!(
                                "HTTP {status} after {attempt} attempts"
                            ))
                        });
                    }

                    let wait = if status == 429 {
                        retry_after(&resp).unwrap_or(backoff)
                    } else {
                        backoff
                    };
                    log::warn!("retry {attempt}/{max} in {wait:?} (HTTP {status})");
                    wait
                }
                Err(e) => {
                    if attempt > max {
                        return Err(DirectoryError::Upstream(format!(
                            "{e} after {attempt} attempts"
                        )));
                    }
                    log::warn!("retry {attempt}/{max} in {backoff:?} ({e})");
                    backoff
                }
            };

            thread::sleep(wait);
            backoff *= 2;
        }
    }
}

impl AffiliationStore for AirtableDirectory {
    type Error = DirectoryError;

    fn write_affiliations(
        &mut self,
        contact: &Contact,
        affiliations: &[String],
    ) -> Result<(), DirectoryError> {
        log::debug!("updating affiliations of {} ({})", contact.name, contact.id);
        self.update_affiliations(&contact.id, affiliations)
    }
}

// ── Response parsing ────────────────────────────────────────────────

fn parse_contact(record: &Value) -> Option<Contact> {
    let id = record["id"].as_str()?;
    let fields = &record["fields"];
    let name = string_field(fields, FIELD_NAME);
    if name.is_empty() {
        return None;
    }

    let affiliations = fields[FIELD_AFFILIATIONS]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Some(Contact {
        id: id.to_string(),
        name,
        first_name: string_field(fields, FIELD_FIRST_NAME),
        last_name: string_field(fields, FIELD_LAST_NAME),
        affiliations,
    })
}

/// Non-string and absent values read as empty.
fn string_field(fields: &Value, key: &str) -> String {
    fields[key].as_str().unwrap_or_default().to_string()
}

/// Airtable errors come as `{"error": {"type", "message"}}` or `{"error": "TYPE"}`.
fn error_message(body: Value, status: u16) -> String {
    match &body["error"] {
        Value::String(kind) => kind.clone(),
        Value::Object(err) => err
            .get("message")
            .or_else(|| err.get("type"))
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("HTTP {status}")),
        _ => format!("HTTP {status}"),
    }
}

fn retry_after(resp: &reqwest::blocking::Response) -> Option<Duration> {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
