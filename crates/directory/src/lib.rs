//! Contact directory backed by an Airtable contacts table.
//!
//! Reads the table into a [`householder_recon::DirectoryIndex`] and writes
//! affiliation updates back through [`householder_recon::AffiliationStore`].
//! The client is constructed from resolved credentials; there is no global
//! session state.

mod client;
mod credentials;
mod error;

pub use client::{AirtableDirectory, RetryPolicy, PAGE_SIZE};
pub use credentials::{
    resolve_credentials, AirtableCredentials, CredentialFlags, AIRTABLE_API_BASE, API_BASE_ENV,
    BASE_ENV, TABLE_ENV, TOKEN_ENV,
};
pub use error::DirectoryError;
