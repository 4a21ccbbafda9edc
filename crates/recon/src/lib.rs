//! `householder-recon`: household name canonicalization and occupant inference.
//!
//! Pure engine crate: receives pre-loaded rows and a directory index, returns
//! annotated households. Directory writes go through the [`AffiliationStore`]
//! trait. No CLI, file or network dependencies.

pub mod affiliate;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod group;
pub mod infer;
pub mod model;
pub mod normalize;
pub mod summary;

pub use config::HouseholdRules;
pub use directory::{AffiliationStore, Contact, DirectoryIndex, DryRun, MergeOutcome};
pub use engine::{canonicalize, run};
pub use error::ReconError;
pub use model::{ContactRef, Household, HouseholdResult, Households, Row, RowOrigin, RunSummary};
