//! `householder run | canonicalize | contacts | rules validate`.

use std::path::{Path, PathBuf};

use householder_directory::{resolve_credentials, AirtableDirectory, CredentialFlags};
use householder_io::{read_rows, write_households, IoError, ReadReport};
use householder_recon::model::{HouseholdResult, RunMeta, RunSummary};
use householder_recon::{DirectoryIndex, DryRun, HouseholdRules};
use serde::Serialize;

use crate::CliError;

pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rules: Option<PathBuf>,
    pub offline: bool,
    pub dry_run: bool,
    pub json: bool,
    pub summary: Option<PathBuf>,
    pub credentials: CredentialFlags,
}

/// JSON shape of `--json` and `--summary`.
#[derive(Serialize)]
struct SummaryReport<'a> {
    meta: &'a RunMeta,
    input: String,
    output: String,
    input_rows_skipped: usize,
    directory_contacts: usize,
    mode: &'static str,
    summary: &'a RunSummary,
}

pub fn cmd_run(opts: RunOptions) -> Result<(), CliError> {
    let rules = load_rules(opts.rules.as_deref())?;

    // Credentials are a precondition: fail before reading any rows.
    let directory = if opts.offline {
        log::info!("Offline: no directory matches, no affiliation writes");
        None
    } else {
        let creds = resolve_credentials(opts.credentials)?;
        Some(AirtableDirectory::new(creds)?)
    };

    let ReadReport { rows, skipped } = read_input(&opts.input)?;

    let mut index = match &directory {
        Some(dir) => dir.load_index()?,
        None => DirectoryIndex::new(),
    };
    let directory_contacts = index.len();

    let (result, mode) = match directory {
        Some(mut dir) if !opts.dry_run => (
            householder_recon::run(&rules, rows, &mut index, &mut dir)?,
            "live",
        ),
        Some(_) => (dry_run(&rules, rows, &mut index), "dry_run"),
        None => (dry_run(&rules, rows, &mut index), "offline"),
    };

    write_output(&opts.output, &result)?;

    let report = SummaryReport {
        meta: &result.meta,
        input: opts.input.display().to_string(),
        output: opts.output.display().to_string(),
        input_rows_skipped: skipped,
        directory_contacts,
        mode,
        summary: &result.summary,
    };
    emit_report(&report, opts.json, opts.summary.as_deref())?;

    let s = &result.summary;
    eprintln!(
        "{} rows, {} households, {} excluded, {} occupants inferred, {} affiliation updates ({}) -> {}",
        s.rows_read,
        s.households,
        s.excluded_rows,
        s.inferred_occupants,
        s.affiliation_updates,
        mode,
        opts.output.display(),
    );
    Ok(())
}

pub fn cmd_canonicalize(
    input: PathBuf,
    output: PathBuf,
    rules_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let rules = load_rules(rules_path.as_deref())?;
    let ReadReport { rows, .. } = read_input(&input)?;
    let result = householder_recon::canonicalize(&rules, rows);
    write_output(&output, &result)?;

    eprintln!(
        "{} rows, {} households, {} excluded -> {}",
        result.summary.rows_read,
        result.summary.households,
        result.summary.excluded_rows,
        output.display(),
    );
    Ok(())
}

pub fn cmd_contacts(credentials: CredentialFlags, json: bool) -> Result<(), CliError> {
    let creds = resolve_credentials(credentials)?;
    let directory = AirtableDirectory::new(creds)?;
    let contacts = directory.load_contacts()?;
    let affiliated = contacts.iter().filter(|c| !c.affiliations.is_empty()).count();

    if json {
        let out = serde_json::json!({
            "contacts": contacts.len(),
            "with_affiliations": affiliated,
        });
        println!("{}", to_json(&out)?);
    } else {
        println!(
            "{} contacts ({} with affiliations)",
            contacts.len(),
            affiliated
        );
    }
    Ok(())
}

pub fn cmd_rules_validate(path: PathBuf) -> Result<(), CliError> {
    let rules = load_rules(Some(path.as_path()))?;
    println!(
        "{}: ok (suffix {:?}, conjunction {:?}, {} separators, {} markers)",
        path.display(),
        rules.household_suffix,
        rules.conjunction,
        rules.separators.len(),
        rules.excluded_markers.len(),
    );
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

fn load_rules(path: Option<&Path>) -> Result<HouseholdRules, CliError> {
    let Some(path) = path else {
        return Ok(HouseholdRules::default());
    };
    log::info!("Using rules from {}", path.display());
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read rules {}: {e}", path.display())))?;
    HouseholdRules::from_toml(&text).map_err(|e| {
        CliError::rules(format!("{}: {e}", path.display()))
            .with_hint("`householder rules validate <FILE>` checks a rules file")
    })
}

fn read_input(path: &Path) -> Result<ReadReport, CliError> {
    read_rows(path).map_err(|e| match e {
        IoError::MissingColumn(_) => CliError::io(format!("{}: {e}", path.display()))
            .with_hint("expected columns: First Name, Last Name, Name, Account Name"),
        other => CliError::io(other.to_string()),
    })
}

fn write_output(path: &Path, result: &HouseholdResult) -> Result<(), CliError> {
    write_households(path, &result.households)
        .map(|_| ())
        .map_err(|e| CliError::io(e.to_string()))
}

/// Run against the in-memory index only; affiliation writes are skipped.
fn dry_run(rules: &HouseholdRules, rows: Vec<householder_recon::Row>, index: &mut DirectoryIndex) -> HouseholdResult {
    match householder_recon::run(rules, rows, index, &mut DryRun) {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

fn emit_report(report: &SummaryReport<'_>, json: bool, file: Option<&Path>) -> Result<(), CliError> {
    if !json && file.is_none() {
        return Ok(());
    }
    let text = to_json(report)?;
    if json {
        println!("{text}");
    }
    if let Some(path) = file {
        std::fs::write(path, format!("{text}\n"))
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    }
    Ok(())
}

fn to_json(value: &impl Serialize) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("cannot serialize summary: {e}")))
}
