// Household account CSV import

use std::io::Read;
use std::path::Path;

use householder_recon::Row;

use crate::error::IoError;

pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const FULL_NAME: &str = "Name";
pub const ACCOUNT_NAME: &str = "Account Name";

/// Rows read from one input file.
#[derive(Debug, Default)]
pub struct ReadReport {
    pub rows: Vec<Row>,
    /// Records dropped because they were short or unparseable.
    pub skipped: usize,
}

pub fn read_rows(path: &Path) -> Result<ReadReport, IoError> {
    let content = read_file_as_utf8(path)?;
    let report = read_rows_from_str(&content)?;
    log::info!(
        "Read {} rows from {} ({} skipped)",
        report.rows.len(),
        path.display(),
        report.skipped
    );
    Ok(report)
}

/// Parse CSV text with a header row naming the four input columns.
///
/// Columns are located by header, so their order and any extra columns do
/// not matter. Every field is trimmed. A blank `Name` falls back to
/// `First Name Last Name`.
pub fn read_rows_from_str(content: &str) -> Result<ReadReport, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| IoError::MissingColumn(name.to_string()))
    };
    let first_col = column(FIRST_NAME)?;
    let last_col = column(LAST_NAME)?;
    let full_col = column(FULL_NAME)?;
    let account_col = column(ACCOUNT_NAME)?;

    let mut report = ReadReport::default();
    for (i, result) in reader.records().enumerate() {
        let line = i + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping record {line}: {e}");
                report.skipped += 1;
                continue;
            }
        };

        let field = |col: usize| record.get(col).map(str::trim);
        let (Some(first), Some(last), Some(full), Some(account)) = (
            field(first_col),
            field(last_col),
            field(full_col),
            field(account_col),
        ) else {
            log::warn!("skipping record {line}: only {} fields", record.len());
            report.skipped += 1;
            continue;
        };

        let full = if full.is_empty() {
            format!("{first} {last}").trim().to_string()
        } else {
            full.to_string()
        };
        report.rows.push(Row::new(first, last, full, account, line));
    }

    Ok(report)
}

/// Pick the delimiter that splits the header row into the most fields.
///
/// Spreadsheet exports sometimes use tab or semicolon instead of comma.
/// Ties go to comma (last candidate wins `max_by_key`).
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|&delim| {
            csv::ReaderBuilder::new()
                .delimiter(delim)
                .has_headers(false)
                .from_reader(header.as_bytes())
                .records()
                .next()
                .and_then(|r| r.ok())
                .map(|r| r.len())
                .unwrap_or(0)
        })
        .unwrap_or(b',')
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::file(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| IoError::file(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            log::warn!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}
