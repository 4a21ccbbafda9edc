// Contact import CSV export

use std::io::Write;
use std::path::Path;

use householder_recon::{Households, Row};

use crate::error::IoError;

pub const OUTPUT_HEADERS: [&str; 6] = [
    "Name",
    "First Name",
    "Last Name",
    "Contact Affiliations",
    "Account Name",
    "Notes",
];

/// Write every row, household by household, to `path`. Returns rows written.
pub fn write_households(path: &Path, households: &Households) -> Result<usize, IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::file(path, e))?;
    let written = write_households_to(file, households)?;
    log::info!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}

pub fn write_households_to<W: Write>(out: W, households: &Households) -> Result<usize, IoError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(OUTPUT_HEADERS)?;

    let mut written = 0;
    for row in households.rows() {
        writer.write_record(&record(row))?;
        written += 1;
    }

    writer.flush().map_err(|e| IoError::Csv(e.to_string()))?;
    Ok(written)
}

fn record(row: &Row) -> [String; 6] {
    [
        row.full_name.clone(),
        row.first_name.clone(),
        row.last_name.clone(),
        row.affiliations_column(),
        row.original_household_name.clone(),
        row.notes(),
    ]
}
