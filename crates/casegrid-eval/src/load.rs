use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use casegrid_core::{Assignment, CategorySpace};

use crate::errors::EvalError;

/// Suite read back from CSV.
#[derive(Debug, Clone, Default)]
pub struct LoadedSuite {
    pub assignments: Vec<Assignment>,
    /// Set when the file carries a trailing `status` column.
    pub statuses: Option<Vec<String>>,
}

/// Read a suite CSV whose header lists the space's categories in order,
/// optionally followed by a `status` column.
pub fn load_suite_csv(
    path: &Path,
    space: &CategorySpace,
    delimiter: u8,
) -> Result<LoadedSuite, EvalError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let names: Vec<&str> = space.names().collect();
    let has_status = header.len() == names.len() + 1
        && header.last().is_some_and(|column| column == "status");
    let columns = if has_status {
        &header[..names.len()]
    } else {
        &header[..]
    };
    if columns != names.as_slice() {
        return Err(EvalError::InvalidSuite(format!(
            "header [{}] does not match categories [{}]",
            header.join(", "),
            names.join(", ")
        )));
    }

    let mut suite = LoadedSuite {
        assignments: Vec::new(),
        statuses: has_status.then(Vec::new),
    };
    for record in reader.records() {
        let record = record?;
        let assignment: Assignment = names
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (*name, value))
            .collect();
        suite.assignments.push(assignment);
        if let Some(statuses) = suite.statuses.as_mut() {
            statuses.push(record.get(names.len()).unwrap_or_default().to_string());
        }
    }

    Ok(suite)
}
