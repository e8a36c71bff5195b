use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use casegrid_core::{Assignment, CategorySpace};

/// Column appended when row statuses are written.
pub const STATUS_COLUMN: &str = "status";

/// Write a suite as CSV, one column per category in space order.
///
/// When `statuses` is given, a trailing `status` column holds the entry at
/// the same row position. Returns the number of bytes written.
pub fn write_suite_csv(
    path: &Path,
    space: &CategorySpace,
    rows: &[Assignment],
    delimiter: u8,
    statuses: Option<&[String]>,
) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(counting);

    let mut header: Vec<&str> = space.names().collect();
    if statuses.is_some() {
        header.push(STATUS_COLUMN);
    }
    writer.write_record(&header)?;

    for (idx, row) in rows.iter().enumerate() {
        let mut record: Vec<&str> = row
            .values_in_order(space)
            .into_iter()
            .map(|value| value.unwrap_or_default())
            .collect();
        if let Some(statuses) = statuses {
            record.push(statuses.get(idx).map(String::as_str).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
