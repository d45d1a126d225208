//! Reading the operator's list of emails to deprovision.
//!
//! The file is a plain comma-separated CSV. Row 1 is a header and is always
//! skipped; the email is taken from the first column of every other row.
//! Other columns are ignored, nothing is deduplicated and email syntax is not
//! checked.

use crate::errors::ImportError;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Strips the quotes a shell or file manager adds around a pasted path
pub fn clean_path_input(raw: &str) -> String {
    raw.trim().replace('"', "")
}

/// Checks that `path` exists and has a `.csv` extension.
pub fn validate_import_path(path: &Path) -> Result<(), ImportError> {
    if !path.exists() {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(()),
        _ => Err(ImportError::NotCsv(path.to_path_buf())),
    }
}

pub fn import_emails(path: &Path) -> Result<Vec<String>, ImportError> {
    info!("Collecting user information from imported CSV file...");

    let file = std::fs::File::open(path).map_err(|e| ImportError::Csv(e.into()))?;
    read_emails(file).map_err(|e| match e {
        ImportError::MissingHeader(_) => ImportError::MissingHeader(path.to_path_buf()),
        other => other,
    })
}

/// Reads column 0 of every row after the first.
///
/// The csv reader drops blank lines on its own, so they are recovered from
/// the byte offsets between records: a blank first row is taken as the
/// header, and any later blank row has no email column and is an error.
pub fn read_emails<R: Read>(mut input: R) -> Result<Vec<String>, ImportError> {
    let mut data = Vec::new();
    input.read_to_end(&mut data).map_err(csv::Error::from)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    let mut rows = RowCursor::default();
    let mut emails = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut next_start = 0;

    while reader.read_record(&mut record)? {
        let start = record.position().map(|p| p.byte() as usize).unwrap_or(next_start);
        rows.skip_blank(blank_rows_at(&data, start))?;
        if rows.advance() {
            let email = record.get(0).ok_or(ImportError::MissingEmail { line: rows.row })?;
            emails.push(email.to_string());
        }
        next_start = reader.position().byte() as usize;
    }
    rows.skip_blank(blank_rows_at(&data, next_start))?;

    if rows.row == 0 {
        return Err(ImportError::MissingHeader(Default::default()));
    }
    Ok(emails)
}

#[derive(Debug, Default)]
struct RowCursor {
    /// 1-based number of the last row consumed, blank rows included
    row: u64,
}

impl RowCursor {
    /// Consumes one row; false while that row is the header
    fn advance(&mut self) -> bool {
        self.row += 1;
        self.row > 1
    }

    fn skip_blank(&mut self, count: usize) -> Result<(), ImportError> {
        for _ in 0..count {
            if self.advance() {
                return Err(ImportError::MissingEmail { line: self.row });
            }
        }
        Ok(())
    }
}

/// Counts empty rows starting at byte `start`.
fn blank_rows_at(data: &[u8], start: usize) -> usize {
    let rest = data.get(start..).unwrap_or_default();
    let lead = rest.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count();
    let run = &rest[..lead];

    // A '\n' completing the previous row's CRLF is not a row of its own
    let mut i = usize::from(start > 0 && data[start - 1] == b'\r' && run.first() == Some(&b'\n'));
    let mut count = 0;
    while i < run.len() {
        i += if run[i] == b'\r' && run.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
        count += 1;
    }
    count
}
