// Reading ZIP archives of survey exports.

use std::io::{Cursor, Read};

use crate::dash::io_common::{input_kind, read_bytes, simplify_file_name, InputKind};
use crate::dash::*;

// Metadata written by some archivers, never survey data.
fn is_hidden_entry(entry: &str) -> bool {
    entry.starts_with("__MACOSX/") || simplify_file_name(entry).starts_with("._")
}

/// Reads every spreadsheet and CSV file of an archive, in archive order, and
/// concatenates their rows. Other entries are ignored.
pub fn read_zip_rows(name: &str, bytes: Vec<u8>) -> DashResult<Vec<RawRow>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context(ZipOpenSnafu { path: name })?;

    let mut res: Vec<RawRow> = Vec::new();
    for idx in 0..archive.len() {
        let mut file = archive
            .by_index(idx)
            .context(ZipOpenSnafu { path: name })?;
        let entry = file.name().to_string();
        let readable = matches!(
            input_kind(&entry),
            Some(InputKind::Csv) | Some(InputKind::Excel)
        );
        if file.is_dir() || !readable || is_hidden_entry(&entry) {
            debug!("read_zip_rows: {:?}: skipping entry {:?}", name, entry);
            continue;
        }
        let mut content: Vec<u8> = Vec::new();
        file.read_to_end(&mut content).context(ZipEntrySnafu {
            path: name,
            entry: entry.clone(),
        })?;
        let mut rows = read_bytes(&entry, content)?;
        info!(
            "read_zip_rows: {:?}: {} rows from {:?}",
            name,
            rows.len(),
            entry
        );
        res.append(&mut rows);
    }
    Ok(res)
}
