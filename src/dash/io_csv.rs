// Primitives for reading CSV files.

use crate::dash::io_common::assemble_row;
use crate::dash::*;

fn read_cell(field: &[u8]) -> RawValue {
    let s = String::from_utf8_lossy(field);
    if s.trim().is_empty() {
        RawValue::Empty
    } else {
        RawValue::Text(s.to_string())
    }
}

/// Reads a CSV file held in memory. The first record holds the headers.
/// Invalid UTF-8 sequences are replaced rather than rejected. Empty cells
/// are left out of the rows.
pub fn read_csv_rows(name: &str, bytes: &[u8]) -> DashResult<Vec<RawRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut records = rdr.into_byte_records();

    let headers: Vec<String> = match records.next() {
        Some(r) => r
            .context(CsvParseSnafu { path: name })?
            .iter()
            .map(|f| String::from_utf8_lossy(f).to_string())
            .collect(),
        None => {
            debug!("read_csv_rows: {:?}: empty file", name);
            return Ok(vec![]);
        }
    };
    debug!("read_csv_rows: header: {:?}", headers);

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvParseSnafu { path: name })?;
        let cells: Vec<RawValue> = line.iter().map(read_cell).collect();
        let raw_row: RawRow = assemble_row(&headers, cells)
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        if raw_row.is_empty() {
            debug!("read_csv_rows: {:?}: skipping blank line {}", name, lineno);
            continue;
        }
        res.push(raw_row);
    }
    debug!("read_csv_rows: {:?}: {} rows", name, res.len());
    Ok(res)
}
