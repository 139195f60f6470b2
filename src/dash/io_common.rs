// Dispatching of the input files to the readers.

use crate::dash::*;

use crate::dash::io_csv::read_csv_rows;
use crate::dash::io_excel::read_excel_rows;
use crate::dash::io_zip::read_zip_rows;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputKind {
    Csv,
    Excel,
    Zip,
}

/// The kind of input, from the extension of the file name.
pub fn input_kind(name: &str) -> Option<InputKind> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;
    match ext.as_str() {
        "csv" => Some(InputKind::Csv),
        "xlsx" | "xlsm" | "xls" | "ods" => Some(InputKind::Excel),
        "zip" => Some(InputKind::Zip),
        _ => None,
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Reads the rows of an in-memory file. `name` is only used for the
/// extension and for the messages.
pub fn read_bytes(name: &str, bytes: Vec<u8>) -> DashResult<Vec<RawRow>> {
    match input_kind(name) {
        Some(InputKind::Csv) => read_csv_rows(name, &bytes),
        Some(InputKind::Excel) => read_excel_rows(name, bytes),
        Some(InputKind::Zip) => read_zip_rows(name, bytes),
        None => Err(Box::new(DashError::UnsupportedInput {
            path: name.to_string(),
        })),
    }
}

/// Reads all the survey rows of a file.
pub fn read_rows(path: &str) -> DashResult<Vec<RawRow>> {
    input_kind(path).context(UnsupportedInputSnafu { path })?;
    info!("Attempting to read survey file {:?}", path);
    let bytes = fs::read(path).context(OpeningFileSnafu { path })?;
    let rows = read_bytes(&simplify_file_name(path), bytes)?;
    if rows.is_empty() {
        return Err(Box::new(DashError::NoRows {
            path: path.to_string(),
        }));
    }
    Ok(rows)
}

/// Pairs the cells of a row with the headers. Extra cells without a header
/// are dropped.
pub fn assemble_row(headers: &[String], cells: Vec<RawValue>) -> RawRow {
    headers.iter().cloned().zip(cells.into_iter()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_kinds() {
        assert_eq!(input_kind("a.CSV"), Some(InputKind::Csv));
        assert_eq!(input_kind("dir/b.xlsx"), Some(InputKind::Excel));
        assert_eq!(input_kind("b.ods"), Some(InputKind::Excel));
        assert_eq!(input_kind("c.zip"), Some(InputKind::Zip));
        assert_eq!(input_kind("d.json"), None);
        assert_eq!(input_kind("noext"), None);
    }

    #[test]
    fn unsupported_input() {
        let res = read_rows("survey.json");
        assert!(matches!(
            res.map_err(|e| *e),
            Err(DashError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn missing_file() {
        let res = read_rows("/nonexistent/survey.csv");
        assert!(matches!(
            res.map_err(|e| *e),
            Err(DashError::OpeningFile { .. })
        ));
    }

    #[test]
    fn assemble_row_drops_extra_cells() {
        let headers = vec!["학과".to_string(), "문항1".to_string()];
        let row = assemble_row(
            &headers,
            vec![
                RawValue::from("간호학과"),
                RawValue::from(5.0),
                RawValue::from("extra"),
            ],
        );
        assert_eq!(row.len(), 2);
        assert_eq!(row[1], ("문항1".to_string(), RawValue::Number(5.0)));
    }
}
