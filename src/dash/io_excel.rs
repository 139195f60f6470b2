// Primitives for reading spreadsheets: xlsx, xlsm, xls and ods.

use std::io::Cursor;

use calamine::{DataType, Ods, Range, Reader, Xls, Xlsx};

use crate::dash::io_common::assemble_row;
use crate::dash::*;

fn read_cell(cell: &DataType) -> RawValue {
    match cell {
        DataType::String(s) if s.trim().is_empty() => RawValue::Empty,
        DataType::String(s) => RawValue::Text(s.clone()),
        DataType::Float(f) => RawValue::Number(*f),
        DataType::Int(i) => RawValue::Number(*i as f64),
        DataType::Bool(b) => RawValue::Bool(*b),
        DataType::DateTime(f) => RawValue::Number(*f),
        DataType::Error(e) => {
            debug!("read_cell: error cell {:?}", e);
            RawValue::Empty
        }
        DataType::Empty => RawValue::Empty,
    }
}

fn header_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        x => read_cell(x).as_text(),
    }
}

// Only the first worksheet is read.
fn first_sheet<R>(workbook: &mut R, name: &str) -> DashResult<Range<DataType>>
where
    R: Reader,
    R::Error: Into<calamine::Error>,
{
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path: name })?
        .map_err(|e| Into::<calamine::Error>::into(e))
        .context(OpeningExcelSnafu { path: name })?;
    Ok(wrange)
}

fn open_workbook_bytes(name: &str, bytes: Vec<u8>) -> DashResult<Range<DataType>> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let cursor = Cursor::new(bytes);
    match ext.as_str() {
        "xls" => {
            let mut workbook: Xls<_> = Xls::new(cursor)
                .map_err(calamine::Error::from)
                .context(OpeningExcelSnafu { path: name })?;
            first_sheet(&mut workbook, name)
        }
        "ods" => {
            let mut workbook: Ods<_> = Ods::new(cursor)
                .map_err(calamine::Error::from)
                .context(OpeningExcelSnafu { path: name })?;
            first_sheet(&mut workbook, name)
        }
        _ => {
            let mut workbook: Xlsx<_> = Xlsx::new(cursor)
                .map_err(calamine::Error::from)
                .context(OpeningExcelSnafu { path: name })?;
            first_sheet(&mut workbook, name)
        }
    }
}

/// Reads the first worksheet of a workbook held in memory. The first row
/// holds the headers. Empty cells are left out of the rows.
pub fn read_excel_rows(name: &str, bytes: Vec<u8>) -> DashResult<Vec<RawRow>> {
    let wrange = open_workbook_bytes(name, bytes)?;

    let mut iter = wrange.rows();
    let headers: Vec<String> = match iter.next() {
        Some(header) => header.iter().map(header_text).collect(),
        None => {
            debug!("read_excel_rows: {:?}: empty worksheet", name);
            return Ok(vec![]);
        }
    };
    debug!("read_excel_rows: header: {:?}", headers);

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<RawValue> = row.iter().map(read_cell).collect();
        let raw_row: RawRow = assemble_row(&headers, cells)
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        if raw_row.is_empty() {
            debug!("read_excel_rows: {:?}: skipping blank row {}", name, idx + 2);
            continue;
        }
        res.push(raw_row);
    }
    debug!("read_excel_rows: {:?}: {} rows", name, res.len());
    Ok(res)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dash::io_common::read_rows;
    use crate::dash::store::tests::temp_dir;
    use std::io::Write;
    use zip::write::FileOptions;

    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    // Numbers become numeric cells, empty strings are left out, anything
    // else is an inline string.
    fn sheet_xml(rows: &[&[&str]]) -> String {
        let mut data = String::new();
        for (r, row) in rows.iter().enumerate() {
            data.push_str(&format!("<row r=\"{}\">", r + 1));
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let pos = format!("{}{}", (b'A' + c as u8) as char, r + 1);
                if value.parse::<f64>().is_ok() {
                    data.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", pos, value));
                } else {
                    data.push_str(&format!(
                        "<c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                        pos, value
                    ));
                }
            }
            data.push_str("</row>");
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><worksheet xmlns=\"{}\"><sheetData>{}</sheetData></worksheet>",
            MAIN_NS, data
        )
    }

    /// A minimal xlsx workbook with one worksheet per entry, in order.
    pub fn xlsx_bytes(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
        let mut sheet_list = String::new();
        let mut rels = String::new();
        for (idx, (name, _)) in sheets.iter().enumerate() {
            sheet_list.push_str(&format!(
                "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
                name,
                idx + 1,
                idx + 1
            ));
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
                idx + 1,
                REL_NS,
                idx + 1
            ));
        }
        let workbook = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><workbook xmlns=\"{}\" xmlns:r=\"{}\"><sheets>{}</sheets></workbook>",
            MAIN_NS, REL_NS, sheet_list
        );
        let workbook_rels = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
            rels
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, contents: &str| {
            writer.start_file(name, FileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        };
        add("xl/workbook.xml", &workbook);
        add("xl/_rels/workbook.xml.rels", &workbook_rels);
        for (idx, (_, rows)) in sheets.iter().enumerate() {
            add(&format!("xl/worksheets/sheet{}.xml", idx + 1), &sheet_xml(rows));
        }
        writer.finish().unwrap().into_inner()
    }

    pub fn survey_workbook() -> Vec<u8> {
        xlsx_bytes(&[
            (
                "응답",
                &[
                    &["학과", "성별", "학년", "문항1", "문항2"],
                    &["간호학과", "여", "2", "5", ""],
                    &["", "", "", "", ""],
                    &["인공지능학과", "  ", "1", "4", "3"],
                ],
            ),
            ("요약", &[&["학과", "문항1"], &["경영학과", "1"]]),
        ])
    }

    #[test]
    fn reads_first_worksheet() {
        let rows = read_excel_rows("survey.xlsx", survey_workbook()).unwrap();
        // The blank row is skipped and the second sheet is never read.
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                ("학과".to_string(), RawValue::from("간호학과")),
                ("성별".to_string(), RawValue::from("여")),
                ("학년".to_string(), RawValue::Number(2.0)),
                ("문항1".to_string(), RawValue::Number(5.0)),
            ]
        );
        // The blank gender is left out.
        assert_eq!(rows[1].len(), 4);
        assert_eq!(rows[1][1], ("학년".to_string(), RawValue::Number(1.0)));

        let row = RespondentRow::from_cells(rows[0].iter());
        assert_eq!(row.dept.as_deref(), Some("간호학과"));
        assert_eq!(row.answer(1), Some(&RawValue::Number(5.0)));
        assert_eq!(row.answer(2), None);
    }

    #[test]
    fn reads_workbook_from_disk() {
        let dir = temp_dir("xlsx");
        let path = dir.join("survey.XLSX");
        fs::write(&path, survey_workbook()).unwrap();
        let rows = read_rows(path.to_str().unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], ("학과".to_string(), RawValue::from("인공지능학과")));
    }

    #[test]
    fn header_only_workbook() {
        let bytes = xlsx_bytes(&[("응답", &[&["학과", "문항1"]])]);
        assert!(read_excel_rows("a.xlsx", bytes).unwrap().is_empty());
    }

    #[test]
    fn cells_are_typed() {
        assert_eq!(read_cell(&DataType::Int(4)), RawValue::Number(4.0));
        assert_eq!(read_cell(&DataType::Float(3.5)), RawValue::Number(3.5));
        assert_eq!(
            read_cell(&DataType::String("여".to_string())),
            RawValue::from("여")
        );
        assert_eq!(read_cell(&DataType::String(" ".to_string())), RawValue::Empty);
        assert_eq!(read_cell(&DataType::Empty), RawValue::Empty);
        assert_eq!(header_text(&DataType::Float(12.0)), "12");
    }

    #[test]
    fn broken_workbook() {
        let res = read_excel_rows("a.xlsx", b"not a workbook".to_vec());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(DashError::OpeningExcel { .. })
        ));
    }
}
