// The CSV upload template.

use competency_core::mapping::NUM_QUESTIONS;

use crate::dash::*;

const EXAMPLE_ANSWERS: [[&str; 5]; 2] = [
    ["4.0", "4.5", "3.5", "5.0", "4.0"],
    ["4.5", "4.0", "5.0", "4.0", "3.5"],
];

pub fn template_headers() -> Vec<String> {
    let mut headers: Vec<String> = ["학과", "성별", "학년", "모집전형"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    headers.extend((1..=NUM_QUESTIONS).map(|q| format!("문항 {}", q)));
    headers
}

fn example_row(prefix: [&str; 4], answers: &[&str; 5]) -> Vec<String> {
    let mut row: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
    row.extend(
        (0..NUM_QUESTIONS as usize).map(|idx| answers[idx % answers.len()].to_string()),
    );
    row
}

/// Writes a template with the expected headers and two example rows.
pub fn write_template(path: &str) -> DashResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;
    wtr.write_record(template_headers())
        .context(CsvWriteSnafu { path })?;
    wtr.write_record(example_row(
        ["인공지능학과", "남성", "1", "학생부교과"],
        &EXAMPLE_ANSWERS[0],
    ))
    .context(CsvWriteSnafu { path })?;
    wtr.write_record(example_row(
        ["간호학과", "여성", "2", "학생부종합"],
        &EXAMPLE_ANSWERS[1],
    ))
    .context(CsvWriteSnafu { path })?;
    wtr.flush().context(WritingFileSnafu { path })?;
    info!("write_template: template written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::io_common::read_rows;
    use crate::dash::store::tests::temp_dir;

    #[test]
    fn template_headers_normalize() {
        let headers = template_headers();
        assert_eq!(headers.len(), 64);
        let keys: Vec<String> = headers.iter().map(|h| normalize_key(h)).collect();
        assert_eq!(keys[..4], ["dept", "gender", "grade", "admissionType"]);
        assert_eq!(keys[4], "question1");
        assert_eq!(keys[63], "question60");
    }

    #[test]
    fn template_can_be_uploaded() {
        let dir = temp_dir("template");
        let path = dir.join("template.csv").display().to_string();
        write_template(&path).unwrap();

        let raw_rows = read_rows(&path).unwrap();
        assert_eq!(raw_rows.len(), 2);
        let rows: Vec<RespondentRow> = raw_rows
            .iter()
            .map(|r| RespondentRow::from_cells(r.iter()))
            .collect();
        let rollup = aggregate_all(&rows, "2026-03-02");
        assert_eq!(rollup.university.gender_distribution.male, 1);
        assert_eq!(rollup.university.gender_distribution.female, 1);
        assert_eq!(rollup.departments[0].category_name(), "AI·SW융합대학");
        assert_eq!(rollup.departments[1].category_name(), "간호대학");
        // Mean of 4.0, 4.5, 3.5, 5.0, 4.0 on the 0-100 scale.
        assert_eq!(rollup.departments[0].summary.sub_competency_scores["sub1"], 84.0);
    }
}
