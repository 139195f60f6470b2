//! Normalization of spreadsheet headers and cells.
//!
//! Survey exports come with headers in Korean or English, with arbitrary
//! spacing and casing. Everything in this module is total: a header or a cell
//! that cannot be understood degrades to a pass-through or to `None`.

use log::debug;
use std::fmt::Display;

use crate::data::{RawValue, RespondentRow};

const DEPT_SYNONYMS: [&str; 4] = ["학과", "전공", "dept", "부서"];
const GENDER_SYNONYMS: [&str; 3] = ["성별", "gender", "sex"];
const GRADE_SYNONYMS: [&str; 3] = ["학년", "grade", "연차"];
const ADMISSION_SYNONYMS: [&str; 3] = ["전형", "모집", "admission"];

/// The label for respondents whose admission track is missing or not recognized.
pub const UNCATEGORIZED_ADMISSION: &str = "기타/미분류";

/// The canonical meaning of a column.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum CanonicalKey {
    Dept,
    Gender,
    Grade,
    AdmissionType,
    Question(u32),
    /// Not recognized: the cleaned header.
    Other(String),
}

impl Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanonicalKey::Dept => write!(f, "dept"),
            CanonicalKey::Gender => write!(f, "gender"),
            CanonicalKey::Grade => write!(f, "grade"),
            CanonicalKey::AdmissionType => write!(f, "admissionType"),
            CanonicalKey::Question(q) => write!(f, "question{}", q),
            CanonicalKey::Other(s) => write!(f, "{}", s),
        }
    }
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn contains_any(s: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| s.contains(n))
}

// The question prefixes (문항, q, question, item, ...) are all optional, so
// the first run of digits in the header is the question number.
fn embedded_number(s: &str) -> Option<u32> {
    let digits: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse::<u32>().ok()
    }
}

/// Finds the meaning of a raw column header.
pub fn classify_header(raw: &str) -> CanonicalKey {
    let key = clean_header(raw);
    if contains_any(&key, &DEPT_SYNONYMS) {
        CanonicalKey::Dept
    } else if contains_any(&key, &GENDER_SYNONYMS) || key == "성" {
        CanonicalKey::Gender
    } else if contains_any(&key, &GRADE_SYNONYMS) {
        CanonicalKey::Grade
    } else if contains_any(&key, &ADMISSION_SYNONYMS) {
        CanonicalKey::AdmissionType
    } else if let Some(q) = embedded_number(&key) {
        CanonicalKey::Question(q)
    } else {
        CanonicalKey::Other(key)
    }
}

/// Maps a raw column header to its canonical key: `dept`, `gender`, `grade`,
/// `admissionType`, `question<N>`, or the cleaned header itself.
pub fn normalize_key(raw: &str) -> String {
    classify_header(raw).to_string()
}

impl RespondentRow {
    /// Builds a typed row from the cells of a spreadsheet row. Blank cells
    /// are ignored. When two columns map to the same key, the last non-blank
    /// one wins.
    pub fn from_cells<'a, I>(cells: I) -> RespondentRow
    where
        I: IntoIterator<Item = &'a (String, RawValue)>,
    {
        let mut row = RespondentRow::new("");
        for (header, value) in cells {
            if value.is_empty() {
                continue;
            }
            match classify_header(header) {
                CanonicalKey::Dept => {
                    let s = value.as_text();
                    let s = s.trim();
                    row.dept = if s.is_empty() {
                        None
                    } else {
                        Some(s.to_string())
                    };
                }
                CanonicalKey::Gender => row.gender = value.clone(),
                CanonicalKey::Grade => row.grade = value.clone(),
                CanonicalKey::AdmissionType => row.admission_type = value.clone(),
                CanonicalKey::Question(q) => {
                    row.answers.insert(q, value.clone());
                }
                CanonicalKey::Other(key) => {
                    debug!("from_cells: ignoring column {:?} ({:?})", header, key);
                }
            }
        }
        row
    }
}

// ******** Cell parsers *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

pub fn parse_gender(raw: &RawValue) -> Gender {
    let s = raw.as_text().trim().to_lowercase();
    match s.as_str() {
        "1" | "남" | "남성" | "남자" | "m" | "male" => Gender::Male,
        "2" | "여" | "여성" | "여자" | "f" | "female" => Gender::Female,
        _ => Gender::Unknown,
    }
}

/// Maps a free-text admission track to one of the fixed admission labels.
pub fn normalize_admission_type(raw: &RawValue) -> &'static str {
    let s = match raw {
        RawValue::Empty | RawValue::Bool(false) => return UNCATEGORIZED_ADMISSION,
        RawValue::Number(f) if *f == 0.0 || f.is_nan() => return UNCATEGORIZED_ADMISSION,
        _ => raw.as_text(),
    };
    let s = s.trim();
    if s.contains("교과") {
        "학생부교과"
    } else if s.contains("종합") {
        "학생부종합"
    } else if s.contains("수능") || s.contains("정시") {
        "수능(정시)"
    } else if s.contains("실기") {
        "실기/실적"
    } else if s.contains("외국인") {
        "재외국인"
    } else {
        UNCATEGORIZED_ADMISSION
    }
}

/// The grade of a respondent. Missing, unreadable or zero grades count as
/// first grade. The value is not range-checked here.
pub fn parse_grade(raw: &RawValue) -> i64 {
    let s = raw.as_text();
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<i64>() {
        Ok(0) | Err(_) => 1,
        Ok(x) => sign * x,
    }
}

/// Reads the leading number of a cell, in the lenient way spreadsheet users
/// expect (`"4점"` reads as 4). Returns `None` for anything without a number.
pub fn parse_answer(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Number(f) if f.is_finite() => Some(*f),
        RawValue::Text(s) => parse_leading_f64(s),
        _ => None,
    }
}

fn parse_leading_f64(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let candidate: String = s
        .char_indices()
        .take_while(|(idx, c)| {
            c.is_ascii_digit() || *c == '.' || *c == 'e' || *c == 'E' || {
                // Signs are accepted at the start or right after an exponent.
                (*c == '-' || *c == '+')
                    && (*idx == 0 || matches!(s[..*idx].chars().last(), Some('e') | Some('E')))
            }
        })
        .map(|(_, c)| c)
        .collect();
    // Shrink until the prefix parses: "4.5e" -> "4.5".
    let mut end = candidate.len();
    while end > 0 {
        if let Ok(v) = candidate[..end].parse::<f64>() {
            if v.is_finite() {
                return Some(v);
            }
        }
        end -= 1;
    }
    None
}

/// Rescales one answer onto the 0-100 scale. Values up to 5 are Likert
/// points (x20), larger values are taken as already on the 0-100 scale.
pub fn scale_answer(v: f64) -> f64 {
    let scaled = if v <= 5.0 { v * 20.0 } else { v };
    scaled.clamp(0.0, 100.0)
}
