// ********* Input data structures ***********

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::category::classify;
use crate::mapping::{competency_mappings, CompetencyMapping};

/// The content of one spreadsheet cell, before any interpretation.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawValue {
    /// The textual rendering of the cell. Integral numbers lose their
    /// fractional part (`1.0` is rendered as `1`).
    pub fn as_text(&self) -> String {
        match self {
            RawValue::Empty => "".to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Number(f) => f.to_string(),
            RawValue::Bool(b) => b.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> RawValue {
        RawValue::Number(f)
    }
}

/// A row as read from a file: the column headers, verbatim, with their cells.
/// The order of the columns is preserved.
pub type RawRow = Vec<(String, RawValue)>;

/// One survey response after header normalization.
///
/// Answers are keyed by question number. Only questions 1 to 60 are read by
/// the aggregation.
#[derive(PartialEq, Debug, Clone)]
pub struct RespondentRow {
    pub dept: Option<String>,
    pub gender: RawValue,
    pub grade: RawValue,
    pub admission_type: RawValue,
    pub answers: BTreeMap<u32, RawValue>,
}

impl RespondentRow {
    /// An empty response for the given department.
    pub fn new(dept: &str) -> RespondentRow {
        let trimmed = dept.trim();
        RespondentRow {
            dept: if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            },
            gender: RawValue::Empty,
            grade: RawValue::Empty,
            admission_type: RawValue::Empty,
            answers: BTreeMap::new(),
        }
    }

    pub fn with_gender(mut self, gender: impl Into<RawValue>) -> RespondentRow {
        self.gender = gender.into();
        self
    }

    pub fn with_grade(mut self, grade: impl Into<RawValue>) -> RespondentRow {
        self.grade = grade.into();
        self
    }

    pub fn with_admission_type(mut self, admission: impl Into<RawValue>) -> RespondentRow {
        self.admission_type = admission.into();
        self
    }

    pub fn with_answer(mut self, question: u32, value: impl Into<RawValue>) -> RespondentRow {
        self.answers.insert(question, value.into());
        self
    }

    /// Fills every question with the same value.
    pub fn with_all_answers(mut self, value: f64) -> RespondentRow {
        for q in 1..=crate::mapping::NUM_QUESTIONS {
            self.answers.insert(q, RawValue::Number(value));
        }
        self
    }

    pub fn answer(&self, question: u32) -> Option<&RawValue> {
        self.answers.get(&question)
    }
}

// ******** Output data structures *********

/// Scores on a 0-100 scale, keyed by competency or sub-competency id.
pub type ScoreMap = BTreeMap<String, f64>;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenderDistribution {
    pub male: u64,
    pub female: u64,
    pub unknown: u64,
}

impl GenderDistribution {
    pub fn total(&self) -> u64 {
        self.male + self.female + self.unknown
    }
}

/// Competency scores split by gender. An empty gender bucket has all its
/// scores at zero.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderCompetencyScores {
    pub male: ScoreMap,
    pub female: ScoreMap,
}

/// The statistical summary of a group of respondents (university, department
/// or category).
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedData {
    pub n: u64,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "isSample")]
    pub is_sample: bool,
    #[serde(rename = "competencyScores")]
    pub competency_scores: ScoreMap,
    #[serde(rename = "subCompetencyScores")]
    pub sub_competency_scores: ScoreMap,
    #[serde(rename = "genderDistribution")]
    pub gender_distribution: GenderDistribution,
    /// Absent when no respondent declared a gender.
    #[serde(
        rename = "genderCompetencyScores",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gender_competency_scores: Option<GenderCompetencyScores>,
    #[serde(rename = "gradeDistribution", deserialize_with = "grade_keys")]
    pub grade_distribution: BTreeMap<u8, u64>,
    #[serde(
        rename = "admissionDistribution",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub admission_distribution: Option<BTreeMap<String, u64>>,
    #[serde(
        rename = "admissionCompetencyScores",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub admission_competency_scores: Option<BTreeMap<String, ScoreMap>>,
}

// JSON object keys are strings, also when the record is flattened into its
// parent.
fn grade_keys<'de, D>(deserializer: D) -> Result<BTreeMap<u8, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, u64> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(k, v)| {
            k.trim()
                .parse::<u8>()
                .map(|g| (g, v))
                .map_err(|_| D::Error::custom(format!("invalid grade key {:?}", k)))
        })
        .collect()
}

/// A department summary. The category is always derived from the name.
/// Serialized flat: `deptName`, `categoryName` and the record's fields.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct DeptAgg {
    #[serde(rename = "deptName")]
    pub dept_name: String,
    #[serde(flatten)]
    pub summary: AggregatedData,
}

impl DeptAgg {
    pub fn category_name(&self) -> &'static str {
        classify(&self.dept_name)
    }
}

#[derive(Serialize)]
struct DeptAggOut<'a> {
    #[serde(rename = "deptName")]
    dept_name: &'a str,
    #[serde(rename = "categoryName")]
    category_name: &'static str,
    #[serde(flatten)]
    summary: &'a AggregatedData,
}

impl Serialize for DeptAgg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DeptAggOut {
            dept_name: &self.dept_name,
            category_name: self.category_name(),
            summary: &self.summary,
        }
        .serialize(serializer)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAgg {
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "deptCount")]
    pub dept_count: usize,
    #[serde(flatten)]
    pub summary: AggregatedData,
}

/// The three levels computed from one set of responses.
#[derive(PartialEq, Debug, Clone)]
pub struct Rollup {
    pub university: AggregatedData,
    pub departments: Vec<DeptAgg>,
    pub categories: Vec<CategoryAgg>,
}

// ******** Application state *********

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    pub university: AggregatedData,
    pub departments: Vec<DeptAgg>,
    pub categories: Vec<CategoryAgg>,
    pub mapping: Vec<CompetencyMapping>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

impl AppState {
    pub fn from_rollup(rollup: Rollup, last_updated: &str) -> AppState {
        AppState {
            university: rollup.university,
            departments: rollup.departments,
            categories: rollup.categories,
            mapping: competency_mappings(),
            last_updated: last_updated.to_string(),
        }
    }

    pub fn department(&self, dept_name: &str) -> Option<&DeptAgg> {
        self.departments.iter().find(|d| d.dept_name == dept_name)
    }

    pub fn category(&self, category_name: &str) -> Option<&CategoryAgg> {
        self.categories
            .iter()
            .find(|c| c.category_name == category_name)
    }

    /// The departments that currently classify into the given category.
    pub fn departments_in(&self, category_name: &str) -> Vec<&DeptAgg> {
        self.departments
            .iter()
            .filter(|d| d.category_name() == category_name)
            .collect()
    }
}
