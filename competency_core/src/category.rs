//! Academic categories and the category-level rollup.
//!
//! Department names are free text, so categories are assigned through ordered
//! substring rules: the first rule that matches wins.

use log::debug;
use std::collections::BTreeMap;

use crate::aggregate::round_to;
use crate::data::{
    AggregatedData, CategoryAgg, DeptAgg, GenderCompetencyScores, GenderDistribution, ScoreMap,
};
use crate::mapping::{sub_competencies, COMPETENCIES};

/// The category for departments that no rule recognizes.
pub const FALLBACK_CATEGORY: &str = "기타창의계열";

const CATEGORY_RULES: [(&str, &[&str]); 8] = [
    (
        "AI·SW융합대학",
        &["디지털콘텐츠", "인공지능", "컴퓨터", "사이버보안", "융합IT", "AI", "SW"],
    ),
    ("간호대학", &["간호"]),
    ("군사경찰계열", &["군사", "경찰"]),
    ("글로벌경영계열", &["경영", "글로벌", "금융", "세무"]),
    (
        "의과학계열",
        &["의예", "의학", "임상병리", "방사선", "치위생"],
    ),
    ("의료공과계열", &["의료공학", "제약공학", "의료IT"]),
    (
        "재활복지계열",
        &["물리치료", "작업치료", "언어치료", "사회복지", "아동보육", "안경광학"],
    ),
    ("창의융합계열", &["문화산업", "유아교육", "초등특수", "심리"]),
];

/// All the category labels, in display order. The fallback comes last.
pub fn category_labels() -> impl Iterator<Item = &'static str> {
    CATEGORY_RULES
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(FALLBACK_CATEGORY))
}

/// Assigns a department to its academic category.
pub fn classify(dept_name: &str) -> &'static str {
    CATEGORY_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| dept_name.contains(n)))
        .map(|(label, _)| *label)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Average of group scores, weighted by the size of each group.
/// Returns 0 when all the groups are empty. The result is rounded to one
/// decimal.
pub fn weighted_score<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, u64)>,
{
    let mut total = 0.0;
    let mut count: u64 = 0;
    for (score, weight) in pairs {
        total += score * weight as f64;
        count += weight;
    }
    if count == 0 {
        0.0
    } else {
        round_to(total / count as f64, 1)
    }
}

fn score_of(scores: &ScoreMap, id: &str) -> f64 {
    scores.get(id).cloned().unwrap_or(0.0)
}

/// Rolls the departments of one category up into a single summary.
/// Only the department summaries are read, never the raw responses.
pub fn aggregate_category(category_name: &str, depts: &[&DeptAgg]) -> CategoryAgg {
    let n: u64 = depts.iter().map(|d| d.summary.n).sum();

    let mut competency_scores = ScoreMap::new();
    for c in COMPETENCIES.iter() {
        let s = weighted_score(
            depts
                .iter()
                .map(|d| (score_of(&d.summary.competency_scores, c.id), d.summary.n)),
        );
        competency_scores.insert(c.id.to_string(), s);
    }

    let mut sub_competency_scores = ScoreMap::new();
    for sub in sub_competencies() {
        let s = weighted_score(
            depts
                .iter()
                .map(|d| (score_of(&d.summary.sub_competency_scores, sub.id), d.summary.n)),
        );
        sub_competency_scores.insert(sub.id.to_string(), s);
    }

    let mut gender_distribution = GenderDistribution::default();
    for d in depts.iter() {
        gender_distribution.male += d.summary.gender_distribution.male;
        gender_distribution.female += d.summary.gender_distribution.female;
        gender_distribution.unknown += d.summary.gender_distribution.unknown;
    }

    let gender_competency_scores =
        if gender_distribution.male + gender_distribution.female > 0 {
            let mut gcs = GenderCompetencyScores::default();
            for c in COMPETENCIES.iter() {
                let male = weighted_score(depts.iter().map(|d| {
                    let s = d
                        .summary
                        .gender_competency_scores
                        .as_ref()
                        .map(|g| score_of(&g.male, c.id))
                        .unwrap_or(0.0);
                    (s, d.summary.gender_distribution.male)
                }));
                let female = weighted_score(depts.iter().map(|d| {
                    let s = d
                        .summary
                        .gender_competency_scores
                        .as_ref()
                        .map(|g| score_of(&g.female, c.id))
                        .unwrap_or(0.0);
                    (s, d.summary.gender_distribution.female)
                }));
                gcs.male.insert(c.id.to_string(), male);
                gcs.female.insert(c.id.to_string(), female);
            }
            Some(gcs)
        } else {
            None
        };

    let mut grade_distribution: BTreeMap<u8, u64> = (1..=4).map(|g| (g, 0)).collect();
    for d in depts.iter() {
        for (grade, count) in d.summary.grade_distribution.iter() {
            *grade_distribution.entry(*grade).or_insert(0) += count;
        }
    }

    let (admission_distribution, admission_competency_scores) = aggregate_admissions(depts);

    debug!(
        "aggregate_category: {}: {} departments, n={}",
        category_name,
        depts.len(),
        n
    );

    CategoryAgg {
        category_name: category_name.to_string(),
        dept_count: depts.len(),
        summary: AggregatedData {
            n,
            updated_at: depts
                .first()
                .map(|d| d.summary.updated_at.clone())
                .unwrap_or_default(),
            is_sample: depts.iter().all(|d| d.summary.is_sample),
            competency_scores,
            sub_competency_scores,
            gender_distribution,
            gender_competency_scores,
            grade_distribution,
            admission_distribution,
            admission_competency_scores,
        },
    }
}

type AdmissionRollup = (
    Option<BTreeMap<String, u64>>,
    Option<BTreeMap<String, ScoreMap>>,
);

// Admission counts are summed, admission scores are weighted by the count of
// each admission label in each department.
fn aggregate_admissions(depts: &[&DeptAgg]) -> AdmissionRollup {
    let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
    for d in depts.iter() {
        if let Some(dist) = d.summary.admission_distribution.as_ref() {
            for (label, count) in dist.iter() {
                *distribution.entry(label.clone()).or_insert(0) += count;
            }
        }
    }
    if distribution.is_empty() {
        return (None, None);
    }

    let mut scores: BTreeMap<String, ScoreMap> = BTreeMap::new();
    for label in distribution.keys() {
        let mut per_competency = ScoreMap::new();
        for c in COMPETENCIES.iter() {
            let s = weighted_score(depts.iter().map(|d| {
                let count = d
                    .summary
                    .admission_distribution
                    .as_ref()
                    .and_then(|dist| dist.get(label))
                    .cloned()
                    .unwrap_or(0);
                let score = d
                    .summary
                    .admission_competency_scores
                    .as_ref()
                    .and_then(|acs| acs.get(label))
                    .map(|m| score_of(m, c.id))
                    .unwrap_or(0.0);
                (score, count)
            }));
            per_competency.insert(c.id.to_string(), s);
        }
        scores.insert(label.clone(), per_competency);
    }
    (Some(distribution), Some(scores))
}

/// Computes one summary per category label. Every label is present, even with
/// no department, except the fallback category which only appears when it
/// has respondents.
pub fn aggregate_categories(depts: &[DeptAgg]) -> Vec<CategoryAgg> {
    let mut by_category: BTreeMap<&'static str, Vec<&DeptAgg>> = BTreeMap::new();
    for d in depts.iter() {
        by_category.entry(d.category_name()).or_default().push(d);
    }

    category_labels()
        .map(|label| {
            let members = by_category.remove(label).unwrap_or_default();
            aggregate_category(label, &members)
        })
        .filter(|cat| cat.summary.n > 0 || cat.category_name != FALLBACK_CATEGORY)
        .collect()
}
