//! Seeded demonstration data, used before the first upload and after a reset.
//!
//! The department records are sample values. The university totals and the
//! categories are derived from them, so the seeded state reconciles exactly
//! like an uploaded one.

use std::collections::BTreeMap;

use crate::category::aggregate_categories;
use crate::data::{
    AggregatedData, AppState, DeptAgg, GenderCompetencyScores, GenderDistribution, ScoreMap,
};
use crate::mapping::competency_mappings;

pub const SAMPLE_DATE: &str = "2025-08-07";

const UNIVERSITY_COMPETENCY_SCORES: [(&str, f64); 6] = [
    ("selfConfidence", 77.2),
    ("lifeDesign", 78.4),
    ("professionalism", 76.3),
    ("creativeChallenge", 73.6),
    ("convergenceComm", 79.9),
    ("communityParticipation", 78.0),
];

const UNIVERSITY_SUB_COMPETENCY_SCORES: [(&str, f64); 12] = [
    ("sub1", 76.5),
    ("sub2", 77.9),
    ("sub3", 79.0),
    ("sub4", 77.8),
    ("sub5", 75.2),
    ("sub6", 77.4),
    ("sub7", 74.1),
    ("sub8", 73.1),
    ("sub9", 80.5),
    ("sub10", 79.3),
    ("sub11", 78.2),
    ("sub12", 77.8),
];

struct SampleDept {
    name: &'static str,
    gender: GenderDistribution,
    grades: [u64; 4],
    // The competency this department stands out in.
    highlight: (&'static str, f64),
}

const SAMPLE_DEPTS: [SampleDept; 3] = [
    SampleDept {
        name: "의예과",
        gender: GenderDistribution {
            male: 58,
            female: 60,
            unknown: 2,
        },
        grades: [35, 30, 28, 27],
        highlight: ("selfConfidence", 82.1),
    },
    SampleDept {
        name: "간호학과",
        gender: GenderDistribution {
            male: 30,
            female: 205,
            unknown: 5,
        },
        grades: [70, 60, 58, 52],
        highlight: ("professionalism", 85.4),
    },
    SampleDept {
        name: "디자인학과",
        gender: GenderDistribution {
            male: 32,
            female: 51,
            unknown: 2,
        },
        grades: [25, 22, 20, 18],
        highlight: ("creativeChallenge", 81.2),
    },
];

fn scores(pairs: &[(&str, f64)]) -> ScoreMap {
    pairs.iter().map(|(id, s)| (id.to_string(), *s)).collect()
}

fn grades(counts: &[u64; 4]) -> BTreeMap<u8, u64> {
    counts
        .iter()
        .enumerate()
        .map(|(idx, c)| ((idx + 1) as u8, *c))
        .collect()
}

// The sample carries no gender gap.
fn same_for_both(scores: &ScoreMap) -> Option<GenderCompetencyScores> {
    Some(GenderCompetencyScores {
        male: scores.clone(),
        female: scores.clone(),
    })
}

fn sample_dept(def: &SampleDept) -> DeptAgg {
    let mut competency_scores = scores(&UNIVERSITY_COMPETENCY_SCORES);
    competency_scores.insert(def.highlight.0.to_string(), def.highlight.1);
    DeptAgg {
        dept_name: def.name.to_string(),
        summary: AggregatedData {
            n: def.gender.total(),
            updated_at: SAMPLE_DATE.to_string(),
            is_sample: true,
            gender_competency_scores: same_for_both(&competency_scores),
            competency_scores,
            sub_competency_scores: scores(&UNIVERSITY_SUB_COMPETENCY_SCORES),
            gender_distribution: def.gender,
            grade_distribution: grades(&def.grades),
            admission_distribution: None,
            admission_competency_scores: None,
        },
    }
}

pub fn sample_departments() -> Vec<DeptAgg> {
    SAMPLE_DEPTS.iter().map(sample_dept).collect()
}

/// The seeded application state.
pub fn sample_state(last_updated: &str) -> AppState {
    let departments = sample_departments();
    let categories = aggregate_categories(&departments);

    let mut gender_distribution = GenderDistribution::default();
    let mut grade_distribution: BTreeMap<u8, u64> = grades(&[0; 4]);
    for d in departments.iter() {
        gender_distribution.male += d.summary.gender_distribution.male;
        gender_distribution.female += d.summary.gender_distribution.female;
        gender_distribution.unknown += d.summary.gender_distribution.unknown;
        for (g, c) in d.summary.grade_distribution.iter() {
            *grade_distribution.entry(*g).or_insert(0) += c;
        }
    }

    let competency_scores = scores(&UNIVERSITY_COMPETENCY_SCORES);
    let university = AggregatedData {
        n: departments.iter().map(|d| d.summary.n).sum(),
        updated_at: SAMPLE_DATE.to_string(),
        is_sample: true,
        gender_competency_scores: same_for_both(&competency_scores),
        competency_scores,
        sub_competency_scores: scores(&UNIVERSITY_SUB_COMPETENCY_SCORES),
        gender_distribution,
        grade_distribution,
        admission_distribution: None,
        admission_competency_scores: None,
    };

    AppState {
        university,
        departments,
        categories,
        mapping: competency_mappings(),
        last_updated: last_updated.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FALLBACK_CATEGORY;

    #[test]
    fn sample_totals_reconcile() {
        let state = sample_state("2026-01-01T00:00:00Z");
        assert_eq!(state.departments.len(), 3);
        assert_eq!(state.university.n, 445);
        assert_eq!(state.university.gender_distribution.total(), 445);
        assert_eq!(state.university.grade_distribution.values().sum::<u64>(), 445);
        let cat_total: u64 = state.categories.iter().map(|c| c.summary.n).sum();
        assert_eq!(cat_total, 445);
        assert!(state.university.is_sample);
        for d in state.departments.iter() {
            assert_eq!(d.summary.gender_distribution.total(), d.summary.n);
        }
    }

    #[test]
    fn sample_categories() {
        let state = sample_state("2026-01-01T00:00:00Z");
        let nursing = state.category("간호대학").unwrap();
        assert_eq!(nursing.summary.n, 240);
        assert_eq!(nursing.summary.competency_scores["professionalism"], 85.4);
        assert!(nursing.summary.is_sample);
        let by_gender = nursing.summary.gender_competency_scores.as_ref().unwrap();
        assert_eq!(by_gender.female["professionalism"], 85.4);
        let other = state.category(FALLBACK_CATEGORY).unwrap();
        assert_eq!(other.dept_count, 1);
        assert_eq!(state.departments_in("의과학계열")[0].dept_name, "의예과");
        // Empty categories are still listed.
        let military = state.category("군사경찰계열").unwrap();
        assert_eq!(military.summary.n, 0);
    }
}
