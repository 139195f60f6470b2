//! The row aggregator: turns a set of responses into one `AggregatedData`.

use log::debug;
use std::collections::BTreeMap;

use crate::data::{AggregatedData, GenderCompetencyScores, GenderDistribution, RespondentRow, ScoreMap};
use crate::mapping::{sub_competencies, COMPETENCIES};
use crate::normalize::{
    normalize_admission_type, parse_answer, parse_gender, parse_grade, scale_answer, Gender,
};

/// Rounds to the given number of decimals.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

fn zero_scores<'a>(ids: impl Iterator<Item = &'a str>) -> ScoreMap {
    ids.map(|id| (id.to_string(), 0.0)).collect()
}

fn zero_grades() -> BTreeMap<u8, u64> {
    (1..=4).map(|g| (g, 0)).collect()
}

/// The summary of an empty group: everything is zero, nothing is divided.
pub fn empty_aggregate(updated_at: &str) -> AggregatedData {
    AggregatedData {
        n: 0,
        updated_at: updated_at.to_string(),
        is_sample: false,
        competency_scores: zero_scores(COMPETENCIES.iter().map(|c| c.id)),
        sub_competency_scores: zero_scores(sub_competencies().map(|s| s.id)),
        gender_distribution: GenderDistribution::default(),
        gender_competency_scores: None,
        grade_distribution: zero_grades(),
        admission_distribution: None,
        admission_competency_scores: None,
    }
}

// Mean of the answered questions of a group. Unanswered and unreadable cells
// are left out of the mean; a group with no answer at all scores 0.
fn group_mean(row: &RespondentRow, questions: impl Iterator<Item = u32>) -> f64 {
    let mut sum = 0.0;
    let mut count: u32 = 0;
    for q in questions {
        if let Some(v) = row.answer(q).and_then(parse_answer) {
            sum += scale_answer(v);
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn mean_or_zero(sum: f64, count: u64) -> f64 {
    if count > 0 {
        round_to(sum / count as f64, 2)
    } else {
        0.0
    }
}

// Running sums, one slot per competency in `COMPETENCIES` order.
type CompetencySums = [f64; 6];

fn to_score_map(sums: &CompetencySums, count: u64) -> ScoreMap {
    COMPETENCIES
        .iter()
        .zip(sums.iter())
        .map(|(c, s)| (c.id.to_string(), mean_or_zero(*s, count)))
        .collect()
}

/// Aggregates a homogeneous set of responses.
///
/// Every answer is rescaled to 0-100, each response contributes its own mean
/// per competency and per sub-competency, and the group score is the mean of
/// those contributions over all the responses. Gender and admission breakdowns
/// divide by their own bucket sizes.
pub fn aggregate_rows(rows: &[RespondentRow], updated_at: &str) -> AggregatedData {
    let n = rows.len() as u64;
    if n == 0 {
        return empty_aggregate(updated_at);
    }

    let mut gender_distribution = GenderDistribution::default();
    let mut grade_distribution = zero_grades();
    let mut admission_distribution: BTreeMap<String, u64> = BTreeMap::new();

    let mut comp_sums: CompetencySums = [0.0; 6];
    let mut sub_sums: Vec<f64> = vec![0.0; sub_competencies().count()];
    let mut male_sums: CompetencySums = [0.0; 6];
    let mut female_sums: CompetencySums = [0.0; 6];
    let mut admission_sums: BTreeMap<&'static str, CompetencySums> = BTreeMap::new();

    for row in rows.iter() {
        let gender = parse_gender(&row.gender);
        match gender {
            Gender::Male => gender_distribution.male += 1,
            Gender::Female => gender_distribution.female += 1,
            Gender::Unknown => gender_distribution.unknown += 1,
        }

        let grade = parse_grade(&row.grade);
        if (1..=4).contains(&grade) {
            *grade_distribution.entry(grade as u8).or_insert(0) += 1;
        } else {
            debug!("aggregate_rows: grade {} out of range, not counted", grade);
        }

        let admission = normalize_admission_type(&row.admission_type);
        *admission_distribution
            .entry(admission.to_string())
            .or_insert(0) += 1;
        let adm_sums = admission_sums.entry(admission).or_insert([0.0; 6]);

        for (idx, comp) in COMPETENCIES.iter().enumerate() {
            let avg = group_mean(row, comp.questions());
            comp_sums[idx] += avg;
            match gender {
                Gender::Male => male_sums[idx] += avg,
                Gender::Female => female_sums[idx] += avg,
                Gender::Unknown => {}
            }
            adm_sums[idx] += avg;
        }

        for (idx, sub) in sub_competencies().enumerate() {
            sub_sums[idx] += group_mean(row, sub.questions());
        }
    }

    let competency_scores = to_score_map(&comp_sums, n);
    let sub_competency_scores: ScoreMap = sub_competencies()
        .zip(sub_sums.iter())
        .map(|(s, sum)| (s.id.to_string(), mean_or_zero(*sum, n)))
        .collect();

    let gender_competency_scores =
        if gender_distribution.male + gender_distribution.female > 0 {
            Some(GenderCompetencyScores {
                male: to_score_map(&male_sums, gender_distribution.male),
                female: to_score_map(&female_sums, gender_distribution.female),
            })
        } else {
            None
        };

    let admission_competency_scores: BTreeMap<String, ScoreMap> = admission_sums
        .iter()
        .map(|(label, sums)| {
            let count = admission_distribution.get(*label).cloned().unwrap_or(0);
            (label.to_string(), to_score_map(sums, count))
        })
        .collect();

    debug!(
        "aggregate_rows: n={} gender={:?} grades={:?}",
        n, gender_distribution, grade_distribution
    );

    AggregatedData {
        n,
        updated_at: updated_at.to_string(),
        is_sample: false,
        competency_scores,
        sub_competency_scores,
        gender_distribution,
        gender_competency_scores,
        grade_distribution,
        admission_distribution: Some(admission_distribution),
        admission_competency_scores: Some(admission_competency_scores),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawValue;

    const DAY: &str = "2026-03-02";

    #[test]
    fn all_fives_score_one_hundred() {
        let rows = vec![
            RespondentRow::new("X").with_all_answers(5.0),
            RespondentRow::new("X").with_all_answers(5.0),
        ];
        let agg = aggregate_rows(&rows, DAY);
        assert_eq!(agg.n, 2);
        assert_eq!(agg.competency_scores.len(), 6);
        assert!(agg.competency_scores.values().all(|s| *s == 100.0));
        assert_eq!(agg.sub_competency_scores.len(), 12);
        assert!(agg.sub_competency_scores.values().all(|s| *s == 100.0));
        assert_eq!(agg.updated_at, DAY);
        assert!(!agg.is_sample);
    }

    #[test]
    fn gender_distribution_counts() {
        let rows = vec![
            RespondentRow::new("X").with_gender("남"),
            RespondentRow::new("X").with_gender("F"),
        ];
        let agg = aggregate_rows(&rows, DAY);
        assert_eq!(
            agg.gender_distribution,
            GenderDistribution {
                male: 1,
                female: 1,
                unknown: 0
            }
        );
        assert_eq!(agg.gender_distribution.total(), agg.n);
    }

    #[test]
    fn empty_group_is_all_zero() {
        let agg = aggregate_rows(&[], DAY);
        assert_eq!(agg.n, 0);
        assert_eq!(agg.competency_scores.len(), 6);
        assert!(agg.competency_scores.values().all(|s| *s == 0.0));
        assert_eq!(agg.sub_competency_scores.len(), 12);
        assert!(agg.sub_competency_scores.values().all(|s| *s == 0.0));
        assert_eq!(agg.grade_distribution.len(), 4);
        assert!(agg.grade_distribution.values().all(|c| *c == 0));
        assert_eq!(agg.gender_competency_scores, None);
        assert_eq!(agg.admission_distribution, None);
    }

    #[test]
    fn likert_and_percent_scales_agree() {
        let likert = aggregate_rows(&[RespondentRow::new("X").with_all_answers(4.0)], DAY);
        let percent = aggregate_rows(&[RespondentRow::new("X").with_all_answers(80.0)], DAY);
        assert_eq!(likert.competency_scores, percent.competency_scores);
        assert_eq!(likert.competency_scores["selfConfidence"], 80.0);
    }

    #[test]
    fn scale_is_detected_per_cell() {
        let row = RespondentRow::new("X")
            .with_answer(1, 4.0)
            .with_answer(2, 60.0);
        let agg = aggregate_rows(&[row], DAY);
        // (80 + 60) / 2 over the answered questions of selfConfidence.
        assert_eq!(agg.competency_scores["selfConfidence"], 70.0);
        assert_eq!(agg.sub_competency_scores["sub1"], 70.0);
        assert_eq!(agg.sub_competency_scores["sub2"], 0.0);
    }

    #[test]
    fn unanswered_cells_are_excluded_not_zeroed() {
        let row = RespondentRow::new("X")
            .with_answer(11, 5.0)
            .with_answer(12, RawValue::Text("".to_string()))
            .with_answer(13, RawValue::Text("모름".to_string()));
        let agg = aggregate_rows(&[row], DAY);
        assert_eq!(agg.competency_scores["lifeDesign"], 100.0);
        assert_eq!(agg.sub_competency_scores["sub3"], 100.0);
    }

    #[test]
    fn incomplete_responses_pull_the_mean_down() {
        let full = RespondentRow::new("X").with_all_answers(5.0);
        let blank = RespondentRow::new("X");
        let agg = aggregate_rows(&[full, blank], DAY);
        assert_eq!(agg.competency_scores["convergenceComm"], 50.0);
    }

    #[test]
    fn grades_out_of_range_are_not_distributed() {
        let rows = vec![
            RespondentRow::new("X").with_grade(2.0),
            RespondentRow::new("X").with_grade("4학년"),
            RespondentRow::new("X").with_grade("6"),
            RespondentRow::new("X"),
        ];
        let agg = aggregate_rows(&rows, DAY);
        assert_eq!(agg.n, 4);
        assert_eq!(agg.grade_distribution[&1], 1);
        assert_eq!(agg.grade_distribution[&2], 1);
        assert_eq!(agg.grade_distribution[&3], 0);
        assert_eq!(agg.grade_distribution[&4], 1);
        assert!(agg.grade_distribution.values().sum::<u64>() <= agg.n);
    }

    #[test]
    fn empty_gender_bucket_scores_zero() {
        let rows = vec![RespondentRow::new("X")
            .with_gender("male")
            .with_all_answers(3.0)];
        let agg = aggregate_rows(&rows, DAY);
        let gcs = agg.gender_competency_scores.unwrap();
        assert_eq!(gcs.male["professionalism"], 60.0);
        assert_eq!(gcs.female.len(), 6);
        assert!(gcs.female.values().all(|s| *s == 0.0));
    }

    #[test]
    fn no_gender_breakdown_without_known_genders() {
        let rows = vec![RespondentRow::new("X").with_all_answers(3.0)];
        let agg = aggregate_rows(&rows, DAY);
        assert_eq!(agg.gender_distribution.unknown, 1);
        assert_eq!(agg.gender_competency_scores, None);
    }

    #[test]
    fn admission_breakdown() {
        let rows = vec![
            RespondentRow::new("X")
                .with_admission_type("학생부교과")
                .with_all_answers(5.0),
            RespondentRow::new("X")
                .with_admission_type("학생부교과 (지역인재)")
                .with_all_answers(3.0),
            RespondentRow::new("X").with_all_answers(1.0),
        ];
        let agg = aggregate_rows(&rows, DAY);
        let dist = agg.admission_distribution.unwrap();
        assert_eq!(dist["학생부교과"], 2);
        assert_eq!(dist["기타/미분류"], 1);
        let scores = agg.admission_competency_scores.unwrap();
        assert_eq!(scores["학생부교과"]["creativeChallenge"], 80.0);
        assert_eq!(scores["기타/미분류"]["creativeChallenge"], 20.0);
    }

    #[test]
    fn scores_stay_within_bounds() {
        let rows = vec![
            RespondentRow::new("X").with_all_answers(250.0),
            RespondentRow::new("X").with_all_answers(-3.0),
            RespondentRow::new("X").with_all_answers(2.5),
        ];
        let agg = aggregate_rows(&rows, DAY);
        for s in agg
            .competency_scores
            .values()
            .chain(agg.sub_competency_scores.values())
        {
            assert!((0.0..=100.0).contains(s), "score {} out of bounds", s);
        }
    }

    #[test]
    fn scores_are_rounded_to_two_decimals() {
        let rows = vec![
            RespondentRow::new("X").with_answer(1, 1.0),
            RespondentRow::new("X").with_answer(1, 1.0),
            RespondentRow::new("X").with_answer(1, 2.0),
        ];
        let agg = aggregate_rows(&rows, DAY);
        // (20 + 20 + 40) / 3
        assert_eq!(agg.competency_scores["selfConfidence"], 26.67);
    }
}
