/*!
Aggregation engine for the university core-competency survey.

The survey has 60 questions. They map to 6 competencies and 12
sub-competencies (see [`mapping`]). Responses are summarized at three levels:
the whole university, each department, and each academic category. Category
summaries are computed from the department summaries only, weighted by the
number of respondents, so the three levels always reconcile.

```
use competency_core::{aggregate_all, RespondentRow};

let rows = vec![
    RespondentRow::new("간호학과").with_gender("여").with_all_answers(5.0),
    RespondentRow::new("간호학과").with_gender("남").with_all_answers(4.0),
];
let rollup = aggregate_all(&rows, "2026-03-02");
assert_eq!(rollup.university.n, 2);
assert_eq!(rollup.departments[0].category_name(), "간호대학");
assert_eq!(rollup.university.competency_scores["selfConfidence"], 90.0);
```

See [`quick_start`] for a walk-through and [`manual`] for the details of
each rule.
*/

pub mod aggregate;
pub mod builder;
pub mod category;
mod data;
pub mod manual;
pub mod mapping;
pub mod normalize;
pub mod quick_start;
pub mod sample;

use log::{debug, info};
use std::collections::HashMap;

pub use crate::aggregate::{aggregate_rows, empty_aggregate};
pub use crate::category::{aggregate_categories, classify, weighted_score, FALLBACK_CATEGORY};
pub use crate::data::*;
pub use crate::mapping::{competency_mappings, CompetencyMapping, SubCompetencyMapping};
pub use crate::normalize::{normalize_key, parse_gender, Gender};

/// The department name used for responses without one.
pub const UNCLASSIFIED_DEPT: &str = "미분류 학과";

/// Groups the responses by department, in order of first appearance.
pub fn group_by_department(rows: &[RespondentRow]) -> Vec<(String, Vec<RespondentRow>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<RespondentRow>)> = Vec::new();
    for row in rows.iter() {
        let name = row
            .dept
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNCLASSIFIED_DEPT);
        match index.get(name) {
            Some(idx) => groups[*idx].1.push(row.clone()),
            None => {
                index.insert(name.to_string(), groups.len());
                groups.push((name.to_string(), vec![row.clone()]));
            }
        }
    }
    groups
}

/// Computes the university, department and category summaries.
///
/// Arguments:
/// * `rows` the normalized responses
/// * `updated_at` the date stamped on every summary (`YYYY-MM-DD`)
pub fn aggregate_all(rows: &[RespondentRow], updated_at: &str) -> Rollup {
    info!("aggregate_all: processing {} responses", rows.len());

    let university = aggregate_rows(rows, updated_at);

    let departments: Vec<DeptAgg> = group_by_department(rows)
        .into_iter()
        .map(|(dept_name, dept_rows)| {
            debug!(
                "aggregate_all: department {:?}: {} responses",
                dept_name,
                dept_rows.len()
            );
            DeptAgg {
                summary: aggregate_rows(&dept_rows, updated_at),
                dept_name,
            }
        })
        .collect();
    info!("aggregate_all: {} departments", departments.len());

    let categories = aggregate_categories(&departments);
    for c in categories.iter() {
        info!(
            "Category: {}: {} departments, {} responses",
            c.category_name, c.dept_count, c.summary.n
        );
    }

    Rollup {
        university,
        departments,
        categories,
    }
}
