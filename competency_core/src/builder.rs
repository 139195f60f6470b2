use log::debug;

use crate::data::{RawRow, RespondentRow, Rollup};

/// A builder for adding survey responses one at a time.
///
/// Readers that stream rows out of a file can hand them over as they come,
/// without keeping the raw cells around.
///
/// ```
/// use competency_core::builder::Builder;
/// use competency_core::RawValue;
///
/// let mut builder = Builder::new("2026-03-02");
/// builder.add_raw_row(&vec![
///     ("학과명".to_string(), RawValue::from("간호학과")),
///     ("성별".to_string(), RawValue::from("여")),
///     ("Q1".to_string(), RawValue::from(5.0)),
/// ]);
/// assert_eq!(builder.len(), 1);
///
/// let rollup = builder.rollup();
/// assert_eq!(rollup.departments[0].dept_name, "간호학과");
/// ```
pub struct Builder {
    updated_at: String,
    rows: Vec<RespondentRow>,
}

impl Builder {
    pub fn new(updated_at: &str) -> Builder {
        Builder {
            updated_at: updated_at.to_string(),
            rows: Vec::new(),
        }
    }

    /// Adds a row with its original column headers.
    pub fn add_raw_row(&mut self, cells: &RawRow) {
        let row = RespondentRow::from_cells(cells.iter());
        debug!("add_raw_row: {}: {:?}", self.rows.len(), row.dept);
        self.add_row(row);
    }

    pub fn add_row(&mut self, row: RespondentRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Computes the summaries over all the rows added so far.
    pub fn rollup(&self) -> Rollup {
        crate::aggregate_all(&self.rows, &self.updated_at)
    }
}
