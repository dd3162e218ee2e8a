//! Row selection over the normalized table.
//!
//! Criteria are combined with logical AND. Filtering never touches the table:
//! a [`FilteredView`] only borrows it and keeps the indices of passing rows.

use std::{fmt, str::FromStr};

use anyhow::{Result, ensure};
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::{
    data::Cell,
    dataset::Table,
    error::MissingColumn,
    schema::{ATTENDANCE, GENDER, LEARNING_STYLE},
};

pub const ALL: &str = "All";

/// Equality predicate on a categorical column, or the "All" wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => cell.as_text() == Some(expected.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl FromStr for Selection {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed == ALL {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(value) => f.write_str(value),
        }
    }
}

impl Serialize for Selection {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Inclusive attendance interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceRange {
    pub min: f64,
    pub max: f64,
}

impl AttendanceRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        ensure!(
            !min.is_nan() && !max.is_nan(),
            "Attendance bounds must be numbers"
        );
        ensure!(
            min <= max,
            "Minimum attendance {min} exceeds maximum attendance {max}"
        );
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Fills absent bounds from the observed range of the full table.
    pub fn resolve(
        min: Option<f64>,
        max: Option<f64>,
        observed: Option<AttendanceRange>,
    ) -> Result<Option<Self>> {
        match (min, max, observed) {
            (None, None, observed) => Ok(observed),
            (Some(min), Some(max), _) => Self::new(min, max).map(Some),
            (Some(min), None, Some(observed)) => Self::new(min, observed.max).map(Some),
            (None, Some(max), Some(observed)) => Self::new(observed.min, max).map(Some),
            (Some(bound), None, None) | (None, Some(bound), None) => {
                Self::new(bound, bound).map(Some)
            }
        }
    }
}

/// Observed minimum and maximum of `Attendance`, the default slider bounds.
pub fn attendance_bounds(table: &Table) -> Option<AttendanceRange> {
    let column = table.column_index(ATTENDANCE)?;
    match table
        .column(column)
        .filter_map(Cell::as_number)
        .minmax_by(f64::total_cmp)
    {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(value) => Some(AttendanceRange {
            min: value,
            max: value,
        }),
        MinMaxResult::MinMax(min, max) => Some(AttendanceRange { min, max }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub gender: Selection,
    pub learning_style: Selection,
    /// `None` means the observed bounds of the full table.
    pub attendance: Option<AttendanceRange>,
}

/// Rows of a table that satisfy a set of criteria.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a Table,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of `table`.
    pub fn all(table: &'a Table) -> Self {
        Self {
            table,
            rows: (0..table.row_count()).collect(),
        }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.table.has_column(name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, MissingColumn> {
        self.table
            .column_index(name)
            .ok_or_else(|| MissingColumn::new(name))
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [Cell]> + '_ {
        let table = self.table;
        self.rows.iter().map(move |idx| table.row(*idx))
    }

    /// Cells of one column across the view, in row order.
    pub fn cells(&self, name: &str) -> Result<impl Iterator<Item = &'a Cell> + '_, MissingColumn> {
        let column = self.column_index(name)?;
        let table = self.table;
        Ok(self.rows.iter().map(move |idx| table.cell(*idx, column)))
    }

    /// Numeric values of one column; missing and text cells are skipped.
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, MissingColumn> {
        Ok(self.cells(name)?.filter_map(Cell::as_number).collect())
    }
}

/// Applies `criteria` to `table`. A row whose `Attendance` is not a number
/// never passes, since it cannot lie inside any interval.
pub fn filter<'a>(table: &'a Table, criteria: &FilterCriteria) -> FilteredView<'a> {
    let gender = table.column_index(GENDER);
    let learning_style = table.column_index(LEARNING_STYLE);
    let attendance = table.column_index(ATTENDANCE);
    let range = criteria.attendance.or_else(|| attendance_bounds(table));

    let rows = (0..table.row_count())
        .filter(|&idx| {
            let row = table.row(idx);
            selection_passes(&criteria.gender, gender.map(|c| &row[c]))
                && selection_passes(&criteria.learning_style, learning_style.map(|c| &row[c]))
                && match (range, attendance.and_then(|c| row[c].as_number())) {
                    (Some(range), Some(value)) => range.contains(value),
                    _ => false,
                }
        })
        .collect();
    FilteredView { table, rows }
}

fn selection_passes(selection: &Selection, cell: Option<&Cell>) -> bool {
    match cell {
        Some(cell) => selection.matches(cell),
        None => selection.is_all(),
    }
}

/// Choices offered for a categorical filter: "All" then the sorted distinct
/// labels present in the table.
pub fn selection_options(table: &Table, column: &str) -> Vec<String> {
    let mut options = vec![ALL.to_string()];
    if let Some(index) = table.column_index(column) {
        options.extend(
            table
                .column(index)
                .filter_map(|cell| cell.group_key().map(|key| key.into_owned()))
                .sorted()
                .dedup(),
        );
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_raw(
            &["Gender", "LearningStyle", "Attendance", "ExamScore"],
            &[
                vec!["Male", "Visual", "90", "88"],
                vec!["Female", "Visual", "40", "55"],
                vec!["Female", "Auditory", "70", "72"],
                vec!["Male", "Auditory", "", "60"],
            ],
        )
        .expect("table")
    }

    #[test]
    fn selection_parses_wildcard() {
        assert_eq!("All".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!(
            " Female ".parse::<Selection>().unwrap(),
            Selection::Only("Female".into())
        );
    }

    #[test]
    fn default_criteria_drop_rows_without_attendance() {
        let table = sample();
        let view = filter(&table, &FilterCriteria::default());
        assert_eq!(view.row_indices(), &[0, 1, 2]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let table = sample();
        let criteria = FilterCriteria {
            gender: Selection::Only("Female".into()),
            learning_style: Selection::All,
            attendance: Some(AttendanceRange::new(50.0, 100.0).unwrap()),
        };
        let view = filter(&table, &criteria);
        assert_eq!(view.row_indices(), &[2]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let table = sample();
        let criteria = FilterCriteria {
            attendance: Some(AttendanceRange::new(40.0, 70.0).unwrap()),
            ..FilterCriteria::default()
        };
        assert_eq!(filter(&table, &criteria).row_indices(), &[1, 2]);
    }

    #[test]
    fn resolve_fills_missing_bounds_from_observed() {
        let observed = attendance_bounds(&sample());
        assert_eq!(observed, Some(AttendanceRange { min: 40.0, max: 90.0 }));
        let resolved = AttendanceRange::resolve(Some(60.0), None, observed).unwrap();
        assert_eq!(resolved, Some(AttendanceRange { min: 60.0, max: 90.0 }));
        assert!(AttendanceRange::resolve(Some(95.0), None, observed).is_err());
    }

    #[test]
    fn options_list_sorted_distinct_labels() {
        let table = sample();
        assert_eq!(
            selection_options(&table, "Gender"),
            vec!["All", "Female", "Male"]
        );
    }
}
