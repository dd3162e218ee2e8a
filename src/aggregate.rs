//! Reductions over a [`FilteredView`].
//!
//! Every function here is pure. An empty view is never an error: scalar
//! reductions return `None` and grouped reductions return no groups. Asking
//! for a column the table does not have yields [`MissingColumn`] so callers
//! can skip the dependent feature.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{data::Cell, error::MissingColumn, filter::FilteredView};

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCount {
    pub first: String,
    pub second: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairMean {
    pub first: String,
    pub second: String,
    pub mean: f64,
    pub count: usize,
}

pub fn count(view: &FilteredView<'_>) -> usize {
    view.len()
}

/// Arithmetic mean of the numeric cells of `column`; `None` when there are none.
pub fn mean(view: &FilteredView<'_>, column: &str) -> Result<Option<f64>, MissingColumn> {
    let mut accumulator = MeanAccumulator::default();
    for value in view.cells(column)?.filter_map(Cell::as_number) {
        accumulator.push(value);
    }
    Ok(accumulator.mean())
}

/// Share of rows whose `column` equals `value`, as a percentage.
pub fn proportion(
    view: &FilteredView<'_>,
    column: &str,
    value: &str,
) -> Result<Option<f64>, MissingColumn> {
    let cells = view.cells(column)?;
    if view.is_empty() {
        return Ok(None);
    }
    let hits = cells
        .filter(|cell| cell.group_key().as_deref() == Some(value))
        .count();
    Ok(Some(hits as f64 / view.len() as f64 * 100.0))
}

/// Rows per distinct value of `column`, most frequent first. Missing cells
/// form no group.
pub fn group_count(view: &FilteredView<'_>, column: &str) -> Result<Vec<GroupCount>, MissingColumn> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in view.cells(column)? {
        if let Some(key) = cell.group_key() {
            *counts.entry(key.into_owned()).or_insert(0) += 1;
        }
    }
    let mut items = counts
        .into_iter()
        .map(|(value, count)| GroupCount { value, count })
        .collect::<Vec<_>>();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    Ok(items)
}

/// Rows per distinct (`first`, `second`) pair, ordered by key.
pub fn group_count_pairs(
    view: &FilteredView<'_>,
    first: &str,
    second: &str,
) -> Result<Vec<PairCount>, MissingColumn> {
    let first_idx = view.column_index(first)?;
    let second_idx = view.column_index(second)?;
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in view.rows() {
        if let (Some(a), Some(b)) = (row[first_idx].group_key(), row[second_idx].group_key()) {
            *counts.entry((a.into_owned(), b.into_owned())).or_insert(0) += 1;
        }
    }
    Ok(counts
        .into_iter()
        .map(|((first, second), count)| PairCount {
            first,
            second,
            count,
        })
        .collect())
}

/// Mean of `value` per group of `key`, ordered by key. Groups contributing no
/// numeric value are absent.
pub fn group_mean(
    view: &FilteredView<'_>,
    key: &str,
    value: &str,
) -> Result<Vec<GroupMean>, MissingColumn> {
    let key_idx = view.column_index(key)?;
    let value_idx = view.column_index(value)?;
    let mut groups: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
    for row in view.rows() {
        if let (Some(group), Some(number)) = (row[key_idx].group_key(), row[value_idx].as_number())
        {
            groups.entry(group.into_owned()).or_default().push(number);
        }
    }
    Ok(groups
        .into_iter()
        .filter_map(|(group, acc)| {
            acc.mean().map(|mean| GroupMean {
                group,
                mean,
                count: acc.count(),
            })
        })
        .collect())
}

/// Mean of `value` per (`first`, `second`) group, ordered by key.
pub fn group_mean_pairs(
    view: &FilteredView<'_>,
    first: &str,
    second: &str,
    value: &str,
) -> Result<Vec<PairMean>, MissingColumn> {
    let first_idx = view.column_index(first)?;
    let second_idx = view.column_index(second)?;
    let value_idx = view.column_index(value)?;
    let mut groups: BTreeMap<(String, String), MeanAccumulator> = BTreeMap::new();
    for row in view.rows() {
        let (Some(a), Some(b), Some(number)) = (
            row[first_idx].group_key(),
            row[second_idx].group_key(),
            row[value_idx].as_number(),
        ) else {
            continue;
        };
        groups
            .entry((a.into_owned(), b.into_owned()))
            .or_default()
            .push(number);
    }
    Ok(groups
        .into_iter()
        .filter_map(|((first, second), acc)| {
            acc.mean().map(|mean| PairMean {
                first,
                second,
                mean,
                count: acc.count(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::Table,
        filter::{FilterCriteria, Selection, filter},
    };

    fn sample() -> Table {
        Table::from_raw(
            &[
                "Gender",
                "LearningStyle",
                "Attendance",
                "ExamScore",
                "PerformanceCategory",
            ],
            &[
                vec!["Male", "Visual", "90", "88", "High"],
                vec!["Female", "Visual", "40", "55", "Low"],
                vec!["Female", "Auditory", "70", "72", "Medium"],
                vec!["Male", "Visual", "80", "", "High"],
            ],
        )
        .expect("table")
    }

    #[test]
    fn mean_skips_missing_values() {
        let table = sample();
        let view = FilteredView::all(&table);
        let mean = mean(&view, "ExamScore").unwrap().unwrap();
        assert!((mean - 71.666_666).abs() < 1e-4);
    }

    #[test]
    fn empty_view_reports_no_data() {
        let table = sample();
        let criteria = FilterCriteria {
            gender: Selection::Only("Nobody".into()),
            ..FilterCriteria::default()
        };
        let view = filter(&table, &criteria);
        assert_eq!(count(&view), 0);
        assert_eq!(mean(&view, "ExamScore").unwrap(), None);
        assert_eq!(proportion(&view, "PerformanceCategory", "High").unwrap(), None);
        assert!(group_count(&view, "LearningStyle").unwrap().is_empty());
    }

    #[test]
    fn missing_column_is_reported() {
        let table = sample();
        let view = FilteredView::all(&table);
        assert_eq!(
            mean(&view, "StressLevel").unwrap_err(),
            MissingColumn::new("StressLevel")
        );
    }

    #[test]
    fn proportion_is_a_percentage() {
        let table = sample();
        let view = FilteredView::all(&table);
        let pct = proportion(&view, "PerformanceCategory", "High").unwrap();
        assert_eq!(pct, Some(50.0));
    }

    #[test]
    fn group_count_orders_by_frequency_then_value() {
        let table = sample();
        let view = FilteredView::all(&table);
        let counts = group_count(&view, "PerformanceCategory").unwrap();
        let flattened: Vec<(&str, usize)> = counts
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(flattened, vec![("High", 2), ("Low", 1), ("Medium", 1)]);
    }

    #[test]
    fn group_mean_skips_missing_values() {
        let table = sample();
        let view = FilteredView::all(&table);
        let means = group_mean(&view, "LearningStyle", "ExamScore").unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].group, "Auditory");
        assert_eq!(means[0].mean, 72.0);
        assert_eq!(means[1].group, "Visual");
        assert_eq!(means[1].count, 2);
        assert_eq!(means[1].mean, 71.5);
    }

    #[test]
    fn pair_aggregates_cover_present_combinations_only() {
        let table = sample();
        let view = FilteredView::all(&table);
        let pairs = group_count_pairs(&view, "LearningStyle", "PerformanceCategory").unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(
            pairs[2],
            PairCount {
                first: "Visual".into(),
                second: "Low".into(),
                count: 1
            }
        );
        let pair_means =
            group_mean_pairs(&view, "Gender", "LearningStyle", "ExamScore").unwrap();
        assert_eq!(pair_means.len(), 3);
        assert_eq!(pair_means[2].first, "Male");
        assert_eq!(pair_means[2].mean, 88.0);
    }
}
