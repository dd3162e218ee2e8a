//! The four dashboard views built over one filtered view.
//!
//! Each builder takes the [`FilteredView`] for the current criteria and
//! returns a serializable report. Optional columns are presence-checked: when
//! one is absent the dependent part of the report is `None` and a debug line
//! records the skip. Scalars computed over an empty view are `None` as well.

use anyhow::{Result, bail};
use clap::ValueEnum;
use log::debug;
use serde::Serialize;

use crate::{
    aggregate::{self, GroupCount, GroupMean, PairCount},
    charts::{BoxSummary, DEFAULT_HISTOGRAM_BINS, Histogram, TrendLine},
    data::Cell,
    error::MissingColumn,
    filter::{FilterCriteria, FilteredView},
    schema::{
        ASSIGNMENT_COMPLETION, ATTENDANCE, ATTENDANCE_BUCKET, DISCUSSIONS, EXAM_SCORE,
        HIGH_PERFORMANCE, LEARNING_STYLE, MOTIVATION, PERFORMANCE_CATEGORY, STRESS_LEVEL,
        STUDY_HOURS, STUDY_HOURS_BUCKET,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub category: String,
    pub trend: TrendLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketScore {
    pub bucket: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSpread {
    pub bucket: String,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewReport {
    pub students: usize,
    pub mean_exam_score: Option<f64>,
    pub mean_attendance: Option<f64>,
    /// Outer `None`: no `PerformanceCategory` column. Inner `None`: no rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_performer_pct: Option<Option<f64>>,
    pub exam_scores: Vec<f64>,
    pub exam_score_histogram: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_counts: Option<Vec<GroupCount>>,
    pub learning_style_counts: Vec<GroupCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub points: Vec<ScatterPoint>,
    pub trend: Option<TrendLine>,
    pub category_trends: Vec<CategoryTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_by_attendance_bucket: Option<Vec<GroupMean>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_hours_scores: Option<Vec<BucketScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_hours_spread: Option<Vec<BucketSpread>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[value(rename_all = "kebab-case")]
pub enum EngagementMetric {
    StudyHours,
    Discussions,
    AssignmentCompletion,
}

impl EngagementMetric {
    pub const ALL: [EngagementMetric; 3] = [
        EngagementMetric::StudyHours,
        EngagementMetric::Discussions,
        EngagementMetric::AssignmentCompletion,
    ];

    pub fn column(self) -> &'static str {
        match self {
            EngagementMetric::StudyHours => STUDY_HOURS,
            EngagementMetric::Discussions => DISCUSSIONS,
            EngagementMetric::AssignmentCompletion => ASSIGNMENT_COMPLETION,
        }
    }

    /// Metrics whose column exists, in menu order.
    pub fn available(view: &FilteredView<'_>) -> Vec<EngagementMetric> {
        Self::ALL
            .into_iter()
            .filter(|metric| view.has_column(metric.column()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Engagement {
    pub metric: EngagementMetric,
    pub by_learning_style: Vec<GroupMean>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningReport {
    pub exam_by_learning_style: Vec<GroupMean>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_mix: Option<Vec<PairCount>>,
    pub available_metrics: Vec<EngagementMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Moderate,
    High,
}

impl Level {
    pub fn stress(mean: f64) -> Self {
        if mean >= 8.0 {
            Level::High
        } else if mean >= 5.0 {
            Level::Moderate
        } else {
            Level::Low
        }
    }

    pub fn motivation(mean: f64) -> Self {
        if mean <= 4.0 {
            Level::Low
        } else if mean <= 7.0 {
            Level::Moderate
        } else {
            Level::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub topic: &'static str,
    pub level: Level,
    pub text: &'static str,
}

impl Insight {
    pub fn for_stress(mean: f64) -> Self {
        let level = Level::stress(mean);
        let text = match level {
            Level::High => {
                "Stress levels are high on average. Consider providing counselling, stress-management workshops and flexible deadlines."
            }
            Level::Moderate => {
                "Stress levels are moderate. Monitor during exam periods and offer support proactively."
            }
            Level::Low => {
                "Average stress is relatively low, but individual students may still need support."
            }
        };
        Self {
            topic: "stress",
            level,
            text,
        }
    }

    pub fn for_motivation(mean: f64) -> Self {
        let level = Level::motivation(mean);
        let text = match level {
            Level::Low => {
                "Motivation appears low. Introduce goal-setting sessions, peer mentoring and more feedback on progress."
            }
            Level::Moderate => {
                "Motivation is moderate. Small nudges like recognition, progress tracking and rewards can help."
            }
            Level::High => {
                "Motivation is high on average. Focus on maintaining engagement and providing challenging tasks."
            }
        };
        Self {
            topic: "motivation",
            level,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_points: Option<Vec<ScatterPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivation_points: Option<Vec<ScatterPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_stress: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_motivation: Option<Option<f64>>,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub filters: FilterCriteria,
    pub overview: OverviewReport,
    pub attendance: AttendanceReport,
    pub learning: LearningReport,
    pub stress: StressReport,
}

pub fn overview(view: &FilteredView<'_>) -> Result<OverviewReport> {
    let exam_scores = view.numbers(EXAM_SCORE)?;
    let exam_score_histogram = Histogram::build(&exam_scores, DEFAULT_HISTOGRAM_BINS);
    Ok(OverviewReport {
        students: aggregate::count(view),
        mean_exam_score: aggregate::mean(view, EXAM_SCORE)?,
        mean_attendance: aggregate::mean(view, ATTENDANCE)?,
        high_performer_pct: optional(aggregate::proportion(
            view,
            PERFORMANCE_CATEGORY,
            HIGH_PERFORMANCE,
        )),
        exam_scores,
        exam_score_histogram,
        performance_counts: optional(aggregate::group_count(view, PERFORMANCE_CATEGORY)),
        learning_style_counts: aggregate::group_count(view, LEARNING_STYLE)?,
    })
}

pub fn attendance(view: &FilteredView<'_>) -> Result<AttendanceReport> {
    let points = scatter(view, ATTENDANCE, EXAM_SCORE)?;
    let trend = TrendLine::fit(&coordinates(points.iter()));
    let category_trends = category_trends(&points);
    Ok(AttendanceReport {
        points,
        trend,
        category_trends,
        exam_by_attendance_bucket: optional(aggregate::group_mean(
            view,
            ATTENDANCE_BUCKET,
            EXAM_SCORE,
        )),
        study_hours_scores: optional(bucket_scores(view, STUDY_HOURS_BUCKET)),
        study_hours_spread: optional(bucket_spread(view, STUDY_HOURS_BUCKET)),
    })
}

/// Builds the learning styles view. Without an explicit `metric` the first
/// available engagement metric is used.
pub fn learning(
    view: &FilteredView<'_>,
    metric: Option<EngagementMetric>,
) -> Result<LearningReport> {
    let available_metrics = EngagementMetric::available(view);
    let chosen = match metric {
        Some(requested) if !available_metrics.contains(&requested) => {
            let names = available_metrics
                .iter()
                .map(|m| m.column())
                .collect::<Vec<_>>();
            bail!(
                "Engagement metric '{}' is not in the data (available: {})",
                requested.column(),
                if names.is_empty() {
                    "none".to_string()
                } else {
                    names.join(", ")
                }
            );
        }
        Some(requested) => Some(requested),
        None => available_metrics.first().copied(),
    };
    if chosen.is_none() {
        debug!("No engagement metric column present; skipping engagement breakdown");
    }
    let engagement = chosen
        .map(|metric| -> Result<Engagement> {
            Ok(Engagement {
                metric,
                by_learning_style: aggregate::group_mean(view, LEARNING_STYLE, metric.column())?,
            })
        })
        .transpose()?;

    Ok(LearningReport {
        exam_by_learning_style: aggregate::group_mean(view, LEARNING_STYLE, EXAM_SCORE)?,
        performance_mix: optional(aggregate::group_count_pairs(
            view,
            LEARNING_STYLE,
            PERFORMANCE_CATEGORY,
        )),
        available_metrics,
        engagement,
    })
}

pub fn stress(view: &FilteredView<'_>) -> Result<StressReport> {
    let mean_stress = optional(aggregate::mean(view, STRESS_LEVEL));
    let mean_motivation = optional(aggregate::mean(view, MOTIVATION));
    let mut insights = Vec::new();
    if let Some(Some(mean)) = mean_stress {
        insights.push(Insight::for_stress(mean));
    }
    if let Some(Some(mean)) = mean_motivation {
        insights.push(Insight::for_motivation(mean));
    }
    Ok(StressReport {
        stress_points: optional(scatter(view, STRESS_LEVEL, EXAM_SCORE)),
        motivation_points: optional(scatter(view, MOTIVATION, EXAM_SCORE)),
        mean_stress,
        mean_motivation,
        insights,
    })
}

pub fn dashboard(
    view: &FilteredView<'_>,
    criteria: &FilterCriteria,
    metric: Option<EngagementMetric>,
) -> Result<DashboardReport> {
    Ok(DashboardReport {
        filters: criteria.clone(),
        overview: overview(view)?,
        attendance: attendance(view)?,
        learning: learning(view, metric)?,
        stress: stress(view)?,
    })
}

/// Turns a missing optional column into a skipped feature.
fn optional<T>(result: std::result::Result<T, MissingColumn>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(missing) => {
            debug!("Skipping feature: {missing}");
            None
        }
    }
}

/// Points with both coordinates numeric, coloured by performance category
/// when that column exists.
fn scatter(
    view: &FilteredView<'_>,
    x_column: &str,
    y_column: &str,
) -> std::result::Result<Vec<ScatterPoint>, MissingColumn> {
    let x_idx = view.column_index(x_column)?;
    let y_idx = view.column_index(y_column)?;
    let category_idx = view.column_index(PERFORMANCE_CATEGORY).ok();
    Ok(view
        .rows()
        .filter_map(|row| {
            let x = row[x_idx].as_number()?;
            let y = row[y_idx].as_number()?;
            let category = category_idx
                .and_then(|idx| row[idx].group_key())
                .map(|key| key.into_owned());
            Some(ScatterPoint { x, y, category })
        })
        .collect())
}

fn coordinates<'p>(points: impl Iterator<Item = &'p ScatterPoint>) -> Vec<(f64, f64)> {
    points.map(|point| (point.x, point.y)).collect()
}

fn category_trends(points: &[ScatterPoint]) -> Vec<CategoryTrend> {
    let mut categories = points
        .iter()
        .filter_map(|point| point.category.as_deref())
        .collect::<Vec<_>>();
    categories.sort_unstable();
    categories.dedup();
    categories
        .into_iter()
        .filter_map(|category| {
            let subset = points
                .iter()
                .filter(|point| point.category.as_deref() == Some(category));
            TrendLine::fit(&coordinates(subset)).map(|trend| CategoryTrend {
                category: category.to_string(),
                trend,
            })
        })
        .collect()
}

fn bucket_scores(
    view: &FilteredView<'_>,
    bucket_column: &str,
) -> std::result::Result<Vec<BucketScore>, MissingColumn> {
    let bucket_idx = view.column_index(bucket_column)?;
    let score_idx = view.column_index(EXAM_SCORE)?;
    Ok(view
        .rows()
        .filter_map(|row| {
            let bucket = row[bucket_idx].group_key()?.into_owned();
            let score = row[score_idx].as_number()?;
            Some(BucketScore { bucket, score })
        })
        .collect())
}

fn bucket_spread(
    view: &FilteredView<'_>,
    bucket_column: &str,
) -> std::result::Result<Vec<BucketSpread>, MissingColumn> {
    let mut grouped: std::collections::BTreeMap<String, Vec<f64>> = Default::default();
    for entry in bucket_scores(view, bucket_column)? {
        grouped.entry(entry.bucket).or_default().push(entry.score);
    }
    Ok(grouped
        .into_iter()
        .filter_map(|(bucket, scores)| {
            BoxSummary::from_values(&scores).map(|summary| BucketSpread { bucket, summary })
        })
        .collect())
}

/// Rows of the view restricted to `columns` (all columns when empty), for
/// point-level output.
pub fn rows<'a>(
    view: &FilteredView<'a>,
    columns: &[String],
    limit: Option<usize>,
) -> Result<(Vec<String>, Vec<Vec<&'a Cell>>)> {
    let table = view.table();
    let indices = if columns.is_empty() {
        (0..table.headers().len()).collect::<Vec<_>>()
    } else {
        columns
            .iter()
            .map(|name| view.column_index(name))
            .collect::<std::result::Result<Vec<_>, _>>()?
    };
    let headers = indices
        .iter()
        .map(|idx| table.headers()[*idx].clone())
        .collect();
    let rows = view
        .rows()
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| indices.iter().map(|idx| &row[*idx]).collect())
        .collect();
    Ok((headers, rows))
}
