//! Text and JSON rendering of view reports.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use heck::ToTitleCase;
use serde::Serialize;

use crate::{
    aggregate::{GroupCount, GroupMean},
    cli::OutputFormat,
    data::Cell,
    filter::FilterCriteria,
    schema::{ATTENDANCE, ATTENDANCE_BUCKET, EXAM_SCORE, LEARNING_STYLE, PERFORMANCE_CATEGORY},
    table::{headers, render_section, render_table},
    views::{
        AttendanceReport, DashboardReport, LearningReport, OverviewReport, ScatterPoint,
        StressReport,
    },
};

const NO_DATA: &str = "n/a";

/// Histogram bars are scaled so the fullest bin spans this many characters.
const BAR_WIDTH: usize = 40;

pub fn emit<T: Serialize>(
    format: OutputFormat,
    report: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", text(report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Serializing report to JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn metric(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.1}"))
}

fn label(column: &str) -> String {
    column.to_title_case()
}

pub fn filters(criteria: &FilterCriteria) -> String {
    let attendance = criteria
        .attendance
        .map(|range| format!("{:.1} - {:.1}", range.min, range.max))
        .unwrap_or_else(|| NO_DATA.to_string());
    format!(
        "Filters: gender={}  learning style={}  attendance={}\n",
        criteria.gender, criteria.learning_style, attendance
    )
}

fn count_rows(counts: &[GroupCount]) -> Vec<Vec<String>> {
    counts
        .iter()
        .map(|c| vec![c.value.clone(), c.count.to_string()])
        .collect()
}

fn mean_rows(means: &[GroupMean]) -> Vec<Vec<String>> {
    means
        .iter()
        .map(|m| vec![m.group.clone(), format!("{:.1}", m.mean), m.count.to_string()])
        .collect()
}

fn point_summary(title: &str, points: &[ScatterPoint]) -> String {
    format!("{title}: {} point(s)\n", points.len())
}

pub fn overview(report: &OverviewReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Overview");
    let mut cards = vec![
        vec!["Total Students (Filtered)".to_string(), report.students.to_string()],
        vec![format!("Avg {}", label(EXAM_SCORE)), metric(report.mean_exam_score)],
        vec![format!("Avg {} (%)", label(ATTENDANCE)), metric(report.mean_attendance)],
    ];
    if let Some(pct) = report.high_performer_pct {
        cards.push(vec!["High Performers (%)".to_string(), metric(pct)]);
    }
    out.push_str(&render_table(&headers(&["metric", "value"]), &cards));
    out.push('\n');

    let histogram_rows = report
        .exam_score_histogram
        .as_ref()
        .map(|histogram| {
            let peak = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
            histogram
                .bins
                .iter()
                .map(|bin| {
                    vec![
                        format!("{:.1} - {:.1}", bin.start, bin.end),
                        bin.count.to_string(),
                        "#".repeat(bin.count * BAR_WIDTH / peak),
                    ]
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    out.push_str(&render_section(
        &format!("{} Distribution", label(EXAM_SCORE)),
        &headers(&["range", "count", ""]),
        &histogram_rows,
    ));

    if let Some(counts) = &report.performance_counts {
        out.push('\n');
        out.push_str(&render_section(
            "Students by Performance Category",
            &headers(&[PERFORMANCE_CATEGORY, "count"]),
            &count_rows(counts),
        ));
    }
    out.push('\n');
    out.push_str(&render_section(
        "Learning Style Distribution",
        &headers(&[LEARNING_STYLE, "count"]),
        &count_rows(&report.learning_style_counts),
    ));
    out
}

pub fn attendance(report: &AttendanceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Attendance & Study Habits");
    out.push_str(&point_summary(
        &format!("{} vs {}", label(ATTENDANCE), label(EXAM_SCORE)),
        &report.points,
    ));

    let mut trend_rows = Vec::new();
    if let Some(trend) = &report.trend {
        trend_rows.push(vec![
            "all".to_string(),
            format!("{:.3}", trend.slope),
            format!("{:.2}", trend.intercept),
            format!("{:.3}", trend.r_squared),
            trend.points.to_string(),
        ]);
    }
    for category in &report.category_trends {
        trend_rows.push(vec![
            category.category.clone(),
            format!("{:.3}", category.trend.slope),
            format!("{:.2}", category.trend.intercept),
            format!("{:.3}", category.trend.r_squared),
            category.trend.points.to_string(),
        ]);
    }
    out.push_str(&render_section(
        "Trend (ordinary least squares)",
        &headers(&["group", "slope", "intercept", "r_squared", "points"]),
        &trend_rows,
    ));

    if let Some(means) = &report.exam_by_attendance_bucket {
        out.push('\n');
        out.push_str(&render_section(
            "Average Exam Score by Attendance Group",
            &headers(&[ATTENDANCE_BUCKET, "mean", "count"]),
            &mean_rows(means),
        ));
    }
    if let Some(spread) = &report.study_hours_spread {
        out.push('\n');
        let rows = spread
            .iter()
            .map(|s| {
                vec![
                    s.bucket.clone(),
                    format!("{:.1}", s.summary.min),
                    format!("{:.1}", s.summary.q1),
                    format!("{:.1}", s.summary.median),
                    format!("{:.1}", s.summary.q3),
                    format!("{:.1}", s.summary.max),
                    s.summary.count.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        out.push_str(&render_section(
            "Exam Score by Study Hours Group",
            &headers(&["group", "min", "q1", "median", "q3", "max", "count"]),
            &rows,
        ));
    }
    out
}

pub fn learning(report: &LearningReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Learning Styles");
    out.push_str(&render_section(
        "Average Exam Score by Learning Style",
        &headers(&[LEARNING_STYLE, "mean", "count"]),
        &mean_rows(&report.exam_by_learning_style),
    ));
    if let Some(mix) = &report.performance_mix {
        out.push('\n');
        let rows = mix
            .iter()
            .map(|p| vec![p.first.clone(), p.second.clone(), p.count.to_string()])
            .collect::<Vec<_>>();
        out.push_str(&render_section(
            "Performance Categories by Learning Style",
            &headers(&[LEARNING_STYLE, PERFORMANCE_CATEGORY, "count"]),
            &rows,
        ));
    }
    if let Some(engagement) = &report.engagement {
        out.push('\n');
        out.push_str(&render_section(
            &format!("Average {} by Learning Style", label(engagement.metric.column())),
            &headers(&[LEARNING_STYLE, "mean", "count"]),
            &mean_rows(&engagement.by_learning_style),
        ));
    }
    out
}

pub fn stress(report: &StressReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Stress & Motivation");
    if let Some(points) = &report.stress_points {
        out.push_str(&point_summary("Stress Level vs Exam Score", points));
    }
    if let Some(points) = &report.motivation_points {
        out.push_str(&point_summary("Motivation vs Exam Score", points));
    }
    let mut cards = Vec::new();
    if let Some(mean) = report.mean_stress {
        cards.push(vec!["Avg Stress Level".to_string(), metric(mean)]);
    }
    if let Some(mean) = report.mean_motivation {
        cards.push(vec!["Avg Motivation".to_string(), metric(mean)]);
    }
    out.push_str(&render_section(
        "Average Stress & Motivation",
        &headers(&["metric", "value"]),
        &cards,
    ));
    if !report.insights.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Interpretation & Suggestions");
        for insight in &report.insights {
            let _ = writeln!(out, "- {}", insight.text);
        }
    }
    out
}

pub fn dashboard(report: &DashboardReport) -> String {
    [
        filters(&report.filters),
        overview(&report.overview),
        attendance(&report.attendance),
        learning(&report.learning),
        stress(&report.stress),
    ]
    .join("\n")
}

pub fn rows(headers: &[String], rows: &[Vec<&Cell>]) -> String {
    let rendered = rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.as_display()).collect())
        .collect::<Vec<Vec<String>>>();
    render_table(headers, &rendered)
}
