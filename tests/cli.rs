mod common;

use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{Value, json};

use common::{TestWorkspace, dashboard, students_fixture};

fn fixture_arg() -> String {
    students_fixture().to_str().expect("utf-8 path").to_string()
}

fn json_output(args: &[&str]) -> Value {
    let output = dashboard()
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("valid JSON on stdout")
}

#[test]
fn overview_prints_headline_metrics() {
    dashboard()
        .args(["overview", "-i", &fixture_arg()])
        .assert()
        .success()
        .stdout(contains("Filters: gender=All  learning style=All"))
        .stdout(contains("Total Students (Filtered)"))
        .stdout(contains("75.5"))
        .stdout(contains("76.2"))
        .stdout(contains("33.3"))
        .stdout(contains("Learning Style Distribution"));
}

#[test]
fn overview_json_respects_gender_filter() {
    let report = json_output(&[
        "overview",
        "-i",
        &fixture_arg(),
        "--gender",
        "Female",
        "--format",
        "json",
    ]);
    assert_eq!(report["students"], json!(3));
    assert_eq!(report["mean_exam_score"], json!(76.0));
    assert_eq!(report["exam_scores"], json!([72.0, 65.0, 91.0]));
}

#[test]
fn filters_matching_nothing_report_no_data() {
    dashboard()
        .args(["overview", "-i", &fixture_arg(), "--gender", "Other"])
        .assert()
        .success()
        .stdout(contains("(no data)"))
        .stdout(contains("n/a"));

    let report = json_output(&[
        "stress",
        "-i",
        &fixture_arg(),
        "--learning-style",
        "Telepathic",
        "--format",
        "json",
    ]);
    assert_eq!(report["mean_stress"], Value::Null);
    assert_eq!(report["insights"], json!([]));
}

#[test]
fn attendance_bounds_filter_rows() {
    let report = json_output(&[
        "overview",
        "-i",
        &fixture_arg(),
        "--min-attendance",
        "80",
        "--format",
        "json",
    ]);
    assert_eq!(report["students"], json!(3));
}

#[test]
fn inverted_attendance_range_is_rejected() {
    dashboard()
        .args([
            "overview",
            "-i",
            &fixture_arg(),
            "--min-attendance",
            "90",
            "--max-attendance",
            "10",
        ])
        .assert()
        .failure()
        .stderr(contains("exceeds maximum attendance"));
}

#[test]
fn learning_uses_requested_metric() {
    dashboard()
        .args(["learning", "-i", &fixture_arg(), "--metric", "study-hours"])
        .assert()
        .success()
        .stdout(contains("Average Exam Score by Learning Style"))
        .stdout(contains("Reading/Writing"))
        .stdout(contains("Average Study Hours by Learning Style"));

    let report = json_output(&[
        "learning",
        "-i",
        &fixture_arg(),
        "--metric",
        "discussions",
        "--format",
        "json",
    ]);
    assert_eq!(report["engagement"]["metric"], json!("Discussions"));
    assert_eq!(
        report["engagement"]["by_learning_style"][0],
        json!({"group": "Auditory", "mean": 0.5, "count": 2})
    );
}

#[test]
fn learning_rejects_metric_missing_from_data() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_csv(
        "minimal.csv",
        &["Gender", "LearningStyle", "Attendance", "ExamScore"],
        &[&["0", "1", "80", "70"]],
    );
    dashboard()
        .args(["learning", "-i", path.to_str().unwrap(), "--metric", "discussions"])
        .assert()
        .failure()
        .stderr(contains("Engagement metric 'Discussions' is not in the data"));
}

#[test]
fn stress_view_prints_suggestions() {
    dashboard()
        .args(["stress", "-i", &fixture_arg()])
        .assert()
        .success()
        .stdout(contains("Stress levels are moderate"))
        .stdout(contains("Motivation is moderate"));
}

#[test]
fn attendance_view_lists_groups() {
    dashboard()
        .args(["attendance", "-i", &fixture_arg()])
        .assert()
        .success()
        .stdout(contains("Attendance vs Exam Score: 6 point(s)"))
        .stdout(contains("Average Exam Score by Attendance Group"))
        .stdout(contains("Exam Score by Study Hours Group"));
}

#[test]
fn summary_json_combines_all_views() {
    let report = json_output(&[
        "summary",
        "-i",
        &fixture_arg(),
        "--gender",
        "Male",
        "--format",
        "json",
    ]);
    assert_eq!(report["filters"]["gender"], json!("Male"));
    assert_eq!(report["filters"]["learning_style"], json!("All"));
    assert_eq!(report["filters"]["attendance"], json!({"min": 55.0, "max": 95.0}));
    assert_eq!(report["overview"]["students"], json!(3));
    assert_eq!(report["overview"]["mean_exam_score"], json!(75.0));
    assert!(report["attendance"]["points"].is_array());
    assert!(report["learning"]["exam_by_learning_style"].is_array());
    assert_eq!(report["stress"]["insights"].as_array().map(Vec::len), Some(2));
}

#[test]
fn rows_restrict_columns_and_limit() {
    let rows = json_output(&[
        "rows",
        "-i",
        &fixture_arg(),
        "-C",
        "Gender,ExamScore,Internet",
        "--limit",
        "3",
        "--format",
        "json",
    ]);
    assert_eq!(
        rows,
        json!([
            {"Gender": "Male", "ExamScore": 88.0, "Internet": "Yes"},
            {"Gender": "Female", "ExamScore": 72.0, "Internet": "No"},
            {"Gender": "Female", "ExamScore": 65.0, "Internet": "Unknown"}
        ])
    );

    dashboard()
        .args(["rows", "-i", &fixture_arg(), "-C", "Nickname"])
        .assert()
        .failure()
        .stderr(contains("column 'Nickname' is not present"));
}

#[test]
fn columns_report_feature_availability() {
    dashboard()
        .args(["columns", "-i", &fixture_arg()])
        .assert()
        .success()
        .stdout(contains("PerformanceCategory"))
        .stdout(contains("required"))
        .stdout(contains("available"))
        .stdout(contains("skipped").not());
}

#[test]
fn options_list_filter_choices() {
    dashboard()
        .args(["options", "-i", &fixture_arg()])
        .assert()
        .success()
        .stdout(contains("All, Female, Male"))
        .stdout(contains("All, Auditory, Kinesthetic, Reading/Writing, Visual"))
        .stdout(contains("55 - 95"));
}

#[test]
fn missing_data_file_fails_with_context() {
    let workspace = TestWorkspace::new();
    dashboard()
        .current_dir(workspace.path())
        .arg("overview")
        .assert()
        .failure()
        .stderr(contains("cannot open data file"))
        .stderr(contains("student_performance_clean.csv"));
}

#[test]
fn missing_required_column_fails() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_csv(
        "partial.csv",
        &["Gender", "Attendance", "ExamScore"],
        &[&["0", "80", "70"]],
    );
    dashboard()
        .args(["overview", "-i", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("required column 'LearningStyle' is missing"));
}

#[test]
fn tab_delimited_input_is_detected_by_extension() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "students.tsv",
        "Gender\tLearningStyle\tAttendance\tExamScore\n0\t1\t80\t70\n1\t0\t90\t80\n",
    );
    let report = json_output(&["overview", "-i", path.to_str().unwrap(), "--format", "json"]);
    assert_eq!(report["students"], json!(2));
    assert_eq!(report["mean_exam_score"], json!(75.0));
}

#[test]
fn config_file_supplies_defaults_and_flags_override_them() {
    let workspace = TestWorkspace::new();
    workspace.copy_students("students.csv");
    let config = workspace.write(
        "dashboard.yaml",
        "data_path: students.csv\nfilters:\n  gender: Female\n",
    );
    let config_arg = config.to_str().unwrap();

    let configured = json_output(&["overview", "--config", config_arg, "--format", "json"]);
    assert_eq!(configured["students"], json!(3));

    let overridden = json_output(&[
        "overview",
        "--config",
        config_arg,
        "--gender",
        "All",
        "--format",
        "json",
    ]);
    assert_eq!(overridden["students"], json!(6));
}

#[test]
fn config_with_unknown_keys_is_rejected() {
    let workspace = TestWorkspace::new();
    let config = workspace.write("dashboard.yaml", "colour: blue\n");
    dashboard()
        .args(["overview", "-i", &fixture_arg(), "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Parsing configuration file").and(contains("colour")));
}
