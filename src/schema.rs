//! Column names of the student performance dataset.
//!
//! Only the four [`REQUIRED_COLUMNS`] must exist; every other column is
//! feature-gated and checked for presence before use.

pub const GENDER: &str = "Gender";
pub const LEARNING_STYLE: &str = "LearningStyle";
pub const ATTENDANCE: &str = "Attendance";
pub const EXAM_SCORE: &str = "ExamScore";

pub const STRESS_LEVEL: &str = "StressLevel";
pub const MOTIVATION: &str = "Motivation";
pub const STUDY_HOURS: &str = "StudyHours";
pub const DISCUSSIONS: &str = "Discussions";
pub const ASSIGNMENT_COMPLETION: &str = "AssignmentCompletion";

pub const PERFORMANCE_CATEGORY: &str = "PerformanceCategory";
pub const ATTENDANCE_BUCKET: &str = "AttendanceBucket";
pub const STUDY_HOURS_BUCKET: &str = "StudyHoursBucket";

pub const REQUIRED_COLUMNS: &[&str] = &[GENDER, LEARNING_STYLE, EXAM_SCORE, ATTENDANCE];

/// Yes/No behavioural flags that may arrive encoded as 1/0.
pub const BINARY_FLAG_COLUMNS: &[&str] = &["Extracurricular", "Internet", "OnlineCourses", "EduTech"];

/// Value of [`PERFORMANCE_CATEGORY`] counted as a high performer.
pub const HIGH_PERFORMANCE: &str = "High";

/// Optional columns paired with the output they unlock.
pub const OPTIONAL_FEATURES: &[(&str, &str)] = &[
    (PERFORMANCE_CATEGORY, "high performer share, category counts and colouring"),
    (ATTENDANCE_BUCKET, "mean exam score per attendance group"),
    (STUDY_HOURS_BUCKET, "exam score spread per study hours group"),
    (STUDY_HOURS, "engagement metric"),
    (DISCUSSIONS, "engagement metric"),
    (ASSIGNMENT_COMPLETION, "engagement metric"),
    (STRESS_LEVEL, "stress scatter, mean and insight"),
    (MOTIVATION, "motivation scatter, mean and insight"),
];
