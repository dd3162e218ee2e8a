use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::views::EngagementMetric;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore student performance data: filtered overviews, attendance, learning styles, stress and motivation",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Headline metrics, score distribution and learning style mix
    Overview(ViewArgs),
    /// Attendance against exam score, attendance groups and study hours groups
    Attendance(ViewArgs),
    /// Exam score, performance mix and engagement per learning style
    Learning(LearningArgs),
    /// Stress and motivation against exam score, with suggestions
    Stress(ViewArgs),
    /// All four views for the same filters
    Summary(LearningArgs),
    /// Print the filtered rows
    Rows(RowsArgs),
    /// List the columns found in the data file and the features they enable
    Columns,
    /// List the available filter choices
    Options(FormatArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Student records file (defaults to the configured or built-in path)
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<PathBuf>,
    /// YAML configuration file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter, global = true)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding", global = true)]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Keep only this gender ("All" disables the filter)
    #[arg(long)]
    pub gender: Option<String>,
    /// Keep only this learning style ("All" disables the filter)
    #[arg(long = "learning-style")]
    pub learning_style: Option<String>,
    /// Lower attendance bound, inclusive (defaults to the observed minimum)
    #[arg(long = "min-attendance")]
    pub min_attendance: Option<f64>,
    /// Upper attendance bound, inclusive (defaults to the observed maximum)
    #[arg(long = "max-attendance")]
    pub max_attendance: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct LearningArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Engagement metric compared across learning styles
    #[arg(long, value_enum)]
    pub metric: Option<EngagementMetric>,
}

#[derive(Debug, Args)]
pub struct RowsArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Restrict output to this comma-separated list of columns
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Limit number of rows emitted
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
