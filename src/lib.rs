pub mod aggregate;
pub mod charts;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod io_utils;
pub mod normalize;
pub mod render;
pub mod schema;
pub mod session;
pub mod table;
pub mod views;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, FormatArgs, LearningArgs, OutputFormat, RowsArgs, ViewArgs},
    filter::AttendanceRange,
    schema::{GENDER, LEARNING_STYLE},
    session::Session,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("student_analytics", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let session = Session::open(&cli.source)?;
    match cli.command {
        Commands::Overview(args) => {
            handle_view(&session, &args, views::overview, render::overview)
        }
        Commands::Attendance(args) => {
            handle_view(&session, &args, views::attendance, render::attendance)
        }
        Commands::Learning(args) => handle_learning(&session, &args),
        Commands::Stress(args) => handle_view(&session, &args, views::stress, render::stress),
        Commands::Summary(args) => handle_summary(&session, &args),
        Commands::Rows(args) => handle_rows(&session, &args),
        Commands::Columns => columns::execute(&session.table),
        Commands::Options(args) => handle_options(&session, &args),
    }
}

fn handle_view<T, B, R>(session: &Session, args: &ViewArgs, build: B, text: R) -> Result<()>
where
    T: Serialize,
    B: FnOnce(&filter::FilteredView<'_>) -> Result<T>,
    R: FnOnce(&T) -> String,
{
    let criteria = session.criteria(&args.filters)?;
    let view = session.filter(&criteria);
    let report = build(&view)?;
    if args.format == OutputFormat::Table {
        print!("{}", render::filters(&criteria));
    }
    render::emit(args.format, &report, text)
}

fn handle_learning(session: &Session, args: &LearningArgs) -> Result<()> {
    let metric = args.metric;
    handle_view(
        session,
        &args.view,
        |view| views::learning(view, metric),
        render::learning,
    )
}

fn handle_summary(session: &Session, args: &LearningArgs) -> Result<()> {
    let criteria = session.criteria(&args.view.filters)?;
    let view = session.filter(&criteria);
    let report = views::dashboard(&view, &criteria, args.metric)?;
    render::emit(args.view.format, &report, render::dashboard)
}

fn handle_rows(session: &Session, args: &RowsArgs) -> Result<()> {
    let criteria = session.criteria(&args.view.filters)?;
    let view = session.filter(&criteria);
    let (headers, rows) = views::rows(&view, &args.columns, args.limit)?;
    match args.view.format {
        OutputFormat::Table => print!("{}", render::rows(&headers, &rows)),
        OutputFormat::Json => {
            let records = rows
                .iter()
                .map(|row| {
                    headers
                        .iter()
                        .zip(row.iter())
                        .map(|(name, cell)| -> Result<(String, serde_json::Value)> {
                            Ok((name.clone(), serde_json::to_value(cell)?))
                        })
                        .collect::<Result<serde_json::Map<_, _>>>()
                })
                .collect::<Result<Vec<_>>>()?;
            let json = serde_json::to_string_pretty(&records)
                .context("Serializing rows to JSON")?;
            println!("{json}");
        }
    }
    info!("Displayed {} row(s)", rows.len());
    Ok(())
}

#[derive(Debug, Serialize)]
struct FilterOptions {
    gender: Vec<String>,
    learning_style: Vec<String>,
    attendance: Option<AttendanceRange>,
}

fn handle_options(session: &Session, args: &FormatArgs) -> Result<()> {
    let options = FilterOptions {
        gender: filter::selection_options(&session.table, GENDER),
        learning_style: filter::selection_options(&session.table, LEARNING_STYLE),
        attendance: filter::attendance_bounds(&session.table),
    };
    render::emit(args.format, &options, |options| {
        let rows = vec![
            vec!["gender".to_string(), options.gender.join(", ")],
            vec!["learning style".to_string(), options.learning_style.join(", ")],
            vec![
                "attendance".to_string(),
                options
                    .attendance
                    .map(|range| format!("{} - {}", range.min, range.max))
                    .unwrap_or_else(|| "n/a".to_string()),
            ],
        ];
        table::render_table(&table::headers(&["filter", "choices"]), &rows)
    })
}
