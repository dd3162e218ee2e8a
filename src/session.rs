//! Resolves where the data comes from and which filters apply, then hands
//! out the cached normalized table.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    cli::{FilterArgs, SourceArgs, parse_delimiter},
    config::{DEFAULT_DATA_PATH, DashboardConfig},
    dataset::{self, LoadOptions, Table},
    filter::{self, AttendanceRange, FilterCriteria, FilteredView, Selection},
    io_utils,
};

#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl ResolvedSource {
    pub fn resolve(args: &SourceArgs, config: &DashboardConfig) -> Result<Self> {
        let path = args
            .input
            .clone()
            .or_else(|| config.data_path(args.config.as_deref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let configured_delimiter = config
            .delimiter
            .as_deref()
            .map(|value| {
                parse_delimiter(value)
                    .map_err(|err| anyhow!("Invalid delimiter '{value}' in configuration: {err}"))
            })
            .transpose()?;
        let delimiter =
            io_utils::resolve_input_delimiter(&path, args.delimiter.or(configured_delimiter));
        let encoding = io_utils::resolve_encoding(
            args.input_encoding
                .as_deref()
                .or(config.encoding.as_deref()),
        )?;
        Ok(Self {
            path,
            delimiter,
            encoding,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter,
            encoding: self.encoding,
        }
    }
}

pub struct Session {
    pub source: ResolvedSource,
    pub config: DashboardConfig,
    pub table: Arc<Table>,
}

impl Session {
    pub fn open(args: &SourceArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => {
                info!("Reading configuration from {path:?}");
                DashboardConfig::load(path)?
            }
            None => DashboardConfig::default(),
        };
        let source = ResolvedSource::resolve(args, &config)?;
        let table = dataset::load_normalized(&source.path, &source.load_options())?;
        Ok(Self {
            source,
            config,
            table,
        })
    }

    /// Filter criteria from command-line flags over configured defaults.
    pub fn criteria(&self, args: &FilterArgs) -> Result<FilterCriteria> {
        let merged = self.config.filters.merge(args);
        let attendance = AttendanceRange::resolve(
            merged.min_attendance,
            merged.max_attendance,
            filter::attendance_bounds(&self.table),
        )
        .context("Resolving attendance range")?;
        Ok(FilterCriteria {
            gender: selection(merged.gender.as_deref()),
            learning_style: selection(merged.learning_style.as_deref()),
            attendance,
        })
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> FilteredView<'_> {
        let view = filter::filter(&self.table, criteria);
        debug!("Criteria {criteria:?}");
        info!(
            "{} of {} row(s) match the current filters",
            view.len(),
            self.table.row_count()
        );
        view
    }
}

fn selection(value: Option<&str>) -> Selection {
    value
        .map(|v| v.parse::<Selection>().unwrap_or_default())
        .unwrap_or_default()
}
