pub mod dashboard;
pub mod demo;
pub mod load;
pub mod options;
pub mod status;
pub mod summary;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::charts::{ChartOptions, Palette, MAX_BINS};
use crate::dataset::Dataset;
use crate::error::{DashError, Result};
use crate::settings::{resolve_dataset, Settings};

#[derive(Parser)]
#[command(
    name = "tillview",
    version,
    about = "Explore supermarket sales by location and customer gender."
)]
pub struct Cli {
    /// Sales CSV to open (overrides the saved default)
    #[arg(long, global = true)]
    pub data: Option<String>,

    /// Log at debug level (or set TILLVIEW_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (default).
    Dashboard,
    /// Print the five dashboard charts for one filter selection.
    Summary {
        /// Location to include; repeat for several (default: all)
        #[arg(long = "location")]
        locations: Vec<String>,
        /// Gender to include, or `all`
        #[arg(long, default_value = "all")]
        gender: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the values offered by the location and gender filters.
    Options,
    /// Validate a sales CSV and make it the default dataset.
    Load {
        /// Path to the CSV file
        path: String,
    },
    /// Write a synthetic sales CSV and make it the default dataset.
    Demo {
        /// Number of transactions to generate
        #[arg(long, default_value = "1000")]
        rows: usize,
        /// Random seed (same seed, same file)
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Output path (default: <config dir>/demo_sales.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show settings and the current dataset.
    Status,
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Load the dataset selected by `--data` or settings. Any failure here is
/// fatal for the calling command.
pub(crate) fn open_dataset(data: Option<&str>) -> Result<Dataset> {
    let path = resolve_dataset(data)?;
    Dataset::load(&path)
}

pub(crate) fn chart_options(settings: &Settings, dataset: &Dataset) -> Result<ChartOptions> {
    if !(1..=MAX_BINS).contains(&settings.histogram_bins) {
        return Err(DashError::InvalidSetting {
            name: "histogram_bins",
            reason: format!("{} is outside 1..={MAX_BINS}", settings.histogram_bins),
        });
    }
    Ok(ChartOptions {
        currency_suffix: settings.currency_suffix.clone(),
        histogram_bins: settings.histogram_bins,
        palette: Palette::for_dataset(dataset),
    })
}
