//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::pager::DEFAULT_PAGE_SIZE;

/// Explore US bikeshare trip data interactively.
#[derive(Parser, Debug, Clone)]
#[command(name = "bikeshare-explorer")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long = "data-dir", env = "BIKESHARE_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Number of trips shown per raw-data page
    #[arg(
        long = "page-size",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub page_size: usize,

    /// Enable verbose logging (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            page_size: DEFAULT_PAGE_SIZE,
            verbose: 0,
        }
    }
}
