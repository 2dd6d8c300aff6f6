use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "checkpack")]
#[command(version)]
#[command(about = "Export event check-in rosters as CSV or as a ZIP bundle", long_about = None)]
#[command(after_help = "Examples:\n  \
  checkpack csv roster.json                 write clients_export.csv\n  \
  checkpack bundle roster.json -o day1.zip  CSV plus signature PNGs\n  \
  checkpack test day1.zip                   verify every entry's CRC")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Debug logging
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    /// Never overwrite existing files
    #[arg(short = 'n', global = true)]
    pub never_overwrite: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export the roster as a single CSV file
    Csv {
        /// Roster JSON file
        #[arg(value_name = "ROSTER")]
        roster: PathBuf,

        /// Output file
        #[arg(short = 'o', value_name = "FILE", default_value = "clients_export.csv")]
        output: PathBuf,
    },

    /// Export the roster CSV and signature images as a ZIP archive
    Bundle {
        /// Roster JSON file
        #[arg(value_name = "ROSTER")]
        roster: PathBuf,

        /// Output file
        #[arg(short = 'o', value_name = "FILE", default_value = "checkins.zip")]
        output: PathBuf,

        /// Name of the CSV entry inside the archive
        #[arg(long, value_name = "NAME", default_value = "checkins.csv")]
        csv_name: String,

        /// Directory for signature images inside the archive
        #[arg(long, value_name = "DIR", default_value = "signatures")]
        signature_dir: String,
    },

    /// List archive contents
    List {
        /// ZIP file
        #[arg(value_name = "FILE")]
        archive: PathBuf,

        /// List verbosely
        #[arg(short = 'v')]
        verbose: bool,
    },

    /// Test archive integrity
    Test {
        /// ZIP file
        #[arg(value_name = "FILE")]
        archive: PathBuf,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.debug) {
            (0, true) => LevelFilter::Debug,
            (0, false) => LevelFilter::Info,
            (1, _) => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    }
}
