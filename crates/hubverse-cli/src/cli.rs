//! CLI argument definitions for `hubjson`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "hubjson",
    version,
    about = "Convert Hubverse forecast hubs into per-location JSON documents",
    long_about = "Convert Hubverse forecast hubs into per-location JSON documents.\n\n\
                  Reads model-output, target-data and location tables, groups forecasts\n\
                  by reference date, target and model, and writes one document per\n\
                  location plus a dataset-level metadata.json."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert one dataset into JSON documents.
    Convert(ConvertArgs),

    /// Convert an NHSN surveillance export into per-jurisdiction time series.
    Nhsn(NhsnArgs),

    /// List the built-in dataset profiles.
    Profiles,
}

#[derive(Parser)]
pub struct NhsnArgs {
    /// NHSN export (CSV or Parquet) with jurisdiction and weekendingdate columns.
    #[arg(long = "data", value_name = "PATH")]
    pub data: PathBuf,

    /// Locations table (CSV or Parquet).
    #[arg(long = "locations-data", value_name = "PATH")]
    pub locations_data: PathBuf,

    /// Socrata view metadata JSON used to rename columns.
    #[arg(long = "column-metadata", value_name = "PATH")]
    pub column_metadata: Option<PathBuf>,

    /// Output root; files go to its nhsn/ directory.
    #[arg(long = "output-dir", value_name = "DIR", required_unless_present = "dry_run")]
    pub output_dir: Option<PathBuf>,

    /// Fail instead of replacing existing files.
    #[arg(long = "no-overwrite")]
    pub no_overwrite: bool,

    /// Build without writing any files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Built-in dataset profile.
    #[arg(
        long = "dataset",
        value_enum,
        required_unless_present = "profile_file",
        conflicts_with = "profile_file"
    )]
    pub dataset: Option<DatasetArg>,

    /// Dataset profile read from a TOML file.
    #[arg(long = "profile-file", value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Root of a Hubverse hub clone (model-output/, target-data/, auxiliary-data/).
    #[arg(
        long = "hub-path",
        value_name = "DIR",
        required_unless_present = "forecast_data",
        conflicts_with = "forecast_data"
    )]
    pub hub_path: Option<PathBuf>,

    /// Forecast table (CSV or Parquet).
    #[arg(
        long = "forecast-data",
        value_name = "PATH",
        requires_all = ["target_data", "locations_data"]
    )]
    pub forecast_data: Option<PathBuf>,

    /// Ground truth table (CSV or Parquet).
    #[arg(long = "target-data", value_name = "PATH", requires = "forecast_data")]
    pub target_data: Option<PathBuf>,

    /// Locations table (CSV or Parquet).
    #[arg(long = "locations-data", value_name = "PATH", requires = "forecast_data")]
    pub locations_data: Option<PathBuf>,

    /// Output root; documents go to a per-dataset directory beneath it.
    #[arg(long = "output-dir", value_name = "DIR", required_unless_present = "dry_run")]
    pub output_dir: Option<PathBuf>,

    /// Fail instead of replacing existing files.
    #[arg(long = "no-overwrite")]
    pub no_overwrite: bool,

    /// Build and validate without writing any files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Keep every quantile level and category instead of the canonical set.
    #[arg(long = "keep-all-output-type-ids")]
    pub keep_all_output_type_ids: bool,

    /// Keep rows with a negative horizon.
    #[arg(long = "keep-nowcasts")]
    pub keep_nowcasts: bool,

    /// What to do with documents that fail validation.
    #[arg(long = "on-invalid", value_enum, default_value = "save")]
    pub on_invalid: InvalidPolicyArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DatasetArg {
    Flu,
    FluMetro,
    Rsv,
    Covid,
}

/// CLI invalid-document policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum InvalidPolicyArg {
    /// Warn and write the document anyway.
    Save,
    /// Leave the document out.
    Skip,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
