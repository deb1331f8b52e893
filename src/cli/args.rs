use crate::readers::LoadFormat;
use crate::utils::constants::PARAM_PRECIPITATION_TYPE;
use crate::writers::TsvLayout;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-extractor")]
#[command(about = "Query actual and forecasted weather from gridded forecast messages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: weather-extractor.toml]")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Input format [default: inferred from file names]"
    )]
    pub format: Option<LoadFormat>,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Best estimate of actual weather for each day of a window
    Actual {
        #[arg(short, long, required = true, num_args = 1.., help = "Input files")]
        input: Vec<PathBuf>,

        #[arg(long, help = "First day of the window (YYYY-MM-DD)")]
        from: NaiveDate,

        #[arg(long, help = "Last day of the window (YYYY-MM-DD)")]
        to: NaiveDate,

        #[command(flatten)]
        aggregation: AggregationArgs,
    },

    /// Forecast issued on a base date for a window of days
    Forecast {
        #[arg(short, long, required = true, num_args = 1.., help = "Input files")]
        input: Vec<PathBuf>,

        #[arg(long, help = "Day the forecast was issued (YYYY-MM-DD)")]
        base: NaiveDate,

        #[arg(long, help = "First forecasted day (YYYY-MM-DD)")]
        from: NaiveDate,

        #[arg(long, help = "Last forecasted day (YYYY-MM-DD)")]
        to: NaiveDate,

        #[command(flatten)]
        aggregation: AggregationArgs,
    },

    /// Summarize the loaded messages
    Info {
        #[arg(short, long, required = true, num_args = 1.., help = "Input files")]
        input: Vec<PathBuf>,
    },

    /// Load input files and store them as a snapshot
    Convert {
        #[arg(short, long, required = true, num_args = 1.., help = "Input files")]
        input: Vec<PathBuf>,

        #[arg(short, long, help = "Snapshot path (.snapshot.json is appended if missing)")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AggregationArgs {
    #[arg(long, help = "Time aggregation: hour, day or week [default: from settings]")]
    pub aggtime: Option<String>,

    #[arg(long, default_value = "grid", help = "Location aggregation: grid, points, country or bbox")]
    pub aggloc: String,

    #[arg(long = "point", help = "Target point LAT,LON for --aggloc points (repeatable)")]
    pub points: Vec<String>,

    #[arg(long, help = "Bounding box LAT1,LON1,LAT2,LON2 for --aggloc bbox")]
    pub bbox: Option<String>,

    #[arg(long, help = "Value reduction: one or mean [default: mean for bbox, one otherwise]")]
    pub policy: Option<String>,

    #[arg(short, long, help = "Output TSV path [default: output/weather-{kind}-{YYMMDD}.tsv]")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = TsvLayout::Long, help = "Export layout")]
    pub layout: TsvLayout,

    #[arg(
        long = "skip-param",
        default_value = PARAM_PRECIPITATION_TYPE,
        help = "Parameter to leave out of the export (repeatable)"
    )]
    pub skip_params: Vec<String>,

    #[arg(long, default_value = "5", help = "Number of result records to print")]
    pub sample: usize,
}
