use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_CHUNK_SIZE;

#[derive(Parser)]
#[command(name = "wildfire-features")]
#[command(about = "Spatial cluster membership features for satellite fire detections")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        default_value_t = ',',
        help = "Field delimiter for CSV input and output"
    )]
    pub delimiter: char,
}

impl Cli {
    /// Delimiter as the single byte the csv crate expects
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}

/// Overrides applied on top of the loaded configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ClusteringArgs {
    #[arg(long, help = "Smallest group of points that counts as a cluster")]
    pub min_cluster_size: Option<usize>,

    #[arg(long, help = "Neighbours used for the core distance of a point")]
    pub min_samples: Option<usize>,

    #[arg(long, help = "Decimal places kept on coordinates before clustering")]
    pub precision: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enrich a batch of detections with calendar and cluster membership features
    Transform {
        #[arg(short, long, help = "Input CSV file of raw detections")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/wildfire-features-{YYMMDD}.{format}]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, value_enum, help = "Output format [default: from extension, else parquet]")]
        format: Option<OutputFormat>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        #[command(flatten)]
        clustering: ClusteringArgs,
    },

    /// Print feature statistics for a batch without writing output
    Summary {
        #[arg(short, long, help = "Input CSV file of raw detections")]
        input: PathBuf,

        #[arg(long, default_value = "false", help = "Print the summary as JSON")]
        json: bool,

        #[command(flatten)]
        clustering: ClusteringArgs,
    },

    /// Report detections with coordinates outside global bounds
    Validate {
        #[arg(short, long, help = "Input CSV file of raw detections")]
        input: PathBuf,
    },

    /// Display information about an enriched Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(OutputFormat::Csv),
            "parquet" | "pq" => Some(OutputFormat::Parquet),
            _ => None,
        }
    }
}
