use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn, Level};

use crate::cli::args::{ClusteringArgs, Cli, Commands, OutputFormat};
use crate::config::FeatureConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{schema, EnrichedObservation};
use crate::processors::{BatchSummary, ClusterFeatureExtractor, IntegrityChecker};
use crate::readers::ObservationReader;
use crate::utils::filename::{file_extension, generate_default_output_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let delimiter = cli.delimiter_byte().ok_or_else(|| {
        ProcessingError::Config(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            cli.delimiter
        ))
    })?;

    match cli.command {
        Commands::Transform {
            input,
            output_file,
            format,
            compression,
            chunk_size,
            clustering,
        } => {
            let config = resolve_config(cli.config.as_deref(), &clustering)?;
            let (format, output_file) = resolve_output(format, output_file);

            println!("Transforming fire detections...");
            println!("Input file: {}", input.display());
            println!("Output file: {}", output_file.display());
            println!(
                "min_cluster_size: {}, min_samples: {}, precision: {}",
                config.clustering.min_cluster_size,
                config.clustering.min_samples,
                config.coordinate_precision
            );

            let records = enrich_file(&input, &config, delimiter)?;
            if records.is_empty() {
                warn!(input = %input.display(), "Input batch has no detections");
            }

            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            println!("Writing {} records...", records.len());
            match format {
                OutputFormat::Csv => {
                    CsvWriter::new()
                        .with_delimiter(delimiter)
                        .write_records(&records, &output_file)?;
                }
                OutputFormat::Parquet => {
                    let writer = ParquetWriter::new().with_compression(&compression)?;
                    writer.write_records_batched(&records, &output_file, chunk_size)?;

                    let file_info = writer.get_file_info(&output_file)?;
                    println!("\n{}", file_info.summary());
                }
            }

            let summary = BatchSummary::from_records(&records);
            println!(
                "\nClustered: {} of {} ({:.1}%)",
                summary.clustered_records,
                summary.total_records,
                summary.clustered_percentage()
            );
            info!(output = %output_file.display(), "Transform complete");
            println!("Processing complete!");
        }

        Commands::Summary {
            input,
            json,
            clustering,
        } => {
            let config = resolve_config(cli.config.as_deref(), &clustering)?;
            let records = enrich_file(&input, &config, delimiter)?;
            let summary = BatchSummary::from_records(&records);

            if json {
                println!("{}", summary.to_json()?);
            } else {
                println!("{}", summary.detailed_summary());
            }
        }

        Commands::Validate { input } => {
            println!("Validating fire detections...");
            println!("Input file: {}", input.display());

            let progress = ProgressReporter::new_spinner("Reading detections...", false);
            let records = ObservationReader::new()
                .with_delimiter(delimiter)
                .read_observations(&input)?;
            progress.finish_with_message(&format!("Read {} records", records.len()));

            let checker = IntegrityChecker::new();
            let report = checker.check_coordinates(&records);
            println!("\n{}", checker.generate_summary(&report));

            if report.violations.is_empty() {
                println!("✅ All coordinates are within bounds");
            } else {
                warn!(violations = report.violations.len(), "Out-of-bounds coordinates found");
                println!(
                    "⚠️  Found {} rows with out-of-bounds coordinates",
                    report.violations.len()
                );
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            println!("\nFeature Columns:");
            for (group, columns) in [
                ("Categorical", &schema::CATEGORICAL_FEATURES[..]),
                ("Numeric", &schema::NUMERIC_FEATURES[..]),
            ] {
                let (present, missing) = file_info.partition_columns(columns);
                println!("  {}: {}", group, present.join(", "));
                if !missing.is_empty() {
                    warn!(?missing, "{} feature columns missing", group);
                    println!("    missing: {}", missing.join(", "));
                }
            }

            let (leaked, _) = file_info.partition_columns(&schema::DROPPED_COLUMNS);
            if !leaked.is_empty() {
                println!("  Raw timestamp columns present: {}", leaked.join(", "));
            }

            if sample > 0 {
                println!("\nSample Records (showing up to {} records):", sample);
                match writer.read_sample_records(&file, sample) {
                    Ok(records) => {
                        for (i, record) in records.iter().enumerate() {
                            println!(
                                "{}. ({:.2}, {:.2}) {} {} month={} week={} clustered={}",
                                i + 1,
                                record.latitude,
                                record.longitude,
                                record.satellite,
                                record.daynight.as_deref().unwrap_or("-"),
                                record.month,
                                record.week_of_year,
                                record.cluster_membership
                            );
                        }
                    }
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

/// Layer CLI overrides on top of defaults, file and environment
fn resolve_config(config_file: Option<&Path>, args: &ClusteringArgs) -> Result<FeatureConfig> {
    let mut config = FeatureConfig::load(config_file)?;

    if let Some(size) = args.min_cluster_size {
        config = config.with_min_cluster_size(size);
    }
    if let Some(samples) = args.min_samples {
        config = config.with_min_samples(samples);
    }
    if let Some(precision) = args.precision {
        config = config.with_coordinate_precision(precision);
    }

    validator::Validate::validate(&config)?;
    Ok(config)
}

fn resolve_output(
    format: Option<OutputFormat>,
    output_file: Option<PathBuf>,
) -> (OutputFormat, PathBuf) {
    let format = format
        .or_else(|| {
            output_file
                .as_deref()
                .and_then(file_extension)
                .and_then(|ext| OutputFormat::from_extension(&ext))
        })
        .unwrap_or(OutputFormat::Parquet);

    let output_file =
        output_file.unwrap_or_else(|| generate_default_output_filename(format.extension()));

    (format, output_file)
}

fn enrich_file(
    input: &Path,
    config: &FeatureConfig,
    delimiter: u8,
) -> Result<Vec<EnrichedObservation>> {
    let progress = ProgressReporter::new_spinner("Reading detections...", false);

    let raw = ObservationReader::new()
        .with_delimiter(delimiter)
        .read_observations(input)?;
    progress.set_message(&format!("Clustering {} detections...", raw.len()));

    let extractor = ClusterFeatureExtractor::new(config)?;
    let records = extractor.transform(&raw)?;

    progress.finish_with_message(&format!("Enriched {} records", records.len()));
    Ok(records)
}
