//! cellfreq - Immune Cell Frequency Analysis CLI
//!
//! Command-line interface for computing relative frequencies and comparing
//! responders with non-responders.

use cellfreq::data::SampleSet;
use cellfreq::error::Result;
use cellfreq::filter::CohortCriteria;
use cellfreq::normalize::{norm_frequencies, FrequencyLayout};
use cellfreq::pipeline::{AnalysisConfig, Pipeline};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI-friendly frequency layout
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLayout {
    /// One row per sample and population with counts and percentages
    Long,
    /// One row per sample, one column per population
    Wide,
}

impl From<CliLayout> for FrequencyLayout {
    fn from(layout: CliLayout) -> Self {
        match layout {
            CliLayout::Long => FrequencyLayout::Long,
            CliLayout::Wide => FrequencyLayout::Wide,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Human-readable summary
    Text,
    /// Tab-separated table
    Tsv,
    /// Comma-separated table
    Csv,
    /// JSON document
    Json,
}

/// Immune Cell Frequency Analysis
#[derive(Parser)]
#[command(name = "cellfreq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute relative frequencies for every sample
    Frequencies {
        /// Path to cell count table
        input: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter for input and output
        #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,

        /// Output layout
        #[arg(long, value_enum, default_value = "long")]
        format: CliLayout,
    },

    /// Compare responders and non-responders in a cohort
    Analyze {
        /// Path to cell count table
        input: PathBuf,

        /// Analysis configuration YAML (default: melanoma PBMC on tr1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Start from all samples instead of the default or configured cohort;
        /// the criteria flags below still apply
        #[arg(long, conflicts_with = "config")]
        all: bool,

        /// Restrict cohort to a condition
        #[arg(long)]
        condition: Option<String>,

        /// Restrict cohort to a sample type
        #[arg(long)]
        sample_type: Option<String>,

        /// Restrict cohort to days since treatment start
        #[arg(long)]
        days: Option<u32>,

        /// Restrict cohort to a treatment
        #[arg(long)]
        treatment: Option<String>,

        /// Output path for the report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Also write the frequency table (long layout) to this path
        #[arg(long)]
        frequencies_out: Option<PathBuf>,

        /// Field delimiter of the input table
        #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,
    },

    /// Generate an example analysis configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

fn parse_delimiter(raw: &str) -> std::result::Result<u8, String> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{}'", raw)),
        },
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Frequencies {
            input,
            output,
            delimiter,
            format,
        } => cmd_frequencies(&input, output.as_ref(), delimiter, format.into()),

        Commands::Analyze {
            input,
            config,
            all,
            condition,
            sample_type,
            days,
            treatment,
            output,
            format,
            frequencies_out,
            delimiter,
        } => {
            let overrides = CohortCriteria {
                condition,
                sample_type,
                days_since_start: days,
                treatment,
            };
            cmd_analyze(
                &input,
                config.as_ref(),
                all,
                overrides,
                output.as_ref(),
                format,
                frequencies_out.as_ref(),
                delimiter,
            )
        }

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Open the output destination, falling back to stdout.
fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(io::stdout().lock()),
    })
}

/// Compute and write relative frequencies
fn cmd_frequencies(
    input: &PathBuf,
    output: Option<&PathBuf>,
    delimiter: u8,
    layout: FrequencyLayout,
) -> Result<()> {
    let samples = SampleSet::from_csv(input, delimiter)?;
    info!(samples = samples.len(), "loaded cell counts");

    let table = norm_frequencies(samples.iter())?;
    table.write(open_output(output)?, delimiter, layout)?;

    if let Some(path) = output {
        info!(path = %path.display(), "wrote frequencies");
    }
    Ok(())
}

/// Run a cohort comparison
#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    input: &PathBuf,
    config_path: Option<&PathBuf>,
    all: bool,
    overrides: CohortCriteria,
    output: Option<&PathBuf>,
    format: ReportFormat,
    frequencies_out: Option<&PathBuf>,
    delimiter: u8,
) -> Result<()> {
    let config = resolve_config(config_path, all, overrides)?;
    let samples = SampleSet::from_csv(input, delimiter)?;
    info!(samples = samples.len(), "loaded cell counts");

    let result = Pipeline::from_config(&config).run(&samples)?;

    if let Some(path) = frequencies_out {
        result
            .frequencies
            .to_csv(path, delimiter, FrequencyLayout::Long)?;
        info!(path = %path.display(), "wrote frequencies");
    }

    let mut out = open_output(output)?;
    match format {
        ReportFormat::Text => write!(out, "{}", result.report)?,
        ReportFormat::Tsv => result.report.write_table(&mut out, b'\t')?,
        ReportFormat::Csv => result.report.write_table(&mut out, b',')?,
        ReportFormat::Json => writeln!(out, "{}", result.report.to_json()?)?,
    }
    out.flush()?;

    if let Some(path) = output {
        info!(path = %path.display(), "wrote report");
    }
    Ok(())
}

/// Pick the base analysis and apply command-line criteria on top.
fn resolve_config(
    config_path: Option<&PathBuf>,
    all: bool,
    overrides: CohortCriteria,
) -> Result<AnalysisConfig> {
    let mut config = match config_path {
        Some(path) => {
            info!(path = %path.display(), "loading analysis configuration");
            AnalysisConfig::from_file(path)?
        }
        None if all => AnalysisConfig {
            name: "all-samples".to_string(),
            description: None,
            criteria: CohortCriteria::any(),
        },
        None => AnalysisConfig::default_melanoma_tr1(),
    };
    merge_criteria(&mut config.criteria, overrides);
    Ok(config)
}

/// Command-line criteria override those loaded from configuration.
fn merge_criteria(criteria: &mut CohortCriteria, overrides: CohortCriteria) {
    if overrides.condition.is_some() {
        criteria.condition = overrides.condition;
    }
    if overrides.sample_type.is_some() {
        criteria.sample_type = overrides.sample_type;
    }
    if overrides.days_since_start.is_some() {
        criteria.days_since_start = overrides.days_since_start;
    }
    if overrides.treatment.is_some() {
        criteria.treatment = overrides.treatment;
    }
}

/// Generate an example configuration
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = AnalysisConfig::default_melanoma_tr1();
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    info!(path = %output_path.display(), "wrote example analysis");
    println!("{}", yaml);

    Ok(())
}
