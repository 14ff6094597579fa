//! CLI for the synthseries synthetic time-series generator.
//!
//! This binary stands in for the dashboard form layer: it reads a
//! configuration, generates the series, and prints or exports the table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use synthseries::{
    DashboardConfig, FACTOR_KINDS, FactorCategory, FactorConfig, FeatureConfig, FeatureValues,
    MultiplierCaches, ReferenceData,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "synthseries")]
#[command(about = "Synthetic time-series generator with composable factors", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a series from a JSON configuration
    Generate {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Write the table to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sum over every feature except these (comma-separated, empty for per-date totals)
        #[arg(short, long, value_delimiter = ',', num_args = 0..)]
        group_by: Option<Vec<String>>,
        /// Only emit the first N rows
        #[arg(long)]
        head: Option<usize>,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List all available factor kinds
    Factors,
    /// Show information about a factor kind
    Info {
        /// Factor kind
        kind: String,
    },
    /// Print an example configuration
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            output,
            group_by,
            head,
            seed,
        } => generate(&config, output, group_by, head, seed),
        Commands::Factors => {
            list_factors();
            Ok(())
        }
        Commands::Info { kind } => show_factor_info(&kind),
        Commands::Example => {
            println!("{}", example_config()?.to_json()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Generate, aggregate and export a series.
fn generate(
    config_path: &Path,
    output: Option<PathBuf>,
    group_by: Option<Vec<String>>,
    head: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = DashboardConfig::from_path(config_path)
        .with_context(|| format!("reading configuration {}", config_path.display()))?;
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let reference = ReferenceData::load(&config.reference).context("loading reference data")?;
    let space = config.feature_space(&reference)?;
    let mut factors = config.factor_set(&reference, &mut MultiplierCaches::default())?;
    let generator = config.generator()?;
    info!(
        rows = %generator.row_count(&space),
        factors = factors.len(),
        seed = config.seed,
        "generating"
    );

    let mut table = generator.generate(&space, &mut factors)?;
    if let Some(features) = group_by {
        let features: Vec<&str> = features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        table = table.group_by(&features)?;
    }
    if let Some(n) = head {
        table = table.head(n);
    }

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("creating output {}", path.display()))?;
            table.write_csv(BufWriter::new(file))?;
            info!(rows = table.len(), path = %path.display(), "wrote series");
        }
        None => table.write_csv(std::io::stdout().lock())?,
    }
    Ok(())
}

/// List all factor kinds grouped by category, in fold order.
fn list_factors() {
    let mut by_category: BTreeMap<FactorCategory, Vec<_>> = BTreeMap::new();
    for kind in FACTOR_KINDS {
        by_category.entry(kind.category).or_default().push(kind);
    }

    println!("Available Factors ({} total)\n", FACTOR_KINDS.len());
    for (category, kinds) in by_category {
        println!("{}:", category);
        for kind in kinds {
            println!("  {} - {}", kind.name, kind.description);
        }
        println!();
    }
}

/// Show detailed information about a factor kind.
fn show_factor_info(name: &str) -> Result<()> {
    let Some(kind) = FACTOR_KINDS.iter().find(|k| k.name == name) else {
        let available: Vec<&str> = FACTOR_KINDS.iter().map(|k| k.name).collect();
        anyhow::bail!(
            "factor kind '{}' not found; available: {}",
            name,
            available.join(", ")
        );
    };

    println!("Factor: {}", kind.name);
    println!("Category: {}", kind.category);
    println!("Description: {}", kind.description);
    println!("Fields:");
    for field in kind.fields {
        println!("  - {}", field);
    }
    Ok(())
}

/// A small configuration exercising the factors that need no reference files.
fn example_config() -> Result<DashboardConfig> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).context("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2020, 12, 31).context("invalid end date")?;

    let mut config = DashboardConfig::new(1000.0, start, end);
    config.seed = 42;
    config.features = vec![
        FeatureConfig {
            name: "country".to_string(),
            values: FeatureValues::List(vec!["Netherlands".to_string(), "Germany".to_string()]),
        },
        FeatureConfig {
            name: "product".to_string(),
            values: FeatureValues::Text("shoes,socks".to_string()),
        },
    ];
    config.factors = vec![
        FactorConfig::LinearTrend {
            feature: Some("product".to_string()),
            coef: 0.2,
            offset: 1.0,
            per_value: BTreeMap::new(),
        },
        FactorConfig::RandomFeature {
            feature: "product".to_string(),
            min: 0.5,
            max: 1.5,
        },
        FactorConfig::Weekday {
            weekend: Some(1.4),
            ratios: BTreeMap::new(),
        },
        FactorConfig::Holiday {
            country_feature: "country".to_string(),
            intensity: 2.0,
            special_holidays: BTreeMap::from([("Christmas Day".to_string(), 5.0)]),
        },
        FactorConfig::WhiteNoise { stdev: 0.05 },
    ];
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_example_config_generates() {
        let config = example_config().unwrap();
        let reference = ReferenceData::default();
        let mut factors = config
            .factor_set(&reference, &mut MultiplierCaches::default())
            .unwrap();
        let table = config
            .generator()
            .unwrap()
            .generate(&config.feature_space(&reference).unwrap(), &mut factors)
            .unwrap();

        assert_eq!(table.len(), 366 * 4);
    }

    #[test]
    fn test_every_kind_has_info() {
        for kind in FACTOR_KINDS {
            assert!(show_factor_info(kind.name).is_ok());
        }
        assert!(show_factor_info("moon_phase").is_err());
    }

    #[test]
    fn test_parse_generate_arguments() {
        let cli = Cli::try_parse_from([
            "synthseries",
            "generate",
            "--config",
            "cfg.json",
            "--group-by",
            "country,product",
            "--head",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate { group_by, head, .. } => {
                assert_eq!(group_by.unwrap(), ["country", "product"]);
                assert_eq!(head, Some(10));
            }
            _ => panic!("expected generate"),
        }
    }
}
