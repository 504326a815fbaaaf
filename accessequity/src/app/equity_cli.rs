use super::{evaluate, optimize, AppError, EquityConfig};
use accessequity_siting::Objective;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// command line tool for equity-adjusted access evaluation and facility siting
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct EquityCliArguments {
    /// select the operation to run
    #[command(subcommand)]
    pub op: EquityOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum EquityOperation {
    /// computes inequality measures of nearest-facility distances for one or more
    /// regions, with kappa calibrated once across all of them.
    Evaluate {
        /// region CSV files (.csv or .csv.gz) with one row per residential unit
        #[arg(required = true)]
        region_files: Vec<String>,
        /// TOML or JSON run configuration
        #[arg(short, long)]
        config_file: Option<String>,
        /// output CSV of measures in long format
        #[arg(short, long, default_value_t = String::from("equity_measures.csv"))]
        output_file: String,
        /// overrides the configured inequality aversion
        #[arg(long, allow_negative_numbers = true)]
        beta: Option<f64>,
    },
    /// greedily selects new facility sites from a candidate set and reports the
    /// subgroup measures of the result.
    Optimize {
        /// region CSV file with current nearest-facility distances
        #[arg(short, long)]
        units_file: String,
        /// CSV of distances from each candidate site to the units it reaches
        #[arg(long)]
        candidates_file: String,
        /// TOML or JSON run configuration
        #[arg(short, long)]
        config_file: Option<String>,
        /// directory for the selections and subgroup tables
        #[arg(short, long, default_value_t = String::from("."))]
        output_directory: String,
        /// overrides the configured number of sites to add
        #[arg(short = 'k', long)]
        sites: Option<usize>,
        /// overrides the configured objective
        #[arg(long, value_enum)]
        objective: Option<Objective>,
    },
}

impl EquityOperation {
    pub fn run(&self) -> Result<(), AppError> {
        match self {
            EquityOperation::Evaluate {
                region_files,
                config_file,
                output_file,
                beta,
            } => {
                let mut config = read_config(config_file.as_ref())?;
                if let Some(beta) = beta {
                    config.beta = *beta;
                }
                config.validate()?;
                let files = region_files.iter().map(PathBuf::from).collect::<Vec<_>>();
                let rows = evaluate::run(&files, &config, Path::new(output_file))?;
                log::info!("computed {} measures", rows.len());
                Ok(())
            }
            EquityOperation::Optimize {
                units_file,
                candidates_file,
                config_file,
                output_directory,
                sites,
                objective,
            } => {
                let mut config = read_config(config_file.as_ref())?;
                if let Some(sites) = sites {
                    config.sites = *sites;
                }
                if let Some(objective) = objective {
                    config.objective = *objective;
                }
                let result = optimize::run(
                    Path::new(units_file),
                    Path::new(candidates_file),
                    &config,
                    Path::new(output_directory),
                )?;
                log::info!("selected {} sites", result.selections.len());
                Ok(())
            }
        }
    }
}

fn read_config(config_file: Option<&String>) -> Result<EquityConfig, AppError> {
    match config_file {
        Some(f) => EquityConfig::from_file(Path::new(f)),
        None => Ok(EquityConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let args = EquityCliArguments::try_parse_from([
            "accessequity",
            "evaluate",
            "north.csv",
            "south.csv.gz",
            "--beta",
            "-0.5",
        ])
        .unwrap();
        match args.op {
            EquityOperation::Evaluate {
                region_files,
                output_file,
                beta,
                config_file,
            } => {
                assert_eq!(region_files, vec!["north.csv", "south.csv.gz"]);
                assert_eq!(output_file, "equity_measures.csv");
                assert_eq!(beta, Some(-0.5));
                assert_eq!(config_file, None);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn test_parse_optimize() {
        let args = EquityCliArguments::try_parse_from([
            "accessequity",
            "optimize",
            "-u",
            "units.csv",
            "--candidates-file",
            "candidates.csv",
            "-k",
            "3",
            "--objective",
            "kolm-pollak-ede",
        ])
        .unwrap();
        match args.op {
            EquityOperation::Optimize {
                sites, objective, ..
            } => {
                assert_eq!(sites, Some(3));
                assert_eq!(objective, Some(Objective::KolmPollakEde));
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_requires_region_files() {
        let result = EquityCliArguments::try_parse_from(["accessequity", "evaluate"]);
        assert!(result.is_err());
    }
}
