use super::AppError;
use accessequity_siting::{Objective, SitingConfig};
use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// settings shared by the `evaluate` and `optimize` operations. every field has a
/// default so a configuration file only needs to list what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    /// inequality aversion, negative for disamenities such as distance
    pub beta: f64,
    /// multiplier applied to every distance read, e.g. 0.001 for metres to kilometres
    pub distance_scale: f64,
    pub unit_id_column: String,
    pub distance_column: String,
    /// population count of each unit
    pub weight_column: String,
    /// population counts of subgroups, each evaluated as its own weighting
    pub subgroup_columns: Vec<String>,
    /// per-unit income, evaluated as a desirable quantity with its own calibration
    pub income_column: Option<String>,
    /// rows above `Q3 + m · IQR` are removed before evaluation when set
    pub outlier_iqr_multiplier: Option<f64>,
    pub candidate_id_column: String,
    pub objective: Objective,
    pub sites: usize,
    /// fixed Kolm-Pollak kappa. calibrated from the data when absent.
    pub kappa: Option<f64>,
    pub parallelize: bool,
    /// additional betas for a sensitivity sweep in `evaluate`, each calibrated on the
    /// union of all regions
    pub betas: Vec<f64>,
}

impl Default for EquityConfig {
    fn default() -> Self {
        let siting = SitingConfig::default();
        Self {
            beta: siting.beta,
            distance_scale: 1.0,
            unit_id_column: String::from("id"),
            distance_column: String::from("distance"),
            weight_column: String::from("population"),
            subgroup_columns: vec![],
            income_column: None,
            outlier_iqr_multiplier: None,
            candidate_id_column: String::from("candidate_id"),
            objective: siting.objective,
            sites: siting.sites,
            kappa: siting.kappa,
            parallelize: siting.parallelize,
            betas: vec![],
        }
    }
}

impl EquityConfig {
    /// reads a TOML or JSON configuration file, chosen by file extension.
    pub fn from_file(filepath: &Path) -> Result<EquityConfig, AppError> {
        let filename = filepath.to_string_lossy().to_string();
        let format = match filepath.extension().and_then(|e| e.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => {
                return Err(AppError::ConfigurationError(format!(
                    "unsupported configuration file type '{filename}', expected .toml or .json"
                )))
            }
        };
        let config = Config::builder()
            .add_source(config::File::new(&filename, format))
            .build()
            .map_err(|e| AppError::ConfigReadError {
                msg: format!("failed reading '{filename}'"),
                source: e,
            })?;
        let equity_config = config
            .try_deserialize::<EquityConfig>()
            .map_err(|e| AppError::ConfigReadError {
                msg: format!("failed decoding '{filename}'"),
                source: e,
            })?;
        equity_config.validate()?;
        Ok(equity_config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.beta.is_finite() {
            return Err(AppError::ConfigurationError(format!(
                "beta must be a finite number, found {}",
                self.beta
            )));
        }
        if !(self.distance_scale.is_finite() && self.distance_scale > 0.0) {
            return Err(AppError::ConfigurationError(format!(
                "distance_scale must be a positive number, found {}",
                self.distance_scale
            )));
        }
        if let Some(beta) = self.betas.iter().find(|b| !b.is_finite()) {
            return Err(AppError::ConfigurationError(format!(
                "betas must be finite numbers, found {beta}"
            )));
        }
        if let Some(m) = self.outlier_iqr_multiplier {
            if !(m.is_finite() && m >= 0.0) {
                return Err(AppError::ConfigurationError(format!(
                    "outlier_iqr_multiplier must be a non-negative number, found {m}"
                )));
            }
        }
        Ok(())
    }

    pub fn siting_config(&self) -> SitingConfig {
        SitingConfig {
            sites: self.sites,
            objective: self.objective,
            beta: self.beta,
            kappa: self.kappa,
            parallelize: self.parallelize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_file(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("resources")
            .join("test")
            .join(name)
    }

    #[test]
    fn test_read_toml() {
        let config = EquityConfig::from_file(&test_file("equity.toml")).unwrap();
        assert_eq!(config.distance_scale, 0.001);
        assert_eq!(
            config.subgroup_columns,
            vec![String::from("low_income"), String::from("no_vehicle")]
        );
        assert_eq!(config.income_column, Some(String::from("median_income")));
        assert_eq!(config.outlier_iqr_multiplier, Some(4.0));
        assert_eq!(config.sites, 2);
        assert!(!config.parallelize);
        // not listed in the file
        assert_eq!(config.unit_id_column, "id");
        assert_eq!(config.kappa, None);
        assert_eq!(config.betas, vec![0.0, -0.5, -2.0]);
    }

    #[test]
    fn test_read_json() {
        let config = EquityConfig::from_file(&test_file("equity.json")).unwrap();
        assert_eq!(config.beta, -0.5);
        assert_eq!(config.objective, Objective::KolmPollakEde);
        let siting = config.siting_config();
        assert_eq!(siting.sites, 3);
        assert_eq!(siting.kappa, Some(-0.2));
        assert!(siting.parallelize);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EquityConfig::from_file(&test_file("region_a.csv"));
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn test_invalid_distance_scale() {
        let config = EquityConfig {
            distance_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
