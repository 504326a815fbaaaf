use accessequity_metrics::{InequalityError, KolmPollak, WeightedSample};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the quantity minimized when choosing a site.
#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// population-weighted mean distance
    #[default]
    Mean,
    /// Kolm-Pollak EDE of distance under a kappa fixed for the whole run
    KolmPollakEde,
}

impl Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::Mean => write!(f, "mean"),
            Objective::KolmPollakEde => write!(f, "kolm_pollak_ede"),
        }
    }
}

/// an [`Objective`] bound to its parameters for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObjectiveFunction {
    Mean,
    KolmPollakEde(KolmPollak),
}

impl ObjectiveFunction {
    pub fn evaluate(&self, sample: &WeightedSample) -> Result<f64, InequalityError> {
        match self {
            ObjectiveFunction::Mean => Ok(sample.mean()),
            ObjectiveFunction::KolmPollakEde(kp) => kp.ede(sample),
        }
    }

    pub fn objective(&self) -> Objective {
        match self {
            ObjectiveFunction::Mean => Objective::Mean,
            ObjectiveFunction::KolmPollakEde(_) => Objective::KolmPollakEde,
        }
    }
}
