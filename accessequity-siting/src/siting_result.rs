use super::Objective;
use accessequity_metrics::KolmPollak;
use serde::{Deserialize, Serialize};

/// one round of a siting run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// 1-based round number, also the priority rank of the site
    pub round: usize,
    pub candidate_id: String,
    /// objective value after adding this site to all earlier selections
    pub objective: f64,
}

/// outcome of a greedy siting run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SitingResult {
    pub objective: Objective,
    /// Kolm-Pollak calibration held fixed for the run. always present for the EDE
    /// objective; for the mean objective it is reported when the baseline allows it.
    pub kolm_pollak: Option<KolmPollak>,
    /// objective value before any site is added
    pub baseline_objective: f64,
    pub selections: Vec<Selection>,
}

impl SitingResult {
    pub fn selected_ids(&self) -> Vec<String> {
        self.selections
            .iter()
            .map(|s| s.candidate_id.clone())
            .collect()
    }

    pub fn objective_values(&self) -> Vec<f64> {
        self.selections.iter().map(|s| s.objective).collect()
    }

    pub fn kappa(&self) -> Option<f64> {
        self.kolm_pollak.map(|kp| kp.kappa)
    }
}
