use super::{
    atkinson, gini, DistributionSummary, InequalityError, KolmPollak, WeightedSample,
};
use serde::{Deserialize, Serialize};

/// the full set of equity measures for one distance distribution, computed under a
/// shared Kolm-Pollak calibration so that reports for different regions can be
/// placed side by side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquityReport {
    pub beta: f64,
    pub kappa: f64,
    pub kolm_pollak_ede: f64,
    pub kolm_pollak_index: f64,
    /// Atkinson EDE of inverted distances with aversion `|beta|`. absent when a
    /// distance is 0 and cannot be inverted.
    pub atkinson_ede: Option<f64>,
    pub atkinson_index: Option<f64>,
    pub atkinson_adjusted_ede: f64,
    pub atkinson_adjusted_index: f64,
    pub gini_index: f64,
    pub mean: f64,
    pub max: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub total_weight: f64,
    /// population-weighted (percentile, value) pairs
    pub percentiles: Vec<(f64, f64)>,
}

impl EquityReport {
    /// evaluates every measure over `sample`, a distribution of distances.
    ///
    /// # Arguments
    /// * `sample` - distances with population weights
    /// * `kolm_pollak` - calibration shared by every report being compared
    pub fn evaluate(
        sample: &WeightedSample,
        kolm_pollak: &KolmPollak,
    ) -> Result<EquityReport, InequalityError> {
        let beta = kolm_pollak.beta;
        let kolm_pollak_ede = kolm_pollak.ede(sample)?;
        let kolm_pollak_index = kolm_pollak.index(sample)?;

        let (atkinson_ede, atkinson_index) = match inverted_atkinson(sample, beta.abs()) {
            Ok((ede, index)) => (Some(ede), Some(index)),
            Err(e) => {
                log::warn!("skipping Atkinson measures on inverted distances: {e}");
                (None, None)
            }
        };
        let atkinson_adjusted_ede = atkinson::atkinson_adjusted_ede(sample, beta)?;
        let atkinson_adjusted_index = atkinson::atkinson_adjusted_index(sample, beta)?;
        let summary = DistributionSummary::from_sample(sample)?;

        Ok(EquityReport {
            beta,
            kappa: kolm_pollak.kappa,
            kolm_pollak_ede,
            kolm_pollak_index,
            atkinson_ede,
            atkinson_index,
            atkinson_adjusted_ede,
            atkinson_adjusted_index,
            gini_index: gini::gini_index(sample)?,
            mean: summary.mean,
            max: summary.max,
            std_dev: summary.std_dev,
            coefficient_of_variation: summary.coefficient_of_variation,
            total_weight: summary.total_weight,
            percentiles: summary.percentiles,
        })
    }
}

fn inverted_atkinson(sample: &WeightedSample, epsilon: f64) -> Result<(f64, f64), InequalityError> {
    let inverted = sample.map_values(|x| 1.0 / x)?;
    let ede = atkinson::atkinson_ede(&inverted, epsilon)?;
    let index = atkinson::atkinson_index(&inverted, epsilon)?;
    Ok((ede, index))
}
