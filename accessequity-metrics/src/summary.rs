use super::{InequalityError, WeightedSample};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// population shares at which distribution percentiles are reported.
pub const REPORT_PERCENTILES: [f64; 6] = [10.0, 50.0, 75.0, 90.0, 95.0, 100.0];

/// descriptive statistics of a population-weighted distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub max: f64,
    /// population standard deviation (no degrees-of-freedom correction)
    pub std_dev: f64,
    /// `std_dev / mean`, 0 when the mean is 0
    pub coefficient_of_variation: f64,
    pub total_weight: f64,
    /// (percentile, value) pairs at [`REPORT_PERCENTILES`]
    pub percentiles: Vec<(f64, f64)>,
}

impl DistributionSummary {
    pub fn from_sample(sample: &WeightedSample) -> Result<DistributionSummary, InequalityError> {
        sample.require_finite("distribution summary")?;
        let total_weight = sample.total_weight();
        let mean = sample.mean();
        let variance = sample
            .iter()
            .map(|(x, w)| w * (x - mean).powi(2))
            .sum::<f64>()
            / total_weight;
        let std_dev = variance.sqrt();
        let coefficient_of_variation = if mean == 0.0 { 0.0 } else { std_dev / mean };
        let percentiles = REPORT_PERCENTILES
            .iter()
            .map(|p| Ok((*p, weighted_percentile(sample, *p)?)))
            .collect::<Result<Vec<_>, InequalityError>>()?;
        Ok(DistributionSummary {
            mean,
            max: sample.max(),
            std_dev,
            coefficient_of_variation,
            total_weight,
            percentiles,
        })
    }
}

/// population-weighted percentile: the smallest value at which the cumulative share
/// of the population reaches `percentile` (0 to 100). 0 gives the minimum and 100 the
/// maximum.
pub fn weighted_percentile(
    sample: &WeightedSample,
    percentile: f64,
) -> Result<f64, InequalityError> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(InequalityError::Domain(format!(
            "percentile must be within [0, 100], found {percentile}"
        )));
    }
    sample.require_finite("weighted percentile")?;
    if percentile == 100.0 {
        return Ok(sample.max());
    }
    let target = percentile * sample.total_weight() / 100.0;
    let mut cumulative = 0.0;
    for (x, w) in sample.iter().sorted_by(|a, b| a.0.total_cmp(&b.0)) {
        cumulative += w;
        if cumulative >= target {
            return Ok(x);
        }
    }
    Ok(sample.max())
}
