use super::{InequalityError, WeightedSample};
use itertools::Itertools;

/// weighted Gini coefficient using the cumulative rank-sum form
///
/// ```text
/// G = Σᵢ wᵢ·(xᵢ·W₍ᵢ₋₁₎ − S₍ᵢ₋₁₎) / (Sₙ·Wₙ)
/// ```
///
/// over values sorted ascending, where `Wᵢ` and `Sᵢ` are running sums of weights and
/// of weighted values. for non-negative values the result lies in [0, 1]. returns 0
/// for a single row, a single distinct value, or a zero total. infinite values are a
/// domain error.
pub fn gini_index(sample: &WeightedSample) -> Result<f64, InequalityError> {
    sample.require_finite("Gini index")?;
    if sample.len() <= 1 || sample.constant_value().is_some() {
        return Ok(0.0);
    }
    let sorted = sample
        .iter()
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .collect_vec();
    let mut cumulative_weight = 0.0;
    let mut cumulative_value = 0.0;
    let mut numerator = 0.0;
    for (x, w) in sorted {
        numerator += w * (x * cumulative_weight - cumulative_value);
        cumulative_weight += w;
        cumulative_value += x * w;
    }
    let denominator = cumulative_value * cumulative_weight;
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok(numerator / denominator)
}
