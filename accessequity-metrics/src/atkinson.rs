//! Atkinson equally-distributed equivalent and index.
//!
//! the standard measure is defined for "good" quantities with strictly positive values,
//! such as income or the inverse of a distance. callers holding distances either invert
//! them first or use the adjusted variant, which works on the raw distances.
//!
//! adjusted variant sign convention: the power mean is taken with exponent `1 + |ε|`,
//! so the adjusted EDE is never below the weighted mean, and a smaller adjusted EDE
//! always means a shorter and more equal distribution. the adjusted index is
//! `EDE / mean − 1`, which is 0 for a perfectly equal sample and grows with inequality.
use super::{InequalityError, WeightedSample};

/// Atkinson EDE, the power mean of order `1 − ε`, or the geometric mean when `ε = 1`.
///
/// # Arguments
/// * `sample` - strictly positive values
/// * `epsilon` - inequality aversion
///
/// # Result
/// the EDE, or a domain error if any value is not strictly positive
pub fn atkinson_ede(sample: &WeightedSample, epsilon: f64) -> Result<f64, InequalityError> {
    require_finite_epsilon(epsilon)?;
    sample.require_finite("Atkinson EDE")?;
    if let Some(x) = sample.values().iter().find(|x| **x <= 0.0) {
        return Err(InequalityError::Domain(format!(
            "Atkinson measures require strictly positive values, found {x}; invert the quantity or use the adjusted variant"
        )));
    }
    if let Some(value) = sample.constant_value() {
        return Ok(value);
    }
    if epsilon == 1.0 {
        let mean_log = sample.iter().map(|(x, w)| w * x.ln()).sum::<f64>() / sample.total_weight();
        return Ok(mean_log.exp());
    }
    Ok(power_mean(sample, 1.0 - epsilon))
}

/// Atkinson index, `1 − EDE / mean`.
pub fn atkinson_index(sample: &WeightedSample, epsilon: f64) -> Result<f64, InequalityError> {
    let ede = atkinson_ede(sample, epsilon)?;
    if sample.constant_value().is_some() {
        return Ok(0.0);
    }
    Ok(1.0 - ede / sample.mean())
}

/// adjusted Atkinson EDE for quantities where larger is worse, such as distance.
///
/// # Arguments
/// * `sample` - non-negative values
/// * `epsilon` - inequality aversion, only its magnitude is used
pub fn atkinson_adjusted_ede(sample: &WeightedSample, epsilon: f64) -> Result<f64, InequalityError> {
    require_finite_epsilon(epsilon)?;
    sample.require_finite("adjusted Atkinson EDE")?;
    if let Some(x) = sample.values().iter().find(|x| **x < 0.0) {
        return Err(InequalityError::Domain(format!(
            "adjusted Atkinson measures require non-negative values, found {x}"
        )));
    }
    if let Some(value) = sample.constant_value() {
        return Ok(value);
    }
    Ok(power_mean(sample, 1.0 + epsilon.abs()))
}

/// adjusted Atkinson index, `EDE / mean − 1`. 0 when the mean is 0.
pub fn atkinson_adjusted_index(
    sample: &WeightedSample,
    epsilon: f64,
) -> Result<f64, InequalityError> {
    let ede = atkinson_adjusted_ede(sample, epsilon)?;
    let mean = sample.mean();
    if mean == 0.0 || sample.constant_value().is_some() {
        return Ok(0.0);
    }
    Ok(ede / mean - 1.0)
}

fn require_finite_epsilon(epsilon: f64) -> Result<(), InequalityError> {
    if epsilon.is_finite() {
        Ok(())
    } else {
        Err(InequalityError::Domain(format!(
            "epsilon must be a finite number, found {epsilon}"
        )))
    }
}

/// weighted power mean of order `exponent` (non-zero). values are scaled by the max
/// (positive order) or min (negative order) so that no term exceeds 1.
fn power_mean(sample: &WeightedSample, exponent: f64) -> f64 {
    let scale = if exponent > 0.0 { sample.max() } else { sample.min() };
    if scale == 0.0 {
        return 0.0;
    }
    let moment = sample
        .iter()
        .map(|(x, w)| w * (x / scale).powf(exponent))
        .sum::<f64>()
        / sample.total_weight();
    scale * moment.powf(1.0 / exponent)
}
