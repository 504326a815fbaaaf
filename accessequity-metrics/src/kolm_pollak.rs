//! Kolm-Pollak equally-distributed equivalent (EDE) and inequality index.
//!
//! the EDE is the value that, if experienced by every resident, would be judged as
//! good as the observed distribution under aversion parameter kappa:
//!
//! ```text
//! EDE = (1 / κ) · ln( Σ wᵢ·exp(κ·xᵢ) / Σ wᵢ )
//! ```
//!
//! a negative kappa places the EDE at or below the weighted mean, a positive kappa at
//! or above it, and kappa = 0 is the inequality-neutral limit where the EDE is the mean.
//! kappa carries the sign of the elasticity `beta` it was calibrated from.
//!
//! kappa must be calibrated once, on a reference distribution that covers every group
//! being compared, and then held fixed. EDEs computed under different kappas are not
//! on the same scale.
use super::{InequalityError, WeightedSample};
use serde::{Deserialize, Serialize};

/// a calibrated Kolm-Pollak aversion parameter along with the elasticity it was
/// derived from, reported next to every EDE so that results can be audited for
/// comparability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KolmPollak {
    pub beta: f64,
    pub kappa: f64,
}

impl KolmPollak {
    /// uses a kappa computed elsewhere, for instance from an earlier study run.
    pub fn new(beta: f64, kappa: f64) -> KolmPollak {
        KolmPollak { beta, kappa }
    }

    /// calibrates kappa against a reference distribution. `beta = 0` is the
    /// inequality-neutral limit and yields `kappa = 0`, whose EDE is the weighted mean.
    pub fn calibrate(reference: &WeightedSample, beta: f64) -> Result<KolmPollak, InequalityError> {
        if beta == 0.0 {
            return Ok(KolmPollak {
                beta: 0.0,
                kappa: 0.0,
            });
        }
        let kappa = calc_kappa(reference, beta)?;
        Ok(KolmPollak { beta, kappa })
    }

    pub fn ede(&self, sample: &WeightedSample) -> Result<f64, InequalityError> {
        ede_with_kappa(sample, self.kappa)
    }

    pub fn index(&self, sample: &WeightedSample) -> Result<f64, InequalityError> {
        let ede = ede_with_kappa(sample, self.kappa)?;
        Ok(index_from_ede(sample, ede))
    }
}

/// fits kappa to a reference sample for a chosen elasticity `beta`.
///
/// kappa is the least-squares solution of `beta ≈ κ·xᵢ` over the population, which
/// has the closed form `κ = beta · Σ wᵢxᵢ / Σ wᵢxᵢ²`.
///
/// # Arguments
/// * `sample` - reference distribution, e.g. every region in a cross-region study
/// * `beta` - elasticity. negative values are used for distances.
///
/// # Result
/// kappa, or a calibration error when beta is 0 (use the weighted mean instead) or the
/// reference sample has no spread away from zero.
pub fn calc_kappa(sample: &WeightedSample, beta: f64) -> Result<f64, InequalityError> {
    if beta == 0.0 {
        return Err(InequalityError::Calibration(String::from(
            "beta = 0 has no kappa, the inequality-neutral EDE is the weighted mean",
        )));
    }
    if !beta.is_finite() {
        return Err(InequalityError::Calibration(format!(
            "beta must be a finite number, found {beta}"
        )));
    }
    sample.require_finite("kappa calibration")?;
    let (first_moment, second_moment) = sample
        .iter()
        .fold((0.0, 0.0), |(sx, sxx), (x, w)| (sx + w * x, sxx + w * x * x));
    if second_moment == 0.0 {
        return Err(InequalityError::Calibration(String::from(
            "reference sample has every value at 0, kappa is undefined",
        )));
    }
    let kappa = beta * first_moment / second_moment;
    if !kappa.is_finite() {
        return Err(InequalityError::Calibration(format!(
            "kappa did not resolve to a finite number (beta={beta}, Σwx={first_moment}, Σwx²={second_moment})"
        )));
    }
    log::debug!("calibrated kappa={kappa} from beta={beta} over {} rows", sample.len());
    Ok(kappa)
}

/// Kolm-Pollak EDE of `sample`.
///
/// when `kappa` is not provided it is calibrated from `sample` itself with `beta`; a
/// `beta` of 0 then returns the weighted mean directly.
pub fn kolm_pollak_ede(
    sample: &WeightedSample,
    beta: f64,
    kappa: Option<f64>,
) -> Result<f64, InequalityError> {
    let kappa = match kappa {
        Some(k) => k,
        None if beta == 0.0 => return Ok(sample.mean()),
        None => calc_kappa(sample, beta)?,
    };
    ede_with_kappa(sample, kappa)
}

/// Kolm-Pollak index, the distance between the weighted mean and the EDE. 0 for a
/// perfectly equal sample.
pub fn kolm_pollak_index(
    sample: &WeightedSample,
    beta: f64,
    kappa: Option<f64>,
) -> Result<f64, InequalityError> {
    let ede = kolm_pollak_ede(sample, beta, kappa)?;
    Ok(index_from_ede(sample, ede))
}

fn index_from_ede(sample: &WeightedSample, ede: f64) -> f64 {
    if sample.constant_value().is_some() {
        return 0.0;
    }
    sample.mean() - ede
}

fn ede_with_kappa(sample: &WeightedSample, kappa: f64) -> Result<f64, InequalityError> {
    if !kappa.is_finite() {
        return Err(InequalityError::Calibration(format!(
            "kappa must be a finite number, found {kappa}"
        )));
    }
    sample.require_finite("Kolm-Pollak EDE")?;
    if let Some(value) = sample.constant_value() {
        return Ok(value);
    }
    if kappa == 0.0 {
        return Ok(sample.mean());
    }
    // shift by the largest exponent so every term is exp(≤ 0), then carry the
    // remainder through exp_m1/ln_1p so small kappas keep their precision.
    let shift = sample
        .values()
        .iter()
        .map(|x| kappa * x)
        .fold(f64::NEG_INFINITY, f64::max);
    if !shift.is_finite() {
        // κ·x overflows: the EDE has reached its limit at the min (κ < 0) or max (κ > 0)
        return Ok(if kappa < 0.0 { sample.min() } else { sample.max() });
    }
    let remainder = sample
        .iter()
        .map(|(x, w)| w * (kappa * x - shift).exp_m1())
        .sum::<f64>()
        / sample.total_weight();
    let ede = (shift + remainder.ln_1p()) / kappa;
    if !ede.is_finite() {
        return Err(InequalityError::Domain(format!(
            "Kolm-Pollak EDE did not resolve to a finite number with kappa={kappa}"
        )));
    }
    Ok(ede)
}
