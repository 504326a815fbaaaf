//! screening for implausibly long distances, which in practice come from failures in
//! the upstream routing step rather than from real residents.
use super::{InequalityError, WeightedSample};
use itertools::Itertools;

/// quantile of `values` with linear interpolation between the two closest ranks.
/// `None` for an empty slice or a `q` outside of [0, 1].
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let sorted = values
        .iter()
        .copied()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect_vec();
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// `Q3 + multiplier · IQR` over the sample rows. quantiles are taken per row, not per
/// resident.
pub fn upper_fence(sample: &WeightedSample, multiplier: f64) -> f64 {
    let q1 = quantile(sample.values(), 0.25).unwrap_or(f64::NAN);
    let q3 = quantile(sample.values(), 0.75).unwrap_or(f64::NAN);
    q3 + multiplier * (q3 - q1)
}

/// removes rows above the [`upper_fence`].
///
/// # Result
/// the screened sample and the number of rows removed
pub fn drop_upper_outliers(
    sample: &WeightedSample,
    multiplier: f64,
) -> Result<(WeightedSample, usize), InequalityError> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(InequalityError::Domain(format!(
            "outlier IQR multiplier must be a non-negative number, found {multiplier}"
        )));
    }
    let fence = upper_fence(sample, multiplier);
    let kept = WeightedSample::from_pairs(sample.iter().filter(|(x, _)| *x <= fence))?;
    let removed = sample.len() - kept.len();
    if removed > 0 {
        log::info!(
            "dropped {removed} of {} rows above outlier fence {fence:.4}",
            sample.len()
        );
    }
    Ok((kept, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&values, 1.5), None);
    }

    #[test]
    fn test_drop_upper_outliers() {
        let mut values: Vec<f64> = (1..=20).map(|x| x as f64 / 10.0).collect();
        values.push(250.0);
        let sample = WeightedSample::unweighted(values).unwrap();
        let (kept, removed) = drop_upper_outliers(&sample, 4.0).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(kept.len(), 20);
        assert_eq!(kept.max(), 2.0);
    }

    #[test]
    fn test_keeps_everything_without_outliers() {
        let sample = WeightedSample::unweighted(vec![1.0, 1.2, 1.4, 1.1]).unwrap();
        let (kept, removed) = drop_upper_outliers(&sample, 4.0).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(kept, sample);
    }

    #[test]
    fn test_invalid_multiplier() {
        let sample = WeightedSample::unweighted(vec![1.0, 2.0]).unwrap();
        assert!(drop_upper_outliers(&sample, -1.0).is_err());
    }
}
