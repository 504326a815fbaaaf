use super::InequalityError;
use serde::{Deserialize, Serialize};

/// a population distributed over a scalar quantity, such as the distance each
/// resident travels to the nearest supermarket. each row pairs a value with the
/// population mass observed at that value, which is equivalent to repeating the
/// value once per resident.
///
/// rows with a NaN value or a weight that is not a finite positive number are dropped
/// when the sample is built. a sample always holds at least one row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedSample {
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl WeightedSample {
    /// builds a sample from parallel value and weight vectors.
    ///
    /// # Arguments
    /// * `values` - observed quantity per row
    /// * `weights` - population mass per row
    ///
    /// # Result
    /// the filtered sample, or an error if the vectors differ in length or no valid
    /// row remains.
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<WeightedSample, InequalityError> {
        if values.len() != weights.len() {
            return Err(InequalityError::MismatchedLengths {
                values: values.len(),
                weights: weights.len(),
            });
        }
        Self::from_pairs(values.into_iter().zip(weights))
    }

    /// builds a sample where every row has weight 1.
    pub fn unweighted(values: Vec<f64>) -> Result<WeightedSample, InequalityError> {
        let weights = vec![1.0; values.len()];
        Self::new(values, weights)
    }

    /// builds a sample from (value, weight) pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<WeightedSample, InequalityError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut dropped: usize = 0;
        let (values, weights): (Vec<f64>, Vec<f64>) = pairs
            .into_iter()
            .filter(|(value, weight)| {
                let keep = is_valid_row(*value, *weight);
                if !keep {
                    dropped += 1;
                }
                keep
            })
            .unzip();
        if dropped > 0 {
            log::debug!("dropped {dropped} rows with a NaN value or non-positive weight");
        }
        if values.is_empty() {
            return Err(InequalityError::InsufficientData);
        }
        Ok(WeightedSample { values, weights })
    }

    /// the union of several samples, used to build a single reference distribution
    /// when comparing regions or years on one calibrated scale.
    pub fn concat<'a, I>(samples: I) -> Result<WeightedSample, InequalityError>
    where
        I: IntoIterator<Item = &'a WeightedSample>,
    {
        Self::from_pairs(samples.into_iter().flat_map(|s| s.iter()))
    }

    /// applies `op` to every value, keeping weights. rows whose new value is NaN
    /// are dropped like at construction.
    pub fn map_values<F>(&self, op: F) -> Result<WeightedSample, InequalityError>
    where
        F: Fn(f64) -> f64,
    {
        Self::from_pairs(self.iter().map(|(x, w)| (op(x), w)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied().zip(self.weights.iter().copied())
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// population-weighted mean of the sample values.
    pub fn mean(&self) -> f64 {
        let weighted_sum: f64 = self.iter().map(|(x, w)| x * w).sum();
        weighted_sum / self.total_weight()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// the shared value when every row holds the same value.
    pub fn constant_value(&self) -> Option<f64> {
        let first = *self.values.first()?;
        if self.values.iter().all(|x| *x == first) {
            Some(first)
        } else {
            None
        }
    }

    /// tests that every value is a finite number, reporting the first offender.
    pub(crate) fn require_finite(&self, measure: &str) -> Result<(), InequalityError> {
        match self.values.iter().find(|x| !x.is_finite()) {
            None => Ok(()),
            Some(x) => Err(InequalityError::Domain(format!(
                "{measure} requires finite values, found {x}"
            ))),
        }
    }
}

fn is_valid_row(value: f64, weight: f64) -> bool {
    !value.is_nan() && weight.is_finite() && weight > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_invalid_rows() {
        let sample = WeightedSample::new(
            vec![1.0, f64::NAN, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 0.0, -1.0, f64::NAN],
        )
        .expect("one row is valid");
        assert_eq!(sample.values(), &[1.0]);
        assert_eq!(sample.weights(), &[2.0]);
    }

    #[test]
    fn test_no_valid_rows() {
        let result = WeightedSample::new(vec![f64::NAN, 2.0], vec![1.0, 0.0]);
        assert_eq!(result, Err(InequalityError::InsufficientData));
        let empty = WeightedSample::unweighted(vec![]);
        assert_eq!(empty, Err(InequalityError::InsufficientData));
    }

    #[test]
    fn test_mismatched_lengths() {
        let result = WeightedSample::new(vec![1.0, 2.0], vec![1.0]);
        assert_eq!(
            result,
            Err(InequalityError::MismatchedLengths {
                values: 2,
                weights: 1
            })
        );
    }

    #[test]
    fn test_weighted_mean_matches_expansion() {
        let weighted = WeightedSample::new(vec![2.0, 4.0], vec![3.0, 1.0]).unwrap();
        let expanded = WeightedSample::unweighted(vec![2.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(weighted.mean(), 2.5);
        assert_eq!(weighted.mean(), expanded.mean());
        assert_eq!(weighted.total_weight(), 4.0);
    }

    #[test]
    fn test_concat() {
        let a = WeightedSample::new(vec![1.0, 2.0], vec![1.0, 1.0]).unwrap();
        let b = WeightedSample::new(vec![3.0], vec![2.0]).unwrap();
        let union = WeightedSample::concat([&a, &b]).unwrap();
        assert_eq!(union.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(union.weights(), &[1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_constant_value() {
        let constant = WeightedSample::new(vec![1.5, 1.5], vec![1.0, 9.0]).unwrap();
        assert_eq!(constant.constant_value(), Some(1.5));
        let varied = WeightedSample::unweighted(vec![1.5, 1.6]).unwrap();
        assert_eq!(varied.constant_value(), None);
    }

    #[test]
    fn test_map_values_drops_nan() {
        let sample = WeightedSample::unweighted(vec![-1.0, 4.0]).unwrap();
        let rooted = sample.map_values(f64::sqrt).unwrap();
        assert_eq!(rooted.values(), &[2.0]);
    }
}
