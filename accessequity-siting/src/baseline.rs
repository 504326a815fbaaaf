use super::{DistanceRecord, SitingError};
use accessequity_metrics::{InequalityError, WeightedSample};
use std::collections::HashMap;

/// the pre-optimization state: each populated unit with its distance to the nearest
/// existing facility. this is the floor every candidate addition is compared against.
///
/// units without a positive population or with an undefined (NaN) distance are left
/// out, so the set of units scored is the same in every round.
#[derive(Clone, Debug)]
pub struct Baseline {
    unit_ids: Vec<String>,
    distances: Vec<f64>,
    weights: Vec<f64>,
    lookup: HashMap<String, usize>,
}

impl Baseline {
    pub fn new(records: &[DistanceRecord]) -> Result<Baseline, SitingError> {
        let mut unit_ids = Vec::with_capacity(records.len());
        let mut distances = Vec::with_capacity(records.len());
        let mut weights = Vec::with_capacity(records.len());
        let mut lookup = HashMap::with_capacity(records.len());
        let mut excluded: usize = 0;
        for record in records.iter() {
            if record.distance.is_nan() || !(record.weight.is_finite() && record.weight > 0.0) {
                excluded += 1;
                continue;
            }
            if record.distance < 0.0 {
                return Err(SitingError::InvalidRecord(format!(
                    "unit '{}' has negative distance {}",
                    record.unit_id, record.distance
                )));
            }
            if lookup.contains_key(&record.unit_id) {
                return Err(SitingError::DuplicateUnit(record.unit_id.clone()));
            }
            lookup.insert(record.unit_id.clone(), unit_ids.len());
            unit_ids.push(record.unit_id.clone());
            distances.push(record.distance);
            weights.push(record.weight);
        }
        if excluded > 0 {
            log::warn!(
                "excluded {excluded} of {} baseline units with no population or undefined distance",
                records.len()
            );
        }
        if unit_ids.is_empty() {
            return Err(SitingError::Metric(InequalityError::InsufficientData));
        }
        Ok(Baseline {
            unit_ids,
            distances,
            weights,
            lookup,
        })
    }

    pub fn len(&self) -> usize {
        self.unit_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_ids.is_empty()
    }

    pub fn unit_ids(&self) -> &[String] {
        &self.unit_ids
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn index_of(&self, unit_id: &str) -> Option<usize> {
        self.lookup.get(unit_id).copied()
    }

    /// the baseline distance distribution.
    pub fn sample(&self) -> Result<WeightedSample, SitingError> {
        self.sample_with(self.distances.clone())
    }

    /// a distribution over the baseline units with replacement distances, aligned to
    /// [`Baseline::unit_ids`].
    pub fn sample_with(&self, distances: Vec<f64>) -> Result<WeightedSample, SitingError> {
        if distances.len() != self.len() {
            return Err(SitingError::InternalError(format!(
                "expected {} distances aligned to baseline units, found {}",
                self.len(),
                distances.len()
            )));
        }
        let sample = WeightedSample::new(distances, self.weights.clone())?;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excludes_unpopulated_and_undefined_units() {
        let records = vec![
            DistanceRecord::new("a", 1.0, 10.0),
            DistanceRecord::new("b", 2.0, 0.0),
            DistanceRecord::new("c", f64::NAN, 4.0),
            DistanceRecord::new("d", 3.0, f64::NAN),
            DistanceRecord::new("e", 4.0, 2.0),
        ];
        let baseline = Baseline::new(&records).unwrap();
        assert_eq!(baseline.unit_ids(), &[String::from("a"), String::from("e")]);
        assert_eq!(baseline.index_of("e"), Some(1));
        assert_eq!(baseline.index_of("b"), None);
        let sample = baseline.sample().unwrap();
        assert_eq!(sample.mean(), (10.0 + 8.0) / 12.0);
    }

    #[test]
    fn test_duplicate_unit() {
        let records = vec![
            DistanceRecord::new("a", 1.0, 10.0),
            DistanceRecord::new("a", 2.0, 10.0),
        ];
        let result = Baseline::new(&records);
        assert_eq!(
            result.err(),
            Some(SitingError::DuplicateUnit(String::from("a")))
        );
    }

    #[test]
    fn test_negative_distance() {
        let records = vec![DistanceRecord::new("a", -1.0, 10.0)];
        assert!(matches!(
            Baseline::new(&records),
            Err(SitingError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_unpopulated_negative_distance_is_excluded() {
        let records = vec![
            DistanceRecord::new("a", 1.0, 10.0),
            DistanceRecord::new("b", -4.0, 0.0),
        ];
        let baseline = Baseline::new(&records).unwrap();
        assert_eq!(baseline.len(), 1);
        assert_eq!(baseline.index_of("b"), None);
    }

    #[test]
    fn test_empty_baseline() {
        let records = vec![DistanceRecord::new("a", 1.0, 0.0)];
        assert_eq!(
            Baseline::new(&records).err(),
            Some(SitingError::Metric(InequalityError::InsufficientData))
        );
    }
}
