use super::{Baseline, CandidateDistance, SitingError};
use std::collections::BTreeMap;

/// distances from every candidate facility site to the units it can reach, keyed by
/// candidate id. a unit missing from a candidate's list is unreachable from that
/// candidate and is ignored, never read as a distance of 0 or infinity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidateMatrix {
    candidates: BTreeMap<String, Vec<(String, f64)>>,
}

/// a candidate with its reachable units translated into baseline positions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedCandidate {
    pub id: String,
    pub entries: Vec<(usize, f64)>,
}

impl CandidateMatrix {
    pub fn new() -> CandidateMatrix {
        CandidateMatrix::default()
    }

    pub fn insert(&mut self, candidate_id: &str, unit_id: &str, distance: f64) {
        self.candidates
            .entry(candidate_id.to_string())
            .or_default()
            .push((unit_id.to_string(), distance));
    }

    /// number of candidate sites.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// candidate ids in ascending order, which is also the tie-breaking order.
    pub fn candidate_ids(&self) -> impl Iterator<Item = &String> {
        self.candidates.keys()
    }

    pub fn get(&self, candidate_id: &str) -> Option<&[(String, f64)]> {
        self.candidates.get(candidate_id).map(|v| v.as_slice())
    }

    /// maps each candidate's unit ids onto baseline positions, in candidate id order.
    /// entries for units outside the baseline or with NaN distance are dropped.
    /// positions of every candidate's reachable units within `baseline`. entries for
    /// units outside the baseline or with an undefined distance are ignored; a negative
    /// distance is an invalid record.
    pub(crate) fn resolve(
        &self,
        baseline: &Baseline,
    ) -> Result<Vec<ResolvedCandidate>, SitingError> {
        let mut unmatched: usize = 0;
        let mut resolved = Vec::with_capacity(self.candidates.len());
        for (id, rows) in self.candidates.iter() {
            let mut entries = Vec::with_capacity(rows.len());
            for (unit_id, distance) in rows.iter() {
                if *distance < 0.0 {
                    return Err(SitingError::InvalidRecord(format!(
                        "candidate '{id}' has negative distance {distance} to unit '{unit_id}'"
                    )));
                }
                match (baseline.index_of(unit_id), distance.is_nan()) {
                    (Some(idx), false) => entries.push((idx, *distance)),
                    _ => unmatched += 1,
                }
            }
            resolved.push(ResolvedCandidate {
                id: id.clone(),
                entries,
            });
        }
        if unmatched > 0 {
            log::debug!(
                "ignored {unmatched} candidate distances to units outside the baseline or with undefined distance"
            );
        }
        Ok(resolved)
    }
}

impl FromIterator<CandidateDistance> for CandidateMatrix {
    fn from_iter<T: IntoIterator<Item = CandidateDistance>>(iter: T) -> Self {
        let mut matrix = CandidateMatrix::new();
        for row in iter {
            matrix
                .candidates
                .entry(row.candidate_id)
                .or_default()
                .push((row.unit_id, row.distance));
        }
        matrix
    }
}
