use super::{candidate_matrix::ResolvedCandidate, Baseline, SitingError};
use std::collections::BTreeSet;

/// progress of a greedy siting run.
///
/// every candidate is either in the append-only `chosen` sequence or in the
/// `remaining` set, never both. `minima` is the element-wise minimum of the baseline
/// distances and the distances of every chosen site, aligned to the baseline units.
/// a state is replaced, never modified, when a candidate is chosen.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionState {
    chosen: Vec<usize>,
    remaining: BTreeSet<usize>,
    minima: Vec<f64>,
}

impl SelectionState {
    /// no candidates chosen, nearest distances equal to the baseline.
    pub(crate) fn initial(baseline: &Baseline, n_candidates: usize) -> SelectionState {
        SelectionState {
            chosen: vec![],
            remaining: (0..n_candidates).collect(),
            minima: baseline.distances().to_vec(),
        }
    }

    /// number of completed rounds.
    pub fn round(&self) -> usize {
        self.chosen.len()
    }

    /// true once `sites` candidates are chosen or none remain.
    pub fn is_done(&self, sites: usize) -> bool {
        self.chosen.len() >= sites || self.remaining.is_empty()
    }

    /// chosen candidate positions in selection order.
    pub fn chosen(&self) -> &[usize] {
        &self.chosen
    }

    /// unchosen candidate positions in candidate id order.
    pub fn remaining(&self) -> &BTreeSet<usize> {
        &self.remaining
    }

    pub fn minima(&self) -> &[f64] {
        &self.minima
    }

    /// nearest distances if `candidate` were added to the chosen sites.
    pub(crate) fn with_candidate(&self, candidate: &ResolvedCandidate) -> Vec<f64> {
        let mut minima = self.minima.clone();
        for (idx, distance) in candidate.entries.iter() {
            minima[*idx] = minima[*idx].min(*distance);
        }
        minima
    }

    /// moves the candidate at position `choice` from remaining to chosen.
    pub(crate) fn advance(
        self,
        choice: usize,
        candidate: &ResolvedCandidate,
    ) -> Result<SelectionState, SitingError> {
        if !self.remaining.contains(&choice) {
            return Err(SitingError::InternalError(format!(
                "candidate '{}' at position {choice} is not available for selection",
                candidate.id
            )));
        }
        let minima = self.with_candidate(candidate);
        let SelectionState {
            mut chosen,
            mut remaining,
            ..
        } = self;
        remaining.remove(&choice);
        chosen.push(choice);
        Ok(SelectionState {
            chosen,
            remaining,
            minima,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DistanceRecord;

    fn baseline() -> Baseline {
        Baseline::new(&[
            DistanceRecord::new("a", 5.0, 10.0),
            DistanceRecord::new("b", 5.0, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_advance() {
        let state = SelectionState::initial(&baseline(), 2);
        assert_eq!(state.round(), 0);
        assert!(!state.is_done(1));
        let candidate = ResolvedCandidate {
            id: String::from("c"),
            entries: vec![(0, 1.0), (1, 9.0)],
        };
        assert_eq!(state.with_candidate(&candidate), vec![1.0, 5.0]);
        let next = state.advance(1, &candidate).unwrap();
        assert_eq!(next.chosen(), &[1]);
        assert_eq!(next.remaining().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(next.minima(), &[1.0, 5.0]);
        assert!(next.is_done(1));
        assert!(!next.is_done(2));
    }

    #[test]
    fn test_advance_rejects_chosen_candidate() {
        let candidate = ResolvedCandidate {
            id: String::from("c"),
            entries: vec![],
        };
        let state = SelectionState::initial(&baseline(), 1)
            .advance(0, &candidate)
            .unwrap();
        assert!(state.is_done(5));
        assert!(state.advance(0, &candidate).is_err());
    }
}
