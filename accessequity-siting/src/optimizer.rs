use super::{
    candidate_matrix::ResolvedCandidate, Baseline, CandidateMatrix, Objective, ObjectiveFunction,
    Selection, SelectionState, SitingError, SitingResult,
};
use accessequity_metrics::KolmPollak;
use itertools::Itertools;
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// parameters of a greedy siting run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SitingConfig {
    /// number of sites to add
    pub sites: usize,
    pub objective: Objective,
    /// elasticity used to calibrate kappa from the baseline
    pub beta: f64,
    /// fixed kappa, e.g. from a cross-region calibration. when absent, kappa is
    /// calibrated from the baseline distribution with `beta`.
    pub kappa: Option<f64>,
    /// evaluate the candidates of a round in parallel
    pub parallelize: bool,
}

impl Default for SitingConfig {
    fn default() -> Self {
        Self {
            sites: 5,
            objective: Objective::Mean,
            beta: -1.0,
            kappa: None,
            parallelize: true,
        }
    }
}

pub struct GreedyOptimizer {
    config: SitingConfig,
}

impl GreedyOptimizer {
    pub fn new(config: SitingConfig) -> Result<GreedyOptimizer, SitingError> {
        if !config.beta.is_finite() {
            return Err(SitingError::InvalidConfig(format!(
                "beta must be a finite number, found {}",
                config.beta
            )));
        }
        if let Some(kappa) = config.kappa {
            if !kappa.is_finite() {
                return Err(SitingError::InvalidConfig(format!(
                    "kappa must be a finite number, found {kappa}"
                )));
            }
        }
        Ok(GreedyOptimizer { config })
    }

    pub fn config(&self) -> &SitingConfig {
        &self.config
    }

    /// the Kolm-Pollak calibration for a run over `baseline`. a configured kappa wins
    /// over calibration. kappa is derived once, before any site is added, so that
    /// every round is scored on the same scale.
    pub fn kolm_pollak(&self, baseline: &Baseline) -> Result<KolmPollak, SitingError> {
        match self.config.kappa {
            Some(kappa) => Ok(KolmPollak::new(self.config.beta, kappa)),
            None => {
                let sample = baseline.sample()?;
                let kp = KolmPollak::calibrate(&sample, self.config.beta)?;
                Ok(kp)
            }
        }
    }

    /// runs greedy selection until the configured number of sites is chosen or no
    /// candidates remain.
    ///
    /// # Arguments
    /// * `baseline` - current nearest-facility distances per unit
    /// * `candidates` - distances from each candidate site to the units it reaches
    ///
    /// # Result
    /// the selected sites in order with the objective reached after each. any
    /// failure evaluating a candidate aborts the run.
    pub fn run(
        &self,
        baseline: &Baseline,
        candidates: &CandidateMatrix,
    ) -> Result<SitingResult, SitingError> {
        let (objective_fn, kolm_pollak) = match self.config.objective {
            Objective::KolmPollakEde => {
                let kp = self.kolm_pollak(baseline)?;
                (ObjectiveFunction::KolmPollakEde(kp), Some(kp))
            }
            Objective::Mean => {
                let kp = self
                    .kolm_pollak(baseline)
                    .map_err(|e| log::warn!("kappa not reported for this run: {e}"))
                    .ok();
                (ObjectiveFunction::Mean, kp)
            }
        };
        let resolved = candidates.resolve(baseline)?;
        let baseline_objective = objective_fn.evaluate(&baseline.sample()?)?;
        log::info!(
            "siting up to {} of {} candidates over {} units, baseline {} = {baseline_objective}",
            self.config.sites,
            resolved.len(),
            baseline.len(),
            self.config.objective
        );

        let rounds = self.config.sites.min(resolved.len());
        let mut bar = Bar::builder()
            .total(rounds)
            .desc("greedy siting")
            .build()
            .map_err(SitingError::InternalError)?;

        let mut state = SelectionState::initial(baseline, resolved.len());
        let mut selections: Vec<Selection> = Vec::with_capacity(rounds);
        while !state.is_done(self.config.sites) {
            let round = state.round() + 1;
            let scores = self.score_round(&state, &resolved, baseline, &objective_fn)?;
            let (choice, objective) = first_minimum(&scores).ok_or_else(|| {
                SitingError::InternalError(format!("round {round} produced no candidate scores"))
            })?;
            let candidate = &resolved[choice];
            log::info!(
                "round {round}: selected '{}' with {} {objective}",
                candidate.id,
                self.config.objective
            );
            selections.push(Selection {
                round,
                candidate_id: candidate.id.clone(),
                objective,
            });
            state = state.advance(choice, candidate)?;
            let _ = bar.update(1);
        }
        eprintln!();

        Ok(SitingResult {
            objective: self.config.objective,
            kolm_pollak,
            baseline_objective,
            selections,
        })
    }

    /// scores every remaining candidate of a round, in candidate id order.
    fn score_round(
        &self,
        state: &SelectionState,
        resolved: &[ResolvedCandidate],
        baseline: &Baseline,
        objective_fn: &ObjectiveFunction,
    ) -> Result<Vec<(usize, f64)>, SitingError> {
        let remaining = state.remaining().iter().copied().collect_vec();
        let score = |idx: usize| -> Result<(usize, f64), SitingError> {
            let minima = state.with_candidate(&resolved[idx]);
            let sample = baseline.sample_with(minima)?;
            let value = objective_fn.evaluate(&sample)?;
            if value.is_nan() {
                return Err(SitingError::InternalError(format!(
                    "objective for candidate '{}' is NaN",
                    resolved[idx].id
                )));
            }
            Ok((idx, value))
        };
        if self.config.parallelize {
            remaining.into_par_iter().map(score).collect()
        } else {
            remaining.into_iter().map(score).collect()
        }
    }
}

/// the lowest score, keeping the first one encountered on ties.
fn first_minimum(scores: &[(usize, f64)]) -> Option<(usize, f64)> {
    scores.iter().copied().fold(None, |best, (idx, value)| match best {
        Some((_, best_value)) if best_value <= value => best,
        _ => Some((idx, value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CandidateDistance, DistanceRecord};

    fn two_unit_baseline() -> Baseline {
        Baseline::new(&[
            DistanceRecord::new("A", 5.0, 10.0),
            DistanceRecord::new("B", 5.0, 10.0),
        ])
        .unwrap()
    }

    fn grid_fixture() -> (Baseline, CandidateMatrix) {
        let records = (0..30)
            .map(|i| {
                let id = format!("u{i:02}");
                let distance = 1.0 + (i % 7) as f64 * 1.3;
                let weight = 5.0 + (i % 4) as f64 * 20.0;
                DistanceRecord::new(&id, distance, weight)
            })
            .collect_vec();
        let baseline = Baseline::new(&records).unwrap();
        let mut candidates = CandidateMatrix::new();
        for c in 0..12 {
            for i in 0..30 {
                // each candidate reaches a band of units, closer at its center
                let offset = (i as i32 - (c * 5 % 30) as i32).abs();
                if offset <= 4 {
                    let distance = 0.2 + offset as f64 * 0.6;
                    candidates.insert(&format!("c{c:02}"), &format!("u{i:02}"), distance);
                }
            }
        }
        (baseline, candidates)
    }

    fn config(sites: usize, objective: Objective, parallelize: bool) -> SitingConfig {
        SitingConfig {
            sites,
            objective,
            parallelize,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_candidate_mean() {
        let baseline = two_unit_baseline();
        let candidates: CandidateMatrix = vec![
            CandidateDistance::new("C", "A", 1.0),
            CandidateDistance::new("C", "B", 9.0),
        ]
        .into_iter()
        .collect();
        let optimizer = GreedyOptimizer::new(config(1, Objective::Mean, false)).unwrap();
        let result = optimizer.run(&baseline, &candidates).unwrap();
        assert_eq!(result.selected_ids(), vec![String::from("C")]);
        assert_eq!(result.objective_values(), vec![3.0]);
        assert_eq!(result.baseline_objective, 5.0);
        assert_eq!(result.selections[0].round, 1);
    }

    #[test]
    fn test_beta_zero_scores_by_mean() {
        let baseline = two_unit_baseline();
        let candidates: CandidateMatrix = vec![
            CandidateDistance::new("C", "A", 1.0),
            CandidateDistance::new("C", "B", 9.0),
        ]
        .into_iter()
        .collect();
        let config = SitingConfig {
            sites: 1,
            objective: Objective::KolmPollakEde,
            beta: 0.0,
            parallelize: false,
            ..Default::default()
        };
        let result = GreedyOptimizer::new(config)
            .unwrap()
            .run(&baseline, &candidates)
            .unwrap();
        assert_eq!(result.kappa(), Some(0.0));
        assert_eq!(result.selected_ids(), vec![String::from("C")]);
        assert_eq!(result.objective_values(), vec![3.0]);
    }

    #[test]
    fn test_negative_candidate_distance_aborts() {
        let mut candidates = CandidateMatrix::new();
        candidates.insert("C", "A", -2.0);
        let optimizer = GreedyOptimizer::new(config(1, Objective::Mean, false)).unwrap();
        let result = optimizer.run(&two_unit_baseline(), &candidates);
        assert!(matches!(result, Err(SitingError::InvalidRecord(_))));
    }

    #[test]
    fn test_ties_keep_first_candidate_id() {
        let baseline = two_unit_baseline();
        let candidates: CandidateMatrix = vec![
            CandidateDistance::new("y", "B", 1.0),
            CandidateDistance::new("x", "A", 1.0),
        ]
        .into_iter()
        .collect();
        let optimizer = GreedyOptimizer::new(config(1, Objective::Mean, true)).unwrap();
        let result = optimizer.run(&baseline, &candidates).unwrap();
        assert_eq!(result.selected_ids(), vec![String::from("x")]);
    }

    #[test]
    fn test_stops_when_candidates_run_out() {
        let baseline = two_unit_baseline();
        let candidates: CandidateMatrix = vec![
            CandidateDistance::new("x", "A", 1.0),
            CandidateDistance::new("y", "B", 2.0),
        ]
        .into_iter()
        .collect();
        let optimizer =
            GreedyOptimizer::new(config(10, Objective::KolmPollakEde, false)).unwrap();
        let result = optimizer.run(&baseline, &candidates).unwrap();
        assert_eq!(result.selections.len(), 2);
        assert_eq!(result.selected_ids(), vec![String::from("x"), String::from("y")]);
    }

    #[test]
    fn test_no_candidates() {
        let optimizer = GreedyOptimizer::new(config(3, Objective::Mean, false)).unwrap();
        let result = optimizer
            .run(&two_unit_baseline(), &CandidateMatrix::new())
            .unwrap();
        assert!(result.selections.is_empty());
        assert_eq!(result.baseline_objective, 5.0);
    }

    #[test]
    fn test_zero_sites() {
        let (baseline, candidates) = grid_fixture();
        let optimizer = GreedyOptimizer::new(config(0, Objective::Mean, false)).unwrap();
        let result = optimizer.run(&baseline, &candidates).unwrap();
        assert!(result.selections.is_empty());
    }

    #[test]
    fn test_objective_is_non_increasing() {
        let (baseline, candidates) = grid_fixture();
        for objective in [Objective::Mean, Objective::KolmPollakEde] {
            let optimizer = GreedyOptimizer::new(config(8, objective, true)).unwrap();
            let result = optimizer.run(&baseline, &candidates).unwrap();
            assert_eq!(result.selections.len(), 8);
            let values = result.objective_values();
            assert!(values[0] <= result.baseline_objective + 1e-12);
            for pair in values.windows(2) {
                assert!(
                    pair[1] <= pair[0] + 1e-12,
                    "{objective} regressed from {} to {}",
                    pair[0],
                    pair[1]
                );
            }
            assert_eq!(result.selected_ids().iter().unique().count(), 8);
        }
    }

    #[test]
    fn test_deterministic_across_runs_and_parallelism() {
        let (baseline, candidates) = grid_fixture();
        let sequential = GreedyOptimizer::new(config(6, Objective::KolmPollakEde, false))
            .unwrap()
            .run(&baseline, &candidates)
            .unwrap();
        for _ in 0..3 {
            let parallel = GreedyOptimizer::new(config(6, Objective::KolmPollakEde, true))
                .unwrap()
                .run(&baseline, &candidates)
                .unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn test_incremental_minimum_matches_full_recompute() {
        let (baseline, candidates) = grid_fixture();
        let optimizer = GreedyOptimizer::new(config(5, Objective::KolmPollakEde, false)).unwrap();
        let result = optimizer.run(&baseline, &candidates).unwrap();
        let kp = result.kolm_pollak.unwrap();
        for selection in result.selections.iter() {
            let chosen = result.selections[..selection.round]
                .iter()
                .map(|s| s.candidate_id.clone())
                .collect_vec();
            let records =
                crate::siting_ops::apply_selection(&baseline, &candidates, &chosen).unwrap();
            let distances = records.iter().map(|r| r.distance).collect_vec();
            let sample = baseline.sample_with(distances).unwrap();
            assert_eq!(kp.ede(&sample).unwrap(), selection.objective);
        }
    }

    #[test]
    fn test_kappa_fixed_from_baseline() {
        let (baseline, candidates) = grid_fixture();
        let optimizer = GreedyOptimizer::new(config(3, Objective::KolmPollakEde, false)).unwrap();
        let expected = KolmPollak::calibrate(&baseline.sample().unwrap(), -1.0).unwrap();
        let result = optimizer.run(&baseline, &candidates).unwrap();
        assert_eq!(result.kolm_pollak, Some(expected));
    }

    #[test]
    fn test_configured_kappa_is_used() {
        let (baseline, candidates) = grid_fixture();
        let config = SitingConfig {
            sites: 2,
            objective: Objective::KolmPollakEde,
            kappa: Some(-0.25),
            parallelize: false,
            ..Default::default()
        };
        let result = GreedyOptimizer::new(config)
            .unwrap()
            .run(&baseline, &candidates)
            .unwrap();
        assert_eq!(result.kappa(), Some(-0.25));
    }

    #[test]
    fn test_invalid_config() {
        let config = SitingConfig {
            beta: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            GreedyOptimizer::new(config),
            Err(SitingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_first_minimum() {
        assert_eq!(first_minimum(&[]), None);
        assert_eq!(
            first_minimum(&[(3, 2.0), (1, 1.0), (0, 1.0), (2, 4.0)]),
            Some((1, 1.0))
        );
    }
}
