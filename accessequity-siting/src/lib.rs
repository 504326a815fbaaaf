//! greedy selection of new facility sites that most improve an access objective.
//!
//! the optimizer holds a fixed baseline of per-unit distances to the nearest existing
//! facility, and a matrix of distances from each candidate site to the units it can
//! reach. each round adds the candidate whose addition yields the lowest objective over
//! the population-weighted nearest-facility distances.
mod baseline;
mod candidate_matrix;
mod distance_record;
mod objective;
mod optimizer;
mod selection_state;
mod siting_error;
pub mod siting_ops;
mod siting_result;

pub use baseline::Baseline;
pub use candidate_matrix::CandidateMatrix;
pub use distance_record::{CandidateDistance, DistanceRecord};
pub use objective::{Objective, ObjectiveFunction};
pub use optimizer::{GreedyOptimizer, SitingConfig};
pub use selection_state::SelectionState;
pub use siting_error::SitingError;
pub use siting_result::{Selection, SitingResult};
