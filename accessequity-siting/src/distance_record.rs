use serde::{Deserialize, Serialize};

/// distance from a spatial unit (e.g. a census block) to its nearest existing facility,
/// with the population living in the unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub unit_id: String,
    pub distance: f64,
    pub weight: f64,
}

impl DistanceRecord {
    pub fn new(unit_id: &str, distance: f64, weight: f64) -> DistanceRecord {
        DistanceRecord {
            unit_id: unit_id.to_string(),
            distance,
            weight,
        }
    }
}

/// distance from a candidate facility site to one unit it can reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateDistance {
    pub candidate_id: String,
    pub unit_id: String,
    pub distance: f64,
}

impl CandidateDistance {
    pub fn new(candidate_id: &str, unit_id: &str, distance: f64) -> CandidateDistance {
        CandidateDistance {
            candidate_id: candidate_id.to_string(),
            unit_id: unit_id.to_string(),
            distance,
        }
    }
}
