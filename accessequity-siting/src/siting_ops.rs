use super::{Baseline, CandidateMatrix, DistanceRecord, SitingError};

/// nearest-facility distance per baseline unit after adding the candidate sites in
/// `candidate_ids` to the existing facilities.
///
/// # Arguments
/// * `baseline` - current nearest-facility distances
/// * `candidates` - candidate distance matrix
/// * `candidate_ids` - sites to add, typically the output of a siting run
///
/// # Result
/// one record per baseline unit, in baseline order, or an error naming the first id
/// missing from the matrix or the first negative candidate distance.
pub fn apply_selection(
    baseline: &Baseline,
    candidates: &CandidateMatrix,
    candidate_ids: &[String],
) -> Result<Vec<DistanceRecord>, SitingError> {
    let mut distances = baseline.distances().to_vec();
    for candidate_id in candidate_ids.iter() {
        let rows = candidates
            .get(candidate_id)
            .ok_or_else(|| SitingError::UnknownCandidate(candidate_id.clone()))?;
        for (unit_id, distance) in rows.iter() {
            if *distance < 0.0 {
                return Err(SitingError::InvalidRecord(format!(
                    "candidate '{candidate_id}' has negative distance {distance} to unit '{unit_id}'"
                )));
            }
            if distance.is_nan() {
                continue;
            }
            if let Some(idx) = baseline.index_of(unit_id) {
                distances[idx] = distances[idx].min(*distance);
            }
        }
    }
    let records = baseline
        .unit_ids()
        .iter()
        .zip(distances)
        .zip(baseline.weights())
        .map(|((unit_id, distance), weight)| DistanceRecord {
            unit_id: unit_id.clone(),
            distance,
            weight: *weight,
        })
        .collect();
    Ok(records)
}
