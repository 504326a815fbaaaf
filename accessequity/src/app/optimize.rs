//! greedy siting over one region, followed by a subgroup evaluation of the sites it
//! selects.
use super::{
    evaluate::{self, TOTAL_POPULATION},
    table_io::{self, UnitTable},
    AppError, EquityConfig, MeasureRow,
};
use accessequity_siting::{
    siting_ops, Baseline, CandidateMatrix, GreedyOptimizer, Objective, SitingResult,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

pub const SELECTIONS_FILENAME: &str = "selections.csv";
pub const SUBGROUP_EQUITY_FILENAME: &str = "subgroup_equity.csv";
pub const RESULT_FILENAME: &str = "siting_result.json";
pub const BEFORE_LABEL: &str = "baseline";
pub const AFTER_LABEL: &str = "selected";

/// a row of the selections table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionRow {
    pub round: usize,
    pub candidate_id: String,
    pub objective: Objective,
    pub value: f64,
    pub kappa: Option<f64>,
}

/// runs the optimizer on a region file and candidate file, writing the selections,
/// the subgroup measures and the full result as JSON to `output_directory`.
pub fn run(
    units_file: &Path,
    candidates_file: &Path,
    config: &EquityConfig,
    output_directory: &Path,
) -> Result<SitingResult, AppError> {
    let table = table_io::read_unit_table(units_file, config)?;
    let candidates = table_io::read_candidates(candidates_file, config)?;
    let (result, measures) = optimize_table(&table, &candidates, config)?;

    std::fs::create_dir_all(output_directory)?;
    table_io::write_csv(
        &output_directory.join(SELECTIONS_FILENAME),
        &selection_rows(&result),
    )?;
    table_io::write_csv(&output_directory.join(SUBGROUP_EQUITY_FILENAME), &measures)?;

    let result_file = output_directory.join(RESULT_FILENAME);
    let json = serde_json::to_string_pretty(&result).map_err(|e| AppError::WriteError {
        filepath: result_file.to_string_lossy().to_string(),
        error: e.to_string(),
    })?;
    std::fs::write(&result_file, json)?;
    Ok(result)
}

/// selects sites for `table` and measures every subgroup before and after the
/// selected sites are built.
pub fn optimize_table(
    table: &UnitTable,
    candidates: &CandidateMatrix,
    config: &EquityConfig,
) -> Result<(SitingResult, Vec<MeasureRow>), AppError> {
    let baseline = Baseline::new(&table.records)?;
    let optimizer = GreedyOptimizer::new(config.siting_config())?;
    let result = optimizer.run(&baseline, candidates)?;
    log::info!(
        "selected [{}] with {} {} -> {}",
        result.selected_ids().join(", "),
        result.objective,
        result.baseline_objective,
        result
            .selections
            .last()
            .map(|s| s.objective)
            .unwrap_or(result.baseline_objective)
    );

    let kolm_pollak = match result.kolm_pollak {
        Some(kp) => kp,
        None => {
            log::warn!("no Kolm-Pollak calibration available, skipping subgroup measures");
            return Ok((result, vec![]));
        }
    };
    let final_records = siting_ops::apply_selection(&baseline, candidates, &result.selected_ids())?;
    let final_distances: HashMap<&str, f64> = final_records
        .iter()
        .map(|r| (r.unit_id.as_str(), r.distance))
        .collect();
    let after = UnitTable {
        records: table
            .records
            .iter()
            .map(|r| {
                let mut record = r.clone();
                if let Some(distance) = final_distances.get(r.unit_id.as_str()) {
                    record.distance = *distance;
                }
                record
            })
            .collect_vec(),
        ..table.clone()
    };

    let mut measures = vec![];
    for (label, scenario) in [(BEFORE_LABEL, table), (AFTER_LABEL, &after)] {
        let sample = evaluate::population_sample(scenario)?;
        measures.push(MeasureRow::new(
            label,
            TOTAL_POPULATION,
            "kolm_pollak_ede",
            Some(kolm_pollak.ede(&sample)?),
        ));
        measures.push(MeasureRow::new(
            label,
            TOTAL_POPULATION,
            "mean",
            Some(sample.mean()),
        ));
        measures.extend(evaluate::subgroup_rows(label, scenario, &kolm_pollak)?);
    }
    Ok((result, measures))
}

pub fn selection_rows(result: &SitingResult) -> Vec<SelectionRow> {
    result
        .selections
        .iter()
        .map(|s| SelectionRow {
            round: s.round,
            candidate_id: s.candidate_id.clone(),
            objective: result.objective,
            value: s.objective,
            kappa: result.kappa(),
        })
        .collect()
}
