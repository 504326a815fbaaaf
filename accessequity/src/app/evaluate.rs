//! equity measures for one or more regions on a shared Kolm-Pollak scale.
use super::{
    table_io::{self, UnitTable},
    AppError, EquityConfig, MeasureRow,
};
use accessequity_metrics::{
    outlier, EquityReport, InequalityError, KolmPollak, WeightedSample,
};
use std::path::{Path, PathBuf};

/// population group label of measures taken over every resident.
pub const TOTAL_POPULATION: &str = "total";

/// reads every region file, evaluates it and writes the measures to `output_file`.
pub fn run(
    region_files: &[PathBuf],
    config: &EquityConfig,
    output_file: &Path,
) -> Result<Vec<MeasureRow>, AppError> {
    let tables = region_files
        .iter()
        .map(|f| table_io::read_unit_table(f, config))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = evaluate_regions(tables, config)?;
    table_io::write_csv(output_file, &rows)?;
    Ok(rows)
}

/// evaluates each region under one kappa, calibrated on the union of all regions
/// unless the configuration fixes it.
pub fn evaluate_regions(
    tables: Vec<UnitTable>,
    config: &EquityConfig,
) -> Result<Vec<MeasureRow>, AppError> {
    let tables = tables
        .into_iter()
        .map(|t| screen_outliers(t, config))
        .collect::<Result<Vec<_>, _>>()?;
    let samples = tables
        .iter()
        .map(population_sample)
        .collect::<Result<Vec<_>, _>>()?;

    let union = WeightedSample::concat(samples.iter())?;
    let kolm_pollak = match config.kappa {
        Some(kappa) => KolmPollak::new(config.beta, kappa),
        None => KolmPollak::calibrate(&union, config.beta)?,
    };
    log::info!(
        "evaluating {} regions with beta {} and kappa {}",
        tables.len(),
        kolm_pollak.beta,
        kolm_pollak.kappa
    );

    let mut rows = vec![];
    for (table, sample) in tables.iter().zip(samples.iter()) {
        let report = EquityReport::evaluate(sample, &kolm_pollak)?;
        rows.extend(MeasureRow::from_report(&table.name, TOTAL_POPULATION, &report));
        rows.extend(subgroup_rows(&table.name, table, &kolm_pollak)?);
        if let Some(income) = &table.income {
            rows.extend(income_rows(table, income, config.beta)?);
        }
    }
    rows.extend(sensitivity_rows(&tables, &samples, &union, &config.betas)?);
    Ok(rows)
}

/// Kolm-Pollak EDE of every region for each beta in `betas`. each beta gets its own
/// kappa, calibrated on the union of all regions.
pub fn sensitivity_rows(
    tables: &[UnitTable],
    samples: &[WeightedSample],
    union: &WeightedSample,
    betas: &[f64],
) -> Result<Vec<MeasureRow>, AppError> {
    let mut rows = vec![];
    for beta in betas.iter() {
        let kolm_pollak = KolmPollak::calibrate(union, *beta)?;
        log::debug!("sensitivity beta {beta} calibrated kappa {}", kolm_pollak.kappa);
        for (table, sample) in tables.iter().zip(samples.iter()) {
            let ede = kolm_pollak.ede(sample)?;
            rows.push(MeasureRow::new(
                &table.name,
                TOTAL_POPULATION,
                &format!("kappa_beta_{beta}"),
                Some(kolm_pollak.kappa),
            ));
            rows.push(MeasureRow::new(
                &table.name,
                TOTAL_POPULATION,
                &format!("kolm_pollak_ede_beta_{beta}"),
                Some(ede),
            ));
        }
    }
    Ok(rows)
}

/// Kolm-Pollak EDE and mean distance of each subgroup in `table`. subgroups with no
/// members in the region are skipped.
pub fn subgroup_rows(
    label: &str,
    table: &UnitTable,
    kolm_pollak: &KolmPollak,
) -> Result<Vec<MeasureRow>, AppError> {
    let mut rows = vec![];
    for (group, weights) in table.subgroup_weights.iter() {
        let sample = match WeightedSample::from_pairs(table.distance_pairs(weights)) {
            Ok(sample) => sample,
            Err(InequalityError::InsufficientData) => {
                log::warn!("{label}: no members of subgroup '{group}', skipping");
                continue;
            }
            Err(e) => return Err(AppError::from(e)),
        };
        let ede = kolm_pollak.ede(&sample)?;
        rows.push(MeasureRow::new(label, group, "kolm_pollak_ede", Some(ede)));
        rows.push(MeasureRow::new(label, group, "mean", Some(sample.mean())));
    }
    Ok(rows)
}

pub fn population_sample(table: &UnitTable) -> Result<WeightedSample, AppError> {
    let weights = table.population_weights();
    WeightedSample::from_pairs(table.distance_pairs(&weights)).map_err(|e| {
        AppError::InternalError(format!("region '{}' has no usable rows: {e}", table.name))
    })
}

/// income is a desirable quantity, so it is calibrated with its own kappa from
/// `-|beta|` rather than on the distance scale.
fn income_rows(
    table: &UnitTable,
    income: &[f64],
    beta: f64,
) -> Result<Vec<MeasureRow>, AppError> {
    let sample = WeightedSample::from_pairs(
        income
            .iter()
            .zip(table.records.iter())
            .map(|(x, r)| (*x, r.weight)),
    )?;
    let kolm_pollak = KolmPollak::calibrate(&sample, -beta.abs())?;
    let ede = kolm_pollak.ede(&sample)?;
    Ok(vec![
        MeasureRow::new(&table.name, TOTAL_POPULATION, "income_kappa", Some(kolm_pollak.kappa)),
        MeasureRow::new(&table.name, TOTAL_POPULATION, "income_kolm_pollak_ede", Some(ede)),
        MeasureRow::new(&table.name, TOTAL_POPULATION, "income_mean", Some(sample.mean())),
    ])
}

fn screen_outliers(table: UnitTable, config: &EquityConfig) -> Result<UnitTable, AppError> {
    let multiplier = match config.outlier_iqr_multiplier {
        Some(m) => m,
        None => return Ok(table),
    };
    let fence = outlier::upper_fence(&population_sample(&table)?, multiplier);
    let before = table.len();
    let screened = table.retain_rows(|r| r.distance.is_nan() || r.distance <= fence);
    let removed = before - screened.len();
    if removed > 0 {
        log::info!(
            "{}: dropped {removed} rows with distance above {fence:.4}",
            screened.name
        );
    }
    Ok(screened)
}
