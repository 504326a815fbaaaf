use accessequity_metrics::EquityReport;
use serde::{Deserialize, Serialize};

/// one measure in long format, the layout of every table the tool writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureRow {
    pub region: String,
    pub population_group: String,
    pub measure: String,
    /// empty when the measure is undefined for this distribution
    pub value: Option<f64>,
}

impl MeasureRow {
    pub fn new(region: &str, population_group: &str, measure: &str, value: Option<f64>) -> Self {
        MeasureRow {
            region: region.to_string(),
            population_group: population_group.to_string(),
            measure: measure.to_string(),
            value,
        }
    }

    pub fn from_report(region: &str, population_group: &str, report: &EquityReport) -> Vec<Self> {
        [
            ("beta", Some(report.beta)),
            ("kappa", Some(report.kappa)),
            ("kolm_pollak_ede", Some(report.kolm_pollak_ede)),
            ("kolm_pollak_index", Some(report.kolm_pollak_index)),
            ("atkinson_ede", report.atkinson_ede),
            ("atkinson_index", report.atkinson_index),
            ("atkinson_adjusted_ede", Some(report.atkinson_adjusted_ede)),
            ("atkinson_adjusted_index", Some(report.atkinson_adjusted_index)),
            ("gini_index", Some(report.gini_index)),
            ("mean", Some(report.mean)),
            ("max", Some(report.max)),
            ("std_dev", Some(report.std_dev)),
            ("coefficient_of_variation", Some(report.coefficient_of_variation)),
            ("total_weight", Some(report.total_weight)),
        ]
        .into_iter()
        .map(|(measure, value)| MeasureRow::new(region, population_group, measure, value))
        .chain(report.percentiles.iter().map(|(p, value)| {
            MeasureRow::new(
                region,
                population_group,
                &format!("percentile_{p}"),
                Some(*value),
            )
        }))
        .collect()
    }
}

/// the value of `measure` for a region and group, if present.
pub fn find_measure(
    rows: &[MeasureRow],
    region: &str,
    population_group: &str,
    measure: &str,
) -> Option<f64> {
    rows.iter()
        .find(|r| {
            r.region == region && r.population_group == population_group && r.measure == measure
        })
        .and_then(|r| r.value)
}
