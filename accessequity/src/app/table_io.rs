use super::{AppError, EquityConfig};
use accessequity_siting::{CandidateDistance, CandidateMatrix, DistanceRecord};
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use kdam::{Bar, BarExt};
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// the rows of one region file, aligned by position.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitTable {
    /// region name, the file name without its extensions
    pub name: String,
    /// distances already multiplied by the configured distance scale
    pub records: Vec<DistanceRecord>,
    pub subgroup_weights: BTreeMap<String, Vec<f64>>,
    pub income: Option<Vec<f64>>,
}

impl UnitTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (distance, weight) pairs of the population or of one subgroup.
    pub fn distance_pairs<'a>(
        &'a self,
        weights: &'a [f64],
    ) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.records
            .iter()
            .zip(weights.iter())
            .map(|(r, w)| (r.distance, *w))
    }

    pub fn population_weights(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.weight).collect()
    }

    /// keeps only the rows for which `keep` holds on the record.
    pub fn retain_rows<F>(self, keep: F) -> UnitTable
    where
        F: Fn(&DistanceRecord) -> bool,
    {
        let mask: Vec<bool> = self.records.iter().map(&keep).collect();
        let filter = |values: Vec<f64>| -> Vec<f64> {
            values
                .into_iter()
                .zip(mask.iter())
                .filter_map(|(v, k)| if *k { Some(v) } else { None })
                .collect()
        };
        let records = self
            .records
            .into_iter()
            .zip(mask.iter())
            .filter_map(|(r, k)| if *k { Some(r) } else { None })
            .collect();
        let subgroup_weights = self
            .subgroup_weights
            .into_iter()
            .map(|(name, weights)| (name, filter(weights)))
            .collect();
        let income = self.income.map(filter);
        UnitTable {
            name: self.name,
            records,
            subgroup_weights,
            income,
        }
    }
}

/// reads a region file of unit distances, weights and optional subgroup and income
/// columns. empty distance cells are read as undefined (NaN) distances.
pub fn read_unit_table(filepath: &Path, config: &EquityConfig) -> Result<UnitTable, AppError> {
    let filename = filepath.to_string_lossy().to_string();
    let mut reader = open_csv(filepath)?;
    let lookup = column_lookup(&mut reader, &filename)?;

    let mut required = vec![
        config.unit_id_column.as_str(),
        config.distance_column.as_str(),
        config.weight_column.as_str(),
    ];
    required.extend(config.subgroup_columns.iter().map(|c| c.as_str()));
    if let Some(income_column) = &config.income_column {
        required.push(income_column.as_str());
    }
    require_columns(&lookup, &required, &filename)?;

    let mut bar = Bar::builder()
        .desc(format!("read {}", region_name(filepath)))
        .unit(" rows")
        .build()
        .map_err(AppError::InternalError)?;
    let mut records = vec![];
    let mut subgroup_weights: BTreeMap<String, Vec<f64>> = config
        .subgroup_columns
        .iter()
        .map(|c| (c.clone(), vec![]))
        .collect();
    let mut income = config.income_column.as_ref().map(|_| vec![]);
    for (idx, row_result) in reader.into_records().enumerate() {
        let row = row_result.map_err(|e| AppError::ReadError {
            filepath: filename.clone(),
            error: format!("row {idx}: {e}"),
        })?;
        let unit_id = get_str(&row, &config.unit_id_column, &lookup, &filename)?;
        let distance =
            get_f64(&row, &config.distance_column, &lookup, &filename)? * config.distance_scale;
        let weight = get_f64(&row, &config.weight_column, &lookup, &filename)?;
        records.push(DistanceRecord::new(unit_id, distance, weight));
        for (column, weights) in subgroup_weights.iter_mut() {
            weights.push(get_f64(&row, column, &lookup, &filename)?);
        }
        if let (Some(column), Some(values)) = (&config.income_column, income.as_mut()) {
            values.push(get_f64(&row, column, &lookup, &filename)?);
        }
        let _ = bar.update(1);
    }
    eprintln!();
    log::debug!("read {} rows from {filename}", records.len());

    Ok(UnitTable {
        name: region_name(filepath),
        records,
        subgroup_weights,
        income,
    })
}

/// reads candidate site distances. rows use the configured candidate id, unit id
/// and distance columns.
pub fn read_candidates(
    filepath: &Path,
    config: &EquityConfig,
) -> Result<CandidateMatrix, AppError> {
    let filename = filepath.to_string_lossy().to_string();
    let mut reader = open_csv(filepath)?;
    let lookup = column_lookup(&mut reader, &filename)?;
    require_columns(
        &lookup,
        &[
            config.candidate_id_column.as_str(),
            config.unit_id_column.as_str(),
            config.distance_column.as_str(),
        ],
        &filename,
    )?;

    let mut bar = Bar::builder()
        .desc("read candidates")
        .unit(" rows")
        .build()
        .map_err(AppError::InternalError)?;
    let mut rows = vec![];
    for (idx, row_result) in reader.into_records().enumerate() {
        let row = row_result.map_err(|e| AppError::ReadError {
            filepath: filename.clone(),
            error: format!("row {idx}: {e}"),
        })?;
        let candidate_id = get_str(&row, &config.candidate_id_column, &lookup, &filename)?;
        let unit_id = get_str(&row, &config.unit_id_column, &lookup, &filename)?;
        let distance =
            get_f64(&row, &config.distance_column, &lookup, &filename)? * config.distance_scale;
        rows.push(CandidateDistance::new(candidate_id, unit_id, distance));
        let _ = bar.update(1);
    }
    eprintln!();
    let matrix: CandidateMatrix = rows.into_iter().collect();
    log::info!("read {} candidate sites from {filename}", matrix.len());
    Ok(matrix)
}

/// writes `rows` as CSV with a header taken from the row type.
pub fn write_csv<T: Serialize>(filepath: &Path, rows: &[T]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(filepath).map_err(|e| AppError::WriteError {
        filepath: filepath.to_string_lossy().to_string(),
        error: e.to_string(),
    })?;
    for row in rows.iter() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("wrote {} rows to {}", rows.len(), filepath.to_string_lossy());
    Ok(())
}

/// file name with `.gz` and `.csv` extensions removed.
pub fn region_name(filepath: &Path) -> String {
    let filename = filepath
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    let filename = filename.strip_suffix(".gz").unwrap_or(&filename);
    let filename = filename.strip_suffix(".csv").unwrap_or(filename);
    filename.to_string()
}

fn is_gzip(filepath: &Path) -> bool {
    filepath.extension().and_then(|e| e.to_str()) == Some("gz")
}

fn open_csv(filepath: &Path) -> Result<csv::Reader<Box<dyn Read>>, AppError> {
    let f = File::open(filepath).map_err(|e| AppError::ReadError {
        filepath: filepath.to_string_lossy().to_string(),
        error: e.to_string(),
    })?;
    let r: Box<dyn Read> = if is_gzip(filepath) {
        Box::new(BufReader::new(GzDecoder::new(f)))
    } else {
        Box::new(f)
    };
    Ok(ReaderBuilder::new().has_headers(true).from_reader(r))
}

fn column_lookup(
    reader: &mut csv::Reader<Box<dyn Read>>,
    filename: &str,
) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader.headers().map_err(|e| AppError::ReadError {
        filepath: filename.to_string(),
        error: format!("failure reading headers: {e}"),
    })?;
    Ok(headers
        .iter()
        .enumerate()
        .map(|(index, column)| (column.trim().to_string(), index))
        .collect())
}

fn require_columns(
    lookup: &HashMap<String, usize>,
    columns: &[&str],
    filename: &str,
) -> Result<(), AppError> {
    for col in columns.iter() {
        if !lookup.contains_key(*col) {
            return Err(AppError::ReadError {
                filepath: filename.to_string(),
                error: format!("missing expected column '{col}'"),
            });
        }
    }
    Ok(())
}

fn get_str<'a>(
    row: &'a StringRecord,
    column: &str,
    lookup: &HashMap<String, usize>,
    filename: &str,
) -> Result<&'a str, AppError> {
    lookup
        .get(column)
        .and_then(|idx| row.get(*idx))
        .map(|s| s.trim())
        .ok_or_else(|| AppError::ReadError {
            filepath: filename.to_string(),
            error: format!("row is missing column '{column}'"),
        })
}

fn get_f64(
    row: &StringRecord,
    column: &str,
    lookup: &HashMap<String, usize>,
    filename: &str,
) -> Result<f64, AppError> {
    let value = get_str(row, column, lookup, filename)?;
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(|e| AppError::ReadError {
        filepath: filename.to_string(),
        error: format!("value '{value}' in column '{column}' is not a number: {e}"),
    })
}
