use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{DataCollection, RecordId, SpectrumData, SpectrumRecord};
use crate::units::{Quantity, Unit};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every spectrum in a file into `collection`. Dispatch by extension.
///
/// Supported formats (one spectrum per row/record):
/// * `.parquet` – list columns `spectral_axis`, `flux`; string columns
///   `name`, `spectral_axis_unit`, `flux_unit` are optional
/// * `.json`    – `[{ "spectral_axis": [...], "flux": [...], ...units }, ...]`
/// * `.csv`     – `spectral_axis` and `flux` hold semicolon-separated floats
///
/// Missing units load as the empty unit.
pub fn load_file(path: &Path, collection: &mut DataCollection) -> Result<Vec<Rc<SpectrumRecord>>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        "csv" => read_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("spectrum")
        .to_string();
    let single = rows.len() == 1;

    // Nothing reaches the collection unless every row converts.
    let mut built = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let fallback = if single { stem.clone() } else { format!("{stem}[{i}]") };
        let id = collection.next_identifier();
        let record = row
            .into_record(id, fallback)
            .with_context(|| format!("Row {i}"))?;
        built.push(record);
    }
    Ok(built.into_iter().map(|record| collection.add(record)).collect())
}

/// One row as read from disk, before unit parsing.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawSpectrum {
    #[serde(default)]
    name: Option<String>,
    spectral_axis: Vec<f64>,
    flux: Vec<f64>,
    #[serde(default)]
    spectral_axis_unit: String,
    #[serde(default)]
    flux_unit: String,
}

impl RawSpectrum {
    fn into_record(self, id: RecordId, fallback_name: String) -> Result<SpectrumRecord> {
        let axis_unit = Unit::parse(&self.spectral_axis_unit).context("parsing spectral axis unit")?;
        let flux_unit = Unit::parse(&self.flux_unit).context("parsing flux unit")?;

        let (axis, flux) = sort_by_axis(self.spectral_axis, self.flux);
        let data = SpectrumData::new(Quantity::new(axis, axis_unit), Quantity::new(flux, flux_unit))?;
        let name = self.name.filter(|n| !n.is_empty()).unwrap_or(fallback_name);
        Ok(SpectrumRecord::new(id, name, data)?)
    }
}

/// Records store an ascending axis; descending files (common for
/// wavenumber data) are reordered with their flux.
fn sort_by_axis(axis: Vec<f64>, flux: Vec<f64>) -> (Vec<f64>, Vec<f64>) {
    if axis.len() != flux.len() || axis.windows(2).all(|w| w[0] <= w[1]) {
        return (axis, flux);
    }
    log::debug!("reordering {} samples by spectral axis", axis.len());
    let mut pairs: Vec<(f64, f64)> = axis.into_iter().zip(flux).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().unzip()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// [
///   {
///     "name": "NGC 1275",
///     "spectral_axis": [4000.0, 4001.0, ...],
///     "spectral_axis_unit": "Angstrom",
///     "flux": [1.2e-16, 1.3e-16, ...],
///     "flux_unit": "erg / (s cm2 Angstrom)"
///   },
///   ...
/// ]
/// ```
///
/// A single top-level object is accepted as a one-spectrum file.
fn read_json(path: &Path) -> Result<Vec<RawSpectrum>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: serde_json::Value = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = match root {
        serde_json::Value::Array(items) => items,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => bail!("Expected a JSON array or object of spectra"),
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| serde_json::from_value(row).with_context(|| format!("Row {i} is not a spectrum record")))
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.
/// `spectral_axis` and `flux` columns contain semicolon-separated floats:
///   `"4000.0;4001.0;4002.0"`, `"0.12;0.14;0.11"`
/// `name`, `spectral_axis_unit` and `flux_unit` columns are optional.
fn read_csv(path: &Path) -> Result<Vec<RawSpectrum>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let axis_idx = column("spectral_axis").context("CSV missing 'spectral_axis' column")?;
    let flux_idx = column("flux").context("CSV missing 'flux' column")?;
    let name_idx = column("name");
    let axis_unit_idx = column("spectral_axis_unit");
    let flux_unit_idx = column("flux_unit");

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let text = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim().to_string();

        rows.push(RawSpectrum {
            name: name_idx.map(|i| text(Some(i))),
            spectral_axis: parse_semicolon_floats(record.get(axis_idx).unwrap_or(""), row_no, "spectral_axis")?,
            flux: parse_semicolon_floats(record.get(flux_idx).unwrap_or(""), row_no, "flux")?,
            spectral_axis_unit: text(axis_unit_idx),
            flux_unit: text(flux_unit_idx),
        });
    }
    Ok(rows)
}

fn parse_semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            let tok = tok.trim();
            if tok.eq_ignore_ascii_case("nan") {
                return Ok(f64::NAN);
            }
            tok.parse::<f64>()
                .with_context(|| format!("Row {row}, {col}[{j}]: '{tok}' is not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `spectral_axis`, `flux`: List<Float64|Float32> or LargeList of the same
/// - `name`, `spectral_axis_unit`, `flux_unit`: optional Utf8 columns
fn read_parquet(path: &Path) -> Result<Vec<RawSpectrum>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let required = |name: &str| {
            schema
                .index_of(name)
                .map(|i| batch.column(i).clone())
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };
        let optional = |name: &str| schema.index_of(name).ok().map(|i| batch.column(i).clone());

        let axis_col = required("spectral_axis")?;
        let flux_col = required("flux")?;
        let name_col = optional("name");
        let axis_unit_col = optional("spectral_axis_unit");
        let flux_unit_col = optional("flux_unit");

        for row in 0..batch.num_rows() {
            rows.push(RawSpectrum {
                name: name_col.as_ref().and_then(|c| string_at(c, row)),
                spectral_axis: extract_f64_list(&axis_col, row)
                    .with_context(|| format!("Row {row}: failed to read 'spectral_axis'"))?,
                flux: extract_f64_list(&flux_col, row).with_context(|| format!("Row {row}: failed to read 'flux'"))?,
                spectral_axis_unit: axis_unit_col.as_ref().and_then(|c| string_at(c, row)).unwrap_or_default(),
                flux_unit: flux_unit_col.as_ref().and_then(|c| string_at(c, row)).unwrap_or_default(),
            });
        }
    }
    Ok(rows)
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

fn string_at(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        other => {
            log::warn!("ignoring non-string unit/name column of type {other:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json_with_units() {
        let file = write_temp(
            ".json",
            r#"[{"name": "star", "spectral_axis": [400, 500, 600], "spectral_axis_unit": "nm",
                 "flux": [1, 2, 3], "flux_unit": "Jy"}]"#,
        );
        let mut collection = DataCollection::default();
        let records = load_file(file.path(), &mut collection).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "star");
        assert_eq!(records[0].spectral_axis().unit(), &Unit::parse("nm").unwrap());
        assert_eq!(records[0].flux().values(), &[1.0, 2.0, 3.0]);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_load_csv_reorders_descending_axis() {
        let file = write_temp(
            ".csv",
            "name,spectral_axis,flux,spectral_axis_unit,flux_unit\n\
             ir,3000;2000;1000,1;2;3,1 / cm,\n",
        );
        let mut collection = DataCollection::default();
        let records = load_file(file.path(), &mut collection).unwrap();
        let record = &records[0];
        assert_eq!(record.spectral_axis().values(), &[1000.0, 2000.0, 3000.0]);
        assert_eq!(record.flux().values(), &[3.0, 2.0, 1.0]);
        assert!(record.flux().unit().is_dimensionless());
    }

    #[test]
    fn test_bad_unit_is_reported() {
        let file = write_temp(
            ".json",
            r#"{"spectral_axis": [1, 2], "spectral_axis_unit": "nmm", "flux": [1, 2]}"#,
        );
        let mut collection = DataCollection::default();
        let err = load_file(file.path(), &mut collection).unwrap_err();
        assert!(format!("{err:#}").contains("spectral axis unit"));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_failed_row_discards_whole_file() {
        let file = write_temp(
            ".json",
            r#"[
                {"name": "good", "spectral_axis": [1, 2], "spectral_axis_unit": "nm", "flux": [1, 2], "flux_unit": "Jy"},
                {"name": "bad", "spectral_axis": [1, 2], "spectral_axis_unit": "nmm", "flux": [1, 2], "flux_unit": "Jy"}
            ]"#,
        );
        let mut collection = DataCollection::default();
        let err = load_file(file.path(), &mut collection).unwrap_err();
        assert!(format!("{err:#}").contains("Row 1"), "{err:#}");
        assert!(collection.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".fits", "");
        let mut collection = DataCollection::default();
        assert!(load_file(file.path(), &mut collection).is_err());
    }
}
