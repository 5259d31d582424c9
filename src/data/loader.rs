use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::index::DatasetIndex;
use super::model::RawObservation;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load raw survey records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat columns `country`, `language`, `experience`, `value`
/// * `.json`    – flat records array, or the nested calculator document
///   `{ country: { language: { "entries": [...] } } }`
/// * `.csv`     – header row with `country`, `language`, `experience`, `value`
///
/// Records are not validated here; see [`DatasetIndex::build`].
pub fn load_file(path: &Path) -> Result<Vec<RawObservation>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load a file and build the index from it.
pub fn load_index(path: &Path) -> Result<DatasetIndex> {
    let records = load_file(path)?;
    let index = DatasetIndex::build(records)
        .with_context(|| format!("validating {}", path.display()))?;
    log::info!(
        "Loaded {} observations ({} countries, {} country/language pairs) from {}",
        index.len(),
        index.list_countries().len(),
        index.pair_count(),
        path.display()
    );
    Ok(index)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two JSON layouts are accepted.
///
/// Records-oriented:
///
/// ```json
/// [
///   { "country": "Spain", "language": "Rust", "experience": "3–5 years", "value": 42.0 },
///   ...
/// ]
/// ```
///
/// Nested calculator document, where country and language are object keys
/// and each entry carries the band in `category`:
///
/// ```json
/// {
///   "Spain": {
///     "Rust": {
///       "entries": [ { "value": 42.0, "category": "3–5 years", "metadata": { ... } } ]
///     }
///   }
/// }
/// ```
fn load_json(path: &Path) -> Result<Vec<RawObservation>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub(crate) fn parse_json(text: &str) -> Result<Vec<RawObservation>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    match &root {
        JsonValue::Array(records) => records
            .iter()
            .enumerate()
            .map(|(i, rec)| -> Result<RawObservation> {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                json_record(obj).with_context(|| format!("Row {i}"))
            })
            .collect(),
        JsonValue::Object(countries) => parse_nested(countries),
        _ => bail!("Expected top-level JSON array or object"),
    }
}

fn parse_nested(countries: &Map<String, JsonValue>) -> Result<Vec<RawObservation>> {
    let mut records = Vec::new();

    for (country, languages) in countries {
        let languages = languages
            .as_object()
            .with_context(|| format!("Country '{country}' is not a JSON object"))?;

        for (language, data) in languages {
            let entries = data
                .get("entries")
                .and_then(JsonValue::as_array)
                .with_context(|| format!("{country}/{language}: missing 'entries' array"))?;

            for (i, entry) in entries.iter().enumerate() {
                let obj = entry
                    .as_object()
                    .with_context(|| format!("{country}/{language} entry {i} is not a JSON object"))?;
                let mut raw = json_record(obj)
                    .with_context(|| format!("{country}/{language} entry {i}"))?;
                raw.country = Some(country.clone());
                raw.language = Some(language.clone());
                records.push(raw);
            }
        }
    }

    Ok(records)
}

/// Read one record object. `category` and `salary` are accepted as the
/// names used by the calculator document.
fn json_record(obj: &Map<String, JsonValue>) -> Result<RawObservation> {
    let value = match first_present(obj, &["value", "salary"]) {
        None => None,
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(other) => bail!("'value' is not a number: {other}"),
    };

    let experience = json_text(first_present(obj, &["experience", "category"])).or_else(|| {
        obj.get("metadata")
            .and_then(|m| m.get("Experience"))
            .and_then(|v| json_text(Some(v)))
    });

    Ok(RawObservation {
        value,
        experience,
        country: json_text(obj.get("country")),
        language: json_text(obj.get("language")),
    })
}

fn first_present<'a>(obj: &'a Map<String, JsonValue>, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn json_text(val: Option<&JsonValue>) -> Option<String> {
    match val? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names (case-insensitive).
/// Required columns: `country`, `language`, `experience` (or `category`)
/// and `value` (or `salary`). Other columns are ignored; empty cells
/// become missing fields.
fn load_csv(path: &Path) -> Result<Vec<RawObservation>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

pub(crate) fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawObservation>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let country_idx = csv_column(&headers, &["country"])?;
    let language_idx = csv_column(&headers, &["language"])?;
    let experience_idx = csv_column(&headers, &["experience", "category"])?;
    let value_idx = csv_column(&headers, &["value", "salary"])?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let value = cell(value_idx)
            .map(|s| {
                s.parse::<f64>()
                    .with_context(|| format!("CSV row {row_no}: value '{s}' is not a number"))
            })
            .transpose()?;

        records.push(RawObservation {
            value,
            experience: cell(experience_idx).map(str::to_string),
            country: cell(country_idx).map(str::to_string),
            language: cell(language_idx).map(str::to_string),
        });
    }

    Ok(records)
}

/// Position of the first header matching any of `names`.
fn csv_column(headers: &[String], names: &[&str]) -> Result<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.as_str()))
        .with_context(|| format!("CSV missing '{}' column", names[0]))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing one survey observation per row.
///
/// Expected schema:
/// - `country`, `language`, `experience`: Utf8 or LargeUtf8
/// - `value`: Float64, Float32, Int64 or Int32
/// - Any other columns are ignored; nulls become missing fields
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<RawObservation>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, &mut records)?;
    }

    Ok(records)
}

pub(crate) fn append_batch(batch: &RecordBatch, records: &mut Vec<RawObservation>) -> Result<()> {
    let schema = batch.schema();
    let column = |name: &str| {
        schema
            .index_of(name)
            .map(|idx| batch.column(idx))
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
    };

    let country = column("country")?;
    let language = column("language")?;
    let experience = column("experience")?;
    let value = column("value")?;

    for row in 0..batch.num_rows() {
        records.push(RawObservation {
            value: extract_number(value, row)
                .with_context(|| format!("Row {row}: failed to read 'value'"))?,
            experience: extract_text(experience, row)
                .with_context(|| format!("Row {row}: failed to read 'experience'"))?,
            country: extract_text(country, row)
                .with_context(|| format!("Row {row}: failed to read 'country'"))?,
            language: extract_text(language, row)
                .with_context(|| format!("Row {row}: failed to read 'language'"))?,
        });
    }

    Ok(())
}

// -- Parquet / Arrow helpers --

/// Extract a string cell; `None` for null.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row)
            .to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        other => bail!("Expected Utf8 column, got {other:?}"),
    };
    Ok(Some(text))
}

/// Extract a numeric cell as `f64`; `None` for null.
fn extract_number(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64,
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64,
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as f64,
        other => bail!("Expected numeric column, got {other:?}"),
    };
    Ok(Some(value))
}
