use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Observation, RawRow};

/// Header names every source table must provide.
const COUNTRY_COL: &str = "country";
const YEAR_COL: &str = "year";
const VALUE_COL: &str = "co2_per_capita";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the observation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `country`, `year`, `co2_per_capita`
/// * `.json`    – `[{ "country": ..., "year": ..., "co2_per_capita": ... }, ...]`
/// * `.parquet` – flat `country`, `year`, `co2_per_capita` columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} observations ({} numeric, {} rows dropped) for {} labels from {}",
        dataset.len(),
        dataset.numeric_count(),
        dataset.dropped_rows,
        dataset.countries.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

/// Coerce one raw row into an [`Observation`].
///
/// Returns `None` when the year is not an integer; the row then contributes
/// to no view. An empty or non-numeric value keeps the row with the value
/// marked absent.
pub fn parse_row(row: &RawRow) -> Option<Observation> {
    let year = parse_year(&row.year)?;
    Some(Observation::new(&row.country, year, parse_value(&row.co2_per_capita)))
}

fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if let Ok(y) = text.parse::<i32>() {
        return Some(y);
    }
    // Integral float text ("1970.0") is still a valid year.
    let f = text.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validate every raw row and build the immutable working dataset.
pub fn dataset_from_rows<I>(rows: I) -> Dataset
where
    I: IntoIterator<Item = RawRow>,
{
    let mut observations = Vec::new();
    let mut dropped = 0usize;

    for row in rows {
        match parse_row(&row) {
            Some(obs) => observations.push(obs),
            None => {
                log::debug!("Dropping row with unparseable year {:?} ({})", row.year, row.country);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::debug!("{dropped} rows dropped for unparseable years");
    }
    Dataset::from_observations(observations, dropped)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// CSV layout: header row with at least `country`, `year` and
/// `co2_per_capita`. Other columns are ignored. Short rows are padded with
/// empty cells, so a missing trailing value reads as absent.
pub fn read_csv<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for required in [COUNTRY_COL, YEAR_COL, VALUE_COL] {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(row);
    }

    Ok(dataset_from_rows(rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json(&text)
}

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "country": "France", "year": 1990, "co2_per_capita": 6.8 },
///   { "country": "Chad",   "year": "1990", "co2_per_capita": null },
///   ...
/// ]
/// ```
///
/// Years and values may be numbers, strings or null.
pub fn read_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        rows.push(RawRow {
            country: json_to_text(obj.get(COUNTRY_COL)),
            year: json_to_text(obj.get(YEAR_COL)),
            co2_per_capita: json_to_text(obj.get(VALUE_COL)),
        });
    }

    Ok(dataset_from_rows(rows))
}

fn json_to_text(val: Option<&JsonValue>) -> String {
    match val {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat `country`, `year` and `co2_per_capita`
/// columns. Integer, float and string column types are all accepted; nulls
/// become empty cells and go through the same validation as CSV text.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let country_col = required_column(&batch, COUNTRY_COL)?;
        let year_col = required_column(&batch, YEAR_COL)?;
        let value_col = required_column(&batch, VALUE_COL)?;

        for row in 0..batch.num_rows() {
            rows.push(RawRow {
                country: cell_text(country_col, row),
                year: cell_text(year_col, row),
                co2_per_capita: cell_text(value_col, row),
            });
        }
    }

    Ok(dataset_from_rows(rows))
}

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Render one Arrow cell as text; nulls and unsupported types are empty.
fn cell_text(col: &ArrayRef, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|a| a.value(row).to_string()),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| a.value(row).to_string()),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(row).to_string()),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| a.value(row).to_string()),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| a.value(row).to_string()),
        other => {
            log::warn!("Unsupported parquet column type {other:?}; treating cell as empty");
            None
        }
    };
    text.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn raw(country: &str, year: &str, value: &str) -> RawRow {
        RawRow {
            country: country.to_string(),
            year: year.to_string(),
            co2_per_capita: value.to_string(),
        }
    }

    #[test]
    fn unparseable_year_drops_row() {
        assert_eq!(parse_row(&raw("France", "n/a", "5.0")), None);
        assert_eq!(parse_row(&raw("France", "", "5.0")), None);
        assert_eq!(parse_row(&raw("France", "1990.5", "5.0")), None);
    }

    #[test]
    fn empty_or_non_numeric_value_is_kept_as_absent() {
        let obs = parse_row(&raw("France", "1990", "")).unwrap();
        assert_eq!(obs, Observation::new("France", 1990, None));

        let obs = parse_row(&raw("France", "1990", "  ")).unwrap();
        assert_eq!(obs.value, None);

        let obs = parse_row(&raw("France", "1990", "abc")).unwrap();
        assert_eq!(obs.value, None);

        let obs = parse_row(&raw("France", "1990", "NaN")).unwrap();
        assert_eq!(obs.value, None);
    }

    #[test]
    fn fields_are_trimmed_and_coerced() {
        let obs = parse_row(&raw("France", " 1990 ", " 6.25 ")).unwrap();
        assert_eq!(obs, Observation::new("France", 1990, Some(6.25)));

        let obs = parse_row(&raw("France", "1990.0", "6")).unwrap();
        assert_eq!(obs.year, 1990);
    }

    #[test]
    fn country_passes_through_unchanged() {
        let obs = parse_row(&raw("", "2000", "1.0")).unwrap();
        assert_eq!(obs.country, "");
        let obs = parse_row(&raw("Africa (GCP)", "2000", "1.0")).unwrap();
        assert_eq!(obs.country, "Africa (GCP)");
    }

    #[test]
    fn csv_with_extra_columns_and_bad_rows() {
        let csv = "country,iso_code,year,co2_per_capita\n\
                   USA,USA,1970,15.0\n\
                   USA,USA,1971,\n\
                   China,CHN,1970,1.0\n\
                   China,CHN,unknown,2.0\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows, 1);
        assert_eq!(ds.observations[1], Observation::new("USA", 1971, None));
        assert!(ds.observations.iter().all(|o| o.year == 1970 || o.year == 1971));
    }

    #[test]
    fn csv_short_row_keeps_observation_with_absent_value() {
        let csv = "country,year,co2_per_capita\n\
                   USA,1970,15.0\n\
                   USA,1971\n\
                   China,1970,1.0\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows, 0);
        assert_eq!(ds.observations[1], Observation::new("USA", 1971, None));
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let csv = "country,year\nUSA,1970\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("co2_per_capita"));
    }

    #[test]
    fn json_accepts_numbers_strings_and_nulls() {
        let json = r#"[
            {"country": "France", "year": 1990, "co2_per_capita": 6.8},
            {"country": "Chad", "year": "1990", "co2_per_capita": null},
            {"country": "Chad", "year": null, "co2_per_capita": 0.1},
            {"country": "Peru", "year": 1991.0, "co2_per_capita": "1.4"}
        ]"#;
        let ds = read_json(json).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows, 1);
        assert_eq!(ds.observations[0], Observation::new("France", 1990, Some(6.8)));
        assert_eq!(ds.observations[1], Observation::new("Chad", 1990, None));
        assert_eq!(ds.observations[2], Observation::new("Peru", 1991, Some(1.4)));
    }

    #[test]
    fn json_rejects_non_array_root() {
        assert!(read_json(r#"{"country": "France"}"#).is_err());
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("co2.csv");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "country,year,co2_per_capita").unwrap();
        writeln!(f, "France,2000,6.0").unwrap();
        drop(f);
        assert_eq!(load_file(&csv_path).unwrap().len(), 1);

        let txt_path = dir.path().join("co2.txt");
        std::fs::write(&txt_path, "whatever").unwrap();
        let err = load_file(&txt_path).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn parquet_round_trip_with_nulls() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("country", DataType::Utf8, false),
            Field::new("year", DataType::Int64, true),
            Field::new("co2_per_capita", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["France", "France", "Chad"])),
                Arc::new(Int64Array::from(vec![Some(2000), None, Some(2000)])),
                Arc::new(Float64Array::from(vec![Some(6.0), Some(5.0), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("co2.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_rows, 1);
        assert_eq!(ds.observations[0], Observation::new("France", 2000, Some(6.0)));
        assert_eq!(ds.observations[1], Observation::new("Chad", 2000, None));
    }
}
