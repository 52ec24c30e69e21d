use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{parse_date, CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Extensions accepted by [`load_file`], for file dialogs.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "json", "parquet", "pq", "xlsx", "xlsm", "xls", "ods"];

/// Load a BMS log from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                 – header row plus one record per line
/// * `.json`                – `[{ "Battery ID": "A1", "SoC": 80, ... }, ...]`
/// * `.parquet`             – flat columns (pandas / polars `to_parquet`)
/// * `.xlsx` `.xls` `.ods`  – first worksheet, first row is the header
pub fn load_file(path: &Path) -> Result<Dataset> {
    match extension(path).as_str() {
        "csv" => {
            let reader = csv::Reader::from_path(path).context("opening CSV")?;
            load_csv(reader)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json(text.as_bytes())
        }
        "parquet" | "pq" => load_parquet(path),
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load a BMS log from in-memory content, e.g. a file dropped without a path.
/// Only the text formats are supported here.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset> {
    match extension(Path::new(name)).as_str() {
        "csv" => load_csv(csv::Reader::from_reader(bytes)),
        "json" => load_json(bytes),
        other => bail!("Cannot load .{other} content without a file path"),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every cell type-guessed.
fn load_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::from_rows(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    // Numbers only when they print back exactly as written, so ids such as
    // `007` or `1.0` stay matchable by their text.
    if let Ok(i) = s.parse::<i64>() {
        if i.to_string() == s {
            return CellValue::Integer(i);
        }
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() && CellValue::Float(f).to_string() == s {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    guess_text(s)
}

/// Text cell, promoted to a date when it reads as one.
fn guess_text(s: &str) -> CellValue {
    match parse_date(s) {
        Some(d) if s.trim().len() == 10 => CellValue::Date(d),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Battery ID": "A1", "Date": "2024-01-01", "Time": "10:00", "SoC": 80 },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance.
fn load_json(bytes: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Row::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Dataset::from_rows(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_text(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one BMS sample per row.
///
/// Strings, integers, floats, booleans and `Date32` map onto [`CellValue`];
/// any other column type is rendered to text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let cells: Row = schema
                .fields()
                .iter()
                .zip(batch.columns())
                .map(|(field, col)| (field.name().clone(), extract_cell(col, row)))
                .collect();
            rows.push(cells);
        }
    }

    Ok(Dataset::from_rows(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                CellValue::Text(col.as_string::<i64>().value(row).to_string())
            }
        }
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        _ => array_value_to_string(col, row)
            .map(CellValue::Text)
            .unwrap_or(CellValue::Null),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an Excel / OpenDocument workbook.
/// The first row names the columns; blank header cells become `Unnamed: N`.
fn load_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no worksheets")?
        .context("reading first worksheet")?;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(Dataset::default());
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {i}"),
            other => other.to_string(),
        })
        .collect();

    let rows = sheet_rows
        .map(|cells| {
            columns
                .iter()
                .zip(cells)
                .map(|(col, cell)| (col.clone(), spreadsheet_cell(cell)))
                .collect::<Row>()
        })
        .collect();

    Ok(Dataset::from_rows(columns, rows))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => guess_text(s),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(datetime_cell)
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => match parse_date(s) {
            Some(d) if s.len() == 10 => CellValue::Date(d),
            _ => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Null,
    }
}

/// Spreadsheet serials carry dates, clock times and timestamps in one type.
fn datetime_cell(dt: NaiveDateTime) -> CellValue {
    if dt.date().year() < 1900 {
        CellValue::Text(dt.time().format("%H:%M:%S").to_string())
    } else if NaiveTime::from_hms_opt(0, 0, 0) == Some(dt.time()) {
        CellValue::Date(dt.date())
    } else {
        CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;

    use crate::data::filter::FilterCriteria;
    use crate::data::view::compute_view;

    const CSV: &str = "\
Battery ID,Date,Time,SoC,Voltage,Current
A1,2024-01-01,10:00,80,3.7,1.2
A2,2024-01-02,11:00,60,3.6,
";

    #[test]
    fn test_csv_types_are_guessed() {
        let ds = load_bytes("log.csv", CSV.as_bytes()).unwrap();
        assert_eq!(ds.columns, vec!["Battery ID", "Date", "Time", "SoC", "Voltage", "Current"]);
        assert_eq!(ds.len(), 2);

        let first = &ds.rows[0];
        assert_eq!(first["Battery ID"], CellValue::Text("A1".into()));
        assert_eq!(
            first["Date"],
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(first["Time"], CellValue::Text("10:00".into()));
        assert_eq!(first["SoC"], CellValue::Integer(80));
        assert_eq!(first["Voltage"], CellValue::Float(3.7));
        assert_eq!(ds.rows[1]["Current"], CellValue::Null);
    }

    #[test]
    fn test_csv_ragged_row_is_an_error() {
        let err = load_bytes("log.csv", b"a,b\n1,2,3\n").unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 0"));
    }

    #[test]
    fn test_json_records_keep_column_order() {
        let json = r#"[
            {"Battery ID": "A1", "Date": "2024-01-01T00:00:00.000", "SoC": 80},
            {"Battery ID": "A2", "SoC": 60.5, "Note": null}
        ]"#;
        let ds = load_bytes("log.json", json.as_bytes()).unwrap();
        assert_eq!(ds.columns, vec!["Battery ID", "Date", "SoC", "Note"]);
        assert_eq!(
            ds.rows[0]["Date"],
            CellValue::Text("2024-01-01T00:00:00.000".into())
        );
        assert_eq!(ds.rows[1]["SoC"], CellValue::Float(60.5));

        let in_range = compute_view(
            Some(&ds),
            &FilterCriteria::date_range("2024-01-01", "2024-01-01"),
        )
        .unwrap();
        assert_eq!(in_range.table.len(), 1);
        assert!(!ds.rows[1].contains_key("Date"));
        assert_eq!(ds.rows[1]["Note"], CellValue::Null);
    }

    #[test]
    fn test_json_timestamps_keep_their_time() {
        let json = r#"[
            {"Time": "2024-01-01T10:00:00.000", "SoC": 80},
            {"Time": "2024-01-01T11:00:00.000", "SoC": 78}
        ]"#;
        let ds = load_bytes("log.json", json.as_bytes()).unwrap();
        assert_eq!(ds.rows[0]["Time"], CellValue::Text("2024-01-01T10:00:00.000".into()));

        let view = compute_view(Some(&ds), &FilterCriteria::default()).unwrap();
        let xs: Vec<_> = view.soc_vs_time.unwrap().points.into_iter().map(|(x, _)| x).collect();
        assert_ne!(xs[0], xs[1]);
    }

    #[test]
    fn test_numbers_must_print_back_unchanged() {
        assert_eq!(guess_cell_type("80"), CellValue::Integer(80));
        assert_eq!(guess_cell_type("-3"), CellValue::Integer(-3));
        assert_eq!(guess_cell_type("3.7"), CellValue::Float(3.7));
        assert_eq!(guess_cell_type("1.0"), CellValue::Float(1.0));
        assert_eq!(guess_cell_type("007"), CellValue::Text("007".into()));
        assert_eq!(guess_cell_type("+5"), CellValue::Text("+5".into()));
        assert_eq!(guess_cell_type("3.70"), CellValue::Text("3.70".into()));
        assert_eq!(guess_cell_type("inf"), CellValue::Text("inf".into()));
        assert_eq!(guess_cell_type("NaN"), CellValue::Text("NaN".into()));
    }

    #[test]
    fn test_csv_ids_filter_as_written() {
        let csv = "Battery ID,SoC\n007,80\n7,70\n1.0,60\n";
        let ds = load_bytes("log.csv", csv.as_bytes()).unwrap();
        let shown: Vec<String> = ds.rows.iter().map(|r| r["Battery ID"].to_string()).collect();
        assert_eq!(shown, vec!["007", "7", "1.0"]);

        for (id, soc) in [("007", 80), ("7", 70), ("1.0", 60)] {
            let view = compute_view(Some(&ds), &FilterCriteria::battery(id)).unwrap();
            assert_eq!(view.table.len(), 1, "battery {id}");
            assert_eq!(view.table.rows[0]["SoC"], CellValue::Integer(soc));
        }
    }

    #[test]
    fn test_json_must_be_records() {
        assert!(load_bytes("log.json", br#"{"SoC": [1, 2]}"#).is_err());
        assert!(load_bytes("log.json", b"[1, 2]").is_err());
    }

    #[test]
    fn test_unsupported_extensions() {
        assert!(load_file(Path::new("log.txt")).is_err());
        assert!(load_bytes("log.parquet", b"PAR1").is_err());
    }

    #[test]
    fn test_parquet_columns_map_to_cells() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Battery ID", DataType::Utf8, false),
            Field::new("Date", DataType::Date32, false),
            Field::new("SoC", DataType::Int64, true),
            Field::new("Voltage", DataType::Float64, false),
        ]));
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let days = (day - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32;
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A1", "A2"])),
                Arc::new(Date32Array::from(vec![days, days + 1])),
                Arc::new(Int64Array::from(vec![Some(80), None])),
                Arc::new(Float64Array::from(vec![3.7, 3.6])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns, vec!["Battery ID", "Date", "SoC", "Voltage"]);
        assert_eq!(ds.rows[0]["Date"], CellValue::Date(day));
        assert_eq!(ds.rows[0]["SoC"], CellValue::Integer(80));
        assert_eq!(ds.rows[1]["SoC"], CellValue::Null);
        assert_eq!(ds.rows[1]["Battery ID"], CellValue::Text("A2".into()));
    }

    #[test]
    fn test_spreadsheet_cells() {
        assert_eq!(spreadsheet_cell(&Data::Float(3.7)), CellValue::Float(3.7));
        assert_eq!(spreadsheet_cell(&Data::Int(80)), CellValue::Integer(80));
        assert_eq!(spreadsheet_cell(&Data::Empty), CellValue::Null);
        assert_eq!(
            spreadsheet_cell(&Data::String("2024-01-02".into())),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(
            spreadsheet_cell(&Data::String("A1".into())),
            CellValue::Text("A1".into())
        );
    }

    #[test]
    fn test_datetime_cells() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(datetime_cell(day.and_hms_opt(0, 0, 0).unwrap()), CellValue::Date(day));
        assert_eq!(
            datetime_cell(day.and_hms_opt(8, 30, 0).unwrap()),
            CellValue::Text("2024-05-06 08:30:00".into())
        );
        let clock = NaiveDate::from_ymd_opt(1899, 12, 31)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(datetime_cell(clock), CellValue::Text("10:00:00".into()));
    }
}
