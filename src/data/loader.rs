use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{SalesDataset, SalesRecord, COLUMNS};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Load result
// ---------------------------------------------------------------------------

/// A loaded dataset together with the rows that failed validation.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub dataset: SalesDataset,
    pub rejected: Vec<DataError>,
}

impl LoadReport {
    fn from_rows(rows: Vec<Result<SalesRecord, DataError>>) -> Self {
        let mut records = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for row in rows {
            match row {
                Ok(rec) => records.push(rec),
                Err(e) => {
                    log::warn!("Skipping malformed row: {e}");
                    rejected.push(e);
                }
            }
        }
        LoadReport {
            dataset: SalesDataset::from_records(records),
            rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the sales columns (extra columns ignored)
/// * `.json`    – `[{ "Year": 2020, "Region": "Asia", ... }, ...]`
/// * `.parquet` – flat columns with the same names
///
/// A missing column or unreadable file is an error; individual bad rows are
/// reported in [`LoadReport::rejected`] and left out of the dataset.
pub fn load_file(path: &Path) -> Result<LoadReport> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let report = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV file")?;
            read_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} records from {} ({} rejected)",
        report.dataset.len(),
        path.display(),
        report.rejected.len()
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Cell validation shared by every format
// ---------------------------------------------------------------------------

/// One raw cell, before it is checked against the column's type.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Cell {
    fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Null => String::new(),
        }
    }
}

/// Build a typed record from a cell accessor, or say why the row is bad.
fn build_record<F>(row: usize, cell: F) -> Result<SalesRecord, DataError>
where
    F: Fn(&'static str) -> Cell,
{
    let fetch = |column: &'static str| {
        let value = cell(column);
        if value.is_missing() {
            Err(DataError::MissingValue { row, column })
        } else {
            Ok(value)
        }
    };
    let invalid = |column: &'static str, expected: &'static str, value: &Cell| DataError::InvalidValue {
        row,
        column,
        expected,
        value: value.describe(),
    };

    let year = |column| {
        let value = fetch(column)?;
        let parsed = match &value {
            Cell::Integer(i) => i32::try_from(*i).ok(),
            Cell::Float(f) if f.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(f) => {
                Some(*f as i32)
            }
            Cell::Text(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| invalid(column, "an integer year", &value))
    };

    let text = |column| fetch(column).map(|v| v.describe().trim().to_string());

    let number = |column| {
        let value = fetch(column)?;
        let parsed = match &value {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Null => None,
        };
        parsed
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| invalid(column, "a non-negative number", &value))
    };

    Ok(SalesRecord {
        year: year("Year")?,
        region: text("Region")?,
        model: text("Model")?,
        fuel_type: text("Fuel_Type")?,
        sales_volume: number("Sales_Volume")?,
        price_usd: number("Price_USD")?,
        mileage_km: number("Mileage_KM")?,
        engine_size_l: number("Engine_Size_L")?,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Short rows are tolerated by the reader and rejected here as missing values.
pub fn read_csv<R: Read>(input: R) -> Result<LoadReport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    let mut positions = Vec::with_capacity(COLUMNS.len());
    for col in COLUMNS {
        let idx = headers
            .iter()
            .position(|h| h == col)
            .with_context(|| format!("CSV missing '{col}' column"))?;
        positions.push((col, idx));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(decode_csv_row(row_no, &record, &positions).and_then(|fields| {
            build_record(row_no, |column| {
                fields
                    .iter()
                    .find(|(name, _)| *name == column)
                    .and_then(|(_, value)| value.map(|s| Cell::Text(s.to_string())))
                    .unwrap_or(Cell::Null)
            })
        }));
    }

    Ok(LoadReport::from_rows(rows))
}

/// Decode the wanted fields of one raw CSV row; a field that is not UTF-8
/// rejects the row.
fn decode_csv_row<'r>(
    row: usize,
    record: &'r csv::ByteRecord,
    positions: &[(&'static str, usize)],
) -> Result<Vec<(&'static str, Option<&'r str>)>, DataError> {
    positions
        .iter()
        .map(|&(column, idx)| match record.get(idx).map(std::str::from_utf8) {
            None => Ok((column, None)),
            Some(Ok(text)) => Ok((column, Some(text))),
            Some(Err(_)) => Err(DataError::InvalidValue {
                row,
                column,
                expected: "UTF-8 text",
                value: record
                    .get(idx)
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default(),
            }),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year": 2020, "Region": "Asia", "Model": "X5", "Fuel_Type": "Diesel",
///     "Sales_Volume": 50, "Price_USD": 65000.0, "Mileage_KM": 12000, "Engine_Size_L": 3.0 },
///   ...
/// ]
/// ```
pub fn read_json(text: &str) -> Result<LoadReport> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    let mut seen = [false; COLUMNS.len()];
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (col, seen) in COLUMNS.iter().zip(seen.iter_mut()) {
            *seen |= obj.contains_key(*col);
        }
        rows.push(build_record(i, |column| json_to_cell(obj.get(column))));
    }

    // A key absent from every record is a missing column, not a bad row.
    if !records.is_empty() {
        if let Some((col, _)) = COLUMNS.iter().zip(seen).find(|(_, seen)| !seen) {
            bail!("JSON records missing '{col}' field");
        }
    }

    Ok(LoadReport::from_rows(rows))
}

fn json_to_cell(val: Option<&JsonValue>) -> Cell {
    match val {
        Some(JsonValue::String(s)) => Cell::Text(s.clone()),
        Some(JsonValue::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        Some(JsonValue::Null) | None => Cell::Null,
        Some(other) => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per sales field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); dictionary-encoded (categorical)
/// string columns are decoded to plain strings first.
fn load_parquet(path: &Path) -> Result<LoadReport> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut columns: Vec<(&'static str, ArrayRef)> = Vec::with_capacity(COLUMNS.len());
        for col in COLUMNS {
            let idx = schema
                .index_of(col)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{col}' column"))?;
            columns.push((col, normalize_column(batch.column(idx))?));
        }

        for row in 0..batch.num_rows() {
            rows.push(build_record(row_offset + row, |column| {
                columns
                    .iter()
                    .find(|(name, _)| *name == column)
                    .map(|(_, array)| arrow_cell(array, row))
                    .unwrap_or(Cell::Null)
            }));
        }
        row_offset += batch.num_rows();
    }

    Ok(LoadReport::from_rows(rows))
}

// -- Parquet / Arrow helpers --

/// Decode dictionary and view string columns into plain `Utf8`.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Dictionary(_, _) | DataType::Utf8View => {
            arrow::compute::cast(col, &DataType::Utf8).context("decoding string column")
        }
        _ => Ok(col.clone()),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| Cell::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| Cell::Text(a.value(row).to_string())),
        DataType::Int16 => any
            .downcast_ref::<Int16Array>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| Cell::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| Cell::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| Cell::Float(a.value(row))),
        other => Some(Cell::Text(format!("{other:?}"))),
    };
    cell.unwrap_or(Cell::Null)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;
    use crate::data::model::fixtures::small_dataset;
    use crate::data::writer;

    const GOOD_CSV: &str = indoc! {"
        Model,Year,Region,Color,Fuel_Type,Transmission,Engine_Size_L,Mileage_KM,Price_USD,Sales_Volume,Sales_Classification
        5 Series,2016,Asia,Red,Petrol,Manual,3.5,151748,98740,8300,High
        i8,2013,North America,Red,Hybrid,Automatic,1.6,121671,79219,3428,Low
    "};

    #[test]
    fn reads_csv_and_ignores_extra_columns() {
        let report = read_csv(GOOD_CSV.as_bytes()).unwrap();
        assert!(report.rejected.is_empty());
        let records = report.dataset.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].model, "5 Series");
        assert_eq!(records[0].year, 2016);
        assert_eq!(records[0].sales_volume, 8300.0);
        assert_eq!(records[1].region, "North America");
        assert_eq!(records[1].engine_size_l, 1.6);
    }

    #[test]
    fn rejects_malformed_csv_rows_and_keeps_the_rest() {
        let csv = indoc! {"
            Year,Region,Model,Fuel_Type,Sales_Volume,Price_USD,Mileage_KM,Engine_Size_L
            2020,Europe,X3,Petrol,100,50000,10000,2.0
            2020,,X5,Diesel,50,60000,20000,3.0
            twenty,Asia,X5,Diesel,50,60000,20000,3.0
            2021,Europe,X3,Petrol,lots,50000,10000,2.0
            2021,Europe,X3,Petrol,-5,50000,10000,2.0
            2021,Europe,X3
            2021,Europe,X3,Petrol,120,50000,10000,2.0
        "};
        let report = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.dataset.len(), 2);
        assert_eq!(
            report.rejected.iter().map(DataError::row).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(
            report.rejected[0],
            DataError::MissingValue { row: 1, column: "Region" }
        );
        assert!(matches!(
            report.rejected[2],
            DataError::InvalidValue { column: "Sales_Volume", .. }
        ));
        assert_eq!(
            report.rejected[4],
            DataError::MissingValue { row: 5, column: "Fuel_Type" }
        );
    }

    #[test]
    fn missing_csv_column_is_fatal() {
        let csv = "Year,Region,Model,Sales_Volume\n2020,Asia,X5,10\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Fuel_Type"));
    }

    #[test]
    fn reads_json_records() {
        let json = indoc! {r#"
            [
              {"Year": 2020, "Region": "Asia", "Model": "X5", "Fuel_Type": "Diesel",
               "Sales_Volume": 50, "Price_USD": 65000.5, "Mileage_KM": 12000, "Engine_Size_L": 3.0},
              {"Year": 2021, "Region": "Asia", "Model": "X5", "Fuel_Type": null,
               "Sales_Volume": 60, "Price_USD": 65000.5, "Mileage_KM": 12000, "Engine_Size_L": 3.0}
            ]
        "#};
        let report = read_json(json).unwrap();
        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.dataset.records()[0].price_usd, 65000.5);
        assert_eq!(
            report.rejected,
            vec![DataError::MissingValue { row: 1, column: "Fuel_Type" }]
        );
    }

    #[test]
    fn invalid_utf8_rejects_only_its_row() {
        let mut csv = b"Year,Region,Model,Fuel_Type,Sales_Volume,Price_USD,Mileage_KM,Engine_Size_L\n".to_vec();
        csv.extend_from_slice(b"2020,Europe,X3,Petrol,100,50000,10000,2.0\n");
        csv.extend_from_slice(b"2020,Eur\xFFope,X3,Petrol,100,50000,10000,2.0\n");
        csv.extend_from_slice(b"2021,Asia,X5,Diesel,80,60000,20000,3.0\n");

        let report = read_csv(csv.as_slice()).unwrap();
        assert_eq!(report.dataset.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert!(matches!(
            report.rejected[0],
            DataError::InvalidValue { row: 1, column: "Region", expected: "UTF-8 text", .. }
        ));
    }

    #[test]
    fn json_row_without_a_key_is_rejected_even_when_first() {
        let json = indoc! {r#"
            [
              {"Year": 2020, "Region": "Asia", "Model": "X5",
               "Sales_Volume": 50, "Price_USD": 65000.0, "Mileage_KM": 12000, "Engine_Size_L": 3.0},
              {"Year": 2021, "Region": "Asia", "Model": "X5", "Fuel_Type": "Diesel",
               "Sales_Volume": 60, "Price_USD": 65000.0, "Mileage_KM": 12000, "Engine_Size_L": 3.0}
            ]
        "#};
        let report = read_json(json).unwrap();
        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.dataset.records()[0].year, 2021);
        assert_eq!(
            report.rejected,
            vec![DataError::MissingValue { row: 0, column: "Fuel_Type" }]
        );
    }

    #[test]
    fn json_key_absent_from_every_record_is_fatal() {
        let json = r#"[{"Year": 2020, "Region": "Asia", "Model": "X5", "Sales_Volume": 50,
                        "Price_USD": 1.0, "Mileage_KM": 1.0, "Engine_Size_L": 1.0}]"#;
        let err = read_json(json).unwrap_err();
        assert!(err.to_string().contains("Fuel_Type"));
    }

    #[rstest]
    #[case::beyond_i32("3.0e10")]
    #[case::below_i32("-3.0e10")]
    #[case::fractional("2020.5")]
    fn out_of_range_float_year_is_rejected(#[case] year: &str) {
        let json = format!(
            r#"[{{"Year": {year}, "Region": "Asia", "Model": "X5", "Fuel_Type": "Diesel",
                 "Sales_Volume": 50, "Price_USD": 1.0, "Mileage_KM": 1.0, "Engine_Size_L": 1.0}}]"#
        );
        let report = read_json(&json).unwrap();
        assert!(report.dataset.is_empty());
        assert!(matches!(
            report.rejected.as_slice(),
            [DataError::InvalidValue { row: 0, column: "Year", .. }]
        ));
    }

    #[test]
    fn whole_float_year_is_accepted() {
        let json = r#"[{"Year": 2020.0, "Region": "Asia", "Model": "X5", "Fuel_Type": "Diesel",
                        "Sales_Volume": 50, "Price_USD": 1.0, "Mileage_KM": 1.0, "Engine_Size_L": 1.0}]"#;
        let report = read_json(json).unwrap();
        assert_eq!(report.dataset.records()[0].year, 2020);
    }

    #[test]
    fn dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("sales.csv");
        std::fs::write(&csv_path, GOOD_CSV).unwrap();
        assert_eq!(load_file(&csv_path).unwrap().dataset.len(), 2);

        let txt_path = dir.path().join("sales.txt");
        std::fs::write(&txt_path, GOOD_CSV).unwrap();
        assert!(load_file(&txt_path).is_err());
    }

    #[test]
    fn reads_back_parquet_written_by_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let ds = small_dataset();

        let file = std::fs::File::create(&path).unwrap();
        writer::write_parquet(ds.records(), file).unwrap();

        let report = load_file(&path).unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.dataset, ds);
    }
}
