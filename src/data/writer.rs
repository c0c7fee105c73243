use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::SalesRecord;

/// Write records as CSV with the standard header row.
pub fn write_csv<W: Write>(records: &[SalesRecord], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for rec in records {
        writer.serialize(rec).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Write records as a single-batch Parquet file with flat columns.
pub fn write_parquet<W: Write + Send>(records: &[SalesRecord], out: W) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Int32, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Model", DataType::Utf8, false),
        Field::new("Fuel_Type", DataType::Utf8, false),
        Field::new("Sales_Volume", DataType::Float64, false),
        Field::new("Price_USD", DataType::Float64, false),
        Field::new("Mileage_KM", DataType::Float64, false),
        Field::new("Engine_Size_L", DataType::Float64, false),
    ]));

    let strings = |f: fn(&SalesRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(f)))
    };
    let floats = |f: fn(&SalesRecord) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(records.iter().map(f)))
    };

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.year))) as ArrayRef,
            strings(|r| r.region.as_str()),
            strings(|r| r.model.as_str()),
            strings(|r| r.fuel_type.as_str()),
            floats(|r| r.sales_volume),
            floats(|r| r.price_usd),
            floats(|r| r.mileage_km),
            floats(|r| r.engine_size_l),
        ],
    )
    .context("building record batch")?;

    let mut writer = ArrowWriter::try_new(out, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;
    use crate::data::model::fixtures::small_dataset;

    #[test]
    fn csv_output_is_loadable() {
        let ds = small_dataset();
        let mut buf = Vec::new();
        write_csv(ds.records(), &mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(
            "Year,Region,Model,Fuel_Type,Sales_Volume,Price_USD,Mileage_KM,Engine_Size_L\n"
        ));
        assert_eq!(read_csv(buf.as_slice()).unwrap().dataset, ds);
    }
}
