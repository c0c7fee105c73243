use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SalesRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single sales record (one row of the source table).
///
/// Field names serialize to the column headers of the source file so the
/// same type can be written back out by the sample generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Fuel_Type")]
    pub fuel_type: String,
    #[serde(rename = "Sales_Volume")]
    pub sales_volume: f64,
    #[serde(rename = "Price_USD")]
    pub price_usd: f64,
    #[serde(rename = "Mileage_KM")]
    pub mileage_km: f64,
    #[serde(rename = "Engine_Size_L")]
    pub engine_size_l: f64,
}

/// Column headers, in file order.
pub const COLUMNS: [&str; 8] = [
    "Year",
    "Region",
    "Model",
    "Fuel_Type",
    "Sales_Volume",
    "Price_USD",
    "Mileage_KM",
    "Engine_Size_L",
];

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with the sorted unique values of every
/// categorical dimension.
///
/// Fields are private: once built the dataset is read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
    years: BTreeSet<i32>,
    regions: BTreeSet<String>,
    models: BTreeSet<String>,
    fuel_types: BTreeSet<String>,
}

impl SalesDataset {
    /// Build dimension indices from already validated records.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut models = BTreeSet::new();
        let mut fuel_types = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            regions.insert(rec.region.clone());
            models.insert(rec.model.clone());
            fuel_types.insert(rec.fuel_type.clone());
        }

        SalesDataset {
            records,
            years,
            regions,
            models,
            fuel_types,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    pub fn models(&self) -> &BTreeSet<String> {
        &self.models
    }

    pub fn fuel_types(&self) -> &BTreeSet<String> {
        &self.fuel_types
    }

    /// First and last observed year, if any records exist.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(year: i32, region: &str, model: &str, fuel: &str, volume: f64) -> SalesRecord {
        SalesRecord {
            year,
            region: region.to_string(),
            model: model.to_string(),
            fuel_type: fuel.to_string(),
            sales_volume: volume,
            price_usd: 50_000.0,
            mileage_km: 10_000.0,
            engine_size_l: 2.0,
        }
    }

    /// The three-row dataset used throughout the tests.
    pub fn small_dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            record(2020, "Europe", "X3", "Petrol", 100.0),
            record(2020, "Asia", "X5", "Diesel", 50.0),
            record(2021, "Europe", "X3", "Petrol", 120.0),
        ])
    }
}
