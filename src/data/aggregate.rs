use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// KPI values over a subset of records.
///
/// Means are `None` when the subset is empty; the sum is then zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateSummary {
    pub record_count: usize,
    pub total_sales_volume: f64,
    pub avg_price: Option<f64>,
    pub avg_mileage: Option<f64>,
    pub avg_engine_size: Option<f64>,
}

/// Sum sales volume and average the price, mileage and engine size columns.
pub fn compute_summary<'a, I>(records: I) -> AggregateSummary
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut count = 0usize;
    let mut volume = 0.0;
    let mut price = 0.0;
    let mut mileage = 0.0;
    let mut engine = 0.0;

    for rec in records {
        count += 1;
        volume += rec.sales_volume;
        price += rec.price_usd;
        mileage += rec.mileage_km;
        engine += rec.engine_size_l;
    }

    let mean = |total: f64| (count > 0).then(|| total / count as f64);

    AggregateSummary {
        record_count: count,
        total_sales_volume: volume,
        avg_price: mean(price),
        avg_mileage: mean(mileage),
        avg_engine_size: mean(engine),
    }
}

// ---------------------------------------------------------------------------
// Group-by sums
// ---------------------------------------------------------------------------

fn sum_volume_by<'a, I, K, F>(records: I, key: F) -> BTreeMap<K, f64>
where
    I: IntoIterator<Item = &'a SalesRecord>,
    K: Ord,
    F: Fn(&'a SalesRecord) -> K,
{
    let mut totals = BTreeMap::new();
    for rec in records {
        *totals.entry(key(rec)).or_insert(0.0) += rec.sales_volume;
    }
    totals
}

/// Region → total sales volume.
pub fn group_by_region<'a, I>(records: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    sum_volume_by(records, |r| r.region.clone())
}

/// (Year, Region) → total sales volume. Feeds the trend and area charts.
pub fn group_by_year_and_region<'a, I>(records: I) -> BTreeMap<(i32, String), f64>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    sum_volume_by(records, |r| (r.year, r.region.clone()))
}

/// (Region, Model) → total sales volume. Feeds the hierarchical breakdown.
pub fn group_by_region_and_model<'a, I>(records: I) -> BTreeMap<(String, String), f64>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    sum_volume_by(records, |r| (r.region.clone(), r.model.clone()))
}

// ---------------------------------------------------------------------------
// Region-year series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub sales_volume: f64,
}

/// Per-year total sales volume for one region, strictly ascending by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionYearSeries {
    pub region: String,
    pub points: Vec<YearTotal>,
}

impl RegionYearSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }
}

/// Filter to one region, group by year and sum. An unknown region gives an
/// empty series.
pub fn extract_region_year_series(dataset: &SalesDataset, region: &str) -> RegionYearSeries {
    let by_year = sum_volume_by(
        dataset.records().iter().filter(|r| r.region == region),
        |r| r.year,
    );

    RegionYearSeries {
        region: region.to_string(),
        points: by_year
            .into_iter()
            .map(|(year, sales_volume)| YearTotal { year, sales_volume })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, small_dataset};

    #[test]
    fn summarises_small_dataset() {
        let ds = small_dataset();
        let summary = compute_summary(ds.records());
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.total_sales_volume, 270.0);
        assert_eq!(summary.avg_price, Some(50_000.0));
        assert_eq!(summary.avg_mileage, Some(10_000.0));
        assert_eq!(summary.avg_engine_size, Some(2.0));
    }

    #[test]
    fn means_are_averages_not_sums() {
        let mut a = record(2020, "Europe", "X3", "Petrol", 1.0);
        a.price_usd = 30_000.0;
        a.engine_size_l = 1.5;
        let mut b = record(2020, "Europe", "X3", "Petrol", 1.0);
        b.price_usd = 60_000.0;
        b.engine_size_l = 3.0;
        let summary = compute_summary([&a, &b]);
        assert_eq!(summary.avg_price, Some(45_000.0));
        assert_eq!(summary.avg_engine_size, Some(2.25));
    }

    #[test]
    fn empty_summary_has_undefined_means() {
        let summary = compute_summary(std::iter::empty());
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.total_sales_volume, 0.0);
        assert_eq!(summary.avg_price, None);
        assert_eq!(summary.avg_mileage, None);
        assert_eq!(summary.avg_engine_size, None);
    }

    #[test]
    fn groups_by_region() {
        let ds = small_dataset();
        let totals = group_by_region(ds.records());
        let expected: BTreeMap<String, f64> =
            [("Europe".to_string(), 220.0), ("Asia".to_string(), 50.0)].into_iter().collect();
        assert_eq!(totals, expected);
    }

    #[test]
    fn region_totals_reconcile_with_summary() {
        let ds = SalesDataset::from_records(vec![
            record(2018, "Africa", "i3", "Electric", 12.5),
            record(2019, "Asia", "X5", "Diesel", 300.0),
            record(2019, "Europe", "X3", "Petrol", 41.0),
            record(2020, "Asia", "M3", "Petrol", 8.0),
            record(2021, "North America", "X7", "Hybrid", 77.0),
        ]);
        let partition: f64 = group_by_region(ds.records()).values().sum();
        assert_eq!(partition, compute_summary(ds.records()).total_sales_volume);
    }

    #[test]
    fn groups_by_year_and_region() {
        let ds = small_dataset();
        let totals = group_by_year_and_region(ds.records());
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[&(2020, "Europe".to_string())], 100.0);
        assert_eq!(totals[&(2020, "Asia".to_string())], 50.0);
        assert_eq!(totals[&(2021, "Europe".to_string())], 120.0);
    }

    #[test]
    fn groups_by_region_and_model() {
        let ds = small_dataset();
        let totals = group_by_region_and_model(ds.records());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&("Europe".to_string(), "X3".to_string())], 220.0);
        assert_eq!(totals[&("Asia".to_string(), "X5".to_string())], 50.0);
    }

    #[test]
    fn extracts_region_year_series() {
        let ds = small_dataset();
        let series = extract_region_year_series(&ds, "Europe");
        assert_eq!(
            series.points,
            vec![
                YearTotal { year: 2020, sales_volume: 100.0 },
                YearTotal { year: 2021, sales_volume: 120.0 },
            ]
        );
        assert_eq!(series.last_year(), Some(2021));
    }

    #[test]
    fn series_is_strictly_ascending_and_pre_aggregated() {
        let ds = SalesDataset::from_records(vec![
            record(2022, "Asia", "X5", "Diesel", 5.0),
            record(2019, "Asia", "X3", "Petrol", 1.0),
            record(2022, "Asia", "M3", "Petrol", 6.0),
            record(2020, "Europe", "X3", "Petrol", 99.0),
            record(2019, "Asia", "i8", "Hybrid", 2.0),
        ]);
        let series = extract_region_year_series(&ds, "Asia");
        assert!(series.points.windows(2).all(|w| w[0].year < w[1].year));
        let pairs: Vec<(i32, f64)> = series.points.iter().map(|p| (p.year, p.sales_volume)).collect();
        assert_eq!(pairs, vec![(2019, 3.0), (2022, 11.0)]);
    }

    #[test]
    fn absent_region_gives_empty_series() {
        let series = extract_region_year_series(&small_dataset(), "Africa");
        assert!(series.is_empty());
        assert_eq!(series.last_year(), None);
    }
}
