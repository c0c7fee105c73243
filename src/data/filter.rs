use std::collections::BTreeSet;
use std::fmt;

use super::model::{SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Year predicate: either every year or one exact year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearSelection {
    #[default]
    All,
    Exact(i32),
}

impl YearSelection {
    pub fn matches(self, year: i32) -> bool {
        match self {
            YearSelection::All => true,
            YearSelection::Exact(y) => y == year,
        }
    }
}

impl fmt::Display for YearSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSelection::All => write!(f, "All years"),
            YearSelection::Exact(y) => write!(f, "{y}"),
        }
    }
}

/// Conjunction of per-dimension inclusion predicates.
///
/// An empty set on a dimension means nothing is selected there, so the
/// filtered subset is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub year: YearSelection,
    pub regions: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub fuel_types: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria with every available value selected (i.e. show everything).
    pub fn select_all(dataset: &SalesDataset) -> Self {
        FilterCriteria {
            year: YearSelection::All,
            regions: dataset.regions().clone(),
            models: dataset.models().clone(),
            fuel_types: dataset.fuel_types().clone(),
        }
    }

    /// Same criteria with the year predicate relaxed.
    pub fn without_year(&self) -> Self {
        FilterCriteria {
            year: YearSelection::All,
            ..self.clone()
        }
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.year.matches(record.year)
            && self.regions.contains(&record.region)
            && self.models.contains(&record.model)
            && self.fuel_types.contains(&record.fuel_type)
    }
}

/// Return the records passing all predicates, in dataset order.
///
/// A year absent from the dataset is not an error: it simply matches
/// nothing.
pub fn apply_filters<'a>(dataset: &'a SalesDataset, criteria: &FilterCriteria) -> Vec<&'a SalesRecord> {
    dataset
        .records()
        .iter()
        .filter(|rec| criteria.matches(rec))
        .collect()
}

/// Indices of records passing all predicates, for table previews.
pub fn filtered_indices(dataset: &SalesDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::data::model::fixtures::{record, small_dataset};

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn select_all_is_identity() {
        let ds = SalesDataset::from_records(vec![
            record(2019, "Africa", "i3", "Electric", 7.0),
            record(2020, "Europe", "X3", "Petrol", 100.0),
            record(2020, "Asia", "X5", "Diesel", 50.0),
            record(2021, "Europe", "M5", "Hybrid", 120.0),
        ]);
        let criteria = FilterCriteria::select_all(&ds);
        let filtered: Vec<SalesRecord> = apply_filters(&ds, &criteria).into_iter().cloned().collect();
        assert_eq!(filtered, ds.records());
    }

    #[test]
    fn selecting_every_value_equals_no_dimension_filter() {
        let ds = small_dataset();
        let mut criteria = FilterCriteria::select_all(&ds);
        criteria.year = YearSelection::Exact(2020);
        let exact_year = apply_filters(&ds, &criteria);

        let expected: Vec<&SalesRecord> = ds.records().iter().filter(|r| r.year == 2020).collect();
        assert_eq!(exact_year, expected);
    }

    #[rstest]
    #[case(&["Asia"], 1, 50.0)]
    #[case(&["Europe"], 2, 220.0)]
    #[case(&["Africa"], 0, 0.0)]
    #[case(&[], 0, 0.0)]
    fn filters_by_region(#[case] regions: &[&str], #[case] count: usize, #[case] total: f64) {
        let ds = small_dataset();
        let criteria = FilterCriteria {
            regions: set(regions),
            ..FilterCriteria::select_all(&ds)
        };
        let subset = apply_filters(&ds, &criteria);
        assert_eq!(subset.len(), count);
        assert_eq!(subset.iter().map(|r| r.sales_volume).sum::<f64>(), total);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let ds = small_dataset();
        let criteria = FilterCriteria {
            year: YearSelection::Exact(2021),
            regions: set(&["Europe", "Asia"]),
            models: set(&["X3"]),
            fuel_types: set(&["Petrol", "Diesel"]),
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![2]);
    }

    #[test]
    fn year_outside_range_yields_empty_subset() {
        let ds = small_dataset();
        let criteria = FilterCriteria {
            year: YearSelection::Exact(1999),
            ..FilterCriteria::select_all(&ds)
        };
        assert!(apply_filters(&ds, &criteria).is_empty());
    }

    #[test]
    fn without_year_keeps_other_predicates() {
        let ds = small_dataset();
        let criteria = FilterCriteria {
            year: YearSelection::Exact(2020),
            regions: set(&["Europe"]),
            ..FilterCriteria::select_all(&ds)
        };
        let relaxed = criteria.without_year();
        assert_eq!(relaxed.year, YearSelection::All);
        assert_eq!(relaxed.regions, criteria.regions);
        assert_eq!(filtered_indices(&ds, &relaxed), vec![0, 2]);
    }
}
