//! Derived tables for each dashboard tab.
//!
//! Every function here is pure: dataset (+ criteria) in, owned tables out.
//! The UI calls them again on every interaction instead of caching.

use std::collections::BTreeMap;
use std::fmt;

use super::aggregate::{
    compute_summary, group_by_region, group_by_region_and_model, group_by_year_and_region,
    AggregateSummary,
};
use super::filter::{filtered_indices, FilterCriteria};
use super::model::SalesDataset;

/// Whether the Year filter also applies to the trend and area charts.
///
/// KPIs, the region bar chart and the region/model breakdown always use
/// the full criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TrendYearPolicy {
    /// Trend and area charts show every year, filtered on the other dimensions.
    #[default]
    Ignore,
    /// Trend and area charts honour the Year filter like every other chart.
    Apply,
}

impl fmt::Display for TrendYearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendYearPolicy::Ignore => write!(f, "ignore"),
            TrendYearPolicy::Apply => write!(f, "apply"),
        }
    }
}

/// Tables for the "Overall Statistics" tab.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewTables {
    /// Every dataset index in order, for the full preview table.
    pub indices: Vec<usize>,
    pub summary: AggregateSummary,
    pub region_totals: BTreeMap<String, f64>,
    pub year_region_totals: BTreeMap<(i32, String), f64>,
}

pub fn overview(dataset: &SalesDataset) -> OverviewTables {
    let records = dataset.records();
    OverviewTables {
        indices: (0..records.len()).collect(),
        summary: compute_summary(records),
        region_totals: group_by_region(records),
        year_region_totals: group_by_year_and_region(records),
    }
}

/// Tables for the "Filtered Statistics" tab.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTables {
    /// Dataset indices of the records matching the full criteria.
    pub indices: Vec<usize>,
    pub summary: AggregateSummary,
    pub region_totals: BTreeMap<String, f64>,
    pub year_region_totals: BTreeMap<(i32, String), f64>,
    pub region_model_totals: BTreeMap<(String, String), f64>,
}

impl FilteredTables {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub fn filtered_view(
    dataset: &SalesDataset,
    criteria: &FilterCriteria,
    policy: TrendYearPolicy,
) -> FilteredTables {
    let records = dataset.records();
    let indices = filtered_indices(dataset, criteria);
    let subset = || indices.iter().map(|&i| &records[i]);

    let year_region_totals = match policy {
        TrendYearPolicy::Apply => group_by_year_and_region(subset()),
        TrendYearPolicy::Ignore => {
            let relaxed = criteria.without_year();
            group_by_year_and_region(records.iter().filter(|r| relaxed.matches(r)))
        }
    };

    log::debug!(
        "filtered view: {} of {} records (year {}, trend policy {policy})",
        indices.len(),
        dataset.len(),
        criteria.year
    );

    FilteredTables {
        summary: compute_summary(subset()),
        region_totals: group_by_region(subset()),
        region_model_totals: group_by_region_and_model(subset()),
        year_region_totals,
        indices,
    }
}
