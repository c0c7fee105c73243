use std::collections::BTreeSet;
use std::path::Path;

use sales_dashboard::data::filter::{FilterCriteria, YearSelection};
use sales_dashboard::data::loader::load_file;
use sales_dashboard::data::model::SalesDataset;
use sales_dashboard::data::views::{filtered_view, overview, FilteredTables, OverviewTables};
use sales_dashboard::forecast::{forecast_region, Horizon, RegionForecast};
use sales_dashboard::ForecastError;

use crate::color::ColorMap;
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overall,
    Filtered,
    Forecast,
}

/// Categorical dimensions the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    Model,
    FuelType,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Region, Dimension::Model, Dimension::FuelType];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region(s)",
            Dimension::Model => "Model(s)",
            Dimension::FuelType => "Fuel Type(s)",
        }
    }

    pub fn available(self, dataset: &SalesDataset) -> &BTreeSet<String> {
        match self {
            Dimension::Region => dataset.regions(),
            Dimension::Model => dataset.models(),
            Dimension::FuelType => dataset.fuel_types(),
        }
    }

    pub fn selected(self, criteria: &mut FilterCriteria) -> &mut BTreeSet<String> {
        match self {
            Dimension::Region => &mut criteria.regions,
            Dimension::Model => &mut criteria.models,
            Dimension::FuelType => &mut criteria.fuel_types,
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<SalesDataset>,

    /// Rows dropped by the loader for the current dataset.
    pub rejected_rows: usize,

    pub tab: Tab,

    /// Current selections on the Filtered Statistics tab.
    pub criteria: FilterCriteria,

    pub overview: Option<OverviewTables>,
    pub filtered: Option<FilteredTables>,

    /// Region and horizon chosen on the Sales Forecasting tab.
    pub forecast_region: Option<String>,
    pub horizon: Horizon,
    pub forecast: Option<Result<RegionForecast, ForecastError>>,

    /// One colour per region, shared by every chart.
    pub region_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            horizon: config.horizon,
            config,
            dataset: None,
            rejected_rows: 0,
            tab: Tab::default(),
            criteria: FilterCriteria::default(),
            overview: None,
            filtered: None,
            forecast_region: None,
            forecast: None,
            region_colors: ColorMap::default(),
            status_message: None,
        };
        if let Some(path) = state.config.initial_path.clone() {
            state.open(&path);
        }
        state
    }

    /// Load a file and replace the current dataset, or report the failure.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(report) => {
                self.set_dataset(report.dataset);
                self.rejected_rows = report.rejected.len();
                if self.rejected_rows > 0 {
                    self.status_message = Some(format!(
                        "{} malformed rows skipped (first: {})",
                        self.rejected_rows, report.rejected[0]
                    ));
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset selections and derived tables.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.criteria = FilterCriteria {
            year: dataset
                .years()
                .first()
                .map_or(YearSelection::All, |&y| YearSelection::Exact(y)),
            ..FilterCriteria::select_all(&dataset)
        };
        self.forecast_region = dataset.regions().first().cloned();
        self.region_colors = ColorMap::new(dataset.regions());
        self.overview = Some(overview(&dataset));
        self.rejected_rows = 0;
        self.status_message = None;

        self.dataset = Some(dataset);
        self.refilter();
        self.reforecast();
    }

    /// Recompute the Filtered Statistics tables after a selection change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filtered = Some(filtered_view(ds, &self.criteria, self.config.trend_year));
        }
    }

    /// Recompute the forecast after a region or horizon change.
    pub fn reforecast(&mut self) {
        let (Some(ds), Some(region)) = (&self.dataset, &self.forecast_region) else {
            self.forecast = None;
            return;
        };
        self.forecast = Some(forecast_region(ds, region, self.horizon, &self.config.forecaster));
    }

    pub fn set_year(&mut self, year: YearSelection) {
        self.criteria.year = year;
        self.refilter();
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = dim.selected(&mut self.criteria);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            *dim.selected(&mut self.criteria) = dim.available(ds).clone();
            self.refilter();
        }
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        dim.selected(&mut self.criteria).clear();
        self.refilter();
    }

    pub fn set_forecast_region(&mut self, region: String) {
        self.forecast_region = Some(region);
        self.reforecast();
    }

    pub fn set_horizon(&mut self, horizon: Horizon) {
        self.horizon = horizon;
        self.reforecast();
    }
}
