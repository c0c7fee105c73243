//! Core of the sales dashboard: typed sales records, loading with row
//! validation, filtering, aggregation and the forecasting contract.
//!
//! Nothing here depends on a UI toolkit; the desktop shell in `main.rs`
//! calls these functions on every interaction.

pub mod data;
pub mod error;
pub mod forecast;

pub use data::aggregate::{AggregateSummary, RegionYearSeries, YearTotal};
pub use data::filter::{apply_filters, FilterCriteria, YearSelection};
pub use data::model::{SalesDataset, SalesRecord};
pub use error::{DataError, ForecastError};
pub use forecast::{forecast_region, Forecast, Forecaster, Horizon, LinearTrendForecaster};
