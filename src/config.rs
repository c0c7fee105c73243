use std::path::PathBuf;

use clap::Parser;

use sales_dashboard::data::views::TrendYearPolicy;
use sales_dashboard::{ForecastError, Forecaster, Horizon, LinearTrendForecaster};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Interactive vehicle sales dashboard.
///
/// Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct DashboardArgs {
    /// Dataset to open at startup (.csv, .json or .parquet)
    pub path: Option<PathBuf>,

    /// Initial forecast horizon in years
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub horizon: u32,

    /// Coverage of the forecast prediction interval
    #[arg(long, default_value_t = 0.8)]
    pub interval_width: f64,

    /// Whether the Year filter applies to the filtered trend and area charts
    #[arg(long, value_enum, default_value_t = TrendYearPolicy::Ignore)]
    pub trend_year: TrendYearPolicy,
}

/// Validated startup settings handed to the app state.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub initial_path: Option<PathBuf>,
    pub horizon: Horizon,
    pub forecaster: LinearTrendForecaster,
    pub trend_year: TrendYearPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            initial_path: None,
            horizon: Horizon::default(),
            forecaster: LinearTrendForecaster::default(),
            trend_year: TrendYearPolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Model name and interval coverage, for chart titles.
    pub fn forecaster_label(&self) -> String {
        format!(
            "{}, {:.0}% interval",
            self.forecaster.name(),
            self.forecaster.interval_width() * 100.0
        )
    }
}

impl TryFrom<DashboardArgs> for DashboardConfig {
    type Error = ForecastError;

    fn try_from(args: DashboardArgs) -> Result<Self, Self::Error> {
        Ok(DashboardConfig {
            initial_path: args.path,
            horizon: Horizon::new(args.horizon)?,
            forecaster: LinearTrendForecaster::new(args.interval_width)?,
            trend_year: args.trend_year,
        })
    }
}
