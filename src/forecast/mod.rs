//! Forecasting collaborator contract.
//!
//! The dashboard only extracts a [`RegionYearSeries`] and hands it to a
//! [`Forecaster`]; what model sits behind the trait is not its concern.

mod linear;

use serde::Serialize;

pub use linear::LinearTrendForecaster;

use crate::data::aggregate::{extract_region_year_series, RegionYearSeries};
use crate::data::model::SalesDataset;
use crate::error::ForecastError;

/// Number of future years to project, always in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Horizon(u32);

impl Horizon {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 10;

    pub fn new(years: u32) -> Result<Self, ForecastError> {
        if (Self::MIN..=Self::MAX).contains(&years) {
            Ok(Horizon(years))
        } else {
            Err(ForecastError::InvalidHorizon(years))
        }
    }

    pub fn years(self) -> u32 {
        self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon(5)
    }
}

/// Point estimate with its prediction interval for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub value: f64,
}

/// Model output over the historical plus future range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    /// Long-run trend component, one value per forecast year.
    pub trend: Vec<TrendPoint>,
}

impl Forecast {
    /// Only the projected years after the last observed one.
    pub fn future(&self, last_observed_year: i32) -> impl Iterator<Item = &ForecastPoint> + '_ {
        self.points
            .iter()
            .filter(move |p| p.year > last_observed_year)
    }
}

/// A time-series model that projects a region's yearly sales.
///
/// Implementations may assume the series is non-empty and sorted by year.
pub trait Forecaster {
    fn name(&self) -> &str;

    fn forecast(
        &self,
        series: &RegionYearSeries,
        horizon: Horizon,
    ) -> Result<Forecast, ForecastError>;
}

/// Result of a forecast request: the input series and the model output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionForecast {
    pub series: RegionYearSeries,
    pub forecast: Forecast,
}

/// Extract the region's yearly series and forecast it.
///
/// An empty series is refused before the forecaster is called.
pub fn forecast_region(
    dataset: &SalesDataset,
    region: &str,
    horizon: Horizon,
    forecaster: &dyn Forecaster,
) -> Result<RegionForecast, ForecastError> {
    let series = extract_region_year_series(dataset, region);
    if series.is_empty() {
        log::warn!("Refusing to forecast region '{region}': no records");
        return Err(ForecastError::EmptySeries {
            region: region.to_string(),
        });
    }

    log::debug!(
        "Forecasting {} years for '{region}' from {} observations with {}",
        horizon.years(),
        series.len(),
        forecaster.name()
    );
    let forecast = forecaster.forecast(&series, horizon)?;
    Ok(RegionForecast { series, forecast })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rstest::rstest;

    use super::*;
    use crate::data::model::fixtures::small_dataset;

    /// Records how often the model is invoked.
    struct CountingForecaster {
        calls: Cell<usize>,
    }

    impl Forecaster for CountingForecaster {
        fn name(&self) -> &str {
            "counting"
        }

        fn forecast(
            &self,
            _series: &RegionYearSeries,
            _horizon: Horizon,
        ) -> Result<Forecast, ForecastError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Forecast {
                points: Vec::new(),
                trend: Vec::new(),
            })
        }
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn horizon_bounds(#[case] years: u32, #[case] ok: bool) {
        assert_eq!(Horizon::new(years).is_ok(), ok);
    }

    #[test]
    fn empty_series_never_reaches_the_model() {
        let model = CountingForecaster { calls: Cell::new(0) };
        let err = forecast_region(&small_dataset(), "Africa", Horizon::default(), &model).unwrap_err();
        assert_eq!(
            err,
            ForecastError::EmptySeries {
                region: "Africa".to_string()
            }
        );
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn non_empty_series_is_forwarded() {
        let model = CountingForecaster { calls: Cell::new(0) };
        let result = forecast_region(&small_dataset(), "Europe", Horizon::default(), &model).unwrap();
        assert_eq!(model.calls.get(), 1);
        assert_eq!(result.series.len(), 2);
    }

    #[test]
    fn future_skips_observed_years() {
        let point = |year| ForecastPoint {
            year,
            estimate: 1.0,
            lower: 0.0,
            upper: 2.0,
        };
        let forecast = Forecast {
            points: vec![point(2020), point(2021), point(2022), point(2023)],
            trend: Vec::new(),
        };
        let years: Vec<i32> = forecast.future(2021).map(|p| p.year).collect();
        assert_eq!(years, vec![2022, 2023]);
    }
}
