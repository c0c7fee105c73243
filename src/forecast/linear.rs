use statrs::distribution::{ContinuousCDF, Normal};

use super::{Forecast, ForecastPoint, Forecaster, Horizon, TrendPoint};
use crate::data::aggregate::RegionYearSeries;
use crate::error::ForecastError;

// ---------------------------------------------------------------------------
// Least-squares linear trend
// ---------------------------------------------------------------------------

/// Ordinary least-squares trend over year with normal prediction intervals.
///
/// The trend line is the point estimate. Interval half-width at year `x` is
/// `z * s * sqrt(1 + 1/n + (x - x̄)² / Sxx)` where `s` is the residual
/// standard error. With fewer than three observations there are no
/// residual degrees of freedom and the interval collapses onto the trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrendForecaster {
    interval_width: f64,
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        LinearTrendForecaster { interval_width: 0.8 }
    }
}

impl LinearTrendForecaster {
    /// `interval_width` is the coverage of the prediction interval, in (0, 1).
    pub fn new(interval_width: f64) -> Result<Self, ForecastError> {
        if interval_width > 0.0 && interval_width < 1.0 {
            Ok(LinearTrendForecaster { interval_width })
        } else {
            Err(ForecastError::InvalidIntervalWidth(interval_width))
        }
    }

    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }
}

struct Fit {
    mean_x: f64,
    intercept: f64,
    slope: f64,
    n: f64,
    sxx: f64,
    std_err: f64,
}

impl Fit {
    fn new(series: &RegionYearSeries) -> Self {
        let n = series.len() as f64;
        let mean_x = series.points.iter().map(|p| p.year as f64).sum::<f64>() / n;
        let mean_y = series.points.iter().map(|p| p.sales_volume).sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for p in &series.points {
            let dx = p.year as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (p.sales_volume - mean_y);
        }
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

        let sse: f64 = series
            .points
            .iter()
            .map(|p| {
                let r = p.sales_volume - (mean_y + slope * (p.year as f64 - mean_x));
                r * r
            })
            .sum();
        let std_err = if series.len() > 2 {
            (sse / (n - 2.0)).sqrt()
        } else {
            0.0
        };

        Fit {
            mean_x,
            intercept: mean_y,
            slope,
            n,
            sxx,
            std_err,
        }
    }

    fn trend(&self, year: i32) -> f64 {
        self.intercept + self.slope * (year as f64 - self.mean_x)
    }

    fn half_width(&self, year: i32, z: f64) -> f64 {
        let dx = year as f64 - self.mean_x;
        let leverage = if self.sxx > 0.0 { dx * dx / self.sxx } else { 0.0 };
        z * self.std_err * (1.0 + 1.0 / self.n + leverage).sqrt()
    }
}

impl Forecaster for LinearTrendForecaster {
    fn name(&self) -> &str {
        "linear trend"
    }

    fn forecast(
        &self,
        series: &RegionYearSeries,
        horizon: Horizon,
    ) -> Result<Forecast, ForecastError> {
        let last_year = series.last_year().ok_or_else(|| ForecastError::EmptySeries {
            region: series.region.clone(),
        })?;

        let fit = Fit::new(series);
        let z = normal_quantile(0.5 + self.interval_width / 2.0)?;
        let future = (1..=horizon.years() as i32).map(|k| last_year + k);
        let years: Vec<i32> = series.points.iter().map(|p| p.year).chain(future).collect();

        let points = years
            .iter()
            .map(|&year| {
                let estimate = fit.trend(year);
                let hw = fit.half_width(year, z);
                ForecastPoint {
                    year,
                    estimate,
                    lower: estimate - hw,
                    upper: estimate + hw,
                }
            })
            .collect();
        let trend = years
            .iter()
            .map(|&year| TrendPoint {
                year,
                value: fit.trend(year),
            })
            .collect();

        Ok(Forecast { points, trend })
    }
}

/// Inverse standard normal CDF.
fn normal_quantile(p: f64) -> Result<f64, ForecastError> {
    let standard = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Model(e.to_string()))?;
    Ok(standard.inverse_cdf(p))
}
