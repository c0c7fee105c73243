use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use sales_dashboard::data::aggregate::RegionYearSeries;
use sales_dashboard::data::model::{SalesDataset, COLUMNS};
use sales_dashboard::forecast::ForecastPoint;

const ROW_HEIGHT: f32 = 18.0;
const MAX_HEIGHT: f32 = 320.0;

fn table<'a>(ui: &'a mut Ui, headers: &[&str]) -> egui_extras::Table<'a> {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(MAX_HEIGHT)
        .columns(Column::auto().at_least(70.0), headers.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for name in headers {
                header.col(|ui| {
                    ui.strong(*name);
                });
            }
        })
}

/// Preview of the dataset rows at `indices` (all rows for the overview).
pub fn records_table(ui: &mut Ui, id: &str, dataset: &SalesDataset, indices: &[usize]) {
    let records = dataset.records();
    ui.push_id(id, |ui| {
        table(ui, &COLUMNS).body(|body| {
            body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                let rec = &records[indices[row.index()]];
                let cells = [
                    rec.year.to_string(),
                    rec.region.clone(),
                    rec.model.clone(),
                    rec.fuel_type.clone(),
                    rec.sales_volume.to_string(),
                    rec.price_usd.to_string(),
                    rec.mileage_km.to_string(),
                    rec.engine_size_l.to_string(),
                ];
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
    });
}

/// Historical yearly totals for the forecast region.
pub fn series_table(ui: &mut Ui, series: &RegionYearSeries) {
    ui.push_id("series_table", |ui| {
        table(ui, &["Year", "Sales_Volume"]).body(|body| {
            body.rows(ROW_HEIGHT, series.points.len(), |mut row| {
                let p = series.points[row.index()];
                row.col(|ui| {
                    ui.label(p.year.to_string());
                });
                row.col(|ui| {
                    ui.label(p.sales_volume.to_string());
                });
            });
        });
    });
}

/// Projected years with point estimate and interval bounds.
pub fn forecast_table(ui: &mut Ui, points: &[&ForecastPoint]) {
    ui.push_id("forecast_table", |ui| {
        table(ui, &["Year", "Forecast", "Lower", "Upper"]).body(|body| {
            body.rows(ROW_HEIGHT, points.len(), |mut row| {
                let p = points[row.index()];
                for text in [
                    p.year.to_string(),
                    format!("{:.2}", p.estimate),
                    format!("{:.2}", p.lower),
                    format!("{:.2}", p.upper),
                ] {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
            });
        });
    });
}
