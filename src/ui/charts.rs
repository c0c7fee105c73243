use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use sales_dashboard::data::aggregate::RegionYearSeries;
use sales_dashboard::forecast::Forecast;

use crate::color::ColorMap;
use crate::ui::format_thousands;

const CHART_HEIGHT: f32 = 300.0;

fn no_data(ui: &mut Ui) {
    ui.label(egui::RichText::new("No data for the current selection.").italics());
}

// ---------------------------------------------------------------------------
// Total sales by region (bar chart)
// ---------------------------------------------------------------------------

pub fn region_bar_chart(ui: &mut Ui, id: &str, totals: &BTreeMap<String, f64>, colors: &ColorMap) {
    if totals.is_empty() {
        no_data(ui);
        return;
    }

    let regions: Vec<String> = totals.keys().cloned().collect();
    let charts: Vec<BarChart> = totals
        .iter()
        .enumerate()
        .map(|(i, (region, &volume))| {
            let bar = Bar::new(i as f64, volume)
                .width(0.6)
                .name(format!("{region}: {}", format_thousands(volume, 0)));
            BarChart::new(vec![bar])
                .color(colors.color_for(region))
                .name(region)
        })
        .collect();

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Sales_Volume")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                regions.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Sales trend per region (line chart) and stacked contribution (area chart)
// ---------------------------------------------------------------------------

/// Pivot (year, region) totals into one sorted series per region.
fn series_by_region(totals: &BTreeMap<(i32, String), f64>) -> BTreeMap<&str, Vec<[f64; 2]>> {
    let mut by_region: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for ((year, region), &volume) in totals {
        by_region
            .entry(region.as_str())
            .or_default()
            .push([*year as f64, volume]);
    }
    by_region
}

pub fn trend_chart(ui: &mut Ui, id: &str, totals: &BTreeMap<(i32, String), f64>, colors: &ColorMap) {
    if totals.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Sales_Volume")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (region, points) in series_by_region(totals) {
                let color = colors.color_for(region);
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(region)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(Points::new(points).name(region).color(color).radius(3.0));
            }
        });
}

/// Cumulative (lower, upper) band per region and year; regions stack in
/// name order and a region missing in a year contributes zero.
pub fn stack_bands(totals: &BTreeMap<(i32, String), f64>) -> BTreeMap<String, Vec<(f64, f64, f64)>> {
    let years: BTreeSet<i32> = totals.keys().map(|(y, _)| *y).collect();
    let regions: BTreeSet<&String> = totals.keys().map(|(_, r)| r).collect();

    let mut bands: BTreeMap<String, Vec<(f64, f64, f64)>> = BTreeMap::new();
    for &year in &years {
        let mut base = 0.0;
        for region in &regions {
            let volume = totals.get(&(year, (*region).clone())).copied().unwrap_or(0.0);
            bands
                .entry((*region).clone())
                .or_default()
                .push((year as f64, base, base + volume));
            base += volume;
        }
    }
    bands
}

pub fn area_chart(ui: &mut Ui, id: &str, totals: &BTreeMap<(i32, String), f64>, colors: &ColorMap) {
    if totals.is_empty() {
        no_data(ui);
        return;
    }

    let bands = stack_bands(totals);
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Sales_Volume")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (region, band) in &bands {
                let color = colors.color_for(region);
                // One trapezoid per year interval keeps every polygon convex.
                for w in band.windows(2) {
                    let ((x0, lo0, hi0), (x1, lo1, hi1)) = (w[0], w[1]);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(vec![[x0, lo0], [x1, lo1], [x1, hi1], [x0, hi0]]))
                            .name(region)
                            .fill_color(color.gamma_multiply(0.5))
                            .stroke(Stroke::NONE),
                    );
                }
                let top: Vec<[f64; 2]> = band.iter().map(|&(x, _, hi)| [x, hi]).collect();
                plot_ui.line(Line::new(PlotPoints::from(top)).name(region).color(color));
            }
        });
}

// ---------------------------------------------------------------------------
// Region & model breakdown (treemap)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TreemapCell {
    pub region: String,
    pub model: String,
    pub volume: f64,
    pub rect: Rect,
}

/// Slice-and-dice layout: regions split the width by their share, models
/// split each region column by height.
pub fn treemap_layout(totals: &BTreeMap<(String, String), f64>, area: Rect) -> Vec<TreemapCell> {
    let mut regions: BTreeMap<&str, Vec<(&str, f64)>> = BTreeMap::new();
    for ((region, model), &volume) in totals {
        if volume > 0.0 {
            regions
                .entry(region.as_str())
                .or_default()
                .push((model.as_str(), volume));
        }
    }
    let grand_total: f64 = regions.values().flatten().map(|(_, v)| v).sum();
    if grand_total <= 0.0 {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut x = area.left();
    for (region, models) in regions {
        let region_total: f64 = models.iter().map(|(_, v)| v).sum();
        let width = area.width() * (region_total / grand_total) as f32;
        let mut y = area.top();
        for (model, volume) in models {
            let height = area.height() * (volume / region_total) as f32;
            cells.push(TreemapCell {
                region: region.to_string(),
                model: model.to_string(),
                volume,
                rect: Rect::from_min_max(Pos2::new(x, y), Pos2::new(x + width, y + height)),
            });
            y += height;
        }
        x += width;
    }
    cells
}

pub fn treemap(ui: &mut Ui, totals: &BTreeMap<(String, String), f64>, colors: &ColorMap) {
    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (area, response) = ui.allocate_exact_size(size, Sense::hover());
    let cells = treemap_layout(totals, area);
    if cells.is_empty() {
        ui.painter().text(
            area.center(),
            Align2::CENTER_CENTER,
            "No data for the current selection.",
            FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        return;
    }

    let per_region: BTreeMap<&str, usize> = cells.iter().fold(BTreeMap::new(), |mut m, c| {
        *m.entry(c.region.as_str()).or_insert(0) += 1;
        m
    });
    let mut index_in_region: BTreeMap<&str, usize> = BTreeMap::new();

    for cell in &cells {
        let idx = index_in_region.entry(cell.region.as_str()).or_insert(0);
        let color = colors.shade_for(&cell.region, *idx, per_region[cell.region.as_str()]);
        *idx += 1;

        let rect = cell.rect.shrink(1.0);
        let painter = ui.painter().with_clip_rect(rect);
        painter.rect_filled(rect, 2.0, color);
        if rect.height() > 14.0 && rect.width() > 30.0 {
            painter.text(
                rect.left_top() + egui::vec2(4.0, 2.0),
                Align2::LEFT_TOP,
                format!("{} / {}", cell.region, cell.model),
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }
    }

    if let Some(pos) = response.hover_pos() {
        if let Some(cell) = cells.iter().find(|c| c.rect.contains(pos)) {
            response.on_hover_text_at_pointer(format!(
                "{} / {}\nSales_Volume: {}",
                cell.region,
                cell.model,
                format_thousands(cell.volume, 0)
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast and trend component
// ---------------------------------------------------------------------------

pub fn forecast_chart(ui: &mut Ui, series: &RegionYearSeries, forecast: &Forecast) {
    let actual: Vec<[f64; 2]> = series
        .points
        .iter()
        .map(|p| [p.year as f64, p.sales_volume])
        .collect();
    let estimate: Vec<[f64; 2]> = forecast
        .points
        .iter()
        .map(|p| [p.year as f64, p.estimate])
        .collect();
    let band_color = Color32::from_rgba_unmultiplied(100, 150, 250, 60);

    Plot::new("forecast_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT + 100.0)
        .x_axis_label("Year")
        .y_axis_label("Sales Volume")
        .show(ui, |plot_ui| {
            for w in forecast.points.windows(2) {
                let (a, b) = (w[0], w[1]);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(vec![
                        [a.year as f64, a.lower],
                        [b.year as f64, b.lower],
                        [b.year as f64, b.upper],
                        [a.year as f64, a.upper],
                    ]))
                    .name("Confidence Interval")
                    .fill_color(band_color)
                    .stroke(Stroke::NONE),
                );
            }
            plot_ui.line(
                Line::new(PlotPoints::from(estimate))
                    .name("Forecast")
                    .width(3.0),
            );
            plot_ui.line(Line::new(PlotPoints::from(actual.clone())).name("Actual"));
            plot_ui.points(Points::new(actual).name("Actual").radius(3.0));
        });
}

pub fn trend_component_chart(ui: &mut Ui, forecast: &Forecast) {
    let trend: Vec<[f64; 2]> = forecast
        .trend
        .iter()
        .map(|p| [p.year as f64, p.value])
        .collect();

    Plot::new("trend_component_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("trend")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(trend)).name("Underlying Trend"));
        });
}
