use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use sales_dashboard::data::aggregate::AggregateSummary;
use sales_dashboard::data::filter::YearSelection;
use sales_dashboard::forecast::Horizon;

use crate::state::{AppState, Dimension, Tab};
use crate::ui::{charts, format_optional, format_thousands, tables};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the menu bar, tab selector and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Overall, "Overall Statistics");
        ui.selectable_value(&mut state.tab, Tab::Filtered, "Filtered Statistics");
        ui.selectable_value(&mut state.tab, Tab::Forecast, "Sales Forecasting");

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} rows skipped",
                ds.len(),
                state.rejected_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn kpi_card(ui: &mut Ui, title: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_height(80.0);
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).color(ui.visuals().weak_text_color()));
            ui.label(RichText::new(value).size(24.0).strong());
        });
    });
}

pub fn kpi_row(ui: &mut Ui, summary: &AggregateSummary) {
    ui.columns(4, |cols| {
        kpi_card(
            &mut cols[0],
            "Total Sales Volume",
            format_thousands(summary.total_sales_volume, 0),
        );
        kpi_card(
            &mut cols[1],
            "Average Price (USD)",
            format_optional(summary.avg_price, |v| format!("${}", format_thousands(v, 2))),
        );
        kpi_card(
            &mut cols[2],
            "Average Mileage (KM)",
            format_optional(summary.avg_mileage, |v| format_thousands(v, 0)),
        );
        kpi_card(
            &mut cols[3],
            "Average Engine Size (L)",
            format_optional(summary.avg_engine_size, |v| format!("{v:.2}")),
        );
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter panel for the Filtered Statistics tab.
pub fn filter_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let years: Vec<i32> = dataset.years().iter().copied().collect();
    let available: Vec<(Dimension, Vec<String>)> = Dimension::ALL
        .iter()
        .map(|&dim| (dim, dim.available(dataset).iter().cloned().collect()))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select Year");
            let current = state.criteria.year;
            egui::ComboBox::from_id_salt("year_filter")
                .selected_text(current.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    let choices = std::iter::once(YearSelection::All)
                        .chain(years.iter().map(|&y| YearSelection::Exact(y)));
                    for choice in choices {
                        if ui.selectable_label(current == choice, choice.to_string()).clicked() {
                            state.set_year(choice);
                        }
                    }
                });
            ui.separator();

            // ---- Per-dimension multi-selects (collapsible) ----
            for (dim, values) in &available {
                let n_selected = dim.selected(&mut state.criteria).len();
                let header_text = format!("{}  ({n_selected}/{})", dim.label(), values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(*dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(*dim);
                            }
                        });

                        for value in values {
                            let mut checked = dim.selected(&mut state.criteria).contains(value);
                            let mut text = RichText::new(value);
                            if *dim == Dimension::Region {
                                text = text.color(state.region_colors.color_for(value));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(*dim, value);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Tab bodies (central panel)
// ---------------------------------------------------------------------------

fn open_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a file to view sales data  (File → Open…)");
    });
}

pub fn overall_tab(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.overview) else {
        open_hint(ui);
        return;
    };

    ui.heading("Overall Statistics (Full Dataset)");
    kpi_row(ui, &view.summary);

    ui.add_space(8.0);
    ui.heading("Total Sales by Region");
    charts::region_bar_chart(ui, "overall_bar", &view.region_totals, &state.region_colors);

    ui.heading("Sales Trend Over Years by Region");
    charts::trend_chart(ui, "overall_trend", &view.year_region_totals, &state.region_colors);

    ui.heading("Full Dataset Preview");
    tables::records_table(ui, "overall_table", dataset, &view.indices);
}

pub fn filtered_tab(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.filtered) else {
        open_hint(ui);
        return;
    };

    let year = match state.criteria.year {
        YearSelection::All => "All Years".to_string(),
        YearSelection::Exact(y) => format!("Year {y}"),
    };
    ui.heading(format!("{} Records Found for {year}", view.indices.len()));
    kpi_row(ui, &view.summary);

    ui.add_space(8.0);
    ui.heading("Total Sales by Region (Filtered)");
    charts::region_bar_chart(ui, "filtered_bar", &view.region_totals, &state.region_colors);

    ui.heading("Sales Trend by Region (Filtered)");
    charts::trend_chart(ui, "filtered_trend", &view.year_region_totals, &state.region_colors);

    ui.heading("Regional Contribution Over Time");
    charts::area_chart(ui, "filtered_area", &view.year_region_totals, &state.region_colors);

    ui.heading("Sales Breakdown by Region & Model");
    charts::treemap(ui, &view.region_model_totals, &state.region_colors);

    ui.heading("Filtered Dataset Preview");
    if view.is_empty() {
        ui.label(RichText::new("No records match the current filters.").italics());
    } else {
        tables::records_table(ui, "filtered_table", dataset, &view.indices);
    }
}

pub fn forecast_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        open_hint(ui);
        return;
    };
    let regions: Vec<String> = dataset.regions().iter().cloned().collect();

    ui.heading("Sales Forecasting");

    let current = state.forecast_region.clone().unwrap_or_default();
    egui::ComboBox::from_label("Select Region")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for region in regions {
                if ui.selectable_label(current == region, &region).clicked() {
                    state.set_forecast_region(region);
                }
            }
        });

    let mut years = state.horizon.years();
    let slider = egui::Slider::new(&mut years, Horizon::MIN..=Horizon::MAX).text("Years to Forecast");
    if ui.add(slider).changed() {
        if let Ok(horizon) = Horizon::new(years) {
            state.set_horizon(horizon);
        }
    }

    ui.separator();

    match &state.forecast {
        None => {}
        Some(Err(e)) => {
            ui.label(RichText::new(format!("Cannot forecast: {e}")).color(Color32::RED));
        }
        Some(Ok(result)) => {
            ui.heading(format!("Historical Sales — {}", result.series.region));
            tables::series_table(ui, &result.series);

            ui.heading("Forecasted Sales Table");
            let last_year = result.series.last_year().unwrap_or(i32::MIN);
            let future: Vec<_> = result.forecast.future(last_year).collect();
            tables::forecast_table(ui, &future);

            ui.heading(format!(
                "Forecast for {} ({} years ahead, {})",
                result.series.region,
                state.horizon.years(),
                state.config.forecaster_label()
            ));
            charts::forecast_chart(ui, &result.series, &result.forecast);

            ui.heading("Trend Component");
            charts::trend_component_chart(ui, &result.forecast);
        }
    }
}
