use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{AppState, Tab};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters (Filtered Statistics only) ----
        if self.state.tab == Tab::Filtered {
            egui::SidePanel::left("filter_panel")
                .default_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::filter_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.tab {
                    Tab::Overall => panels::overall_tab(ui, &self.state),
                    Tab::Filtered => panels::filtered_tab(ui, &self.state),
                    Tab::Forecast => panels::forecast_tab(ui, &mut self.state),
                });
        });
    }
}
