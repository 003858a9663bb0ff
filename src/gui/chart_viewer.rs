//! Chart Viewer Widget
//! The linked line and bar charts, side by side below the map.

use crate::charts::{ChartPlotter, DeathTrendChart, SeriesPlot, UnemploymentChart};
use crate::stats::DeathMetric;
use egui::{ComboBox, RichText};

const CHART_HEIGHT: f32 = 280.0;
const CHART_SPACING: f32 = 15.0;

/// What the viewer reports back to the app for one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChartViewerResponse {
    /// A control took the pointer click, so it must not reach the map.
    pub consumed_click: bool,
    pub metric_changed: Option<DeathMetric>,
}

/// Draws the two chart cards. Stateless: the view models own the data.
pub struct ChartViewer;

impl ChartViewer {
    pub fn show(
        ui: &mut egui::Ui,
        trend: &DeathTrendChart,
        unemployment: &UnemploymentChart,
    ) -> ChartViewerResponse {
        let mut response = ChartViewerResponse::default();
        let card_width = ((ui.available_width() - CHART_SPACING) / 2.0).max(200.0);

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(card_width);
                Self::draw_trend_card(ui, trend, &mut response);
            });

            ui.add_space(CHART_SPACING);

            ui.vertical(|ui| {
                ui.set_width(card_width);
                Self::draw_unemployment_card(ui, unemployment);
            });
        });

        response
    }

    fn draw_trend_card(ui: &mut egui::Ui, trend: &DeathTrendChart, response: &mut ChartViewerResponse) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Overdose Deaths by Year").size(14.0).strong());

            let current = trend.metric();
            let combo = ComboBox::from_id_salt("death_metric")
                .width(260.0)
                .selected_text(current.label())
                .show_ui(ui, |ui| {
                    for metric in DeathMetric::ALL {
                        if ui
                            .selectable_label(current == metric, metric.label())
                            .clicked()
                        {
                            response.metric_changed = Some(metric);
                        }
                    }
                });
            if combo.response.clicked() || combo.inner.is_some() {
                response.consumed_click = true;
            }
        });
        ui.add_space(5.0);

        if Self::no_data(ui, trend.plot()) {
            return;
        }
        if let Some(year) = ChartPlotter::draw_line_chart(ui, "death_trend", trend.plot(), CHART_HEIGHT) {
            if let Some(point) = trend.plot().points.iter().find(|p| p.year == year) {
                ui.label(format!("{}: {:.4}", year, point.value));
            }
        }
    }

    fn draw_unemployment_card(ui: &mut egui::Ui, unemployment: &UnemploymentChart) {
        ui.label(RichText::new("Unemployment by Year").size(14.0).strong());
        ui.add_space(5.0);

        if Self::no_data(ui, unemployment.plot()) {
            return;
        }
        let Some(year) =
            ChartPlotter::draw_bar_chart(ui, "unemployment", unemployment.plot(), CHART_HEIGHT)
        else {
            return;
        };

        let months = unemployment.monthly_breakdown(year);
        if months.is_empty() {
            ui.label(format!("{}", year));
            return;
        }
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(format!("{}:", year)).strong());
            for (month, rate) in months {
                ui.label(format!("M{} {:.1}%", month, rate));
            }
        });
    }

    /// Placeholder for a series with nothing to plot. Returns true if drawn.
    fn no_data(ui: &mut egui::Ui, plot: &SeriesPlot) -> bool {
        if !plot.is_empty() {
            return false;
        }
        ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
        });
        true
    }
}
