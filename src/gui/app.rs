//! Opioid Atlas Main Application
//! Main window with the control panel, the map and the linked charts.

use crate::charts::StaticChartRenderer;
use crate::dashboard::Dashboard;
use crate::data::LoadEvent;
use crate::filter::ClickRouter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, MapView};
use egui::SidePanel;
use std::sync::mpsc::Receiver;
use tracing::{info, warn};

/// Size of each exported SVG chart.
const EXPORT_SIZE: (u32, u32) = (800, 500);

/// Main application window.
pub struct DashboardApp {
    dashboard: Dashboard,
    control_panel: ControlPanel,
    map_view: MapView,

    // Background loads; dropped once all three results are in
    load_rx: Option<Receiver<LoadEvent>>,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dashboard: Dashboard,
        load_rx: Receiver<LoadEvent>,
    ) -> Self {
        Self {
            dashboard,
            control_panel: ControlPanel::new(),
            map_view: MapView::new(),
            load_rx: Some(load_rx),
        }
    }

    /// Drain finished loads into the dashboard
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        while let Ok(event) = rx.try_recv() {
            self.dashboard.apply(event);
        }

        if self.dashboard.is_ready() {
            info!("All datasets resolved");
        } else {
            self.load_rx = Some(rx);
        }
    }

    /// Write both charts as SVG files into a user-chosen directory
    fn handle_export_svg(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let deaths_name = format!("deaths_{}", self.dashboard.trend.metric().slug());
        let plots = [
            (deaths_name.as_str(), self.dashboard.trend.plot()),
            ("unemployment", self.dashboard.unemployment.plot()),
        ];

        match StaticChartRenderer::export_svgs(&dir, &plots, EXPORT_SIZE.0, EXPORT_SIZE.1) {
            Ok(written) => {
                self.control_panel
                    .set_status(format!("Exported {} charts to {}", written.len(), dir.display()));
            }
            Err(e) => {
                warn!(error = %e, "SVG export failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Keep polling while loads are outstanding
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        let mut router = ClickRouter::new();

        // Left panel - description, load status, export
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let status = self.dashboard.status_lines();
                    let export_enabled = self.dashboard.is_ready();
                    if self.control_panel.show(ui, &status, export_enabled) == ControlPanelAction::ExportSvg {
                        router.consume();
                        self.handle_export_svg();
                    }
                });
            });

        // Central panel - map above the two charts
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.map_view.show(ui, &self.dashboard.map, &mut router);
                ui.add_space(10.0);
                ui.separator();

                let response =
                    ChartViewer::show(ui, &self.dashboard.trend, &self.dashboard.unemployment);
                if response.consumed_click {
                    router.consume();
                }
                if let Some(metric) = response.metric_changed {
                    info!(metric = metric.label(), "Death metric changed");
                    self.dashboard.trend.set_metric(metric);
                }
            });
        });

        // Any click outside every region and every control resets the selection
        let pointer_clicked = ctx.input(|i| i.pointer.primary_clicked());
        if self.dashboard.resolve_frame(router, pointer_clicked) {
            ctx.request_repaint();
        }
    }
}
