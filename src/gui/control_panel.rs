//! Control Panel Widget
//! Left side panel with the dashboard title, usage notes, load status and export.

use egui::{Color32, RichText};

const TITLE: &str = "Visualization of Opioid Overdose Death in the USA";

const METRIC_NOTES: [(&str, &str); 4] = [
    (
        "Deaths",
        "Number of deaths caused by opioid overdoses, also expressed as a percentage of the state population.",
    ),
    (
        "Crude Rate",
        "Deaths per 100,000 people in the state population.",
    ),
    (
        "Prescriptions",
        "Millions of opioid prescriptions dispensed by US retailers in that year.",
    ),
    (
        "Unemployment Rate",
        "Share of the labor force that is unemployed, averaged over the months of each year.",
    ),
];

/// Left side panel. Holds only the status text of the last export.
pub struct ControlPanel {
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the panel. `datasets` is one `(name, status)` line per load.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        datasets: &[(&'static str, String)],
        export_enabled: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new(TITLE)
                    .size(20.0)
                    .strong()
                    .color(Color32::from_rgb(70, 130, 180)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Usage Section =====
        ui.label(RichText::new("How to Use This Dashboard").size(14.0).strong());
        ui.add_space(5.0);
        ui.label(
            "Click a state on the map to filter both charts to that state. \
             Click anywhere outside the states to return to the nationwide view.",
        );
        ui.add_space(5.0);
        for (name, note) in METRIC_NOTES {
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(format!("• {}:", name)).strong());
                ui.label(note);
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Section =====
        ui.label(RichText::new("Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                for (name, status) in datasets {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(*name).size(12.0));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(RichText::new(status).size(12.0).color(status_color(status)));
                        });
                    });
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("Export SVG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportSvg;
                }
            });
        });

        ui.add_space(5.0);
        ui.label(RichText::new(&self.status).size(11.0).color(status_color(&self.status)));

        action
    }
}

fn status_color(status: &str) -> Color32 {
    if status.starts_with("Error") {
        Color32::from_rgb(220, 53, 69)
    } else if status.starts_with("Loading") {
        Color32::GRAY
    } else {
        Color32::from_rgb(40, 167, 69)
    }
}

/// Actions triggered by the control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ExportSvg,
}
