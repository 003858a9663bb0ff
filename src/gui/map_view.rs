//! Map View Widget
//! Shows the rasterized choropleth as a texture, hit-tests clicks and hovers
//! against the projected regions, and draws the color legend.

use crate::charts::choropleth::LEGEND_CELLS;
use crate::charts::{ChoroplethMap, MapRasterizer};
use crate::filter::ClickRouter;
use egui::load::SizedTexture;
use egui::{Color32, ColorImage, Pos2, Rect, RichText, Sense, TextureHandle, TextureOptions};
use tracing::{debug, warn};

const LEGEND_CELL_WIDTH: f32 = 14.0;
const LEGEND_CELL_HEIGHT: f32 = 12.0;

/// Map canvas with a cached texture, re-rasterized when the model's revision moves.
#[derive(Default)]
pub struct MapView {
    texture: Option<TextureHandle>,
    revision: Option<u64>,
    error: Option<String>,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh_texture(&mut self, ctx: &egui::Context, map: &ChoroplethMap) {
        if self.revision == Some(map.revision()) {
            return;
        }
        self.revision = Some(map.revision());

        match MapRasterizer::rasterize(map) {
            Ok(raster) => {
                let image = ColorImage::from_rgb(
                    [raster.width as usize, raster.height as usize],
                    &raster.rgb,
                );
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::LINEAR),
                    None => {
                        self.texture = Some(ctx.load_texture("choropleth", image, TextureOptions::LINEAR))
                    }
                }
                self.error = None;
                debug!(revision = map.revision(), "Map re-rasterized");
            }
            Err(e) => {
                warn!(error = %e, "Map rasterization failed");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Draw the map and legend. Region hits go to `router`.
    pub fn show(&mut self, ui: &mut egui::Ui, map: &ChoroplethMap, router: &mut ClickRouter) {
        if map.regions().is_empty() {
            ui.label(RichText::new("No Map Data").size(20.0));
            return;
        }

        self.refresh_texture(ui.ctx(), map);
        if let Some(error) = &self.error {
            ui.label(RichText::new(format!("Error: {}", error)).color(Color32::from_rgb(220, 53, 69)));
        }
        let Some(texture) = &self.texture else {
            return;
        };

        let (width, height) = map.size();
        let scale = display_scale(ui.available_width(), width);
        let size = egui::vec2(width as f32 * scale, height as f32 * scale);

        let response = ui.add(
            egui::Image::new(SizedTexture::new(texture.id(), size))
                .fit_to_exact_size(size)
                .sense(Sense::click()),
        );

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let [x, y] = canvas_position(pos, response.rect, scale);
                if let Some(name) = map.region_at(x, y) {
                    router.region_clicked(name);
                }
            }
        }

        if let Some(pos) = response.hover_pos() {
            let [x, y] = canvas_position(pos, response.rect, scale);
            if let Some(name) = map.region_at(x, y) {
                let text = match map.total_deaths(name) {
                    Some(total) => format!("{}\nTotal deaths: {:.0}", name, total),
                    None => format!("{}\nNo data", name),
                };
                response.on_hover_text(text);
            }
        }

        ui.add_space(8.0);
        Self::draw_legend(ui, map);
    }

    fn draw_legend(ui: &mut egui::Ui, map: &ChoroplethMap) {
        ui.label(RichText::new("Number of Deaths").size(12.0).strong());

        let ramp_width = LEGEND_CELL_WIDTH * LEGEND_CELLS as f32;
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ramp_width, LEGEND_CELL_HEIGHT),
            Sense::hover(),
        );
        for (i, color) in map.legend_cells().into_iter().enumerate() {
            let min = rect.min + egui::vec2(i as f32 * LEGEND_CELL_WIDTH, 0.0);
            let cell = Rect::from_min_size(min, egui::vec2(LEGEND_CELL_WIDTH, LEGEND_CELL_HEIGHT));
            ui.painter().rect_filled(cell, 0.0, color.to_egui());
        }

        ui.allocate_ui(egui::vec2(ramp_width, 14.0), |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("0").size(11.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(format!("{:.0}", map.max_deaths())).size(11.0));
                });
            });
        });
    }
}

/// Shrink factor so the canvas fits the available width; never enlarges.
fn display_scale(available: f32, canvas_width: u32) -> f32 {
    if canvas_width == 0 || available <= 0.0 {
        return 1.0;
    }
    (available / canvas_width as f32).min(1.0)
}

/// Screen position to canvas pixel coordinates.
fn canvas_position(pos: Pos2, rect: Rect, scale: f32) -> [f64; 2] {
    let local = (pos - rect.min) / scale;
    [local.x as f64, local.y as f64]
}
