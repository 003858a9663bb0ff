//! Static Renderer
//! Rasterizes the choropleth for display and writes charts out as SVG, both
//! through plotters.
//!
//! The map is drawn in two passes: fills for every region, then outlines with
//! the highlighted region stroked last so its border sits on top.

use crate::charts::choropleth::ChoroplethMap;
use crate::charts::color::Rgb;
use crate::charts::series::{PlotKind, SeriesPlot};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing backend failed: {0}")]
    Backend(String),
    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

fn backend_err<E: Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Packed RGB pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

fn to_pixels(ring: &[[f64; 2]]) -> Vec<(i32, i32)> {
    ring.iter()
        .map(|&[x, y]| (x.round() as i32, y.round() as i32))
        .collect()
}

pub struct MapRasterizer;

impl MapRasterizer {
    /// Fully redraw the map into a fresh pixel buffer.
    pub fn rasterize(map: &ChoroplethMap) -> Result<RasterImage, RenderError> {
        let (width, height) = map.size();
        let mut rgb = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_err)?;

            for region in map.regions() {
                let fill = map.fill_for(&region.name).to_plotters();
                for polygon in &region.polygons {
                    let mut rings = polygon.iter();
                    if let Some(outer) = rings.next() {
                        root.draw(&Polygon::new(to_pixels(outer), fill.filled()))
                            .map_err(backend_err)?;
                    }
                    for hole in rings {
                        root.draw(&Polygon::new(to_pixels(hole), WHITE.filled()))
                            .map_err(backend_err)?;
                    }
                }
            }

            let highlighted = map.highlighted();
            let (plain, selected): (Vec<_>, Vec<_>) = map
                .regions()
                .iter()
                .partition(|region| Some(region.name.as_str()) != highlighted);

            for region in plain.into_iter().chain(selected) {
                let (color, width): (Rgb, u32) = map.stroke_for(&region.name);
                let style = color.to_plotters().stroke_width(width);
                for ring in region.polygons.iter().flatten() {
                    root.draw(&PathElement::new(to_pixels(ring), style))
                        .map_err(backend_err)?;
                }
            }

            root.present().map_err(backend_err)?;
        }

        Ok(RasterImage { width, height, rgb })
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a line or bar series to an SVG document.
    pub fn render_svg(plot: &SeriesPlot, width: u32, height: u32) -> Result<String, RenderError> {
        let mut svg = String::new();
        let steel = Rgb::STEEL_BLUE.to_plotters();
        let points: Vec<(f64, f64)> = plot
            .points
            .iter()
            .filter(|p| p.value.is_finite())
            .map(|p| (p.year as f64, p.value))
            .collect();

        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_err)?;

            let (x_min, x_max) = plot.x_range();
            let pad = if plot.kind == PlotKind::Bar { 0.5 } else { 0.0 };
            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d((x_min - pad)..(x_max + pad), 0.0..plot.y_max())
                .map_err(backend_err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(plot.x_label.as_str())
                .y_desc(plot.y_label.as_str())
                .x_label_formatter(&|x| format!("{:.0}", x))
                .draw()
                .map_err(backend_err)?;

            match plot.kind {
                PlotKind::Line => {
                    chart
                        .draw_series(LineSeries::new(points.iter().copied(), steel.stroke_width(2)))
                        .map_err(backend_err)?;
                    chart
                        .draw_series(points.iter().map(|&p| Circle::new(p, 5, steel.filled())))
                        .map_err(backend_err)?;
                }
                PlotKind::Bar => {
                    chart
                        .draw_series(points.iter().map(|&(x, y)| {
                            Rectangle::new([(x - 0.45, 0.0), (x + 0.45, y)], steel.filled())
                        }))
                        .map_err(backend_err)?;
                }
            }

            root.present().map_err(backend_err)?;
        }

        Ok(svg)
    }

    /// Write each named plot as `<name>.svg` inside `dir`.
    pub fn export_svgs(
        dir: &Path,
        plots: &[(&str, &SeriesPlot)],
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        let mut written = Vec::with_capacity(plots.len());
        for (name, plot) in plots {
            let svg = Self::render_svg(plot, width, height)?;
            let path = dir.join(format!("{}.svg", name));
            std::fs::write(&path, svg)?;
            info!(path = %path.display(), "Exported chart");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BoundaryCollection, DeathRecord, StateBoundary};
    use crate::filter::{Selection, SelectionListener};

    fn map() -> ChoroplethMap {
        let mut map = ChoroplethMap::new(80, 50);
        map.set_boundaries(&BoundaryCollection {
            regions: vec![StateBoundary {
                name: "Colorado".into(),
                polygons: vec![vec![vec![
                    [-109.05, 37.0],
                    [-102.05, 37.0],
                    [-102.05, 41.0],
                    [-109.05, 41.0],
                    [-109.05, 37.0],
                ]]],
            }],
        });
        map.set_deaths(&[DeathRecord::new("Colorado", 2015, 10.0, 100.0, 1.0, 1.0)]);
        map
    }

    fn pixel(image: &RasterImage, x: u32, y: u32) -> Rgb {
        let i = ((y * image.width + x) * 3) as usize;
        Rgb(image.rgb[i], image.rgb[i + 1], image.rgb[i + 2])
    }

    #[test]
    fn raster_fills_region_with_scale_color() {
        let map = map();
        let image = MapRasterizer::rasterize(&map).unwrap();

        assert_eq!(image.rgb.len(), 80 * 50 * 3);
        assert_eq!(pixel(&image, 40, 25), map.fill_for("Colorado"));
    }

    #[test]
    fn rerender_is_idempotent() {
        let mut map = map();
        map.selection_changed(&Selection::Selected("Colorado".into()));
        let a = MapRasterizer::rasterize(&map).unwrap();
        let b = MapRasterizer::rasterize(&map).unwrap();
        assert_eq!(a, b);
    }
}
