//! Chart Plotter Module
//! Draws the death trend and unemployment series interactively with egui_plot.

use crate::charts::color::Rgb;
use crate::charts::series::SeriesPlot;
use egui::Color32;
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, PlotUi, Points};
use std::ops::RangeInclusive;

/// Hover radius around a dot, in screen pixels.
const DOT_HOVER_RADIUS: f32 = 8.0;
const BAR_WIDTH: f64 = 0.9;

const DOT_RADIUS: f32 = 5.0;
const DOT_HOVER_SIZE: f32 = 7.0;

fn steel() -> Color32 {
    Rgb::STEEL_BLUE.to_egui()
}

fn hover_red() -> Color32 {
    Rgb::RED.to_egui()
}

/// Whole years only; fractional grid marks stay unlabeled.
fn year_tick(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if mark.value.fract() == 0.0 {
        format!("{:.0}", mark.value)
    } else {
        String::new()
    }
}

/// Draws series plots with egui_plot. Each call is a full redraw.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Index of the dot nearest the pointer, if it is close enough.
    fn hovered_dot(plot_ui: &PlotUi, points: &[[f64; 2]]) -> Option<usize> {
        let pointer = plot_ui.pointer_coordinate()?;
        let pointer_screen = plot_ui.screen_from_plot(pointer);

        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let screen = plot_ui.screen_from_plot(PlotPoint::new(p[0], p[1]));
                (i, screen.distance(pointer_screen))
            })
            .filter(|(_, d)| *d <= DOT_HOVER_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Line chart with dots; the hovered dot is enlarged and red.
    ///
    /// Returns the hovered year.
    pub fn draw_line_chart(ui: &mut egui::Ui, id: &str, plot: &SeriesPlot, height: f32) -> Option<i32> {
        let points: Vec<[f64; 2]> = plot
            .points
            .iter()
            .filter(|p| p.value.is_finite())
            .map(|p| [p.year as f64, p.value])
            .collect();

        let (x_min, x_max) = plot.x_range();
        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .x_axis_label(plot.x_label.clone())
            .y_axis_label(plot.y_label.clone())
            .include_x(x_min)
            .include_x(x_max)
            .include_y(0.0)
            .include_y(plot.y_max())
            .x_axis_formatter(year_tick)
            .show(ui, |plot_ui| {
                let hovered = Self::hovered_dot(plot_ui, &points);

                if points.len() > 1 {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(steel())
                            .width(2.0),
                    );
                }

                plot_ui.points(
                    Points::new(PlotPoints::from_iter(
                        points
                            .iter()
                            .enumerate()
                            .filter(|(i, _)| Some(*i) != hovered)
                            .map(|(_, p)| *p),
                    ))
                    .radius(DOT_RADIUS)
                    .filled(true)
                    .color(steel()),
                );

                if let Some(i) = hovered {
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter([points[i]]))
                            .radius(DOT_HOVER_SIZE)
                            .filled(true)
                            .color(hover_red()),
                    );
                }

                hovered.map(|i| points[i][0] as i32)
            })
            .inner
    }

    /// Bar chart; every bar of the hovered year turns red.
    ///
    /// Returns the hovered year.
    pub fn draw_bar_chart(ui: &mut egui::Ui, id: &str, plot: &SeriesPlot, height: f32) -> Option<i32> {
        let (x_min, x_max) = plot.x_range();
        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .x_axis_label(plot.x_label.clone())
            .y_axis_label(plot.y_label.clone())
            .include_x(x_min - BAR_WIDTH / 2.0)
            .include_x(x_max + BAR_WIDTH / 2.0)
            .include_y(0.0)
            .include_y(plot.y_max())
            .x_axis_formatter(year_tick)
            .show(ui, |plot_ui| {
                let hovered = plot_ui.pointer_coordinate().and_then(|pointer| {
                    let year = pointer.x.round();
                    let over_bar = (pointer.x - year).abs() <= BAR_WIDTH / 2.0
                        && plot.points.iter().any(|p| {
                            p.year as f64 == year && pointer.y >= 0.0 && pointer.y <= p.value
                        });
                    over_bar.then_some(year as i32)
                });

                let bars: Vec<Bar> = plot
                    .points
                    .iter()
                    .filter(|p| p.value.is_finite())
                    .map(|p| {
                        let color = if Some(p.year) == hovered {
                            hover_red()
                        } else {
                            steel()
                        };
                        Bar::new(p.year as f64, p.value)
                            .width(BAR_WIDTH)
                            .fill(color)
                            .stroke(egui::Stroke::new(0.5, color))
                    })
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars));
                hovered
            })
            .inner
    }
}
