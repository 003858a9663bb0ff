//! Charts module - view models, projection and rendering

pub mod choropleth;
pub mod color;
pub mod projection;
mod plotter;
mod renderer;
pub mod series;
mod trend;

pub use choropleth::ChoroplethMap;
pub use plotter::ChartPlotter;
pub use renderer::{MapRasterizer, StaticChartRenderer};
pub use series::SeriesPlot;
pub use trend::{DeathTrendChart, UnemploymentChart};
