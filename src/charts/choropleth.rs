//! Choropleth Map Model
//! Projected state regions colored by total deaths, with the selected region
//! highlighted and point hit-testing for clicks.

use crate::charts::color::{Rgb, SequentialScale};
use crate::charts::projection::AlbersUsa;
use crate::data::{BoundaryCollection, DeathRecord};
use crate::filter::{Selection, SelectionListener};
use crate::stats::Aggregator;
use std::collections::BTreeMap;

/// Number of cells in the legend ramp.
pub const LEGEND_CELLS: usize = 20;

pub const DEFAULT_STROKE: (Rgb, u32) = (Rgb::WHITE, 1);
pub const HIGHLIGHT_STROKE: (Rgb, u32) = (Rgb::BLACK, 2);

/// A polygon in pixel space: outer ring first, then holes.
pub type PixelPolygon = Vec<Vec<[f64; 2]>>;

#[derive(Debug, Clone)]
pub struct ProjectedRegion {
    pub name: String,
    pub polygons: Vec<PixelPolygon>,
}

impl ProjectedRegion {
    /// Even-odd test over every ring, so holes are excluded.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.polygons.iter().any(|polygon| {
            polygon
                .iter()
                .filter(|ring| ring_contains(ring, x, y))
                .count()
                % 2
                == 1
        })
    }
}

/// Ray-casting point-in-ring test.
pub fn ring_contains(ring: &[[f64; 2]], x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Everything needed to draw the map; redrawn in full whenever `revision` moves.
#[derive(Debug, Clone)]
pub struct ChoroplethMap {
    width: u32,
    height: u32,
    regions: Vec<ProjectedRegion>,
    deaths_by_state: BTreeMap<String, f64>,
    scale: SequentialScale,
    highlighted: Option<String>,
    revision: u64,
}

impl ChoroplethMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            regions: Vec::new(),
            deaths_by_state: BTreeMap::new(),
            scale: SequentialScale::new((0.0, 0.0)),
            highlighted: None,
            revision: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn regions(&self) -> &[ProjectedRegion] {
        &self.regions
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Project the boundaries into the canvas.
    pub fn set_boundaries(&mut self, boundaries: &BoundaryCollection) {
        let projection = AlbersUsa::fit(boundaries, self.width as f64, self.height as f64);
        self.regions = boundaries
            .regions
            .iter()
            .map(|region| ProjectedRegion {
                name: region.name.clone(),
                polygons: region
                    .polygons
                    .iter()
                    .map(|polygon| {
                        polygon
                            .iter()
                            .map(|ring| {
                                ring.iter()
                                    .map(|&[lon, lat]| projection.project(lon, lat))
                                    .collect()
                            })
                            .collect()
                    })
                    .collect(),
            })
            .collect();
        self.revision += 1;
    }

    /// Recompute per-state totals and the color domain.
    pub fn set_deaths(&mut self, records: &[DeathRecord]) {
        self.deaths_by_state = Aggregator::aggregate_deaths_by_state(records);
        self.scale = SequentialScale::new(Aggregator::color_domain(&self.deaths_by_state));
        self.revision += 1;
    }

    pub fn max_deaths(&self) -> f64 {
        self.scale.domain().1
    }

    pub fn total_deaths(&self, state: &str) -> Option<f64> {
        self.deaths_by_state.get(state).copied()
    }

    /// Fill for a region; states without records use the zero color.
    pub fn fill_for(&self, state: &str) -> Rgb {
        self.scale.color(self.total_deaths(state).unwrap_or(0.0))
    }

    pub fn stroke_for(&self, state: &str) -> (Rgb, u32) {
        if self.highlighted.as_deref() == Some(state) {
            HIGHLIGHT_STROKE
        } else {
            DEFAULT_STROKE
        }
    }

    /// Topmost region under a pixel position.
    pub fn region_at(&self, x: f64, y: f64) -> Option<&str> {
        self.regions
            .iter()
            .rev()
            .find(|region| region.contains(x, y))
            .map(|region| region.name.as_str())
    }

    /// Legend ramp colors, cell `i` showing `i * max / LEGEND_CELLS`.
    pub fn legend_cells(&self) -> Vec<Rgb> {
        let max = self.max_deaths();
        (0..LEGEND_CELLS)
            .map(|i| self.scale.color(i as f64 * max / LEGEND_CELLS as f64))
            .collect()
    }
}

impl SelectionListener for ChoroplethMap {
    fn selection_changed(&mut self, selection: &Selection) {
        self.highlighted = selection.state().map(str::to_string);
        self.revision += 1;
    }
}
