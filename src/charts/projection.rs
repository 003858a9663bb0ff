//! Map Projection
//! Composite Albers equal-area projection for the US: the lower 48 states plus
//! Alaska and Hawaii insets, fitted to a pixel extent.

use crate::data::BoundaryCollection;

/// Conic equal-area projection with its own rotation, center and parallels.
#[derive(Debug, Clone, Copy)]
struct ConicEqualArea {
    rotate: f64,
    n: f64,
    c: f64,
    r0: f64,
    center: [f64; 2],
}

impl ConicEqualArea {
    fn new(rotate: f64, center: [f64; 2], parallels: [f64; 2]) -> Self {
        let sy0 = parallels[0].to_radians().sin();
        let n = (sy0 + parallels[1].to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;
        let mut proj = Self {
            rotate,
            n,
            c,
            r0,
            center: [0.0, 0.0],
        };
        proj.center = proj.raw(center[0].to_radians(), center[1].to_radians());
        proj
    }

    fn raw(&self, lambda: f64, phi: f64) -> [f64; 2] {
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let x = lambda * self.n;
        [r * x.sin(), self.r0 - r * x.cos()]
    }

    /// Projected position relative to the center, in unit scale, y pointing up.
    fn project(&self, lon: f64, lat: f64) -> [f64; 2] {
        let lambda = wrap_degrees(lon + self.rotate).to_radians();
        let p = self.raw(lambda, lat.to_radians());
        [p[0] - self.center[0], p[1] - self.center[1]]
    }
}

fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Albers USA fitted to a `width x height` pixel canvas.
#[derive(Debug, Clone, Copy)]
pub struct AlbersUsa {
    lower48: ConicEqualArea,
    alaska: ConicEqualArea,
    hawaii: ConicEqualArea,
    scale: f64,
    translate: [f64; 2],
}

impl Default for AlbersUsa {
    fn default() -> Self {
        Self {
            lower48: ConicEqualArea::new(96.0, [-0.6, 38.7], [29.5, 45.5]),
            alaska: ConicEqualArea::new(154.0, [-2.0, 58.5], [55.0, 65.0]),
            hawaii: ConicEqualArea::new(157.0, [-3.0, 19.9], [8.0, 18.0]),
            scale: 1.0,
            translate: [0.0, 0.0],
        }
    }
}

impl AlbersUsa {
    /// Position at scale 1 with insets applied, y pointing down.
    fn unit(&self, lon: f64, lat: f64) -> [f64; 2] {
        let (proj, inset_scale, offset) = if lat >= 50.0 && (lon < -129.0 || lon > 170.0) {
            (&self.alaska, 0.35, [-0.307, 0.201])
        } else if lat < 24.0 && lon < -150.0 {
            (&self.hawaii, 1.0, [-0.205, 0.212])
        } else {
            (&self.lower48, 1.0, [0.0, 0.0])
        };
        let p = proj.project(lon, lat);
        [offset[0] + inset_scale * p[0], offset[1] - inset_scale * p[1]]
    }

    /// Fit every boundary vertex into the canvas, centered.
    pub fn fit(boundaries: &BoundaryCollection, width: f64, height: f64) -> Self {
        let mut projection = Self::default();

        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        let vertices = boundaries
            .regions
            .iter()
            .flat_map(|r| r.polygons.iter())
            .flat_map(|p| p.iter())
            .flat_map(|ring| ring.iter());
        for &[lon, lat] in vertices {
            let p = projection.unit(lon, lat);
            if p[0].is_finite() && p[1].is_finite() {
                min = [min[0].min(p[0]), min[1].min(p[1])];
                max = [max[0].max(p[0]), max[1].max(p[1])];
            }
        }

        let dx = max[0] - min[0];
        let dy = max[1] - min[1];
        if !(dx > 0.0 && dy > 0.0) {
            projection.translate = [width / 2.0, height / 2.0];
            return projection;
        }

        let k = (width / dx).min(height / dy);
        projection.scale = k;
        projection.translate = [
            (width - k * (max[0] + min[0])) / 2.0,
            (height - k * (max[1] + min[1])) / 2.0,
        ];
        projection
    }

    /// Pixel position of a longitude/latitude pair.
    pub fn project(&self, lon: f64, lat: f64) -> [f64; 2] {
        let p = self.unit(lon, lat);
        [
            self.translate[0] + self.scale * p[0],
            self.translate[1] + self.scale * p[1],
        ]
    }
}
