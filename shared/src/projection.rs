//! Web Mercator (EPSG:3857) reprojection and extent math.

use std::f64::consts::PI;

use crate::coords::LonLat;

pub const EARTH_RADIUS: f64 = 6_378_137.0;
/// Half the width of the projected world in meters.
pub const HALF_WORLD: f64 = PI * EARTH_RADIUS;
pub const TILE_SIZE: f64 = 256.0;
/// Resolution (meters per pixel) at zoom 0 for a 256px tile grid.
pub const MAX_RESOLUTION: f64 = 2.0 * HALF_WORLD / TILE_SIZE;

/// A point in display (projected) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Project lon/lat degrees into Web Mercator meters. Y is clamped to the
/// square world; non-finite input stays non-finite.
pub fn from_lon_lat(ll: LonLat) -> Coordinate {
    let x = EARTH_RADIUS * ll.lon.to_radians();
    let mut y = EARTH_RADIUS * (PI * (ll.lat + 90.0) / 360.0).tan().ln();
    if y > HALF_WORLD {
        y = HALF_WORLD;
    } else if y < -HALF_WORLD {
        y = -HALF_WORLD;
    }
    Coordinate::new(x, y)
}

pub fn resolution_for_zoom(zoom: f64) -> f64 {
    MAX_RESOLUTION / 2f64.powf(zoom)
}

pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (MAX_RESOLUTION / resolution).log2()
}

/// Axis-aligned bounding box in projected space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// An inverted extent that any `extend` call replaces.
    pub const fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut extent = Self::empty();
        for c in coords {
            extent.extend(*c);
        }
        extent
    }

    pub fn extend(&mut self, c: Coordinate) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }
}
