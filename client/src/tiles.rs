use nortus_shared::projection::{Coordinate, HALF_WORLD, MAX_RESOLUTION, TILE_SIZE};

use crate::viewport::Viewport;

/// Dark CARTO basemap. `{a-d}` picks a subdomain, `{r}` the retina suffix.
pub const BASEMAP_URL_TEMPLATE: &str =
    "https://{a-d}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";
pub const BASEMAP_MAX_ZOOM: u8 = 20;

// Horizontal copies of the world drawn at most, so a wide container at low
// zoom never asks for an unbounded tile row.
const MAX_WORLD_COPIES: i64 = 3;

/// Where a tile lands in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

/// Grid cell of the tile pyramid. `x` is unwrapped so copies east or west
/// of the antimeridian keep distinct positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub z: u8,
    pub x: i64,
    pub y: i64,
}

impl TileCoord {
    pub fn wrapped_x(&self) -> i64 {
        self.x.rem_euclid(1_i64 << self.z)
    }

    /// World span of one tile side at this zoom.
    pub fn span(&self) -> f64 {
        TILE_SIZE * MAX_RESOLUTION / f64::from(1_u32 << self.z)
    }

    /// Unique per grid cell, including wrapped copies.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    pub fn url(&self, template: &str, retina: bool) -> String {
        tile_url(template, self.z, self.wrapped_x(), self.y, retina)
    }

    pub fn screen_rect(&self, vp: &Viewport) -> TileRect {
        let span = self.span();
        let world_left = -HALF_WORLD + self.x as f64 * span;
        let world_top = HALF_WORLD - self.y as f64 * span;
        let (left, top) = vp.world_to_screen(Coordinate::new(world_left, world_top));
        TileRect {
            left,
            top,
            size: span / vp.resolution,
        }
    }
}

/// Integer zoom level of the tiles fetched for a view.
pub fn tile_zoom(vp: &Viewport) -> u8 {
    let z = vp.zoom().round();
    if z.is_finite() {
        z.clamp(0.0, f64::from(BASEMAP_MAX_ZOOM)) as u8
    } else {
        0
    }
}

/// Grid cells covering the visible area.
pub fn visible_tile_coords(vp: &Viewport) -> Vec<TileCoord> {
    let z = tile_zoom(vp);
    let n = 1_i64 << z;
    let span = TileCoord { z, x: 0, y: 0 }.span();
    let ext = vp.visible_extent();
    if !ext.is_finite() {
        return Vec::new();
    }

    let x_min = ((ext.min_x + HALF_WORLD) / span).floor() as i64;
    let x_max = ((ext.max_x + HALF_WORLD) / span).ceil() as i64 - 1;
    let y_min = (((HALF_WORLD - ext.max_y) / span).floor() as i64).max(0);
    let y_max = (((HALF_WORLD - ext.min_y) / span).ceil() as i64 - 1).min(n - 1);

    let x_limit = n * MAX_WORLD_COPIES;
    let x_max = x_max.min(x_min + x_limit - 1);

    let mut coords = Vec::new();
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            coords.push(TileCoord { z, x, y });
        }
    }
    coords
}

/// Expand an XYZ url template. A `{a-d}` style range picks one character
/// from the range based on the tile position.
pub fn tile_url(template: &str, z: u8, x: i64, y: i64, retina: bool) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let token = &rest[open + 1..open + close];
        match token {
            "z" => out.push_str(&z.to_string()),
            "x" => out.push_str(&x.to_string()),
            "y" => out.push_str(&y.to_string()),
            "r" => {
                if retina {
                    out.push_str("@2x");
                }
            }
            _ => match subdomain_range(token) {
                Some((first, last)) => {
                    let count = i64::from(last as u8 - first as u8) + 1;
                    let offset = (x + y).rem_euclid(count) as u8;
                    out.push((first as u8 + offset) as char);
                }
                None => out.push_str(&rest[open..=open + close]),
            },
        }
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn subdomain_range(token: &str) -> Option<(char, char)> {
    let mut chars = token.chars();
    let (first, dash, last) = (chars.next()?, chars.next()?, chars.next()?);
    if chars.next().is_some() || dash != '-' {
        return None;
    }
    (first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric() && first <= last)
        .then_some((first, last))
}
