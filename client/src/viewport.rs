use nortus_shared::coords::LonLat;
use nortus_shared::projection::{
    Coordinate, Extent, from_lon_lat, resolution_for_zoom, zoom_for_resolution,
};

pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;
const ZOOM_SENSITIVITY: f64 = 0.002;

/// Screen-space padding in pixels: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

/// View state of the map: a projected center, a resolution in meters per
/// pixel and the pixel size of the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub resolution: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LonLat, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center: from_lon_lat(center),
            resolution: resolution_for_zoom(zoom.clamp(MIN_ZOOM, MAX_ZOOM)),
            width,
            height,
        }
    }

    pub fn zoom(&self) -> f64 {
        zoom_for_resolution(self.resolution)
    }

    /// Convert projected coordinates to container pixels.
    pub fn world_to_screen(&self, c: Coordinate) -> (f64, f64) {
        (
            (c.x - self.center.x) / self.resolution + self.width / 2.0,
            (self.center.y - c.y) / self.resolution + self.height / 2.0,
        )
    }

    /// Convert container pixels to projected coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> Coordinate {
        Coordinate::new(
            self.center.x + (sx - self.width / 2.0) * self.resolution,
            self.center.y - (sy - self.height / 2.0) * self.resolution,
        )
    }

    pub fn visible_extent(&self) -> Extent {
        let half_w = self.width / 2.0 * self.resolution;
        let half_h = self.height / 2.0 * self.resolution;
        Extent {
            min_x: self.center.x - half_w,
            min_y: self.center.y - half_h,
            max_x: self.center.x + half_w,
            max_y: self.center.y + half_h,
        }
    }

    /// Move the map content by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center.x -= dx * self.resolution;
        self.center.y += dy * self.resolution;
    }

    /// Zoom toward a focus point (container pixels).
    pub fn zoom_at(&mut self, delta: f64, sx: f64, sy: f64) {
        let focus = self.screen_to_world(sx, sy);
        let factor = (delta * ZOOM_SENSITIVITY).exp();
        let min_res = resolution_for_zoom(MAX_ZOOM);
        let max_res = resolution_for_zoom(MIN_ZOOM);
        let new_res = (self.resolution * factor).clamp(min_res, max_res);

        // Keep the point under the cursor fixed
        self.center.x = focus.x - (sx - self.width / 2.0) * new_res;
        self.center.y = focus.y + (sy - self.height / 2.0) * new_res;
        self.resolution = new_res;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
        }
    }

    /// The view that shows `extent` inside the padded area, never zoomed in
    /// past `max_zoom`.
    pub fn fitted(&self, extent: &Extent, padding: Padding, max_zoom: f64) -> Viewport {
        let inner_w = (self.width - padding.left - padding.right).max(1.0);
        let inner_h = (self.height - padding.top - padding.bottom).max(1.0);

        let min_res = resolution_for_zoom(max_zoom.min(MAX_ZOOM));
        let max_res = resolution_for_zoom(MIN_ZOOM);
        let wanted = (extent.width() / inner_w).max(extent.height() / inner_h);
        let resolution = if wanted.is_finite() {
            wanted.clamp(min_res, max_res)
        } else {
            min_res
        };

        let center = extent.center();
        Viewport {
            center: Coordinate::new(
                center.x + (padding.right - padding.left) / 2.0 * resolution,
                center.y + (padding.top - padding.bottom) / 2.0 * resolution,
            ),
            resolution,
            width: self.width,
            height: self.height,
        }
    }

    /// Pan just enough for a screen rectangle to sit `margin` pixels inside the
    /// container. Returns whether the view moved.
    pub fn pan_into_view(&mut self, left: f64, top: f64, right: f64, bottom: f64, margin: f64) -> bool {
        let dx = if left < margin {
            margin - left
        } else if right > self.width - margin {
            (self.width - margin - right).max(margin - left)
        } else {
            0.0
        };
        let dy = if top < margin {
            margin - top
        } else if bottom > self.height - margin {
            (self.height - margin - bottom).max(margin - top)
        } else {
            0.0
        };

        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        self.pan(dx, dy);
        true
    }
}
