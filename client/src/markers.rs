use nortus_shared::marker::{MARKER_SIZE_PX, marker_icon_src};
use nortus_shared::projection::{Coordinate, Extent, from_lon_lat};
use nortus_shared::{Location, normalize_input_coords};

use crate::viewport::Viewport;

/// One drawable point feature on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location: Location,
    pub position: Coordinate,
    pub icon_src: String,
}

impl Marker {
    /// Build the marker for a location, or None when its coordinates do not
    /// normalize to finite numbers.
    pub fn for_location(location: &Location) -> Option<Self> {
        let lon_lat = normalize_input_coords(&location.coordinates);
        if !lon_lat.is_finite() {
            return None;
        }
        let position = from_lon_lat(lon_lat);
        if !position.is_finite() {
            return None;
        }
        Some(Self {
            icon_src: marker_icon_src(&location.icon, location.accent_color(), MARKER_SIZE_PX),
            position,
            location: location.clone(),
        })
    }
}

/// The vector layer holding one marker per drawable location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    generation: u64,
}

impl MarkerLayer {
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Replace every marker with those built from `locations`.
    /// Returns how many were drawable.
    pub fn rebuild(&mut self, locations: &[Location]) -> usize {
        self.clear();
        self.generation = self.generation.wrapping_add(1);
        self.markers
            .extend(locations.iter().filter_map(Marker::for_location));
        self.markers.len()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Bumped on every rebuild so views can tell old features from new ones.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn extent(&self) -> Extent {
        Extent::from_coords(self.markers.iter().map(|m| &m.position))
    }

    /// Whether a location with `id` still has a marker.
    pub fn contains_id(&self, id: &str) -> bool {
        self.markers.iter().any(|m| m.location.id == id)
    }

    /// Topmost marker whose icon box contains the container pixel. Later
    /// markers draw above earlier ones.
    pub fn hit_test(&self, vp: &Viewport, sx: f64, sy: f64) -> Option<&Marker> {
        let half = f64::from(MARKER_SIZE_PX) / 2.0;
        self.markers.iter().rev().find(|marker| {
            let (mx, my) = vp.world_to_screen(marker.position);
            (sx - mx).abs() <= half && (sy - my).abs() <= half
        })
    }
}
