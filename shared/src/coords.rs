use crate::location::RawCoord;

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

fn in_lon_range(v: f64) -> bool {
    (-180.0..=180.0).contains(&v)
}

fn in_lat_range(v: f64) -> bool {
    (-90.0..=90.0).contains(&v)
}

/// Resolve a coordinate pair of unknown order into lon/lat.
///
/// The pair is read as `(a, b) = (raw[1], raw[0])`. When both readings are
/// valid the lon/lat reading wins. A pair that fits neither reading is returned
/// as-is; callers drop it if it does not project to a finite point.
pub fn normalize_input_coords(raw: &[RawCoord]) -> LonLat {
    if raw.len() < 2 {
        return LonLat::new(0.0, 0.0);
    }
    normalize_pair(raw[0].as_f64(), raw[1].as_f64())
}

/// Same as [`normalize_input_coords`] for an already numeric pair.
pub fn normalize_pair(first: f64, second: f64) -> LonLat {
    let a = second;
    let b = first;
    if a.is_nan() || b.is_nan() {
        return LonLat::new(0.0, 0.0);
    }

    if in_lon_range(a) && in_lat_range(b) {
        return LonLat::new(a, b);
    }

    if in_lat_range(a) && in_lon_range(b) {
        return LonLat::new(b, a);
    }

    LonLat::new(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[f64]) -> Vec<RawCoord> {
        values.iter().copied().map(RawCoord::from).collect()
    }

    #[test]
    fn keeps_lon_lat_order_when_already_valid() {
        let got = normalize_input_coords(&raw(&[-51.9, -14.2]));
        assert_eq!(got, LonLat::new(-14.2, -51.9));
    }

    #[test]
    fn swaps_lat_lon_when_only_swap_is_valid() {
        assert_eq!(
            normalize_input_coords(&raw(&[45.0, 120.0])),
            LonLat::new(120.0, 45.0)
        );
        // 120 cannot be a latitude, so the pair is flipped.
        assert_eq!(
            normalize_input_coords(&raw(&[120.0, 45.0])),
            LonLat::new(120.0, 45.0)
        );
    }

    #[test]
    fn second_component_is_read_as_longitude_first() {
        assert_eq!(normalize_pair(-14.2, -51.9), LonLat::new(-51.9, -14.2));
        assert_eq!(normalize_pair(-51.9, -14.2), LonLat::new(-14.2, -51.9));
    }

    #[test]
    fn overlap_prefers_lon_lat_reading() {
        assert_eq!(normalize_pair(10.0, 20.0), LonLat::new(20.0, 10.0));
    }

    #[test]
    fn out_of_range_values_pass_through() {
        assert_eq!(normalize_pair(500.0, 300.0), LonLat::new(300.0, 500.0));
        assert_eq!(normalize_pair(-14.2, 999.0), LonLat::new(999.0, -14.2));
    }

    #[test]
    fn non_numeric_or_short_input_yields_origin() {
        assert_eq!(normalize_input_coords(&[]), LonLat::new(0.0, 0.0));
        assert_eq!(normalize_input_coords(&raw(&[1.0])), LonLat::new(0.0, 0.0));
        let mixed = vec![RawCoord::Text("north".into()), RawCoord::Number(10.0)];
        assert_eq!(normalize_input_coords(&mixed), LonLat::new(0.0, 0.0));
    }

    #[test]
    fn infinite_input_is_passed_on_for_the_finite_check() {
        let got = normalize_pair(f64::INFINITY, 10.0);
        assert!(!got.is_finite());
    }
}
