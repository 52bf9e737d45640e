use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const MARKER_SIZE_PX: u32 = 22;

/// Characters escaped by URI-component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Vector glyphs available for map markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerGlyph {
    MapPin,
    Film,
    Plane,
    Tree,
    Store,
    GraduationCap,
    Landmark,
    Dumbbell,
    Utensils,
    Hospital,
}

impl MarkerGlyph {
    /// Glyph for an icon name; unknown names get the generic pin.
    pub fn from_icon_name(name: &str) -> Self {
        match name {
            "map-pin" => Self::MapPin,
            "film" => Self::Film,
            "plane" => Self::Plane,
            "tree" => Self::Tree,
            "store" => Self::Store,
            "graduation-cap" => Self::GraduationCap,
            "landmark" => Self::Landmark,
            "dumbbell" => Self::Dumbbell,
            "utensils" => Self::Utensils,
            "hospital" => Self::Hospital,
            _ => Self::MapPin,
        }
    }

    // 24x24 stroke artwork, drawn with `currentColor`.
    fn body(self) -> &'static str {
        match self {
            Self::MapPin => {
                r#"<path d="M21 10c0 7-9 13-9 13s-9-6-9-13a9 9 0 0 1 18 0z"/><circle cx="12" cy="10" r="3"/>"#
            }
            Self::Film => {
                r#"<rect x="2" y="2" width="20" height="20" rx="2.2"/><path d="M7 2v20M17 2v20M2 12h20M2 7h5M2 17h5M17 17h5M17 7h5"/>"#
            }
            Self::Plane => {
                r#"<path d="M21 16v-2l-8-5V3.5a1.5 1.5 0 0 0-3 0V9l-8 5v2l8-2.5V19l-2 1.5V22l3.5-1 3.5 1v-1.5L13 19v-5.5z"/>"#
            }
            Self::Tree => r#"<path d="M12 2 5 12h4l-4 6h14l-4-6h4z"/><path d="M12 18v4"/>"#,
            Self::Store => {
                r#"<path d="M3 9 4.5 3h15L21 9"/><path d="M3 9h18v2a3 3 0 0 1-6 0 3 3 0 0 1-6 0 3 3 0 0 1-6 0z"/><path d="M5 13v8h14v-8M10 21v-5h4v5"/>"#
            }
            Self::GraduationCap => {
                r#"<path d="M22 9 12 4 2 9l10 5 10-5z"/><path d="M6 11v5c3 2.5 9 2.5 12 0v-5M22 9v6"/>"#
            }
            Self::Landmark => r#"<path d="M3 22h18M6 18v-7M10 18v-7M14 18v-7M18 18v-7M12 2l8 5H4z"/>"#,
            Self::Dumbbell => {
                r#"<path d="M6.5 6.5v11M17.5 6.5v11M3 9v6M21 9v6M6.5 12h11M3 12h3.5M17.5 12H21"/>"#
            }
            Self::Utensils => r#"<path d="M3 2v7c0 1.1.9 2 2 2h4a2 2 0 0 0 2-2V2M7 2v20M21 15V2a5 5 0 0 0-5 5v6c0 1.1.9 2 2 2h3zm0 0v7"/>"#,
            Self::Hospital => {
                r#"<rect x="3" y="3" width="18" height="18" rx="2"/><path d="M12 7v10M7 12h10"/>"#
            }
        }
    }
}

/// Standalone SVG document for a marker tinted with `color`.
pub fn marker_svg(icon: &str, color: &str, size: u32) -> String {
    let glyph = MarkerGlyph::from_icon_name(icon);
    let color = sanitize_color(color);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 24 24" fill="none" stroke="{color}" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" color="{color}">{}</svg>"#,
        glyph.body()
    )
}

/// Inline image source for a marker, suitable for an `<img src>`.
pub fn marker_icon_src(icon: &str, color: &str, size: u32) -> String {
    let svg = marker_svg(icon, color, size);
    format!(
        "data:image/svg+xml;utf8,{}",
        utf8_percent_encode(&svg, URI_COMPONENT)
    )
}

// Colors end up inside an attribute, so anything outside a plain CSS color
// token falls back to the default accent.
fn sanitize_color(color: &str) -> &str {
    let ok = !color.is_empty()
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | ' ' | '%'));
    if ok { color } else { crate::location::DEFAULT_ACCENT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_lookup_falls_back_to_pin() {
        assert_eq!(MarkerGlyph::from_icon_name("plane"), MarkerGlyph::Plane);
        assert_eq!(
            MarkerGlyph::from_icon_name("graduation-cap"),
            MarkerGlyph::GraduationCap
        );
        assert_eq!(MarkerGlyph::from_icon_name("hospital"), MarkerGlyph::Hospital);
        assert_eq!(MarkerGlyph::from_icon_name("rocket"), MarkerGlyph::MapPin);
        assert_eq!(MarkerGlyph::from_icon_name(""), MarkerGlyph::MapPin);
    }

    #[test]
    fn svg_carries_size_and_color() {
        let svg = marker_svg("store", "#ff0066", 22);
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"width="22""#));
        assert!(svg.contains(r##"stroke="#ff0066""##));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn unsafe_color_is_replaced_by_default_accent() {
        let svg = marker_svg("store", "\"><script>", 22);
        assert!(svg.contains(r##"stroke="#2DB3C8""##));
        assert!(!svg.contains("script"));
    }

    #[test]
    fn icon_src_is_uri_component_encoded() {
        let src = marker_icon_src("map-pin", "#2DB3C8", 22);
        assert!(src.starts_with("data:image/svg+xml;utf8,%3Csvg%20"));
        assert!(src.contains("%232DB3C8"));
        assert!(!src.contains('<'));
        assert!(!src.contains('"'));
        assert!(!src.contains(' '));
    }
}
