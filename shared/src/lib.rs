pub mod api;
pub mod coords;
pub mod filter;
pub mod location;
pub mod marker;
pub mod projection;

pub use api::{ApiErrorBody, ServiceError};
pub use coords::{LonLat, normalize_input_coords};
pub use filter::LocationFilter;
pub use location::*;
pub use projection::{Coordinate, Extent};
