//! Pure helpers shared by the index, planner and edge builder.
//!
//! Nothing in this layer holds state:
//! - Coordinate validation
//! - Web-Mercator projection to unit space
//! - Category colors
//! - Grouping raw entities by exact coordinate

pub mod color;
pub mod grouping;
pub mod projection;
pub mod validation;

pub use color::{Rgba, color_of, legend};
pub use grouping::group_by_coordinate;
