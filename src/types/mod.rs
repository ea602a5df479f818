//! Index-space and grid-location types shared by every kernel.

mod geometry;
mod index_box;
mod staggering;

pub use geometry::Geometry;
pub use index_box::IndexBox;
pub use staggering::{Direction, Staggering};
