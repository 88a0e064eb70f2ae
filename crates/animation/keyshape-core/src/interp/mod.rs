//! Interpolation helpers.
//!
//! Linear only: shapes blend pointwise, coordinates independently.

pub mod functions;

pub use functions::{lerp_f64, lerp_point, lerp_shape};
