//! Dimension-generic vector and transform vocabulary for the Strider motion stack.
//!
//! The resolver is written once against [`Dimension`]; [`Dim2`] and [`Dim3`]
//! bind it to `glam` vectors and affine transforms.

mod axis;
mod dimension;
mod transform;
mod vector;

pub use axis::{AxisMask, BodyAxis};
pub use dimension::{Dim2, Dim3, Dimension};
pub use transform::BodyTransform;
pub use vector::{CMP_EPSILON, MotionVector};
