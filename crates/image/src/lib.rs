//! Image handling for the scan tracer.
//!
//! Wraps the `image` crate (imported as `crates_image`) to decode uploads,
//! normalize them into model input tensors, and composite Grad-CAM
//! heatmaps back onto the original scan.
//!
//! Input tensors use NHWC layout: `[1, height, width, 3]`.

pub mod error;
pub use error::ImageError;

mod image;
pub use image::*;

mod decode;
pub use decode::*;

mod normalize;
pub use normalize::*;

mod encode;
pub use encode::*;

mod overlay;
pub use overlay::*;
