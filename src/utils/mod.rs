//! Utility functions for image loading and result visualization.

pub mod image;
pub mod visualization;

pub use self::image::{load_gray_image, load_gray_image_from_bytes};
pub use visualization::{RenderConfig, render_board};
