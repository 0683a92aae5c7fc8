//! Image packing for icon and pattern textures.

mod image;
mod image_atlas;
mod image_manager;
mod potpack;

pub use image::{ImageError, RgbaImage};
pub use image_atlas::{ImageAtlas, ImagePosition, StyleImage, PADDING};
pub use image_manager::ImageManager;
pub use potpack::{potpack, Bin};
