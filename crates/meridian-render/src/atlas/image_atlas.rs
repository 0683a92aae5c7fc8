use std::collections::HashMap;

use crate::gl::{Backend, Context, Texture, TextureFormat};

use super::image::{ImageError, RgbaImage};
use super::potpack::{potpack, Bin};

/// Transparent border around every packed image, in texels.
pub const PADDING: u32 = 1;

/// A bitmap registered under an image id.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleImage {
    pub data: RgbaImage,
    /// Device pixels per image pixel.
    pub pixel_ratio: f32,
    pub sdf: bool,
}

impl StyleImage {
    pub fn new(data: RgbaImage, pixel_ratio: f32) -> Self {
        Self {
            data,
            pixel_ratio,
            sdf: false,
        }
    }
}

/// Where an image landed in an atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePosition {
    /// Packed rectangle including padding.
    pub padded: Bin,
    pub pixel_ratio: f32,
}

impl ImagePosition {
    #[inline]
    pub fn new(padded: Bin, pixel_ratio: f32) -> Self {
        Self { padded, pixel_ratio }
    }

    /// Top-left texel of the unpadded image.
    #[inline]
    pub fn tl(&self) -> [u32; 2] {
        [self.padded.x + PADDING, self.padded.y + PADDING]
    }

    /// One past the bottom-right texel of the unpadded image.
    #[inline]
    pub fn br(&self) -> [u32; 2] {
        [
            self.padded.x + self.padded.w - PADDING,
            self.padded.y + self.padded.h - PADDING,
        ]
    }

    #[inline]
    pub fn tlbr(&self) -> [f32; 4] {
        let [l, t] = self.tl();
        let [r, b] = self.br();
        [l as f32, t as f32, r as f32, b as f32]
    }

    /// Size in CSS pixels.
    #[inline]
    pub fn display_size(&self) -> [f32; 2] {
        [
            (self.padded.w - PADDING * 2) as f32 / self.pixel_ratio,
            (self.padded.h - PADDING * 2) as f32 / self.pixel_ratio,
        ]
    }
}

/// Padded bin for `image`.
pub(crate) fn padded_bin(image: &RgbaImage) -> Bin {
    Bin::new(image.width() + PADDING * 2, image.height() + PADDING * 2)
}

/// Copies `src` into the interior of `bin` and fills the padding with the
/// opposite edge so repeated sampling wraps seamlessly.
pub(crate) fn copy_with_wrapped_padding(
    src: &RgbaImage,
    dst: &mut RgbaImage,
    bin: &Bin,
) -> Result<(), ImageError> {
    let x = bin.x + PADDING;
    let y = bin.y + PADDING;
    let w = src.width();
    let h = src.height();

    RgbaImage::copy(src, dst, [0, 0], [x, y], [w, h])?;
    if w == 0 || h == 0 {
        return Ok(());
    }
    // above <- last row, below <- first row
    RgbaImage::copy(src, dst, [0, h - 1], [x, y - 1], [w, 1])?;
    RgbaImage::copy(src, dst, [0, 0], [x, y + h], [w, 1])?;
    // left <- last column, right <- first column
    RgbaImage::copy(src, dst, [w - 1, 0], [x - 1, y], [1, h])?;
    RgbaImage::copy(src, dst, [0, 0], [x + w, y], [1, h])?;
    Ok(())
}

/// Icons and patterns packed once into a single bitmap.
///
/// Inputs are ordered slices; equal-height images keep that order in the
/// packing.
#[derive(Debug, Clone)]
pub struct ImageAtlas {
    image: RgbaImage,
    icon_positions: HashMap<String, ImagePosition>,
    pattern_positions: HashMap<String, ImagePosition>,
}

impl ImageAtlas {
    pub fn new(
        icons: &[(String, StyleImage)],
        patterns: &[(String, StyleImage)],
    ) -> Result<Self, ImageError> {
        let mut bins: Vec<Bin> = icons
            .iter()
            .chain(patterns.iter())
            .map(|(_, img)| padded_bin(&img.data))
            .collect();

        let (w, h) = potpack(&mut bins);
        let mut image = RgbaImage::new(w.max(1), h.max(1));

        let (icon_bins, pattern_bins) = bins.split_at(icons.len());

        let mut icon_positions = HashMap::with_capacity(icons.len());
        for ((id, src), bin) in icons.iter().zip(icon_bins) {
            RgbaImage::copy(
                &src.data,
                &mut image,
                [0, 0],
                [bin.x + PADDING, bin.y + PADDING],
                src.data.size(),
            )?;
            icon_positions.insert(id.clone(), ImagePosition::new(*bin, src.pixel_ratio));
        }

        let mut pattern_positions = HashMap::with_capacity(patterns.len());
        for ((id, src), bin) in patterns.iter().zip(pattern_bins) {
            copy_with_wrapped_padding(&src.data, &mut image, bin)?;
            pattern_positions.insert(id.clone(), ImagePosition::new(*bin, src.pixel_ratio));
        }

        log::debug!(
            "packed image atlas {}x{} ({} icons, {} patterns)",
            image.width(),
            image.height(),
            icon_positions.len(),
            pattern_positions.len()
        );

        Ok(Self {
            image,
            icon_positions,
            pattern_positions,
        })
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[inline]
    pub fn icon_position(&self, id: &str) -> Option<&ImagePosition> {
        self.icon_positions.get(id)
    }

    #[inline]
    pub fn pattern_position(&self, id: &str) -> Option<&ImagePosition> {
        self.pattern_positions.get(id)
    }

    /// Uploads the bitmap as a new RGBA texture.
    pub fn upload<B: Backend>(&self, ctx: &mut Context<B>) -> Texture {
        ctx.create_texture(self.image.size(), TextureFormat::Rgba8, Some(self.image.data()))
    }
}
