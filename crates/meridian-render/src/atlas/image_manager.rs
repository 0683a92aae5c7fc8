use std::collections::HashMap;

use crate::gl::{Backend, Context, Texture, TextureFilter, TextureFormat, TextureWrap};

use super::image::RgbaImage;
use super::image_atlas::{copy_with_wrapped_padding, padded_bin, ImagePosition, StyleImage};
use super::potpack::{potpack, Bin};

/// Style images plus a lazily grown pattern atlas shared by every tile.
///
/// A pattern joins the atlas the first time it is requested; adding one
/// repacks all patterns and marks the texture for re-upload.
#[derive(Debug)]
pub struct ImageManager {
    images: HashMap<String, StyleImage>,
    /// Insertion-ordered pattern ids and their bins.
    patterns: Vec<(String, Bin)>,
    atlas_image: RgbaImage,
    atlas_texture: Option<Texture>,
    dirty: bool,
}

impl Default for ImageManager {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
            patterns: Vec::new(),
            atlas_image: RgbaImage::new(1, 1),
            atlas_texture: None,
            dirty: true,
        }
    }
}

impl ImageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces an image. Replacing a packed pattern repacks.
    pub fn add_image(&mut self, id: impl Into<String>, image: StyleImage) {
        let id = id.into();
        let packed = self.patterns.iter().position(|(p, _)| *p == id);
        let size_changed = self
            .images
            .get(&id)
            .is_some_and(|old| old.data.size() != image.data.size());

        if let Some(index) = packed {
            self.patterns[index].1 = padded_bin(&image.data);
        }
        self.images.insert(id, image);

        if packed.is_some() {
            if size_changed {
                log::debug!("pattern image resized; repacking");
            }
            self.update_pattern_atlas();
        }
    }

    pub fn remove_image(&mut self, id: &str) {
        self.images.remove(id);
        let before = self.patterns.len();
        self.patterns.retain(|(p, _)| p != id);
        if self.patterns.len() != before {
            self.update_pattern_atlas();
        }
    }

    #[inline]
    pub fn image(&self, id: &str) -> Option<&StyleImage> {
        self.images.get(id)
    }

    /// Atlas position of pattern `id`, packing it on first request.
    ///
    /// `None` when no image with that id is registered.
    pub fn get_pattern(&mut self, id: &str) -> Option<ImagePosition> {
        if let Some(position) = self.pattern_position(id) {
            return Some(position);
        }

        let image = self.images.get(id)?;
        self.patterns.push((id.to_owned(), padded_bin(&image.data)));
        self.update_pattern_atlas();
        self.pattern_position(id)
    }

    fn pattern_position(&self, id: &str) -> Option<ImagePosition> {
        let (_, bin) = self.patterns.iter().find(|(p, _)| p == id)?;
        let image = self.images.get(id)?;
        Some(ImagePosition::new(*bin, image.pixel_ratio))
    }

    /// Current atlas bitmap size.
    #[inline]
    pub fn pixel_size(&self) -> [u32; 2] {
        self.atlas_image.size()
    }

    #[inline]
    pub fn atlas_image(&self) -> &RgbaImage {
        &self.atlas_image
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Binds the atlas to `unit`, uploading first if it changed.
    pub fn bind<B: Backend>(&mut self, ctx: &mut Context<B>, unit: u32) {
        match self.atlas_texture.as_mut() {
            None => {
                let texture = ctx.create_texture(
                    self.atlas_image.size(),
                    TextureFormat::Rgba8,
                    Some(self.atlas_image.data()),
                );
                self.atlas_texture = Some(texture);
            }
            Some(texture) if self.dirty => {
                ctx.update_texture(texture, self.atlas_image.size(), self.atlas_image.data());
            }
            Some(_) => {}
        }
        self.dirty = false;

        let Some(texture) = self.atlas_texture.as_ref() else { return };
        ctx.bind_texture(unit, texture, TextureFilter::Linear, TextureWrap::Clamp);
    }

    /// Drops the texture handle; the next bind uploads a fresh one.
    pub fn invalidate_texture(&mut self) {
        self.atlas_texture = None;
        self.dirty = true;
    }

    fn update_pattern_atlas(&mut self) {
        let mut bins: Vec<Bin> = self.patterns.iter().map(|(_, b)| Bin::new(b.w, b.h)).collect();
        let (w, h) = potpack(&mut bins);

        let mut atlas = RgbaImage::new(w.max(1), h.max(1));
        for ((id, slot), bin) in self.patterns.iter_mut().zip(&bins) {
            *slot = *bin;
            let Some(image) = self.images.get(id.as_str()) else { continue };
            if let Err(err) = copy_with_wrapped_padding(&image.data, &mut atlas, bin) {
                log::warn!("pattern `{id}` could not be copied into the atlas: {err}");
            }
        }

        log::debug!(
            "repacked pattern atlas: {} pattern(s), {}x{}",
            self.patterns.len(),
            atlas.width(),
            atlas.height()
        );
        self.atlas_image = atlas;
        self.dirty = true;
    }
}
