use std::collections::HashMap;

use crate::atlas::{ImageAtlas, RgbaImage};
use crate::gl::{Backend, Context, Texture};

use super::bucket::Bucket;
use super::tile_id::OverscaledTileId;

/// Elevation encoding of a raster-dem source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DemEncoding {
    #[default]
    Mapbox,
    Terrarium,
}

impl DemEncoding {
    /// Weights turning an RGB texel into meters: `dot(rgb * 255, unpack.xyz) - unpack.w`.
    pub fn unpack_vector(self) -> [f32; 4] {
        match self {
            DemEncoding::Mapbox => [6553.6, 25.6, 0.1, 10000.0],
            DemEncoding::Terrarium => [256.0, 1.0, 1.0 / 256.0, 32768.0],
        }
    }
}

/// Decoded elevation tile with a one-texel border copied from its neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct DemData {
    /// Interior size in texels.
    pub dim: u32,
    pub pixels: RgbaImage,
    pub encoding: DemEncoding,
    /// Bumped whenever the border is backfilled; forces a new prepare pass.
    pub revision: u64,
}

impl DemData {
    /// `dim + 2`, the uploaded texture size.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.dim + 2
    }
}

/// A loaded tile: buckets keyed by layer id plus its textures.
#[derive(Debug)]
pub struct Tile {
    pub id: OverscaledTileId,
    /// Source tile size in CSS pixels.
    pub tile_size: u32,
    buckets: HashMap<String, Bucket>,
    pub image_atlas: Option<ImageAtlas>,
    pub image_atlas_texture: Option<Texture>,
    pub glyph_atlas_texture: Option<Texture>,
    pub raster_texture: Option<Texture>,
    pub dem: Option<DemData>,
    /// Timestamp (ms) the tile became renderable.
    pub time_added: f64,
    patterns_loaded: bool,
}

impl Tile {
    pub fn new(id: OverscaledTileId, tile_size: u32) -> Self {
        Self {
            id,
            tile_size,
            buckets: HashMap::new(),
            image_atlas: None,
            image_atlas_texture: None,
            glyph_atlas_texture: None,
            raster_texture: None,
            dem: None,
            time_added: 0.0,
            patterns_loaded: true,
        }
    }

    pub fn insert_bucket(&mut self, layer_id: impl Into<String>, bucket: Bucket) {
        self.buckets.insert(layer_id.into(), bucket);
    }

    pub fn bucket(&self, layer_id: &str) -> Option<&Bucket> {
        self.buckets.get(layer_id)
    }

    pub fn has_buckets(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Every pattern the tile's layers reference has an atlas position.
    #[inline]
    pub fn patterns_loaded(&self) -> bool {
        self.patterns_loaded
    }

    pub fn set_patterns_loaded(&mut self, loaded: bool) {
        self.patterns_loaded = loaded;
    }

    /// Uploads the icon/pattern atlas on first use.
    pub fn upload<B: Backend>(&mut self, ctx: &mut Context<B>) {
        if self.image_atlas_texture.is_some() {
            return;
        }
        if let Some(atlas) = &self.image_atlas {
            self.image_atlas_texture = Some(atlas.upload(ctx));
        }
    }

    /// Forgets every GPU handle; the owning context is gone.
    pub fn drop_gpu_resources(&mut self) {
        self.image_atlas_texture = None;
    }
}
