//! One draw routine per layer type. Each checks the pass it is called in
//! and returns early when the layer has nothing to draw there.

pub mod background;
pub mod circle;
pub mod debug;
pub mod fill;
pub mod fill_extrusion;
pub mod hillshade;
pub mod line;
pub mod raster;
pub mod symbol;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::atlas::{ImageAtlas, RgbaImage, StyleImage};
    use crate::config::{FrameOptions, RenderConfig};
    use crate::gl::{
        BufferUsage, Context, DrawState, Mat4, PosVertex, RecordingBackend, Segment, TextureFormat,
        UniformKind,
    };
    use crate::math::{mat4_identity, mat4_translate};
    use crate::program::{test_shaders, PaintBinder, ProgramConfiguration};
    use crate::render::Painter;
    use crate::source::{
        Bucket, CollisionBoxVertex, CollisionBuffers, CollisionPlacementVertex, DemData,
        DemEncoding,
        ExtrusionVertex, FillBucket, GeometryBucket, GeometryBuffers, LineVertex, OverscaledTileId,
        StaticSourceCache, SymbolBucket, SymbolBuffers, SymbolDynamicVertex, SymbolLayoutVertex,
        SymbolOpacityVertex, SymbolSize, Tile, UnwrappedTileId,
    };
    use crate::style::Style;
    use crate::transform::Transform;

    pub type Ctx = Context<RecordingBackend>;

    /// Unpitched camera whose tile matrices are plain translations.
    pub struct FlatTransform {
        pub zoom: f32,
        pub angle: f32,
        pub pitch: f32,
        pub tiles: Vec<OverscaledTileId>,
    }

    impl FlatTransform {
        pub fn new(zoom: f32) -> Self {
            Self {
                zoom,
                angle: 0.0,
                pitch: 0.0,
                tiles: Vec::new(),
            }
        }

        /// A z2 camera covering `n` tiles along the top row.
        pub fn with_tiles(n: u32) -> Self {
            Self {
                tiles: (0..n).map(|x| OverscaledTileId::canonical(2, x, 0)).collect(),
                ..Self::new(2.0)
            }
        }

        pub fn tile_matrix(&self, tile: &OverscaledTileId) -> Mat4 {
            self.pos_matrix(&tile.to_unwrapped(), false)
        }
    }

    impl Transform for FlatTransform {
        fn zoom(&self) -> f32 {
            self.zoom
        }

        fn angle(&self) -> f32 {
            self.angle
        }

        fn pitch(&self) -> f32 {
            self.pitch
        }

        fn size(&self) -> [f32; 2] {
            [512.0, 512.0]
        }

        fn camera_to_center_distance(&self) -> f32 {
            384.0
        }

        fn pixels_to_gl_units(&self) -> [f32; 2] {
            [2.0 / 512.0, -2.0 / 512.0]
        }

        fn pos_matrix(&self, tile: &UnwrappedTileId, _aligned: bool) -> Mat4 {
            let c = tile.canonical;
            mat4_translate(&mat4_identity(), [c.x as f32, c.y as f32, 0.0])
        }

        fn covering_tiles(&self, _tile_size: u32) -> Vec<OverscaledTileId> {
            self.tiles.clone()
        }

        fn label_plane_matrix(&self) -> Mat4 {
            mat4_identity()
        }

        fn gl_coord_matrix(&self) -> Mat4 {
            mat4_identity()
        }
    }

    pub fn test_painter() -> Painter<RecordingBackend> {
        test_painter_with(RenderConfig::default())
    }

    pub fn test_painter_with(config: RenderConfig) -> Painter<RecordingBackend> {
        Painter::new(RecordingBackend::new(), test_shaders(), config)
    }

    pub fn frame_options() -> FrameOptions {
        FrameOptions {
            now: 1000.0,
            symbol_fade_change: 1.0,
            drawing_buffer_size: [512, 512],
            ..FrameOptions::default()
        }
    }

    pub fn render(
        painter: &mut Painter<RecordingBackend>,
        style: &mut Style,
        transform: &FlatTransform,
    ) {
        painter.render(style, transform, &frame_options()).unwrap();
    }

    /// Recorded draws issued with the program compiled from `stem`.
    pub fn draws_by_shader(painter: &Painter<RecordingBackend>, stem: &str) -> Vec<DrawState> {
        let backend = painter.context().backend();
        let marker = format!("// {stem} vertex");
        backend
            .draw_states()
            .into_iter()
            .filter(|d| {
                d.program
                    .and_then(|p| backend.program_source(p))
                    .is_some_and(|(vertex, _)| vertex.contains(&marker))
            })
            .collect()
    }

    pub fn solid_image(width: u32, height: u32) -> StyleImage {
        let data = [255u8, 0, 0, 255].repeat((width * height) as usize);
        StyleImage::new(RgbaImage::from_pixels(width, height, data).unwrap(), 1.0)
    }

    /// Adds a source named `source` holding `tiles`, each with a bucket for `layer`.
    pub fn add_source(
        painter: &mut Painter<RecordingBackend>,
        style: &mut Style,
        source: &str,
        layer: &str,
        tiles: &[OverscaledTileId],
        bucket: fn(&mut Ctx) -> Bucket,
    ) {
        let buckets = tiles.iter().map(|id| (*id, bucket(painter.context_mut()))).collect();
        add_source_with(style, source, layer, buckets);
    }

    pub fn add_source_with(
        style: &mut Style,
        source: &str,
        layer: &str,
        buckets: Vec<(OverscaledTileId, Bucket)>,
    ) {
        let mut cache = StaticSourceCache::new(source, 512);
        for (id, bucket) in buckets {
            let mut tile = Tile::new(id, 512);
            tile.insert_bucket(layer, bucket);
            cache.add_tile(tile);
        }
        style.add_source(Box::new(cache));
    }

    pub fn set_patterns_loaded(style: &mut Style, source: &str, loaded: bool) {
        if let Some(cache) = style.source_mut(source) {
            cache.for_each_tile_mut(&mut |tile: &mut Tile| tile.set_patterns_loaded(loaded));
        }
    }

    /// Gives every tile of `source` an image atlas holding only `patterns`.
    pub fn with_pattern_atlas(style: &mut Style, source: &str, patterns: &[&str]) {
        let patterns: Vec<(String, StyleImage)> =
            patterns.iter().map(|id| ((*id).to_owned(), solid_image(4, 4))).collect();
        if let Some(cache) = style.source_mut(source) {
            cache.for_each_tile_mut(&mut |tile: &mut Tile| {
                tile.image_atlas = Some(ImageAtlas::new(&[], &patterns).unwrap());
            });
        }
    }

    /// Adds a uniform-bound pattern property to `bucket`'s configuration.
    pub fn with_pattern_binder(mut bucket: Bucket) -> Bucket {
        let binder = PaintBinder::Pattern { buffer: None };
        match &mut bucket {
            Bucket::Fill(fill) => {
                fill.configuration =
                    fill.configuration.clone().with("pattern", UniformKind::Vec4, binder);
            }
            Bucket::Line(geometry) | Bucket::FillExtrusion(geometry) => {
                geometry.configuration =
                    geometry.configuration.clone().with("pattern", UniformKind::Vec4, binder);
            }
            _ => {}
        }
        bucket
    }

    /// Gives every tile of `source` a glyph atlas and an icon atlas.
    pub fn with_symbol_textures(ctx: &mut Ctx, style: &mut Style, source: &str) {
        if let Some(cache) = style.source_mut(source) {
            cache.for_each_tile_mut(&mut |tile: &mut Tile| {
                tile.glyph_atlas_texture =
                    Some(ctx.create_texture([64, 64], TextureFormat::Alpha8, None));
                tile.image_atlas_texture =
                    Some(ctx.create_texture([32, 32], TextureFormat::Rgba8, None));
            });
        }
    }

    pub fn raster_tile(ctx: &mut Ctx, id: OverscaledTileId, time_added: f64) -> Tile {
        let mut tile = Tile::new(id, 512);
        tile.raster_texture = Some(ctx.create_texture([256, 256], TextureFormat::Rgba8, None));
        tile.time_added = time_added;
        tile
    }

    pub fn dem_tile(id: OverscaledTileId, dim: u32) -> Tile {
        let stride = dim + 2;
        let mut tile = Tile::new(id, 512);
        tile.dem = Some(DemData {
            dim,
            pixels: RgbaImage::new(stride, stride),
            encoding: DemEncoding::Mapbox,
            revision: 0,
        });
        tile
    }

    fn quad<V: crate::gl::Vertex>(
        ctx: &mut Ctx,
        vertex: V,
        segments: Vec<Segment>,
    ) -> GeometryBuffers {
        let primitives: u32 = segments
            .iter()
            .map(|s| s.primitive_offset + s.primitive_length)
            .max()
            .unwrap_or(0);
        let indices: Vec<u16> = (0..primitives).flat_map(|_| [0, 1, 2]).collect();
        GeometryBuffers {
            layout_vertex_buffer: ctx.create_vertex_buffer(&[vertex; 4], BufferUsage::Static),
            index_buffer: ctx.create_index_buffer(&indices, BufferUsage::Static),
            segments,
        }
    }

    /// One segment per key, starting at primitive `key`.
    fn keyed_segments(keys: &[f32]) -> Vec<Segment> {
        keys.iter()
            .map(|&key| Segment {
                primitive_offset: key as u32,
                sort_key: key,
                ..Segment::whole(4, 1)
            })
            .collect()
    }

    pub fn fill_bucket(ctx: &mut Ctx) -> Bucket {
        let geometry = quad(ctx, PosVertex { pos: [0, 0] }, vec![Segment::whole(4, 2)]);
        Bucket::Fill(FillBucket {
            geometry,
            outline_index_buffer: ctx
                .create_index_buffer(&[0, 1, 1, 3, 3, 2, 2, 0], BufferUsage::Static),
            outline_segments: vec![Segment::whole(4, 4)],
            configuration: ProgramConfiguration::new()
                .with("color", UniformKind::Color, PaintBinder::Constant)
                .with("opacity", UniformKind::Float, PaintBinder::Constant),
        })
    }

    pub fn line_bucket(ctx: &mut Ctx) -> Bucket {
        let vertex = LineVertex {
            pos_normal: [0, 0],
            data: [0; 4],
        };
        Bucket::Line(GeometryBucket {
            geometry: quad(ctx, vertex, vec![Segment::whole(4, 2)]),
            configuration: ProgramConfiguration::new()
                .with("color", UniformKind::Color, PaintBinder::Constant)
                .with("opacity", UniformKind::Float, PaintBinder::Constant)
                .with("width", UniformKind::Float, PaintBinder::Constant),
        })
    }

    pub fn circle_bucket(ctx: &mut Ctx, keys: &[f32]) -> Bucket {
        Bucket::Circle(GeometryBucket {
            geometry: quad(ctx, PosVertex { pos: [0, 0] }, keyed_segments(keys)),
            configuration: ProgramConfiguration::new()
                .with("radius", UniformKind::Float, PaintBinder::Constant)
                .with("color", UniformKind::Color, PaintBinder::Constant),
        })
    }

    pub fn extrusion_bucket(ctx: &mut Ctx) -> Bucket {
        let vertex = ExtrusionVertex {
            pos: [0, 0],
            normal_ed: [0; 4],
        };
        Bucket::FillExtrusion(GeometryBucket {
            geometry: quad(ctx, vertex, vec![Segment::whole(4, 2)]),
            configuration: ProgramConfiguration::new()
                .with("color", UniformKind::Color, PaintBinder::Constant)
                .with("height", UniformKind::Float, PaintBinder::Constant),
        })
    }

    fn symbol_buffers(ctx: &mut Ctx, keys: &[f32]) -> SymbolBuffers {
        let vertex = SymbolLayoutVertex {
            pos_offset: [0; 4],
            data: [0; 4],
        };
        SymbolBuffers {
            geometry: quad(ctx, vertex, keyed_segments(keys)),
            dynamic_layout_vertex_buffer: ctx.create_vertex_buffer(
                &[SymbolDynamicVertex { projected_pos: [0.0; 3] }; 4],
                BufferUsage::Dynamic,
            ),
            opacity_vertex_buffer: ctx
                .create_vertex_buffer(
                    &[SymbolOpacityVertex { fade_opacity: 0 }; 4],
                    BufferUsage::Dynamic,
                ),
            size: SymbolSize::Constant(16.0),
            configuration: ProgramConfiguration::new()
                .with("opacity", UniformKind::Float, PaintBinder::Constant)
                .with("fill_color", UniformKind::Color, PaintBinder::Constant),
        }
    }

    /// Icon and text buffers with one segment per key, plus collision boxes.
    pub fn symbol_bucket(ctx: &mut Ctx, keys: &[f32]) -> Bucket {
        let collision = CollisionBoxVertex {
            pos: [0, 0],
            anchor_pos: [0, 0],
            extrude: [0, 0],
        };
        let mut collision_geometry = quad(ctx, collision, vec![Segment::whole(4, 4)]);
        collision_geometry.index_buffer =
            ctx.create_index_buffer(&[0, 1, 1, 3, 3, 2, 2, 0], BufferUsage::Static);
        let placement = CollisionPlacementVertex {
            placed: [1, 0, 0, 0],
            shift: [0.0, 0.0],
        };
        Bucket::Symbol(SymbolBucket {
            icon: Some(symbol_buffers(ctx, keys)),
            text: Some(symbol_buffers(ctx, keys)),
            sdf_icons: false,
            icons_need_linear: false,
            can_overlap: true,
            collision_box: Some(CollisionBuffers {
                geometry: collision_geometry,
                dynamic_vertex_buffer: ctx
                    .create_vertex_buffer(&[placement; 4], BufferUsage::Dynamic),
            }),
        })
    }
}
