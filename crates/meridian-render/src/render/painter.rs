use std::collections::{HashMap, HashSet};

use crate::atlas::ImageManager;
use crate::color::Color;
use crate::config::{FrameOptions, RenderConfig};
use crate::error::{RenderError, Result};
use crate::gl::{
    Backend, BufferUsage, ColorMode, CompareFunc, Context, CullFaceMode, DepthMask, DepthMode,
    FramebufferId, IndexBuffer, Mat4, PosVertex, Primitive, RasterBoundsVertex, Segment,
    StencilMode, StencilOp, StencilTest, Texture, UniformValues, VertexBuffer,
};
use crate::math::{mat4_translate, rotate_vec2};
use crate::program::{DrawCall, ProgramCache, ShaderId, ShaderLibrary};
use crate::source::{EXTENT, OverscaledTileId, SourceCache, Tile};
use crate::style::{
    CrossfadeParameters, LayerPaint, LayerType, Light, Style, StyleLayer, TranslateAnchor,
};
use crate::transform::Transform;

use super::clip::TileClipRegistry;
use super::depth::DepthAllocator;
use super::draw;
use super::pass::RenderPass;
use super::pattern::pixels_to_tile_units;

/// Geometry shared by clip masks, backgrounds, rasters and debug outlines.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PainterBuffers {
    /// Tile corners `(0,0) (E,0) (0,E) (E,E)`.
    pub tile_extent: VertexBuffer,
    pub quad_indices: IndexBuffer,
    pub quad_segments: [Segment; 1],
    /// Closed outline `0 1 3 2 0` over the tile corners.
    pub border_indices: IndexBuffer,
    pub border_segments: [Segment; 1],
    pub raster_bounds: VertexBuffer,
}

/// Offscreen hillshade texture of one DEM tile.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PreparedHillshade {
    pub dem_texture: Texture,
    pub texture: Texture,
    pub framebuffer: FramebufferId,
    pub revision: u64,
}

/// Values fixed for one pass of one frame.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub transform: &'a dyn Transform,
    pub options: &'a FrameOptions,
    pub light: &'a Light,
    pub pass: RenderPass,
    pub depth: DepthAllocator,
    /// Index of the first 3D layer; it and every layer above skip the opaque pass.
    pub opaque_pass_cutoff: usize,
    pub crossfade: CrossfadeParameters,
}

impl Frame<'_> {
    #[inline]
    pub fn opaque_pass_enabled_for_layer(&self, layer_index: usize) -> bool {
        layer_index < self.opaque_pass_cutoff
    }

    /// Depth state confining a draw to sublayer `n` of `layer_index`.
    pub fn depth_mode_for_sublayer(
        &self,
        layer_index: usize,
        n: u32,
        mask: DepthMask,
        func: CompareFunc,
    ) -> DepthMode {
        if !self.opaque_pass_enabled_for_layer(layer_index) {
            return DepthMode::DISABLED;
        }
        DepthMode::new(func, mask, self.depth.interval(layer_index, n))
    }
}

/// One style layer about to be drawn.
#[derive(Clone, Copy)]
pub struct LayerDraw<'a> {
    pub frame: &'a Frame<'a>,
    pub layer: &'a StyleLayer,
    /// Position in style order; drives depth allocation.
    pub layer_index: usize,
    pub source: Option<&'a dyn SourceCache>,
    pub coords: &'a [OverscaledTileId],
}

impl LayerDraw<'_> {
    #[inline]
    pub fn pass(&self) -> RenderPass {
        self.frame.pass
    }

    #[inline]
    pub fn depth_mode_for_sublayer(&self, n: u32, mask: DepthMask) -> DepthMode {
        self.frame
            .depth_mode_for_sublayer(self.layer_index, n, mask, CompareFunc::LessEqual)
    }

    #[inline]
    pub fn pos_matrix(&self, tile: &OverscaledTileId) -> Mat4 {
        self.frame.transform.pos_matrix(&tile.to_unwrapped(), false)
    }
}

/// Visible tiles of one source, computed once per frame.
#[derive(Debug, Default)]
struct VisibleCoordinates {
    ascending: Vec<OverscaledTileId>,
    descending: Vec<OverscaledTileId>,
    descending_symbol: Vec<OverscaledTileId>,
}

impl VisibleCoordinates {
    fn new(source: &dyn SourceCache) -> Self {
        let ascending = source.visible_coordinates(false);
        let descending = ascending.iter().rev().copied().collect();
        let mut descending_symbol = source.visible_coordinates(true);
        descending_symbol.reverse();
        Self {
            ascending,
            descending,
            descending_symbol,
        }
    }
}

/// Draws a style's layers for one camera into the backend's default framebuffer.
///
/// Owns every cache whose contents depend on the graphics context: compiled
/// programs, the pattern atlas texture, shared quads and prepared hillshades.
pub struct Painter<B: Backend> {
    pub(crate) context: Context<B>,
    pub(crate) config: RenderConfig,
    pub(crate) shaders: ShaderLibrary,
    pub(crate) programs: ProgramCache,
    pub(crate) image_manager: ImageManager,
    pub(crate) clip: TileClipRegistry,
    pub(crate) buffers: Option<PainterBuffers>,
    pub(crate) hillshade: HashMap<(String, OverscaledTileId), PreparedHillshade>,
}

impl<B: Backend> Painter<B> {
    pub fn new(backend: B, shaders: ShaderLibrary, config: RenderConfig) -> Self {
        Self {
            context: Context::new(backend),
            config,
            shaders,
            programs: ProgramCache::new(),
            image_manager: ImageManager::new(),
            clip: TileClipRegistry::new(),
            buffers: None,
            hillshade: HashMap::new(),
        }
    }

    #[inline]
    pub fn context(&self) -> &Context<B> {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut Context<B> {
        &mut self.context
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn image_manager_mut(&mut self) -> &mut ImageManager {
        &mut self.image_manager
    }

    #[inline]
    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    #[inline]
    pub fn clip_registry(&self) -> &TileClipRegistry {
        &self.clip
    }

    /// Renders one frame.
    ///
    /// Order:
    /// - upload pending tile atlases
    /// - offscreen pass (hillshade preparation), then bind the default framebuffer and clear
    /// - opaque pass, top layer first (skipped under the overdraw inspector)
    /// - translucent pass, bottom layer first
    /// - tile boundaries when enabled
    ///
    /// Tiles without a bucket for a layer are skipped. Shader and uniform
    /// errors abort the frame.
    pub fn render(
        &mut self,
        style: &mut Style,
        transform: &dyn Transform,
        options: &FrameOptions,
    ) -> Result<()> {
        if self.context.is_context_lost() {
            return Err(RenderError::ContextLost);
        }
        self.ensure_buffers();

        for source in style.sources_mut() {
            source.for_each_tile_mut(&mut |tile: &mut Tile| tile.upload(&mut self.context));
        }
        let style: &Style = style;

        let zoom = transform.zoom();
        let layer_count = style.layers.len();
        let opaque_pass_cutoff = style
            .layers
            .iter()
            .position(StyleLayer::is_3d)
            .unwrap_or(layer_count);

        let base = Frame {
            transform,
            options,
            light: &style.light,
            pass: RenderPass::Offscreen,
            depth: DepthAllocator::new(self.config.num_sublayers(), layer_count),
            opaque_pass_cutoff,
            crossfade: CrossfadeParameters::new(
                zoom,
                options.now,
                &options.zoom_history,
                self.config.fade_duration,
            ),
        };

        let mut visible: HashMap<String, VisibleCoordinates> = HashMap::new();
        for source in style.sources() {
            visible.insert(source.id().to_owned(), VisibleCoordinates::new(source));
        }

        // ── offscreen ────────────────────────────────────────────────────
        let frame = base;
        let mut offscreen_tiles: HashSet<(&str, OverscaledTileId)> = HashSet::new();
        for (index, layer) in style.layers.iter().enumerate() {
            if !layer.has_offscreen_pass() || layer.is_hidden(zoom) {
                continue;
            }
            let Some((source, coords)) = layer_source(style, &visible, layer) else { continue };
            offscreen_tiles.extend(coords.descending.iter().map(|c| (layer.id.as_str(), *c)));
            self.render_layer(&LayerDraw {
                frame: &frame,
                layer,
                layer_index: index,
                source: Some(source),
                coords: &coords.descending,
            })?;
        }
        self.evict_hillshades(&offscreen_tiles);

        self.context.bind_framebuffer(FramebufferId::DEFAULT);
        self.context.set_viewport([0, 0], options.drawing_buffer_size);
        let clear_color = if self.config.show_overdraw_inspector {
            Color::BLACK
        } else {
            Color::TRANSPARENT
        };
        self.context.clear(Some(clear_color), Some(1.0), Some(0));
        self.clip.clear();

        // ── opaque ───────────────────────────────────────────────────────
        if !self.config.show_overdraw_inspector {
            let frame = Frame {
                pass: RenderPass::Opaque,
                ..base
            };
            for index in (0..layer_count).rev() {
                let layer = &style.layers[index];
                if layer.is_hidden(zoom) {
                    continue;
                }
                let (source, coords) = match layer_source(style, &visible, layer) {
                    Some((source, coords)) => {
                        let id = source.id();
                        self.render_tile_clipping_masks(&frame, layer, id, &coords.ascending)?;
                        (Some(source), coords.ascending.as_slice())
                    }
                    None => (None, &[][..]),
                };
                self.render_layer(&LayerDraw {
                    frame: &frame,
                    layer,
                    layer_index: index,
                    source,
                    coords,
                })?;
            }
        }

        // ── translucent ──────────────────────────────────────────────────
        let frame = Frame {
            pass: RenderPass::Translucent,
            ..base
        };
        for (index, layer) in style.layers.iter().enumerate() {
            if layer.is_hidden(zoom) {
                continue;
            }
            let (source, coords) = match layer_source(style, &visible, layer) {
                Some((source, coords)) => {
                    self.render_tile_clipping_masks(&frame, layer, source.id(), &coords.ascending)?;
                    let tiles = if layer.layer_type() == LayerType::Symbol {
                        &coords.descending_symbol
                    } else {
                        &coords.descending
                    };
                    (Some(source), tiles.as_slice())
                }
                None => (None, &[][..]),
            };
            self.render_layer(&LayerDraw {
                frame: &frame,
                layer,
                layer_index: index,
                source,
                coords,
            })?;
        }

        if self.config.show_tile_boundaries {
            let mut ids: Vec<&String> = visible.keys().collect();
            ids.sort();
            for id in ids {
                for tile in &visible[id].ascending {
                    draw::debug::draw_debug_tile(self, &frame, tile)?;
                }
            }
        }

        self.context.set_default();
        log::trace!(
            "frame at z{zoom:.2}: {layer_count} layers, {} sources, {} programs",
            visible.len(),
            self.programs.len()
        );
        Ok(())
    }

    fn render_layer(&mut self, draw: &LayerDraw<'_>) -> Result<()> {
        let layer = draw.layer;
        if layer.is_hidden(draw.frame.transform.zoom()) {
            return Ok(());
        }
        if layer.layer_type() != LayerType::Background && draw.coords.is_empty() {
            return Ok(());
        }
        match &layer.paint {
            LayerPaint::Background(paint) => draw::background::draw_background(self, draw, paint),
            LayerPaint::Fill(paint) => draw::fill::draw_fill(self, draw, paint),
            LayerPaint::Line(paint) => draw::line::draw_line(self, draw, paint),
            LayerPaint::Circle(paint) => draw::circle::draw_circles(self, draw, paint),
            LayerPaint::Symbol(paint) => draw::symbol::draw_symbols(self, draw, paint),
            LayerPaint::FillExtrusion(paint) => {
                draw::fill_extrusion::draw_fill_extrusion(self, draw, paint)
            }
            LayerPaint::Raster(paint) => draw::raster::draw_raster(self, draw, paint),
            LayerPaint::Hillshade(paint) => draw::hillshade::draw_hillshade(self, draw, paint),
        }
    }

    /// Writes one stencil id per tile when `source` is not already masked.
    fn render_tile_clipping_masks(
        &mut self,
        frame: &Frame<'_>,
        layer: &StyleLayer,
        source: &str,
        coords: &[OverscaledTileId],
    ) -> Result<()> {
        if self.clip.is_current(source) || !layer.is_tile_clipped() || coords.is_empty() {
            return Ok(());
        }
        let buffers = self.ensure_buffers();
        self.context.clear(None, None, Some(0));

        let ids = self.clip.assign(source, coords);
        for (tile, id) in ids {
            let uniforms =
                UniformValues::new()
                    .with("u_matrix", frame.transform.pos_matrix(&tile.to_unwrapped(), false));
            self.draw_program(
                ShaderId::ClippingMask,
                DrawCall {
                    primitive: Primitive::Triangles,
                    depth: DepthMode::DISABLED,
                    stencil: StencilMode::clip_mask_write(id),
                    color: ColorMode::DISABLED,
                    cull: CullFaceMode::DISABLED,
                    uniforms: &uniforms,
                    configuration: None,
                    paint: None,
                    zoom: frame.transform.zoom(),
                    layout_vertex_buffer: &buffers.tile_extent,
                    index_buffer: &buffers.quad_indices,
                    segments: &buffers.quad_segments,
                    extra_vertex_buffers: &[],
                },
            )?;
        }
        Ok(())
    }

    /// Stencil test confining a draw to `tile`'s clip mask. Tiles without a
    /// mask are not clipped.
    pub fn stencil_mode_for_clipping(&self, tile: &OverscaledTileId) -> StencilMode {
        match self.clip.id(tile) {
            Some(id) => StencilMode::clip_test(id),
            None => StencilMode::DISABLED,
        }
    }

    /// Clears the stencil buffer and returns a mode that colors each pixel at
    /// most once. Clip masks must be rebuilt afterwards.
    pub fn stencil_mode_for_3d(&mut self) -> StencilMode {
        self.context.clear(None, None, Some(0));
        self.clip.invalidate();
        StencilMode::new(
            StencilTest {
                func: CompareFunc::NotEqual,
                mask: 0xFF,
            },
            1,
            0xFF,
            StencilOp::Keep,
            StencilOp::Keep,
            StencilOp::Replace,
        )
    }

    /// Sorts `coords` by descending zoom and assigns each zoom level a
    /// stencil reference so that overlapping tiles of different zooms draw
    /// each pixel once, highest zoom winning.
    pub fn stencil_config_for_overlap(
        &mut self,
        coords: &[OverscaledTileId],
    ) -> Vec<(OverscaledTileId, StencilMode)> {
        let mut sorted = coords.to_vec();
        sorted.sort_by(|a, b| b.overscaled_z.cmp(&a.overscaled_z));
        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return Vec::new();
        };
        let min_z = last.overscaled_z;
        if first.overscaled_z == min_z {
            return sorted.into_iter().map(|c| (c, StencilMode::DISABLED)).collect();
        }

        self.context.clear(None, None, Some(0));
        self.clip.invalidate();
        sorted
            .into_iter()
            .map(|c| {
                let mode = StencilMode::new(
                    StencilTest {
                        func: CompareFunc::GreaterEqual,
                        mask: 0xFF,
                    },
                    1 + u32::from(c.overscaled_z - min_z),
                    0xFF,
                    StencilOp::Keep,
                    StencilOp::Keep,
                    StencilOp::Replace,
                );
                (c, mode)
            })
            .collect()
    }

    pub fn color_mode_for_render_pass(&self, pass: RenderPass) -> ColorMode {
        if self.config.show_overdraw_inspector {
            ColorMode::overdraw_inspector()
        } else if pass == RenderPass::Opaque {
            ColorMode::UNBLENDED
        } else {
            ColorMode::ALPHA_BLENDED
        }
    }

    /// Compiles on first use, then draws.
    pub(crate) fn draw_program(&mut self, shader: ShaderId, call: DrawCall<'_>) -> Result<()> {
        let program = self.programs.get(
            &mut self.context,
            &self.shaders,
            shader,
            call.configuration,
            self.config.show_overdraw_inspector,
        )?;
        program.draw(&mut self.context, call)
    }

    pub(crate) fn ensure_buffers(&mut self) -> PainterBuffers {
        if let Some(buffers) = self.buffers {
            return buffers;
        }
        let e = EXTENT as i16;
        let corners = [[0, 0], [e, 0], [0, e], [e, e]];

        let tile_extent = self
            .context
            .create_vertex_buffer(&corners.map(|pos| PosVertex { pos }), BufferUsage::Static);
        let raster_bounds = self.context.create_vertex_buffer(
            &corners.map(|pos| RasterBoundsVertex { pos, texture_pos: pos }),
            BufferUsage::Static,
        );
        let quad_indices =
            self.context.create_index_buffer(&[0, 1, 2, 1, 2, 3], BufferUsage::Static);
        let border_indices =
            self.context.create_index_buffer(&[0, 1, 3, 2, 0], BufferUsage::Static);

        let buffers = PainterBuffers {
            tile_extent,
            quad_indices,
            quad_segments: [Segment::whole(4, 2)],
            border_indices,
            border_segments: [Segment::whole(4, 5)],
            raster_bounds,
        };
        self.buffers = Some(buffers);
        buffers
    }

    /// Deletes prepared hillshades whose (layer, tile) left the offscreen pass.
    fn evict_hillshades(&mut self, keep: &HashSet<(&str, OverscaledTileId)>) {
        let stale: Vec<(String, OverscaledTileId)> = self
            .hillshade
            .keys()
            .filter(|(layer, coord)| !keep.contains(&(layer.as_str(), *coord)))
            .cloned()
            .collect();
        for key in stale {
            let Some(prepared) = self.hillshade.remove(&key) else { continue };
            self.context.delete_framebuffer(prepared.framebuffer);
            self.context.delete_texture(&prepared.texture);
            self.context.delete_texture(&prepared.dem_texture);
        }
    }

    /// Drops everything tied to the lost context. The next `render` rebuilds
    /// programs, buffers and textures from scratch.
    pub fn reset_after_context_loss(&mut self, style: &mut Style) {
        log::debug!(
            "context lost: dropping {} programs and {} prepared hillshades",
            self.programs.len(),
            self.hillshade.len()
        );
        self.programs.clear();
        self.image_manager.invalidate_texture();
        self.buffers = None;
        self.hillshade.clear();
        self.clip.clear();
        self.context.reset_state();
        for source in style.sources_mut() {
            source.for_each_tile_mut(&mut |tile: &mut Tile| tile.drop_gpu_resources());
        }
    }

    /// Deletes every GPU object the painter created.
    pub fn destroy(&mut self) {
        self.programs.destroy(&mut self.context);
        if let Some(buffers) = self.buffers.take() {
            for id in [
                buffers.tile_extent.id,
                buffers.raster_bounds.id,
                buffers.quad_indices.id,
                buffers.border_indices.id,
            ] {
                self.context.delete_buffer(id);
            }
        }
        for (_, prepared) in self.hillshade.drain() {
            self.context.delete_framebuffer(prepared.framebuffer);
            self.context.delete_texture(&prepared.texture);
            self.context.delete_texture(&prepared.dem_texture);
        }
        self.image_manager.invalidate_texture();
        self.clip.clear();
    }
}

/// Offsets `matrix` by a translate paint property.
///
/// Map-anchored translations rotate with the map; viewport-anchored ones stay
/// screen-aligned. Outside viewport units the offset is converted to tile units.
pub fn translate_pos_matrix(
    transform: &dyn Transform,
    matrix: &Mat4,
    tile: &OverscaledTileId,
    tile_size: u32,
    translate: [f32; 2],
    anchor: TranslateAnchor,
    in_viewport_units: bool,
) -> Mat4 {
    if translate == [0.0, 0.0] {
        return *matrix;
    }
    let angle = match (in_viewport_units, anchor) {
        (true, TranslateAnchor::Map) => transform.angle(),
        (false, TranslateAnchor::Viewport) => -transform.angle(),
        _ => 0.0,
    };
    let translate = if angle != 0.0 {
        rotate_vec2(translate, angle)
    } else {
        translate
    };
    let offset = if in_viewport_units {
        translate
    } else {
        let zoom = transform.zoom();
        [
            pixels_to_tile_units(tile, tile_size, translate[0], zoom),
            pixels_to_tile_units(tile, tile_size, translate[1], zoom),
        ]
    };
    mat4_translate(matrix, [offset[0], offset[1], 0.0])
}

fn layer_source<'s>(
    style: &'s Style,
    visible: &'s HashMap<String, VisibleCoordinates>,
    layer: &StyleLayer,
) -> Option<(&'s dyn SourceCache, &'s VisibleCoordinates)> {
    let id = layer.source.as_deref()?;
    Some((style.source(id)?, visible.get(id)?))
}
