//! Style layers with paint values already evaluated for the frame's zoom.

use crate::color::Color;
use crate::gl::{TextureFilter, UniformValues};

use super::property::{Alignment, CrossFaded, PropertyValue, TranslateAnchor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Background,
    Fill,
    Line,
    Circle,
    Symbol,
    FillExtrusion,
    Raster,
    Hillshade,
}

/// Image-pattern property; `None` when unset.
pub type PatternProperty = Option<CrossFaded<String>>;

/// Inserts `name` when `value` is constant.
fn set_constant<T: Copy + Into<crate::gl::UniformData>>(
    out: &mut UniformValues,
    name: &'static str,
    value: PropertyValue<T>,
) {
    if let PropertyValue::Constant(v) = value {
        out.set(name, v);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPaint {
    pub color: Color,
    pub opacity: f32,
    pub pattern: PatternProperty,
}

impl Default for BackgroundPaint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 1.0,
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillPaint {
    pub antialias: bool,
    pub opacity: PropertyValue<f32>,
    pub color: PropertyValue<Color>,
    /// Falls back to `color` when unset.
    pub outline_color: Option<PropertyValue<Color>>,
    pub translate: [f32; 2],
    pub translate_anchor: TranslateAnchor,
    pub pattern: PatternProperty,
}

impl Default for FillPaint {
    fn default() -> Self {
        Self {
            antialias: true,
            opacity: PropertyValue::Constant(1.0),
            color: PropertyValue::Constant(Color::BLACK),
            outline_color: None,
            translate: [0.0, 0.0],
            translate_anchor: TranslateAnchor::Map,
            pattern: None,
        }
    }
}

impl FillPaint {
    pub fn paint_uniforms(&self) -> UniformValues {
        let mut out = UniformValues::new();
        set_constant(&mut out, "u_opacity", self.opacity);
        set_constant(&mut out, "u_color", self.color);
        set_constant(&mut out, "u_outline_color", self.outline_color.unwrap_or(self.color));
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePaint {
    pub opacity: PropertyValue<f32>,
    pub color: PropertyValue<Color>,
    pub width: PropertyValue<f32>,
    pub gap_width: PropertyValue<f32>,
    pub offset: PropertyValue<f32>,
    pub blur: PropertyValue<f32>,
    pub translate: [f32; 2],
    pub translate_anchor: TranslateAnchor,
    pub pattern: PatternProperty,
}

impl Default for LinePaint {
    fn default() -> Self {
        Self {
            opacity: PropertyValue::Constant(1.0),
            color: PropertyValue::Constant(Color::BLACK),
            width: PropertyValue::Constant(1.0),
            gap_width: PropertyValue::Constant(0.0),
            offset: PropertyValue::Constant(0.0),
            blur: PropertyValue::Constant(0.0),
            translate: [0.0, 0.0],
            translate_anchor: TranslateAnchor::Map,
            pattern: None,
        }
    }
}

impl LinePaint {
    pub fn paint_uniforms(&self) -> UniformValues {
        let mut out = UniformValues::new();
        set_constant(&mut out, "u_opacity", self.opacity);
        set_constant(&mut out, "u_color", self.color);
        set_constant(&mut out, "u_width", self.width);
        set_constant(&mut out, "u_gapwidth", self.gap_width);
        set_constant(&mut out, "u_offset", self.offset);
        set_constant(&mut out, "u_blur", self.blur);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CirclePaint {
    pub radius: PropertyValue<f32>,
    pub color: PropertyValue<Color>,
    pub blur: PropertyValue<f32>,
    pub opacity: PropertyValue<f32>,
    pub translate: [f32; 2],
    pub translate_anchor: TranslateAnchor,
    pub pitch_scale: Alignment,
    pub pitch_alignment: Alignment,
    pub stroke_width: PropertyValue<f32>,
    pub stroke_color: PropertyValue<Color>,
    pub stroke_opacity: PropertyValue<f32>,
    /// Features are ordered by their segment sort keys.
    pub sort_key: bool,
}

impl Default for CirclePaint {
    fn default() -> Self {
        Self {
            radius: PropertyValue::Constant(5.0),
            color: PropertyValue::Constant(Color::BLACK),
            blur: PropertyValue::Constant(0.0),
            opacity: PropertyValue::Constant(1.0),
            translate: [0.0, 0.0],
            translate_anchor: TranslateAnchor::Map,
            pitch_scale: Alignment::Map,
            pitch_alignment: Alignment::Viewport,
            stroke_width: PropertyValue::Constant(0.0),
            stroke_color: PropertyValue::Constant(Color::BLACK),
            stroke_opacity: PropertyValue::Constant(1.0),
            sort_key: false,
        }
    }
}

impl CirclePaint {
    pub fn paint_uniforms(&self) -> UniformValues {
        let mut out = UniformValues::new();
        set_constant(&mut out, "u_radius", self.radius);
        set_constant(&mut out, "u_color", self.color);
        set_constant(&mut out, "u_blur", self.blur);
        set_constant(&mut out, "u_opacity", self.opacity);
        set_constant(&mut out, "u_stroke_width", self.stroke_width);
        set_constant(&mut out, "u_stroke_color", self.stroke_color);
        set_constant(&mut out, "u_stroke_opacity", self.stroke_opacity);
        out
    }
}

/// Icon or text half of a symbol layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPartPaint {
    pub opacity: PropertyValue<f32>,
    pub color: PropertyValue<Color>,
    pub halo_color: PropertyValue<Color>,
    pub halo_width: PropertyValue<f32>,
    pub halo_blur: PropertyValue<f32>,
    pub translate: [f32; 2],
    pub translate_anchor: TranslateAnchor,
    pub rotation_alignment: Alignment,
    pub pitch_alignment: Alignment,
    /// Constant layout size; `1` means unscaled.
    pub size: PropertyValue<f32>,
}

impl Default for SymbolPartPaint {
    fn default() -> Self {
        Self {
            opacity: PropertyValue::Constant(1.0),
            color: PropertyValue::Constant(Color::BLACK),
            halo_color: PropertyValue::Constant(Color::TRANSPARENT),
            halo_width: PropertyValue::Constant(0.0),
            halo_blur: PropertyValue::Constant(0.0),
            translate: [0.0, 0.0],
            translate_anchor: TranslateAnchor::Map,
            rotation_alignment: Alignment::Viewport,
            pitch_alignment: Alignment::Viewport,
            size: PropertyValue::Constant(1.0),
        }
    }
}

impl SymbolPartPaint {
    pub fn paint_uniforms(&self) -> UniformValues {
        let mut out = UniformValues::new();
        set_constant(&mut out, "u_opacity", self.opacity);
        set_constant(&mut out, "u_fill_color", self.color);
        set_constant(&mut out, "u_halo_color", self.halo_color);
        set_constant(&mut out, "u_halo_width", self.halo_width);
        set_constant(&mut out, "u_halo_blur", self.halo_blur);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolPaint {
    pub icon: SymbolPartPaint,
    pub text: SymbolPartPaint,
    /// Symbols placed along lines rather than at points.
    pub line_placement: bool,
    pub sort_key: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillExtrusionPaint {
    pub opacity: f32,
    pub color: PropertyValue<Color>,
    pub translate: [f32; 2],
    pub translate_anchor: TranslateAnchor,
    pub pattern: PatternProperty,
    pub height: PropertyValue<f32>,
    pub base: PropertyValue<f32>,
    pub vertical_gradient: bool,
}

impl Default for FillExtrusionPaint {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            color: PropertyValue::Constant(Color::BLACK),
            translate: [0.0, 0.0],
            translate_anchor: TranslateAnchor::Map,
            pattern: None,
            height: PropertyValue::Constant(0.0),
            base: PropertyValue::Constant(0.0),
            vertical_gradient: true,
        }
    }
}

impl FillExtrusionPaint {
    pub fn paint_uniforms(&self) -> UniformValues {
        let mut out = UniformValues::new();
        set_constant(&mut out, "u_color", self.color);
        set_constant(&mut out, "u_height", self.height);
        set_constant(&mut out, "u_base", self.base);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterPaint {
    pub opacity: f32,
    /// Degrees.
    pub hue_rotate: f32,
    pub brightness_min: f32,
    pub brightness_max: f32,
    pub saturation: f32,
    pub contrast: f32,
    pub resampling: TextureFilter,
    /// Milliseconds.
    pub fade_duration: f64,
}

impl Default for RasterPaint {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            hue_rotate: 0.0,
            brightness_min: 0.0,
            brightness_max: 1.0,
            saturation: 0.0,
            contrast: 0.0,
            resampling: TextureFilter::Linear,
            fade_duration: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HillshadePaint {
    /// Degrees clockwise from north.
    pub illumination_direction: f32,
    pub illumination_anchor: TranslateAnchor,
    pub exaggeration: f32,
    pub shadow_color: Color,
    pub highlight_color: Color,
    pub accent_color: Color,
}

impl Default for HillshadePaint {
    fn default() -> Self {
        Self {
            illumination_direction: 335.0,
            illumination_anchor: TranslateAnchor::Viewport,
            exaggeration: 0.5,
            shadow_color: Color::BLACK,
            highlight_color: Color::WHITE,
            accent_color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerPaint {
    Background(BackgroundPaint),
    Fill(FillPaint),
    Line(LinePaint),
    Circle(CirclePaint),
    Symbol(SymbolPaint),
    FillExtrusion(FillExtrusionPaint),
    Raster(RasterPaint),
    Hillshade(HillshadePaint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    pub id: String,
    /// Backing source; background layers have none.
    pub source: Option<String>,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub visible: bool,
    pub paint: LayerPaint,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, source: Option<&str>, paint: LayerPaint) -> Self {
        Self {
            id: id.into(),
            source: source.map(str::to_owned),
            min_zoom: 0.0,
            max_zoom: f32::INFINITY,
            visible: true,
            paint,
        }
    }

    pub fn layer_type(&self) -> LayerType {
        match self.paint {
            LayerPaint::Background(_) => LayerType::Background,
            LayerPaint::Fill(_) => LayerType::Fill,
            LayerPaint::Line(_) => LayerType::Line,
            LayerPaint::Circle(_) => LayerType::Circle,
            LayerPaint::Symbol(_) => LayerType::Symbol,
            LayerPaint::FillExtrusion(_) => LayerType::FillExtrusion,
            LayerPaint::Raster(_) => LayerType::Raster,
            LayerPaint::Hillshade(_) => LayerType::Hillshade,
        }
    }

    pub fn is_hidden(&self, zoom: f32) -> bool {
        !self.visible || zoom < self.min_zoom || zoom >= self.max_zoom
    }

    /// Draws into the depth buffer with the 3D range.
    pub fn is_3d(&self) -> bool {
        self.layer_type() == LayerType::FillExtrusion
    }

    /// Confined to each tile's stencil clip mask.
    pub fn is_tile_clipped(&self) -> bool {
        matches!(self.layer_type(), LayerType::Fill | LayerType::Line)
    }

    /// Renders an intermediate texture before the main passes.
    pub fn has_offscreen_pass(&self) -> bool {
        matches!(&self.paint, LayerPaint::Hillshade(p) if p.exaggeration != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_range_is_half_open() {
        let mut layer = StyleLayer::new("l", Some("s"), LayerPaint::Line(LinePaint::default()));
        layer.min_zoom = 4.0;
        layer.max_zoom = 10.0;
        assert!(layer.is_hidden(3.9));
        assert!(!layer.is_hidden(4.0));
        assert!(layer.is_hidden(10.0));
        layer.visible = false;
        assert!(layer.is_hidden(5.0));
    }

    #[test]
    fn flags_by_type() {
        let fill = StyleLayer::new("f", Some("s"), LayerPaint::Fill(FillPaint::default()));
        let paint = LayerPaint::FillExtrusion(FillExtrusionPaint::default());
        let ext = StyleLayer::new("e", Some("s"), paint);
        let flat = StyleLayer::new(
            "h",
            Some("dem"),
            LayerPaint::Hillshade(HillshadePaint {
                exaggeration: 0.0,
                ..HillshadePaint::default()
            }),
        );
        assert!(fill.is_tile_clipped() && !fill.is_3d());
        assert!(ext.is_3d() && !ext.is_tile_clipped());
        assert!(!flat.has_offscreen_pass());
    }

    #[test]
    fn fill_outline_defaults_to_fill_color() {
        let paint = FillPaint {
            color: PropertyValue::Constant(Color::WHITE),
            ..FillPaint::default()
        };
        let u = paint.paint_uniforms();
        assert_eq!(u.get("u_outline_color"), u.get("u_color"));
    }
}
