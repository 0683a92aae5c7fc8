use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::Context as _;

/// Every program the renderer can ask for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShaderId {
    ClippingMask,
    Background,
    BackgroundPattern,
    Fill,
    FillPattern,
    FillOutline,
    FillOutlinePattern,
    Line,
    LinePattern,
    Circle,
    SymbolIcon,
    SymbolSdf,
    FillExtrusion,
    FillExtrusionPattern,
    Raster,
    HillshadePrepare,
    Hillshade,
    Debug,
    CollisionBox,
}

impl ShaderId {
    pub const ALL: [ShaderId; 19] = [
        ShaderId::ClippingMask,
        ShaderId::Background,
        ShaderId::BackgroundPattern,
        ShaderId::Fill,
        ShaderId::FillPattern,
        ShaderId::FillOutline,
        ShaderId::FillOutlinePattern,
        ShaderId::Line,
        ShaderId::LinePattern,
        ShaderId::Circle,
        ShaderId::SymbolIcon,
        ShaderId::SymbolSdf,
        ShaderId::FillExtrusion,
        ShaderId::FillExtrusionPattern,
        ShaderId::Raster,
        ShaderId::HillshadePrepare,
        ShaderId::Hillshade,
        ShaderId::Debug,
        ShaderId::CollisionBox,
    ];

    /// File stem used by [`ShaderLibrary::load_dir`].
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderId::ClippingMask => "clipping_mask",
            ShaderId::Background => "background",
            ShaderId::BackgroundPattern => "background_pattern",
            ShaderId::Fill => "fill",
            ShaderId::FillPattern => "fill_pattern",
            ShaderId::FillOutline => "fill_outline",
            ShaderId::FillOutlinePattern => "fill_outline_pattern",
            ShaderId::Line => "line",
            ShaderId::LinePattern => "line_pattern",
            ShaderId::Circle => "circle",
            ShaderId::SymbolIcon => "symbol_icon",
            ShaderId::SymbolSdf => "symbol_sdf",
            ShaderId::FillExtrusion => "fill_extrusion",
            ShaderId::FillExtrusionPattern => "fill_extrusion_pattern",
            ShaderId::Raster => "raster",
            ShaderId::HillshadePrepare => "hillshade_prepare",
            ShaderId::Hillshade => "hillshade",
            ShaderId::Debug => "debug",
            ShaderId::CollisionBox => "collision_box",
        }
    }
}

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// Shader text supplied by the host, keyed by [`ShaderId`].
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    sources: HashMap<ShaderId, ShaderSource>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ShaderId, vertex: impl Into<String>, fragment: impl Into<String>) {
        self.sources.insert(
            id,
            ShaderSource {
                vertex: vertex.into(),
                fragment: fragment.into(),
            },
        );
    }

    #[inline]
    pub fn get(&self, id: ShaderId) -> Option<&ShaderSource> {
        self.sources.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Reads `<stem>.vertex.glsl` / `<stem>.fragment.glsl` pairs from `dir`.
    ///
    /// Shaders with no files are left out; asking for them later fails with
    /// [`RenderError::MissingShader`](crate::RenderError::MissingShader).
    pub fn load_dir(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut library = Self::new();

        for id in ShaderId::ALL {
            let vertex_path = dir.join(format!("{}.vertex.glsl", id.as_str()));
            let fragment_path = dir.join(format!("{}.fragment.glsl", id.as_str()));
            if !vertex_path.exists() && !fragment_path.exists() {
                continue;
            }

            let vertex = std::fs::read_to_string(&vertex_path)
                .with_context(|| format!("reading {}", vertex_path.display()))?;
            let fragment = std::fs::read_to_string(&fragment_path)
                .with_context(|| format!("reading {}", fragment_path.display()))?;
            library.insert(id, vertex, fragment);
        }

        log::debug!("loaded {} shader(s) from {}", library.len(), dir.display());
        Ok(library)
    }
}
