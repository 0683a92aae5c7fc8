//! Style-side inputs: layers, evaluated paint values, light and crossfades.

mod layer;
mod light;
mod property;

use std::collections::HashMap;

pub use layer::{
    BackgroundPaint, CirclePaint, FillExtrusionPaint, FillPaint, HillshadePaint, LayerPaint,
    LayerType, LinePaint, PatternProperty, RasterPaint, StyleLayer, SymbolPaint, SymbolPartPaint,
};
pub use light::Light;
pub use property::{
    Alignment, CrossFaded, CrossfadeParameters, PropertyValue, TranslateAnchor, ZoomHistory,
};

use crate::source::SourceCache;

/// Ordered layers (bottom first) and the sources they draw from.
#[derive(Default)]
pub struct Style {
    pub layers: Vec<StyleLayer>,
    pub light: Light,
    sources: HashMap<String, Box<dyn SourceCache>>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, source: Box<dyn SourceCache>) {
        self.sources.insert(source.id().to_owned(), source);
    }

    pub fn source(&self, id: &str) -> Option<&dyn SourceCache> {
        self.sources.get(id).map(|s| s.as_ref())
    }

    pub fn source_mut(&mut self, id: &str) -> Option<&mut (dyn SourceCache + 'static)> {
        self.sources.get_mut(id).map(|s| s.as_mut())
    }

    pub fn sources(&self) -> impl Iterator<Item = &dyn SourceCache> {
        self.sources.values().map(|s| s.as_ref())
    }

    pub fn sources_mut(&mut self) -> impl Iterator<Item = &mut (dyn SourceCache + 'static)> {
        self.sources.values_mut().map(|s| s.as_mut())
    }

    pub fn push_layer(&mut self, layer: StyleLayer) {
        self.layers.push(layer);
    }
}
