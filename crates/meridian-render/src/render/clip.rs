use std::collections::HashMap;

use crate::source::OverscaledTileId;

/// Stencil reference ids of the tiles of the source whose clip masks are
/// currently in the stencil buffer.
#[derive(Debug, Default)]
pub struct TileClipRegistry {
    source: Option<String>,
    ids: HashMap<OverscaledTileId, u32>,
}

impl TileClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose masks are live, if any.
    pub fn current_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_current(&self, source: &str) -> bool {
        self.source.as_deref() == Some(source)
    }

    /// Assigns ids `1..=tiles.len()` in order, dropping earlier assignments.
    pub fn assign(
        &mut self,
        source: &str,
        tiles: &[OverscaledTileId],
    ) -> Vec<(OverscaledTileId, u32)> {
        self.source = Some(source.to_owned());
        self.ids.clear();
        let mut out = Vec::with_capacity(tiles.len());
        for (tile, id) in tiles.iter().zip(1u32..) {
            self.ids.insert(*tile, id);
            out.push((*tile, id));
        }
        if tiles.len() > 255 {
            log::warn!(
                "{} clip masks for source {source}; ids above 255 alias in an 8-bit stencil buffer",
                tiles.len()
            );
        }
        out
    }

    pub fn id(&self, tile: &OverscaledTileId) -> Option<u32> {
        self.ids.get(tile).copied()
    }

    /// The stencil buffer was overwritten; the next clipped layer rebuilds.
    pub fn invalidate(&mut self) {
        self.source = None;
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles() -> Vec<OverscaledTileId> {
        vec![
            OverscaledTileId::canonical(2, 0, 0),
            OverscaledTileId::canonical(2, 1, 0),
            OverscaledTileId::canonical(2, 0, 1),
        ]
    }

    #[test]
    fn ids_restart_after_switching_sources() {
        let mut registry = TileClipRegistry::new();
        let a = tiles();

        let first: Vec<u32> = registry.assign("a", &a).into_iter().map(|(_, id)| id).collect();
        assert_eq!(first, [1, 2, 3]);

        registry.assign("b", &a[..1]);
        assert!(registry.is_current("b"));

        let again: Vec<u32> = registry.assign("a", &a).into_iter().map(|(_, id)| id).collect();
        assert_eq!(again, [1, 2, 3]);
        assert_eq!(registry.id(&a[2]), Some(3));
    }

    #[test]
    fn invalidate_keeps_ids_but_forces_rebuild() {
        let mut registry = TileClipRegistry::new();
        registry.assign("a", &tiles());
        registry.invalidate();
        assert!(!registry.is_current("a"));
        assert_eq!(registry.current_source(), None);
    }
}
