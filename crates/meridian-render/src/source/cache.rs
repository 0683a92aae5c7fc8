use std::collections::HashMap;

use super::tile::Tile;
use super::tile_id::{OverscaledTileId, compare_tile_ids};

/// Tiles of one source that the renderer may read during a frame.
pub trait SourceCache {
    fn id(&self) -> &str;

    /// Tile size in CSS pixels.
    fn tile_size(&self) -> u32 {
        512
    }

    /// Whether covering zoom levels round instead of floor.
    fn round_zoom(&self) -> bool {
        false
    }

    fn tile(&self, id: &OverscaledTileId) -> Option<&Tile>;

    /// Renderable tiles in paint order. With `symbols`, tiles kept only so
    /// that labels can fade out are included too.
    fn visible_coordinates(&self, symbols: bool) -> Vec<OverscaledTileId>;

    /// Nearest loaded ancestor of `id` no lower than `min_zoom`.
    fn find_loaded_parent(&self, id: &OverscaledTileId, min_zoom: u8) -> Option<&Tile> {
        (min_zoom..id.overscaled_z)
            .rev()
            .filter_map(|z| id.scaled_to(z))
            .find_map(|parent| self.tile(&parent))
    }

    fn for_each_tile_mut(&mut self, f: &mut dyn FnMut(&mut Tile));
}

/// A source whose tile set is managed by the caller.
#[derive(Debug)]
pub struct StaticSourceCache {
    id: String,
    tile_size: u32,
    round_zoom: bool,
    tiles: HashMap<OverscaledTileId, Tile>,
    renderable: Vec<OverscaledTileId>,
    retained: Vec<OverscaledTileId>,
}

impl StaticSourceCache {
    pub fn new(id: impl Into<String>, tile_size: u32) -> Self {
        Self {
            id: id.into(),
            tile_size,
            round_zoom: false,
            tiles: HashMap::new(),
            renderable: Vec::new(),
            retained: Vec::new(),
        }
    }

    pub fn with_round_zoom(mut self, round: bool) -> Self {
        self.round_zoom = round;
        self
    }

    /// Adds a renderable tile.
    pub fn add_tile(&mut self, tile: Tile) {
        let id = tile.id;
        if self.tiles.insert(id, tile).is_none() {
            self.renderable.push(id);
        }
    }

    /// Adds a loaded tile that is neither drawn nor faded, e.g. a parent.
    pub fn add_loaded_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    /// Adds a tile that only symbol layers still draw while their labels fade.
    pub fn add_retained_tile(&mut self, tile: Tile) {
        let id = tile.id;
        if self.tiles.insert(id, tile).is_none() {
            self.retained.push(id);
        }
    }

    pub fn remove_tile(&mut self, id: &OverscaledTileId) -> Option<Tile> {
        self.renderable.retain(|t| t != id);
        self.retained.retain(|t| t != id);
        self.tiles.remove(id)
    }

    pub fn tile_mut(&mut self, id: &OverscaledTileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }
}

impl SourceCache for StaticSourceCache {
    fn id(&self) -> &str {
        &self.id
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn round_zoom(&self) -> bool {
        self.round_zoom
    }

    fn tile(&self, id: &OverscaledTileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    fn visible_coordinates(&self, symbols: bool) -> Vec<OverscaledTileId> {
        let mut ids = self.renderable.clone();
        if symbols {
            ids.extend_from_slice(&self.retained);
        }
        ids.sort_by(compare_tile_ids);
        ids
    }

    fn for_each_tile_mut(&mut self, f: &mut dyn FnMut(&mut Tile)) {
        for tile in self.tiles.values_mut() {
            f(tile);
        }
    }
}
