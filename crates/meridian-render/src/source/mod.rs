//! Tiles, buckets and the source caches the renderer reads from.

mod bucket;
mod cache;
mod tile;
mod tile_id;

pub use bucket::{
    Bucket, CollisionBoxVertex, CollisionBuffers, CollisionPlacementVertex, ExtrusionVertex,
    FillBucket,
    GeometryBucket, GeometryBuffers, LineVertex, SymbolBucket, SymbolBuffers, SymbolDynamicVertex,
    SymbolLayoutVertex, SymbolOpacityVertex, SymbolSize,
};
pub use cache::{SourceCache, StaticSourceCache};
pub use tile::{DemData, DemEncoding, Tile};
pub use tile_id::{CanonicalTileId, OverscaledTileId, UnwrappedTileId, compare_tile_ids};

/// Tile-space units per tile edge.
pub const EXTENT: u32 = 8192;
