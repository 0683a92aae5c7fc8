use std::fmt;

/// A tile in the canonical `z/x/y` grid of one world copy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CanonicalTileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl CanonicalTileId {
    pub const fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

/// A canonical tile in a specific world copy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UnwrappedTileId {
    pub wrap: i32,
    pub canonical: CanonicalTileId,
}

impl UnwrappedTileId {
    pub const fn new(wrap: i32, canonical: CanonicalTileId) -> Self {
        Self { wrap, canonical }
    }
}

/// A tile whose data may come from a lower zoom and be drawn scaled up.
///
/// `overscaled_z >= canonical.z` always.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OverscaledTileId {
    pub overscaled_z: u8,
    pub wrap: i32,
    pub canonical: CanonicalTileId,
}

impl OverscaledTileId {
    pub fn new(overscaled_z: u8, wrap: i32, canonical: CanonicalTileId) -> Self {
        debug_assert!(overscaled_z >= canonical.z);
        Self {
            overscaled_z,
            wrap,
            canonical,
        }
    }

    /// Non-overscaled tile at `z/x/y` in world copy 0.
    pub fn canonical(z: u8, x: u32, y: u32) -> Self {
        Self::new(z, 0, CanonicalTileId::new(z, x, y))
    }

    #[inline]
    pub fn overscale_factor(&self) -> f32 {
        (1u64 << (self.overscaled_z - self.canonical.z)) as f32
    }

    #[inline]
    pub fn to_unwrapped(&self) -> UnwrappedTileId {
        UnwrappedTileId::new(self.wrap, self.canonical)
    }

    /// Parent at `target_z`, or `None` when `target_z` is not below this tile.
    pub fn scaled_to(&self, target_z: u8) -> Option<OverscaledTileId> {
        if target_z >= self.overscaled_z {
            return None;
        }
        if target_z >= self.canonical.z {
            return Some(Self::new(target_z, self.wrap, self.canonical));
        }
        let shift = self.canonical.z - target_z;
        Some(Self::new(
            target_z,
            self.wrap,
            CanonicalTileId::new(target_z, self.canonical.x >> shift, self.canonical.y >> shift),
        ))
    }
}

impl fmt::Display for OverscaledTileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.canonical;
        write!(f, "{}/{}/{}", c.z, c.x, c.y)?;
        if self.overscaled_z != c.z {
            write!(f, "@{}", self.overscaled_z)?;
        }
        if self.wrap != 0 {
            write!(f, "~{}", self.wrap)?;
        }
        Ok(())
    }
}

/// Paint order of renderable tiles: zoom ascending, then world copies away
/// from the primary one, then `y` and `x` descending.
pub fn compare_tile_ids(a: &OverscaledTileId, b: &OverscaledTileId) -> std::cmp::Ordering {
    let wrap_rank = |w: i32| (w * 2).abs() - i32::from(w < 0);
    a.overscaled_z
        .cmp(&b.overscaled_z)
        .then_with(|| wrap_rank(b.wrap).cmp(&wrap_rank(a.wrap)))
        .then_with(|| b.canonical.y.cmp(&a.canonical.y))
        .then_with(|| b.canonical.x.cmp(&a.canonical.x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overscale_factor_doubles_per_level() {
        let id = OverscaledTileId::new(5, 0, CanonicalTileId::new(3, 1, 2));
        assert_eq!(id.overscale_factor(), 4.0);
    }

    #[test]
    fn scaled_to_walks_up_the_pyramid() {
        let id = OverscaledTileId::canonical(4, 13, 6);
        let parent = id.scaled_to(2).unwrap();
        assert_eq!(parent.canonical, CanonicalTileId::new(2, 3, 1));
        assert!(id.scaled_to(4).is_none());

        let over = OverscaledTileId::new(6, 0, CanonicalTileId::new(4, 13, 6));
        assert_eq!(over.scaled_to(5).unwrap().canonical, over.canonical);
    }

    #[test]
    fn ordering_puts_lower_zoom_first() {
        let mut ids = vec![
            OverscaledTileId::canonical(3, 0, 0),
            OverscaledTileId::canonical(2, 1, 1),
            OverscaledTileId::canonical(3, 1, 0),
        ];
        ids.sort_by(compare_tile_ids);
        assert_eq!(ids[0].overscaled_z, 2);
        assert_eq!(ids[1].canonical.x, 1);
    }

    #[test]
    fn display_marks_overscale_and_wrap() {
        let id = OverscaledTileId::new(5, -1, CanonicalTileId::new(3, 1, 2));
        assert_eq!(id.to_string(), "3/1/2@5~-1");
    }
}
