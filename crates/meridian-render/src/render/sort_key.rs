//! Cross-tile feature ordering for layers with a sort key.

use crate::gl::Segment;

/// Segments to draw with some per-tile state.
#[derive(Debug, Clone)]
pub struct SegmentsRenderState<'a, S> {
    pub state: S,
    pub segments: &'a [Segment],
    pub sort_key: f32,
}

/// Appends `segments` for one tile. With `by_key` every segment becomes its
/// own entry carrying its sort key.
pub fn push_segments<'a, S: Clone>(
    out: &mut Vec<SegmentsRenderState<'a, S>>,
    state: S,
    segments: &'a [Segment],
    by_key: bool,
) {
    if by_key {
        for segment in segments {
            out.push(SegmentsRenderState {
                state: state.clone(),
                segments: std::slice::from_ref(segment),
                sort_key: segment.sort_key,
            });
        }
    } else {
        out.push(SegmentsRenderState {
            state,
            segments,
            sort_key: 0.0,
        });
    }
}

/// Stable ascending sort; equal keys keep tile order.
pub fn sort_by_key<S>(states: &mut [SegmentsRenderState<'_, S>]) {
    states.sort_by(|a, b| a.sort_key.total_cmp(&b.sort_key));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(key: f32) -> Segment {
        Segment {
            sort_key: key,
            ..Segment::whole(4, 2)
        }
    }

    #[test]
    fn keys_interleave_across_tiles() {
        let tile1 = [keyed(5.0), keyed(1.0)];
        let tile2 = [keyed(3.0), keyed(2.0)];

        let mut states = Vec::new();
        push_segments(&mut states, 1, &tile1, true);
        push_segments(&mut states, 2, &tile2, true);
        sort_by_key(&mut states);

        let keys: Vec<f32> = states.iter().map(|s| s.sort_key).collect();
        assert_eq!(keys, [1.0, 2.0, 3.0, 5.0]);
        let tiles: Vec<i32> = states.iter().map(|s| s.state).collect();
        assert_eq!(tiles, [1, 2, 2, 1]);
    }

    #[test]
    fn without_key_each_tile_is_one_entry() {
        let tile = [keyed(5.0), keyed(1.0)];
        let mut states = Vec::new();
        push_segments(&mut states, (), &tile, false);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].segments.len(), 2);
    }
}
