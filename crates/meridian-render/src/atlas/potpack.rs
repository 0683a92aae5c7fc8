//! Greedy box packing into a near-square bin.

/// Rectangle to place. `x`/`y` are written by [`potpack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bin {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Bin {
    #[inline]
    pub fn new(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }
}

#[derive(Debug, Clone, Copy)]
struct Space {
    x: u32,
    y: u32,
    w: u32,
    /// `u32::MAX` stands for unbounded.
    h: u32,
}

/// Places every bin and returns the `(width, height)` of the packed area.
///
/// Boxes go tallest-first into the most recently created free space that
/// fits them. The sort is stable, so equal heights keep input order.
pub fn potpack(bins: &mut [Bin]) -> (u32, u32) {
    if bins.is_empty() {
        return (0, 0);
    }

    let mut area: u64 = 0;
    let mut max_width = 0;
    for b in bins.iter() {
        area += b.w as u64 * b.h as u64;
        max_width = max_width.max(b.w);
    }

    let mut order: Vec<usize> = (0..bins.len()).collect();
    order.sort_by(|&a, &b| bins[b].h.cmp(&bins[a].h));

    let start_width = ((area as f64 / 0.95).sqrt().ceil() as u32).max(max_width);
    let mut spaces = vec![Space {
        x: 0,
        y: 0,
        w: start_width,
        h: u32::MAX,
    }];

    let mut width = 0;
    let mut height = 0;

    for index in order {
        let bin = &mut bins[index];
        for i in (0..spaces.len()).rev() {
            let space = spaces[i];
            if bin.w > space.w || bin.h > space.h {
                continue;
            }

            bin.x = space.x;
            bin.y = space.y;
            height = height.max(bin.y + bin.h);
            width = width.max(bin.x + bin.w);

            if bin.w == space.w && bin.h == space.h {
                spaces.swap_remove(i);
            } else if bin.h == space.h {
                spaces[i].x += bin.w;
                spaces[i].w -= bin.w;
            } else if bin.w == space.w {
                spaces[i].y += bin.h;
                spaces[i].h -= bin.h;
            } else {
                spaces.push(Space {
                    x: space.x + bin.w,
                    y: space.y,
                    w: space.w - bin.w,
                    h: bin.h,
                });
                spaces[i].y += bin.h;
                spaces[i].h -= bin.h;
            }
            break;
        }
    }

    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: &Bin, b: &Bin) -> bool {
        a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h
    }

    #[test]
    fn bins_do_not_overlap_and_fit() {
        let mut bins: Vec<Bin> = [(10, 10), (22, 17), (5, 30), (12, 12), (8, 3), (40, 2)]
            .iter()
            .map(|&(w, h)| Bin::new(w, h))
            .collect();
        let (w, h) = potpack(&mut bins);

        for (i, a) in bins.iter().enumerate() {
            assert!(a.x + a.w <= w && a.y + a.h <= h);
            for b in &bins[i + 1..] {
                assert!(!overlaps(a, b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn equal_heights_keep_input_order() {
        let mut bins = vec![Bin::new(4, 4), Bin::new(4, 4), Bin::new(4, 4)];
        potpack(&mut bins);
        // Same row, left to right in input order.
        assert_eq!(bins[0].y, bins[1].y);
        assert!(bins[0].x < bins[1].x);
        assert!(bins[1].y < bins[2].y || bins[1].x < bins[2].x);
    }

    #[test]
    fn empty_input_packs_to_zero() {
        assert_eq!(potpack(&mut []), (0, 0));
    }

    #[test]
    fn single_bin_is_tight() {
        let mut bins = vec![Bin::new(22, 17)];
        assert_eq!(potpack(&mut bins), (22, 17));
        assert_eq!((bins[0].x, bins[0].y), (0, 0));
    }
}
