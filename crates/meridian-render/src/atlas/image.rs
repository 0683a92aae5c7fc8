use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error(
        "pixel buffer of {actual} bytes does not match {width}x{height} image ({expected} bytes)"
    )]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("copy rectangle {size:?} at {origin:?} exceeds {bounds:?} image")]
    OutOfBounds {
        origin: [u32; 2],
        size: [u32; 2],
        bounds: [u32; 2],
    },
}

/// Tightly packed RGBA8 bitmap, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaImage {
    /// Transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_pixels(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Copies a `size` rectangle from `src` at `src_origin` into `dst` at `dst_origin`.
    pub fn copy(
        src: &RgbaImage,
        dst: &mut RgbaImage,
        src_origin: [u32; 2],
        dst_origin: [u32; 2],
        size: [u32; 2],
    ) -> Result<(), ImageError> {
        check_bounds(src, src_origin, size)?;
        check_bounds(dst, dst_origin, size)?;

        let row_bytes = size[0] as usize * 4;
        for row in 0..size[1] as usize {
            let s = ((src_origin[1] as usize + row) * src.width as usize + src_origin[0] as usize)
                * 4;
            let d = ((dst_origin[1] as usize + row) * dst.width as usize + dst_origin[0] as usize)
                * 4;
            dst.data[d..d + row_bytes].copy_from_slice(&src.data[s..s + row_bytes]);
        }
        Ok(())
    }
}

fn check_bounds(image: &RgbaImage, origin: [u32; 2], size: [u32; 2]) -> Result<(), ImageError> {
    let fits = |o: u32, s: u32, bound: u32| o.checked_add(s).is_some_and(|end| end <= bound);
    if fits(origin[0], size[0], image.width) && fits(origin[1], size[1], image.height) {
        Ok(())
    } else {
        Err(ImageError::OutOfBounds {
            origin,
            size,
            bounds: image.size(),
        })
    }
}
