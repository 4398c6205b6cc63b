use crate::foundation::core::{PixelRect, Rgba8Premul};
use crate::foundation::error::{ShadefxError, ShadefxResult};

/// Premultiplied RGBA8 pixel buffer, row-major with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Transparent raster of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Raster filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> Self {
        let mut out = Self::new(width, height);
        out.fill(color);
        out
    }

    /// Wrap premultiplied bytes, checking the length against the size.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> ShadefxResult<Self> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(ShadefxError::invalid_image(format!(
                "{width}x{height} raster needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Import a straight-alpha image.
    pub fn from_rgba_image(img: &::image::RgbaImage) -> Self {
        let mut data = img.as_raw().clone();
        for px in data.chunks_exact_mut(4) {
            let p = Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3]);
            px.copy_from_slice(&p.to_array());
        }
        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    /// Export as a straight-alpha image.
    pub fn to_rgba_image(&self) -> ::image::RgbaImage {
        ::image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b, a] = self.pixel(x, y);
            ::image::Rgba([unpremul(r, a), unpremul(g, a), unpremul(b, a), a])
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable premultiplied bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Pixel at `(x, y)`; out-of-range coordinates read as transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let c = color.to_array();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    /// Reset to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Copy the overlap of `src` (placed at `src_bounds`) into `self` (placed at `at`).
    pub(crate) fn blit(&mut self, at: PixelRect, src: &Raster, src_bounds: PixelRect) {
        let overlap = at.intersect(src_bounds);
        if overlap.is_empty() {
            return;
        }
        let n = overlap.width as usize * 4;
        for y in overlap.y..overlap.max_y() {
            let s = ((y - src_bounds.y) as usize * src.width as usize
                + (overlap.x - src_bounds.x) as usize)
                * 4;
            let d = ((y - at.y) as usize * self.width as usize + (overlap.x - at.x) as usize) * 4;
            self.data[d..d + n].copy_from_slice(&src.data[s..s + n]);
        }
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

fn unpremul(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/image/raster.rs"]
mod tests;
