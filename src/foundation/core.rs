pub use kurbo::{Affine, Point, Rect, Vec2};

/// Integer pixel rectangle (`x`, `y`, `width`, `height`) used for clips and raster bounds.
///
/// A rectangle with a non-positive width or height is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl PixelRect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Create a rectangle from origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its edges (`x1`/`y1` exclusive).
    pub fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    /// Smallest pixel rectangle containing `r` (floor the minimum, ceil the maximum).
    pub fn round_out(r: Rect) -> Self {
        if !(r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()) {
            return Self::EMPTY;
        }
        let r = r.abs();
        let x0 = r.x0.floor() as i32;
        let y0 = r.y0.floor() as i32;
        let x1 = r.x1.ceil() as i32;
        let y1 = r.y1.ceil() as i32;
        Self::from_edges(x0, y0, x1, y1)
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    pub fn max_x(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn max_y(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Convert to a floating-point rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.max_x()),
            f64::from(self.max_y()),
        )
    }

    /// Shift by an integer offset.
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self
        }
    }

    /// Grow each side by `h` horizontally and `v` vertically (negative values shrink).
    pub fn grow(self, h: i32, v: i32) -> Self {
        Self {
            x: self.x.saturating_sub(h),
            y: self.y.saturating_sub(v),
            width: self.width.saturating_add(h.saturating_mul(2)),
            height: self.height.saturating_add(v.saturating_mul(2)),
        }
    }

    /// Overlap of two rectangles; [`PixelRect::EMPTY`] when they do not intersect.
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.max_x().min(other.max_x());
        let y1 = self.max_y().min(other.max_y());
        if x1 <= x0 || y1 <= y0 {
            return Self::EMPTY;
        }
        Self::from_edges(x0, y0, x1, y1)
    }

    /// Intersect with an optional clip (`None` leaves the rectangle unchanged).
    pub fn clip_to(self, clip: Option<Self>) -> Self {
        match clip {
            Some(c) => self.intersect(c),
            None => self,
        }
    }

    /// Bounding rectangle of both; empty operands are ignored.
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    /// Return `true` when `other` lies entirely inside `self`.
    pub fn contains(self, other: Self) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Opaque black, the default shadow color.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
