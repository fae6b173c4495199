use ndarray::Array2;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, RGBA_CHANNEL_COUNT};
use crate::error::{Result, RoentgenError};

/// An RGBA color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

/// A point in continuous pixel coordinates.
///
/// Whether the coordinates are image-space or canvas-space depends on which
/// side of a [`crate::transform::ViewTransform`] the point lives on; the
/// annotation model stores image-space points exclusively.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: PointF) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle with non-negative extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    /// Build a normalized rectangle from two opposite corners. The result
    /// always has non-negative width and height, whatever the drag direction.
    pub fn from_corners(a: PointF, b: PointF) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn min(&self) -> PointF {
        PointF::new(self.x, self.y)
    }

    pub fn max(&self) -> PointF {
        PointF::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The four corners in clockwise order starting at the minimum corner.
    pub fn corners(&self) -> [PointF; 4] {
        [
            PointF::new(self.x, self.y),
            PointF::new(self.x + self.width, self.y),
            PointF::new(self.x + self.width, self.y + self.height),
            PointF::new(self.x, self.y + self.height),
        ]
    }
}

/// An interleaved 8-bit RGBA pixel buffer.
///
/// Row-major, 4 bytes per pixel. This is the unit every filter consumes and
/// produces, and the surface the two viewer layers are rendered into.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Raster {
    /// Create a raster filled with a uniform color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * RGBA_CHANNEL_COUNT);
        for _ in 0..count {
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Create a fully transparent raster, used for overlay layers.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Wrap an existing interleaved RGBA buffer, validating its length.
    pub fn from_vec(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * RGBA_CHANNEL_COUNT;
        if pixels.len() != expected {
            return Err(RoentgenError::BufferSizeMismatch {
                len: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * RGBA_CHANNEL_COUNT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.pixels
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * RGBA_CHANNEL_COUNT
    }

    /// Pixel at (x, y). Out-of-bounds reads return transparent black.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Color {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return Color::TRANSPARENT;
        }
        let i = self.offset(x as u32, y as u32);
        Color::rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Overwrite the pixel at (x, y). Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
        self.pixels[i + 3] = color.a;
    }

    /// Source-over blend of `color` onto the pixel at (x, y).
    #[inline]
    pub fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        let a = color.a as u32;
        if a == 0 {
            return;
        }
        if a == 255 {
            self.pixels[i] = color.r;
            self.pixels[i + 1] = color.g;
            self.pixels[i + 2] = color.b;
            self.pixels[i + 3] = 255;
            return;
        }
        let inv = 255 - a;
        let dst_a = self.pixels[i + 3] as u32;
        self.pixels[i] = ((color.r as u32 * a + self.pixels[i] as u32 * inv) / 255) as u8;
        self.pixels[i + 1] = ((color.g as u32 * a + self.pixels[i + 1] as u32 * inv) / 255) as u8;
        self.pixels[i + 2] = ((color.b as u32 * a + self.pixels[i + 2] as u32 * inv) / 255) as u8;
        self.pixels[i + 3] = (a + dst_a * inv / 255) as u8;
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Fill the whole raster with one color.
    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(RGBA_CHANNEL_COUNT) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
    }

    /// Extract the luminance plane as f32 in [0.0, 1.0] using the ITU-R
    /// BT.601 weights. Alpha is ignored.
    pub fn luminance_plane(&self) -> Array2<f32> {
        let w = self.width as usize;
        let h = self.height as usize;
        Array2::from_shape_fn((h, w), |(row, col)| {
            let i = (row * w + col) * RGBA_CHANNEL_COUNT;
            let r = self.pixels[i] as f32;
            let g = self.pixels[i + 1] as f32;
            let b = self.pixels[i + 2] as f32;
            (LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b) / 255.0
        })
    }

    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .expect("raster buffer length matches dimensions")
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            pixels: img.into_raw(),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_short_buffer() {
        let err = Raster::from_vec(vec![0u8; 10], 4, 4);
        assert!(err.is_err());
    }

    #[test]
    fn blend_opaque_replaces() {
        let mut r = Raster::filled(2, 2, Color::BLACK);
        r.blend(1, 1, Color::rgb(10, 20, 30));
        assert_eq!(r.get(1, 1), Color::rgb(10, 20, 30));
    }

    #[test]
    fn out_of_bounds_access_is_safe() {
        let mut r = Raster::filled(2, 2, Color::BLACK);
        r.set(-1, 5, Color::WHITE);
        assert_eq!(r.get(-1, 5), Color::TRANSPARENT);
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let rect = RectF::from_corners(PointF::new(5.0, 8.0), PointF::new(1.0, 2.0));
        assert_eq!(rect.x, 1.0);
        assert_eq!(rect.y, 2.0);
        assert_eq!(rect.width, 4.0);
        assert_eq!(rect.height, 6.0);
    }
}
