use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, RoentgenError};
use crate::raster::Raster;
use crate::study::{ImageMetadata, SourceFormat, StudyImage};

/// Layout of a headerless raw grayscale capture.
///
/// Raw exports carry no dimensions of their own, so the caller supplies
/// them. Samples are little-endian, row-major, top-left origin. When a
/// display window is given, 16-bit samples map through it; otherwise the
/// full sample range maps onto [0, 255].
#[derive(Clone, Copy, Debug)]
pub struct RawSpec {
    pub width: u32,
    pub height: u32,
    /// Bits per sample, 8 or 16.
    pub bit_depth: u8,
    pub window_center: Option<f32>,
    pub window_width: Option<f32>,
}

impl RawSpec {
    pub fn new(width: u32, height: u32, bit_depth: u8) -> Self {
        Self {
            width,
            height,
            bit_depth,
            window_center: None,
            window_width: None,
        }
    }

    pub fn with_window(mut self, center: f32, width: f32) -> Self {
        self.window_center = Some(center);
        self.window_width = Some(width);
        self
    }

    fn bytes_per_sample(&self) -> usize {
        self.bit_depth as usize / 8
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_sample()
    }
}

/// Linear display windowing: samples at or below center - width/2 go black,
/// samples at or above center + width/2 go white.
fn window_to_byte(sample: f32, center: f32, width: f32) -> u8 {
    let width = width.max(1.0);
    let low = center - width / 2.0;
    (((sample - low) / width).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Decode raw grayscale bytes into an opaque RGBA raster.
pub fn decode_raw(bytes: &[u8], spec: &RawSpec) -> Result<Raster> {
    if spec.width == 0 || spec.height == 0 {
        return Err(RoentgenError::InvalidDimensions {
            width: spec.width,
            height: spec.height,
        });
    }
    if spec.bit_depth != 8 && spec.bit_depth != 16 {
        return Err(RoentgenError::InvalidRaw(format!(
            "unsupported bit depth {}, expected 8 or 16",
            spec.bit_depth
        )));
    }
    let expected = spec.expected_len();
    if bytes.len() != expected {
        return Err(RoentgenError::InvalidRaw(format!(
            "expected {expected} bytes for {}x{} at {} bits, got {}",
            spec.width,
            spec.height,
            spec.bit_depth,
            bytes.len()
        )));
    }

    let pixel_count = spec.width as usize * spec.height as usize;
    let mut raster = Raster::transparent(spec.width, spec.height);
    let out = raster.as_bytes_mut();

    if spec.bit_depth == 8 {
        for (i, &sample) in bytes.iter().enumerate() {
            let gray = match (spec.window_center, spec.window_width) {
                (Some(c), Some(w)) => window_to_byte(sample as f32, c, w),
                _ => sample,
            };
            write_gray(out, i, gray);
        }
    } else {
        let mut cursor = Cursor::new(bytes);
        for i in 0..pixel_count {
            let sample = cursor.read_u16::<LittleEndian>()? as f32;
            let gray = match (spec.window_center, spec.window_width) {
                (Some(c), Some(w)) => window_to_byte(sample, c, w),
                // Full-range fallback keeps unwindowed captures visible.
                _ => (sample / 65535.0 * 255.0).round() as u8,
            };
            write_gray(out, i, gray);
        }
    }

    Ok(raster)
}

fn write_gray(out: &mut [u8], pixel: usize, gray: u8) {
    let idx = pixel * 4;
    out[idx] = gray;
    out[idx + 1] = gray;
    out[idx + 2] = gray;
    out[idx + 3] = 255;
}

/// Decode raw bytes into a study image, seeding the metadata window from
/// the spec so the viewer surfaces the same values.
pub fn decode_raw_study(bytes: &[u8], spec: &RawSpec, filename: Option<String>) -> Result<StudyImage> {
    let raster = decode_raw(bytes, spec)?;
    let metadata = ImageMetadata {
        original_filename: filename,
        window_center: spec.window_center,
        window_width: spec.window_width,
        ..ImageMetadata::default()
    };
    Ok(StudyImage::new(raster, SourceFormat::Raw, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_bit_passthrough_without_window() {
        let bytes = vec![0u8, 64, 128, 255];
        let raster = decode_raw(&bytes, &RawSpec::new(2, 2, 8)).unwrap();
        assert_eq!(raster.get(0, 0).r, 0);
        assert_eq!(raster.get(1, 0).r, 64);
        assert_eq!(raster.get(0, 1).r, 128);
        assert_eq!(raster.get(1, 1).r, 255);
        assert_eq!(raster.get(1, 1).a, 255);
    }

    #[test]
    fn sixteen_bit_window_maps_center_and_edges() {
        // center 1000, width 400: 800 -> black, 1200 -> white, 1000 -> mid.
        let samples: Vec<u16> = vec![800, 1000, 1200, 700];
        let mut bytes = Vec::new();
        for s in &samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        let spec = RawSpec::new(2, 2, 16).with_window(1000.0, 400.0);
        let raster = decode_raw(&bytes, &spec).unwrap();
        assert_eq!(raster.get(0, 0).r, 0);
        assert_eq!(raster.get(1, 0).r, 128);
        assert_eq!(raster.get(0, 1).r, 255);
        assert_eq!(raster.get(1, 1).r, 0, "below the window floors at black");
    }

    #[test]
    fn sixteen_bit_without_window_uses_full_range() {
        let samples: Vec<u16> = vec![0, 65535];
        let mut bytes = Vec::new();
        for s in &samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        let raster = decode_raw(&bytes, &RawSpec::new(2, 1, 16)).unwrap();
        assert_eq!(raster.get(0, 0).r, 0);
        assert_eq!(raster.get(1, 0).r, 255);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let err = decode_raw(&[0u8; 7], &RawSpec::new(2, 2, 16)).unwrap_err();
        assert!(matches!(err, RoentgenError::InvalidRaw(_)));
    }

    #[test]
    fn unsupported_depth_is_rejected() {
        let err = decode_raw(&[0u8; 16], &RawSpec::new(2, 2, 32)).unwrap_err();
        assert!(matches!(err, RoentgenError::InvalidRaw(_)));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = decode_raw(&[], &RawSpec::new(0, 4, 8)).unwrap_err();
        assert!(matches!(err, RoentgenError::InvalidDimensions { .. }));
    }
}
