use rayon::prelude::*;

use super::luma::{edge_magnitude_plane, otsu_threshold};
use crate::consts::{EPSILON, PARALLEL_PIXEL_THRESHOLD, RGBA_CHANNEL_COUNT};
use crate::raster::Raster;

/// Edge magnitude below which a pixel counts as smooth tissue rather than a
/// structure boundary.
const EDGE_SMOOTH_MAX: f32 = 0.08;

/// Fraction added to the Otsu threshold per unit of intensity.
const MARGIN_SCALE: f32 = 0.1;

/// Contrast gain applied above the threshold per unit of intensity.
const ENHANCE_GAIN: f32 = 0.3;

/// Sharpening kicks in above this intensity.
const SHARPEN_MIN_INTENSITY: f32 = 0.3;

/// Otsu-threshold soft-tissue suppression.
///
/// A global Otsu threshold over the luminance histogram separates soft
/// tissue from denser structure. Smooth pixels below the threshold (plus an
/// intensity-scaled margin) are attenuated toward zero; pixels above it get
/// a mild contrast boost pivoting at the threshold, and higher intensities
/// finish with a 3x3 sharpening pass.
pub fn tissue_suppression(src: &Raster, intensity: f32) -> Raster {
    if intensity <= 0.0 {
        return src.clone();
    }
    let intensity = intensity.min(1.0);

    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return src.clone();
    }

    let luma = src.luminance_plane();
    let threshold = otsu_threshold(&luma);
    let edges = edge_magnitude_plane(&luma);
    let cutoff = (threshold + MARGIN_SCALE * intensity).min(1.0);
    let pivot = threshold * 255.0;
    let gain = 1.0 + ENHANCE_GAIN * intensity;

    let stride = w * RGBA_CHANNEL_COUNT;
    let mut out = src.as_bytes().to_vec();

    let suppress_row = |y: usize, row: &mut [u8]| {
        for x in 0..w {
            let l = luma[[y, x]];
            let pi = x * RGBA_CHANNEL_COUNT;
            if l < cutoff {
                if edges[[y, x]] >= EDGE_SMOOTH_MAX {
                    continue;
                }
                let depth = ((cutoff - l) / cutoff.max(EPSILON)).clamp(0.0, 1.0);
                let factor = (1.0 - intensity * (0.3 + 0.7 * depth)).max(0.0);
                for c in 0..3 {
                    row[pi + c] = (row[pi + c] as f32 * factor).round() as u8;
                }
            } else {
                for c in 0..3 {
                    let enhanced = pivot + (row[pi + c] as f32 - pivot) * gain;
                    row[pi + c] = enhanced.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    };

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        out.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| suppress_row(y, row));
    } else {
        for (y, row) in out.chunks_mut(stride).enumerate() {
            suppress_row(y, row);
        }
    }

    if intensity > SHARPEN_MIN_INTENSITY {
        out = sharpen3(&out, w, h, 0.5 * intensity);
    }

    Raster::from_vec(out, src.width(), src.height())
        .expect("filtered buffer keeps source dimensions")
}

/// 3x3 unsharp-style kernel: center 1+4a, cross neighbors -a. Border pixels
/// are copied through. Alpha passes through.
fn sharpen3(src: &[u8], w: usize, h: usize, amount: f32) -> Vec<u8> {
    if w < 3 || h < 3 {
        return src.to_vec();
    }
    let stride = w * RGBA_CHANNEL_COUNT;
    let mut out = src.to_vec();
    let center_w = 1.0 + 4.0 * amount;

    let sharpen_row = |y: usize, row: &mut [u8]| {
        if y == 0 || y == h - 1 {
            return;
        }
        for x in 1..w - 1 {
            let pi = x * RGBA_CHANNEL_COUNT;
            let idx = |yy: usize, xx: usize, c: usize| src[yy * stride + xx * RGBA_CHANNEL_COUNT + c];
            for c in 0..3 {
                let v = idx(y, x, c) as f32 * center_w
                    - amount
                        * (idx(y - 1, x, c) as f32
                            + idx(y + 1, x, c) as f32
                            + idx(y, x - 1, c) as f32
                            + idx(y, x + 1, c) as f32);
                row[pi + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    };

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        out.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| sharpen_row(y, row));
    } else {
        for (y, row) in out.chunks_mut(stride).enumerate() {
            sharpen_row(y, row);
        }
    }

    out
}
