use rayon::prelude::*;

use super::luma::local_mean_plane;
use crate::consts::{BONE_LOCAL_WINDOW, PARALLEL_PIXEL_THRESHOLD, RGBA_CHANNEL_COUNT};
use crate::raster::Raster;

/// Luminance must exceed the local mean by this much (scaled down as
/// intensity rises) before a pixel is treated as bone.
const DETECTION_OFFSET: f32 = 0.15;

/// Attenuation never drops a channel below this fraction of its value, so
/// suppressed bone stays faintly visible instead of blacking out.
const ATTENUATION_FLOOR: f32 = 0.1;

/// Adaptive bone suppression.
///
/// Bright structures are detected against a local luminance mean over a
/// square neighborhood, then attenuated. The attenuation deepens with both
/// the requested intensity and how far the pixel rises above its
/// surroundings, which keeps soft gradients intact while knocking back
/// dense radio-opaque regions.
pub fn bone_suppression(src: &Raster, intensity: f32) -> Raster {
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
    let local_mean = local_mean_plane(&luma, BONE_LOCAL_WINDOW);
    let offset = DETECTION_OFFSET * (1.0 - 0.5 * intensity);

    let stride = w * RGBA_CHANNEL_COUNT;
    let mut out = src.as_bytes().to_vec();

    let suppress_row = |y: usize, row: &mut [u8]| {
        for x in 0..w {
            let l = luma[[y, x]];
            let threshold = local_mean[[y, x]] + offset;
            if l <= threshold {
                continue;
            }
            let overshoot = l - threshold;
            let factor = (1.0 - intensity * (0.5 + 2.0 * overshoot)).max(ATTENUATION_FLOOR);
            let pi = x * RGBA_CHANNEL_COUNT;
            for c in 0..3 {
                row[pi + c] = (row[pi + c] as f32 * factor).round() as u8;
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

    Raster::from_vec(out, src.width(), src.height())
        .expect("filtered buffer keeps source dimensions")
}
