use rayon::prelude::*;

use crate::consts::{EPSILON, PARALLEL_PIXEL_THRESHOLD, RGBA_CHANNEL_COUNT};
use crate::raster::Raster;

/// Edge-preserving smoothing: each pixel becomes a weighted average of its
/// square neighborhood, where the weight falls off with both spatial
/// distance and color distance. Strong edges keep their neighbors' weights
/// near zero and survive; flat regions average out.
///
/// The neighborhood radius is ⌈2·sigma_spatial⌉. Pixels within that radius
/// of the border are copied through unmodified. Alpha is passed through from
/// the source.
pub fn bilateral_filter(src: &Raster, sigma_spatial: f32, sigma_color: f32) -> Raster {
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return src.clone();
    }

    let radius = (sigma_spatial * 2.0).ceil() as usize;
    // The whole image is border when the kernel does not fit.
    if radius == 0 || w <= 2 * radius || h <= 2 * radius {
        return src.clone();
    }

    let stride = w * RGBA_CHANNEL_COUNT;
    let src_raw = src.as_bytes();
    let mut dst_raw = src_raw.to_vec();

    let spatial_denom = 2.0 * sigma_spatial * sigma_spatial + EPSILON;
    let color_denom = 2.0 * sigma_color * sigma_color + EPSILON;

    let filter_row = |y: usize, row_out: &mut [u8]| {
        if y < radius || y >= h - radius {
            return;
        }
        for x in radius..w - radius {
            let pi = x * RGBA_CHANNEL_COUNT;
            let center = y * stride + pi;
            let cr = src_raw[center] as f32;
            let cg = src_raw[center + 1] as f32;
            let cb = src_raw[center + 2] as f32;

            let mut sum_r = 0.0f32;
            let mut sum_g = 0.0f32;
            let mut sum_b = 0.0f32;
            let mut weight_sum = 0.0f32;

            for dy in -(radius as i32)..=radius as i32 {
                let sy = (y as i32 + dy) as usize;
                for dx in -(radius as i32)..=radius as i32 {
                    let sx = (x as i32 + dx) as usize;
                    let si = sy * stride + sx * RGBA_CHANNEL_COUNT;
                    let pr = src_raw[si] as f32;
                    let pg = src_raw[si + 1] as f32;
                    let pb = src_raw[si + 2] as f32;

                    let spatial = (dx * dx + dy * dy) as f32 / spatial_denom;
                    let dr = cr - pr;
                    let dg = cg - pg;
                    let db = cb - pb;
                    let range = (dr * dr + dg * dg + db * db) / color_denom;
                    let weight = (-spatial - range).exp();

                    sum_r += pr * weight;
                    sum_g += pg * weight;
                    sum_b += pb * weight;
                    weight_sum += weight;
                }
            }

            let norm = weight_sum.max(EPSILON);
            row_out[pi] = (sum_r / norm).round().clamp(0.0, 255.0) as u8;
            row_out[pi + 1] = (sum_g / norm).round().clamp(0.0, 255.0) as u8;
            row_out[pi + 2] = (sum_b / norm).round().clamp(0.0, 255.0) as u8;
            row_out[pi + 3] = src_raw[center + 3];
        }
    };

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        dst_raw
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row_out)| filter_row(y, row_out));
    } else {
        for (y, row_out) in dst_raw.chunks_mut(stride).enumerate() {
            filter_row(y, row_out);
        }
    }

    Raster::from_vec(dst_raw, src.width(), src.height())
        .expect("filtered buffer keeps source dimensions")
}
