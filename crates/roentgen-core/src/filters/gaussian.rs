use rayon::prelude::*;

use crate::consts::{PARALLEL_PIXEL_THRESHOLD, RGBA_CHANNEL_COUNT};
use crate::raster::Raster;

/// Color channels convolved per pass (alpha is carried through unchanged).
const RGB: usize = 3;

/// Gaussian smoothing via separable 1D convolution, equivalent to the full
/// 2D kernel of size 2·⌈3σ⌉+1. Edges are clamped. Alpha passes through.
pub fn gaussian_filter(src: &Raster, sigma: f32) -> Raster {
    if sigma <= 0.0 {
        return src.clone();
    }
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return src.clone();
    }

    let kernel = make_gaussian_kernel(sigma);
    let mid = convolve_rows(src.as_bytes(), w, h, &kernel);
    let out = convolve_cols(&mid, src.as_bytes(), w, h, &kernel);
    Raster::from_vec(out, src.width(), src.height())
        .expect("filtered buffer keeps source dimensions")
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Horizontal pass: interleaved RGBA bytes in, planar-interleaved RGB f32 out.
fn convolve_rows(src: &[u8], w: usize, h: usize, kernel: &[f32]) -> Vec<f32> {
    let radius = kernel.len() / 2;
    let src_stride = w * RGBA_CHANNEL_COUNT;
    let mid_stride = w * RGB;
    let mut mid = vec![0.0f32; w * h * RGB];

    let row_pass = |y: usize, row_out: &mut [f32]| {
        let row_src = &src[y * src_stride..(y + 1) * src_stride];
        for x in 0..w {
            let mut sum = [0.0f32; RGB];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx =
                    (x as isize + ki as isize - radius as isize).clamp(0, w as isize - 1) as usize;
                let si = sx * RGBA_CHANNEL_COUNT;
                for c in 0..RGB {
                    sum[c] += row_src[si + c] as f32 * kv;
                }
            }
            let di = x * RGB;
            row_out[di..di + RGB].copy_from_slice(&sum);
        }
    };

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        mid.par_chunks_mut(mid_stride)
            .enumerate()
            .for_each(|(y, row_out)| row_pass(y, row_out));
    } else {
        for (y, row_out) in mid.chunks_mut(mid_stride).enumerate() {
            row_pass(y, row_out);
        }
    }

    mid
}

/// Vertical pass: planar-interleaved RGB f32 in, interleaved RGBA bytes out,
/// with alpha copied from the original source.
fn convolve_cols(mid: &[f32], src: &[u8], w: usize, h: usize, kernel: &[f32]) -> Vec<u8> {
    let radius = kernel.len() / 2;
    let mid_stride = w * RGB;
    let out_stride = w * RGBA_CHANNEL_COUNT;
    let mut out = vec![0u8; w * h * RGBA_CHANNEL_COUNT];

    let col_pass = |y: usize, row_out: &mut [u8]| {
        for x in 0..w {
            let mut sum = [0.0f32; RGB];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy =
                    (y as isize + ki as isize - radius as isize).clamp(0, h as isize - 1) as usize;
                let si = sy * mid_stride + x * RGB;
                for c in 0..RGB {
                    sum[c] += mid[si + c] * kv;
                }
            }
            let di = x * RGBA_CHANNEL_COUNT;
            for c in 0..RGB {
                row_out[di + c] = sum[c].round().clamp(0.0, 255.0) as u8;
            }
            row_out[di + 3] = src[y * out_stride + di + 3];
        }
    };

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        out.par_chunks_mut(out_stride)
            .enumerate()
            .for_each(|(y, row_out)| col_pass(y, row_out));
    } else {
        for (y, row_out) in out.chunks_mut(out_stride).enumerate() {
            col_pass(y, row_out);
        }
    }

    out
}
