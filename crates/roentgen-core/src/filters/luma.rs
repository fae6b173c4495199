use ndarray::Array2;

use crate::consts::{EPSILON, OTSU_HISTOGRAM_BINS};

/// Otsu's thresholding: find the luminance that maximizes between-class
/// variance. Values are expected in [0.0, 1.0]; the returned threshold is
/// the center of the winning histogram bin.
pub fn otsu_threshold(data: &Array2<f32>) -> f32 {
    let bins = OTSU_HISTOGRAM_BINS;
    let mut histogram = vec![0u64; bins];

    for &v in data.iter() {
        let bin = ((v.clamp(0.0, 1.0) * (bins - 1) as f32) as usize).min(bins - 1);
        histogram[bin] += 1;
    }

    let total = data.len() as f64;
    let mut sum_all: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_all += i as f64 * count as f64;
    }

    let mut weight_bg: f64 = 0.0;
    let mut sum_bg: f64 = 0.0;
    let mut best_variance = 0.0_f64;
    let mut best_bin = 0usize;

    for (i, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best_bin = i;
        }
    }

    (best_bin as f32 + 0.5) / bins as f32
}

/// Mean over a square window centered at each pixel, window edges clamped to
/// the plane. Uses an integral image so the window size does not change the
/// per-pixel cost.
pub fn local_mean_plane(data: &Array2<f32>, window: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }
    let half = (window / 2) as isize;

    let mut integral = Array2::<f64>::zeros((h + 1, w + 1));
    for row in 0..h {
        for col in 0..w {
            integral[[row + 1, col + 1]] = data[[row, col]] as f64
                + integral[[row, col + 1]]
                + integral[[row + 1, col]]
                - integral[[row, col]];
        }
    }

    Array2::from_shape_fn((h, w), |(row, col)| {
        let r0 = (row as isize - half).max(0) as usize;
        let r1 = (row as isize + half).min(h as isize - 1) as usize;
        let c0 = (col as isize - half).max(0) as usize;
        let c1 = (col as isize + half).min(w as isize - 1) as usize;
        let sum = integral[[r1 + 1, c1 + 1]] - integral[[r0, c1 + 1]] - integral[[r1 + 1, c0]]
            + integral[[r0, c0]];
        let count = ((r1 - r0 + 1) * (c1 - c0 + 1)) as f64;
        (sum / count.max(EPSILON as f64)) as f32
    })
}

/// Gradient magnitude from central differences, clamped at the borders.
/// A cheap edge-strength estimate for separating smooth tissue regions from
/// structure boundaries.
pub fn edge_magnitude_plane(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }
    Array2::from_shape_fn((h, w), |(row, col)| {
        let left = data[[row, col.saturating_sub(1)]];
        let right = data[[row, (col + 1).min(w - 1)]];
        let up = data[[row.saturating_sub(1), col]];
        let down = data[[(row + 1).min(h - 1), col]];
        let gx = (right - left) / 2.0;
        let gy = (down - up) / 2.0;
        (gx * gx + gy * gy).sqrt()
    })
}
