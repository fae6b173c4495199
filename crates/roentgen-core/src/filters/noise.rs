use super::bilateral::bilateral_filter;
use super::gaussian::gaussian_filter;
use crate::raster::Raster;

/// Composite noise reduction driven by a single [0, 1] intensity.
///
/// Intensity 0 returns the input byte-identical. Otherwise a bilateral pass
/// runs with sigmas derived from the intensity, and intensities above 0.5
/// add a light Gaussian pass on top.
pub fn noise_reduction(src: &Raster, intensity: f32) -> Raster {
    if intensity <= 0.0 {
        return src.clone();
    }
    let intensity = intensity.min(1.0);

    let sigma_spatial = 3.0 * intensity + 1.0;
    let sigma_color = 50.0 * intensity + 10.0;
    let smoothed = bilateral_filter(src, sigma_spatial, sigma_color);

    if intensity > 0.5 {
        gaussian_filter(&smoothed, 2.0 * (intensity - 0.5))
    } else {
        smoothed
    }
}
