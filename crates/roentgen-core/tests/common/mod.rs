#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use roentgen_core::filters::{self, FilterKind};
use roentgen_core::processing::FilterRunner;
use roentgen_core::raster::{Color, Raster};
use roentgen_core::study::{ImageMetadata, SourceFormat, StudyImage};

/// Horizontal grayscale ramp from black at the left edge to white at the
/// right edge.
pub fn gradient_raster(width: u32, height: u32) -> Raster {
    let mut raster = Raster::transparent(width, height);
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let v = (x as f32 / (width.max(2) - 1) as f32 * 255.0) as u8;
            raster.set(x, y, Color::rgb(v, v, v));
        }
    }
    raster
}

/// Mid-gray raster with deterministic speckle noise, for filters that need
/// something to smooth.
pub fn speckled_raster(width: u32, height: u32) -> Raster {
    let mut raster = Raster::transparent(width, height);
    let mut seed = 0x2545f491u32;
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            let jitter = (seed >> 24) as i32 - 128;
            let v = (128 + jitter / 2).clamp(0, 255) as u8;
            raster.set(x, y, Color::rgb(v, v, v));
        }
    }
    raster
}

/// Left half `low`, right half `high`: two clean luminance modes for
/// thresholding tests.
pub fn bimodal_raster(width: u32, height: u32, low: u8, high: u8) -> Raster {
    let mut raster = Raster::transparent(width, height);
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let v = if x < width as i64 / 2 { low } else { high };
            raster.set(x, y, Color::rgb(v, v, v));
        }
    }
    raster
}

/// Wrap a raster in a PNG-sourced study image with empty metadata.
pub fn study_from(raster: Raster) -> StudyImage {
    StudyImage::new(raster, SourceFormat::Png, ImageMetadata::default())
}

/// Byte-level equality with a readable failure.
pub fn assert_rasters_identical(a: &Raster, b: &Raster) {
    assert_eq!(a.width(), b.width());
    assert_eq!(a.height(), b.height());
    assert_eq!(a.as_bytes(), b.as_bytes(), "rasters differ at byte level");
}

/// Runner that counts executions, for asserting cache-hit dispatch behavior.
pub struct CountingRunner {
    pub runs: Arc<AtomicUsize>,
}

impl CountingRunner {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        (Self { runs: runs.clone() }, runs)
    }
}

impl FilterRunner for CountingRunner {
    fn run(
        &self,
        kind: FilterKind,
        input: &Raster,
        intensity: f32,
    ) -> Result<Raster, String> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(filters::apply(kind, input, intensity))
    }
}

/// Runner that sleeps past the engine deadline before answering, for
/// exercising the timeout and late-reply paths.
pub struct SlowRunner {
    pub delay: Duration,
}

impl FilterRunner for SlowRunner {
    fn run(
        &self,
        kind: FilterKind,
        input: &Raster,
        intensity: f32,
    ) -> Result<Raster, String> {
        std::thread::sleep(self.delay);
        Ok(filters::apply(kind, input, intensity))
    }
}

/// Runner whose every job fails.
pub struct FailingRunner;

impl FilterRunner for FailingRunner {
    fn run(&self, _kind: FilterKind, _input: &Raster, _intensity: f32) -> Result<Raster, String> {
        Err("synthetic stage failure".to_string())
    }
}
