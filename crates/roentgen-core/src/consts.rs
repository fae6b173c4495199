/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in an interleaved RGBA buffer.
pub const RGBA_CHANNEL_COUNT: usize = 4;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Minimum viewer zoom factor.
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum viewer zoom factor.
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom change applied by one zoom-in or zoom-out step.
pub const ZOOM_STEP: f32 = 0.1;

/// Minimum brightness/contrast multiplier.
pub const MIN_LEVEL: f32 = 0.1;

/// Maximum brightness/contrast multiplier.
pub const MAX_LEVEL: f32 = 3.0;

/// Fraction of the canvas the fitted image occupies, leaving a surround
/// margin for rotation and panning headroom.
pub const CANVAS_FIT_FACTOR: f32 = 0.8;

/// Seconds a dispatched filter job may stay pending before it is expired.
pub const PROCESSING_TIMEOUT_SECS: u64 = 10;

/// Maximum number of filtered rasters retained in the result cache.
pub const FILTER_CACHE_CAPACITY: usize = 32;

/// Side length of the square neighborhood used for the adaptive local mean
/// in bone suppression.
pub const BONE_LOCAL_WINDOW: usize = 15;

/// Quantization step applied to filter intensities when building cache keys,
/// so keys hash and compare without relying on raw f32 equality.
pub const INTENSITY_KEY_STEP: f32 = 1e-3;
