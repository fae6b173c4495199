use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoentgenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer length {len} does not match {width}x{height} RGBA")]
    BufferSizeMismatch { len: usize, width: u32, height: u32 },

    #[error("Invalid raw image data: {0}")]
    InvalidRaw(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Processing worker is not available")]
    WorkerUnavailable,

    #[error("Processing job {job_id} timed out after {seconds} s")]
    ProcessingTimeout { job_id: u64, seconds: u64 },

    #[error("Filter stage failed: {0}")]
    FilterFailed(String),

    #[error("No image selected")]
    NoImage,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Annotation data error: {0}")]
    AnnotationData(String),
}

pub type Result<T> = std::result::Result<T, RoentgenError>;
