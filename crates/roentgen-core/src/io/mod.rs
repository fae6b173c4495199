pub mod image_io;
pub mod raw;

pub use image_io::{load_raster, load_study_image, save_image, save_png, thumbnail};
pub use raw::{decode_raw, decode_raw_study, RawSpec};
