use std::sync::atomic::{AtomicU64, Ordering};

use crate::raster::Raster;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Source encoding the study image was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SourceFormat {
    Dicom,
    Jpeg,
    Png,
    Raw,
}

impl SourceFormat {
    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Dicom => "DICOM",
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::Raw => "RAW",
        }
    }
}

/// Study-level metadata attached to an image.
///
/// Fields mirror the acquisition record delivered alongside the pixel data;
/// all of them are optional free text except the display window, which seeds
/// the viewer's window center/width readouts when present.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ImageMetadata {
    pub modality: Option<String>,
    pub body_part: Option<String>,
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    pub institution_name: Option<String>,
    pub referring_physician: Option<String>,
    pub original_filename: Option<String>,
    pub window_center: Option<f32>,
    pub window_width: Option<f32>,
}

/// A decoded study image: pixel raster plus metadata plus a process-unique
/// identity.
///
/// The id participates in filter cache keys, so cached results can never
/// bleed between images even when two images share dimensions and settings.
#[derive(Clone, Debug)]
pub struct StudyImage {
    id: u64,
    pub raster: Raster,
    pub format: SourceFormat,
    pub metadata: ImageMetadata,
}

impl StudyImage {
    pub fn new(raster: Raster, format: SourceFormat, metadata: ImageMetadata) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            raster,
            format,
            metadata,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}
