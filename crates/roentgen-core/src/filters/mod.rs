pub mod bilateral;
pub mod bone;
pub mod gaussian;
pub mod luma;
pub mod noise;
pub mod tissue;

pub use bilateral::bilateral_filter;
pub use bone::bone_suppression;
pub use gaussian::gaussian_filter;
pub use noise::noise_reduction;
pub use tissue::tissue_suppression;

use crate::raster::Raster;

/// Filter stages the viewer can request, listed in chain order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FilterKind {
    NoiseReduction,
    BoneSuppression,
    TissueSuppression,
}

impl FilterKind {
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::NoiseReduction => "Noise reduction",
            FilterKind::BoneSuppression => "Bone suppression",
            FilterKind::TissueSuppression => "Tissue suppression",
        }
    }

    /// All stages in the order the processing chain applies them.
    pub fn chain_order() -> [FilterKind; 3] {
        [
            FilterKind::NoiseReduction,
            FilterKind::BoneSuppression,
            FilterKind::TissueSuppression,
        ]
    }
}

/// Run one filter stage. Every stage treats intensity 0 as a no-op and
/// passes alpha through unchanged.
pub fn apply(kind: FilterKind, src: &Raster, intensity: f32) -> Raster {
    match kind {
        FilterKind::NoiseReduction => noise_reduction(src, intensity),
        FilterKind::BoneSuppression => bone_suppression(src, intensity),
        FilterKind::TissueSuppression => tissue_suppression(src, intensity),
    }
}
