use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::consts::INTENSITY_KEY_STEP;
use crate::filters::FilterKind;
use crate::raster::Raster;

/// Slider positions for the three-stage filter chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilterSettings {
    pub noise: f32,
    pub bone: f32,
    pub flesh: f32,
}

impl FilterSettings {
    pub fn intensity_for(&self, kind: FilterKind) -> f32 {
        match kind {
            FilterKind::NoiseReduction => self.noise,
            FilterKind::BoneSuppression => self.bone,
            FilterKind::TissueSuppression => self.flesh,
        }
    }

    /// True when every stage is a no-op and the chain can be skipped.
    pub fn is_passthrough(&self) -> bool {
        self.noise <= 0.0 && self.bone <= 0.0 && self.flesh <= 0.0
    }
}

fn quantize(intensity: f32) -> u32 {
    (intensity.clamp(0.0, 1.0) / INTENSITY_KEY_STEP).round() as u32
}

/// Identity of one cached stage result.
///
/// The key embeds the image id plus the quantized intensities of every
/// stage up to and including this one, because a stage's input is the
/// previous stage's output. Changing the noise slider therefore misses on
/// cached bone and tissue results too, and switching images always misses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    image_id: u64,
    kind: FilterKind,
    upstream: Vec<u32>,
}

impl CacheKey {
    pub fn for_stage(image_id: u64, kind: FilterKind, settings: &FilterSettings) -> Self {
        let mut upstream = Vec::with_capacity(3);
        for stage in FilterKind::chain_order() {
            upstream.push(quantize(settings.intensity_for(stage)));
            if stage == kind {
                break;
            }
        }
        Self {
            image_id,
            kind,
            upstream,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }
}

/// Bounded LRU cache of filtered rasters.
///
/// Lookups refresh recency; inserts past capacity evict the entry touched
/// longest ago. Sized in entries rather than bytes, which is coarse but
/// predictable for the image sizes the viewer handles.
pub struct FilterCache {
    capacity: usize,
    entries: HashMap<CacheKey, Arc<Raster>>,
    recency: VecDeque<CacheKey>,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(key.clone());
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<Raster>> {
        let hit = self.entries.get(key).cloned();
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    pub fn insert(&mut self, key: CacheKey, raster: Arc<Raster>) {
        self.entries.insert(key.clone(), raster);
        self.touch(&key);
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.recency.pop_front() {
                debug!(kind = oldest.kind().label(), "evicting cached filter result");
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }
}
