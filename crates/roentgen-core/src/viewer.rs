use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::annotations::AnnotationSet;
use crate::config::ViewerConfig;
use crate::consts::{MAX_LEVEL, MAX_ZOOM, MIN_LEVEL, MIN_ZOOM, ZOOM_STEP};
use crate::error::{Result, RoentgenError};
use crate::filters::FilterKind;
use crate::processing::{FilterEngine, FilterSettings, JobOutcome, LibraryRunner, Submission};
use crate::raster::{Color, PointF, Raster};
use crate::render::{self, compose, export_png, render_base, render_fallback, render_overlay};
use crate::study::StudyImage;
use crate::tools::{GestureOutcome, Tool, ToolState};
use crate::transform::ViewTransform;

/// Default annotation stroke color.
const ANNOTATION_COLOR: Color = Color::rgb(255, 210, 60);

/// Adjustable view parameters for the displayed image.
///
/// Fields are public for rendering, but callers mutate through the setters,
/// which clamp to the supported ranges. Zoom stays in [0.1, 5], rotation is
/// kept in [0, 360), and the brightness/contrast multipliers stay in
/// [0.1, 3].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerState {
    pub zoom: f32,
    pub rotation_deg: i32,
    pub brightness: f32,
    pub contrast: f32,
    /// Display window from the study metadata, readout only. The canvas
    /// applies the brightness/contrast multipliers, never these.
    pub window_center: Option<f32>,
    pub window_width: Option<f32>,
    pub noise_threshold: f32,
    pub bone_removal: f32,
    pub flesh_removal: f32,
    pub is_maximized: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation_deg: 0,
            brightness: 1.0,
            contrast: 1.0,
            window_center: None,
            window_width: None,
            noise_threshold: 0.0,
            bone_removal: 0.0,
            flesh_removal: 0.0,
            is_maximized: false,
        }
    }
}

impl ViewerState {
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn rotate_by(&mut self, delta_deg: i32) {
        self.rotation_deg = (self.rotation_deg + delta_deg).rem_euclid(360);
    }

    pub fn set_brightness(&mut self, value: f32) {
        self.brightness = value.clamp(MIN_LEVEL, MAX_LEVEL);
    }

    pub fn set_contrast(&mut self, value: f32) {
        self.contrast = value.clamp(MIN_LEVEL, MAX_LEVEL);
    }

    pub fn set_noise_threshold(&mut self, value: f32) {
        self.noise_threshold = value.clamp(0.0, 1.0);
    }

    pub fn set_bone_removal(&mut self, value: f32) {
        self.bone_removal = value.clamp(0.0, 1.0);
    }

    pub fn set_flesh_removal(&mut self, value: f32) {
        self.flesh_removal = value.clamp(0.0, 1.0);
    }

    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }

    pub fn brightness_percent(&self) -> i32 {
        (self.brightness * 100.0).round() as i32
    }

    pub fn contrast_percent(&self) -> i32 {
        (self.contrast * 100.0).round() as i32
    }

    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            noise: self.noise_threshold,
            bone: self.bone_removal,
            flesh: self.flesh_removal,
        }
    }

}

/// In-flight progress through the active stages of the filter chain.
struct ChainProgress {
    /// Active stages in chain order. Zero-intensity stages never appear.
    stages: Vec<FilterKind>,
    /// Index of the stage whose result is still outstanding.
    next: usize,
    /// Output of the last finished stage, input to the next one.
    input: Arc<Raster>,
}

/// One open image and everything the viewer knows about it.
///
/// The session owns the view state, the annotation set, the gesture state
/// machine, and the filter engine, and it renders the two canvas layers.
/// All methods run on the owning thread; background filtering comes back
/// through [`tick`](Self::tick), which drains worker results, advances the
/// noise, bone, flesh chain, and repaints whichever layers went stale.
///
/// While a chain is in flight the base layer shows the unfiltered image;
/// the filtered raster replaces it when the last stage lands. Results
/// tagged with a superseded sequence number are discarded, so a slider
/// dragged twice never has the older result overwrite the newer one.
pub struct ViewerSession {
    state: ViewerState,
    /// What image selection and view resets restore to. Stock values
    /// unless the session was built from a config.
    defaults: ViewerState,
    annotations: AnnotationSet,
    tool: ToolState,
    engine: FilterEngine,
    image: Option<StudyImage>,
    load_error: Option<String>,
    canvas_w: u32,
    canvas_h: u32,
    base: Raster,
    overlay: Raster,
    filtered: Option<Arc<Raster>>,
    chain: Option<ChainProgress>,
    sequence: u64,
    text_prompt: Option<PointF>,
    annotation_color: Color,
    base_dirty: bool,
    overlay_dirty: bool,
    base_revision: u64,
    overlay_revision: u64,
}

impl ViewerSession {
    /// Session with a default engine and a conventional 800x600 surface.
    /// Embedders resize via [`set_canvas_size`](Self::set_canvas_size).
    pub fn new() -> Self {
        Self::with_engine(FilterEngine::new())
    }

    /// Session configured from a [`ViewerConfig`]: the processing section
    /// sizes the engine, and the display/filter values become the defaults
    /// restored on image selection and view reset.
    pub fn with_config(config: &ViewerConfig) -> Self {
        let engine = FilterEngine::with_runner(
            LibraryRunner,
            config.processing.cache_capacity,
            Duration::from_secs(config.processing.timeout_secs),
        );
        let mut session = Self::with_engine(engine);
        session.defaults.set_brightness(config.display.brightness);
        session.defaults.set_contrast(config.display.contrast);
        session.defaults.set_noise_threshold(config.filters.noise_threshold);
        session.defaults.set_bone_removal(config.filters.bone_removal);
        session.defaults.set_flesh_removal(config.filters.flesh_removal);
        session.state = session.defaults;
        session.annotation_color = config.annotations.color;
        session
    }

    pub fn with_engine(engine: FilterEngine) -> Self {
        Self {
            state: ViewerState::default(),
            defaults: ViewerState::default(),
            annotations: AnnotationSet::new(),
            tool: ToolState::new(),
            engine,
            image: None,
            load_error: None,
            canvas_w: 800,
            canvas_h: 600,
            base: Raster::filled(800, 600, render::base::BACKDROP),
            overlay: Raster::transparent(800, 600),
            filtered: None,
            chain: None,
            sequence: 0,
            text_prompt: None,
            annotation_color: ANNOTATION_COLOR,
            base_dirty: false,
            overlay_dirty: false,
            base_revision: 0,
            overlay_revision: 0,
        }
    }

    // Read-only projections.

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn image(&self) -> Option<&StudyImage> {
        self.image.as_ref()
    }

    pub fn load_failure(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn active_tool(&self) -> Tool {
        self.tool.active()
    }

    pub fn is_drawing(&self) -> bool {
        self.tool.is_drawing()
    }

    /// Image-space anchor of the gesture in progress, for rubber-band
    /// previews. `None` outside a drag.
    pub fn gesture_start(&self) -> Option<PointF> {
        self.tool.start()
    }

    /// Angle-tool clicks already placed, in image space.
    pub fn angle_points(&self) -> &[PointF] {
        self.tool.angle_points()
    }

    pub fn annotation_color(&self) -> Color {
        self.annotation_color
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_w, self.canvas_h)
    }

    pub fn base_layer(&self) -> &Raster {
        &self.base
    }

    pub fn overlay_layer(&self) -> &Raster {
        &self.overlay
    }

    /// Bumped every time the base layer re-renders. Embedders compare this
    /// against their last upload to skip redundant texture updates.
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    /// Bumped every time the overlay layer re-renders.
    pub fn overlay_revision(&self) -> u64 {
        self.overlay_revision
    }

    /// Image-space anchor awaiting text entry, if the text tool fired.
    pub fn pending_text_prompt(&self) -> Option<PointF> {
        self.text_prompt
    }

    /// True while any filter stage is queued or running.
    pub fn is_processing(&self) -> bool {
        self.chain.is_some() || self.engine.has_pending()
    }

    /// The stage the chain is currently waiting on, with how many of the
    /// active stages are already done and the chain length.
    pub fn chain_progress(&self) -> Option<(FilterKind, usize, usize)> {
        let chain = self.chain.as_ref()?;
        let stage = chain.stages.get(chain.next).copied()?;
        Some((stage, chain.next, chain.stages.len()))
    }

    pub fn is_filter_worker_available(&self) -> bool {
        self.engine.is_worker_available()
    }

    /// The view transform for the current canvas, centered on it.
    pub fn current_transform(&self) -> ViewTransform {
        ViewTransform::new(
            self.state.zoom,
            self.state.rotation_deg,
            PointF::new(self.canvas_w as f32 / 2.0, self.canvas_h as f32 / 2.0),
        )
    }

    // Image lifecycle.

    /// Open an image. View parameters, filter sliders, annotations, and any
    /// in-progress gesture all reset; filter results from the previous image
    /// are orphaned by the sequence bump inside the chain restart. The
    /// metadata display window, when present, seeds the window readouts.
    pub fn select_image(&mut self, image: StudyImage) {
        info!(
            id = image.id(),
            width = image.width(),
            height = image.height(),
            format = image.format.label(),
            "image selected"
        );
        self.load_error = None;
        self.annotations.clear_all();
        self.tool.abandon();
        self.text_prompt = None;
        self.reset_state();
        self.state.window_center = image.metadata.window_center;
        self.state.window_width = image.metadata.window_width;
        self.image = Some(image);
        self.restart_chain();
        self.overlay_dirty = true;
    }

    /// Record a failed load. The base layer becomes the fallback card so the
    /// failure is visible rather than a stale or blank canvas.
    pub fn image_load_failed(&mut self, detail: &str) {
        warn!("image load failed: {detail}");
        self.image = None;
        self.chain = None;
        self.filtered = None;
        self.sequence += 1;
        self.annotations.clear_all();
        self.tool.abandon();
        self.text_prompt = None;
        self.reset_state();
        self.load_error = Some(detail.to_string());
        self.base_dirty = true;
        self.overlay_dirty = true;
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        if (width, height) == (self.canvas_w, self.canvas_h) {
            return;
        }
        self.canvas_w = width;
        self.canvas_h = height;
        self.base_dirty = true;
        self.overlay_dirty = true;
    }

    // View mutators. Transform changes invalidate both layers because the
    // overlay is positioned through the same transform as the image.

    pub fn set_zoom(&mut self, zoom: f32) {
        self.state.set_zoom(zoom);
        self.mark_transform_changed();
    }

    pub fn zoom_in(&mut self) {
        self.state.zoom_in();
        self.mark_transform_changed();
    }

    pub fn zoom_out(&mut self) {
        self.state.zoom_out();
        self.mark_transform_changed();
    }

    pub fn rotate_by(&mut self, delta_deg: i32) {
        self.state.rotate_by(delta_deg);
        self.mark_transform_changed();
    }

    pub fn set_brightness(&mut self, value: f32) {
        self.state.set_brightness(value);
        self.base_dirty = true;
    }

    pub fn set_contrast(&mut self, value: f32) {
        self.state.set_contrast(value);
        self.base_dirty = true;
    }

    pub fn toggle_maximized(&mut self) {
        self.state.is_maximized = !self.state.is_maximized;
    }

    /// Restore zoom, rotation, brightness, and contrast to their defaults.
    /// Filter sliders and the window readouts are left alone.
    pub fn reset_view(&mut self) {
        self.state.zoom = self.defaults.zoom;
        self.state.rotation_deg = self.defaults.rotation_deg;
        self.state.brightness = self.defaults.brightness;
        self.state.contrast = self.defaults.contrast;
        self.mark_transform_changed();
    }

    /// Everything back to the session defaults. Window maximization is app
    /// chrome rather than a per-image view parameter, so it survives.
    fn reset_state(&mut self) {
        let maximized = self.state.is_maximized;
        self.state = self.defaults;
        self.state.is_maximized = maximized;
    }

    fn mark_transform_changed(&mut self) {
        self.base_dirty = true;
        self.overlay_dirty = true;
    }

    // Filter sliders. A changed value abandons the in-flight chain by
    // bumping the sequence and starts over from the raw image.

    pub fn set_noise_threshold(&mut self, value: f32) {
        let before = self.state.noise_threshold;
        self.state.set_noise_threshold(value);
        if self.state.noise_threshold != before {
            self.restart_chain();
        }
    }

    pub fn set_bone_removal(&mut self, value: f32) {
        let before = self.state.bone_removal;
        self.state.set_bone_removal(value);
        if self.state.bone_removal != before {
            self.restart_chain();
        }
    }

    pub fn set_flesh_removal(&mut self, value: f32) {
        let before = self.state.flesh_removal;
        self.state.set_flesh_removal(value);
        if self.state.flesh_removal != before {
            self.restart_chain();
        }
    }

    // Pointer input, in canvas coordinates.

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool.set_tool(tool);
        self.text_prompt = None;
    }

    pub fn set_annotation_color(&mut self, color: Color) {
        self.annotation_color = color;
    }

    pub fn pointer_down(&mut self, canvas_point: PointF) {
        if self.image.is_none() {
            return;
        }
        let image_point = self.current_transform().to_image(canvas_point);
        self.tool.pointer_down(image_point);
    }

    pub fn pointer_up(&mut self, canvas_point: PointF) {
        if self.image.is_none() {
            return;
        }
        let image_point = self.current_transform().to_image(canvas_point);
        match self.tool.pointer_up(image_point) {
            GestureOutcome::None => {}
            GestureOutcome::Annotation(shape) => {
                let id = self.annotations.add_annotation(shape, self.annotation_color);
                debug!(id, "annotation committed");
                self.overlay_dirty = true;
            }
            GestureOutcome::Measurement(kind) => {
                let label = kind.format_value();
                let id = self.annotations.add_measurement(kind, self.annotation_color);
                debug!(id, value = %label, "measurement committed");
                self.overlay_dirty = true;
            }
            GestureOutcome::TextPrompt { anchor } => {
                self.text_prompt = Some(anchor);
            }
        }
    }

    /// Answer a pending text prompt. Blank input cancels.
    pub fn commit_text(&mut self, text: &str) {
        let Some(anchor) = self.text_prompt.take() else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.annotations.add_annotation(
            crate::annotations::Shape::Text {
                anchor,
                text: text.to_string(),
            },
            self.annotation_color,
        );
        self.overlay_dirty = true;
    }

    pub fn cancel_text(&mut self) {
        self.text_prompt = None;
    }

    pub fn clear_annotations(&mut self) {
        if self.annotations.is_empty() {
            return;
        }
        info!(count = self.annotations.len(), "clearing all annotations");
        self.annotations.clear_all();
        self.overlay_dirty = true;
    }

    // Frame pump.

    /// Drain filter results, advance the chain, repaint stale layers. Call
    /// once per frame, or in a loop when driving the session headless.
    pub fn tick(&mut self) {
        self.pump_outcomes();
        self.refresh_layers();
    }

    /// Synchronous export of the current canvas: base layer with the
    /// overlay flattened on top, PNG-encoded.
    pub fn export_annotated_image(&mut self) -> Result<Vec<u8>> {
        if self.image.is_none() {
            return Err(RoentgenError::NoImage);
        }
        self.refresh_layers();
        export_png(&compose(&self.base, &self.overlay))
    }

    fn refresh_layers(&mut self) {
        if self.base_dirty {
            self.render_base_layer();
        }
        if self.overlay_dirty {
            self.render_overlay_layer();
        }
    }

    fn render_base_layer(&mut self) {
        self.base = match (&self.image, &self.load_error) {
            (Some(image), _) => {
                let source: &Raster = match &self.filtered {
                    Some(filtered) => filtered,
                    None => &image.raster,
                };
                render_base(source, self.canvas_w, self.canvas_h, &self.state)
            }
            (None, Some(detail)) => render_fallback(self.canvas_w, self.canvas_h, detail),
            (None, None) => Raster::filled(self.canvas_w, self.canvas_h, render::base::BACKDROP),
        };
        self.base_dirty = false;
        self.base_revision += 1;
    }

    fn render_overlay_layer(&mut self) {
        let transform = self.current_transform();
        self.overlay = render_overlay(&self.annotations, self.canvas_w, self.canvas_h, &transform);
        self.overlay_dirty = false;
        self.overlay_revision += 1;
    }

    /// Begin the filter chain from the raw image under the current sliders.
    /// The previous chain, if any, is superseded; its late results will
    /// carry an older sequence and be dropped.
    fn restart_chain(&mut self) {
        self.sequence += 1;
        self.filtered = None;
        self.chain = None;
        self.base_dirty = true;

        let Some(image) = &self.image else {
            return;
        };
        let settings = self.state.filter_settings();
        if settings.is_passthrough() {
            return;
        }
        let stages: Vec<FilterKind> = FilterKind::chain_order()
            .into_iter()
            .filter(|kind| settings.intensity_for(*kind) > 0.0)
            .collect();
        debug!(stages = stages.len(), sequence = self.sequence, "filter chain started");
        self.chain = Some(ChainProgress {
            stages,
            next: 0,
            input: Arc::new(image.raster.clone()),
        });
        self.advance_chain();
    }

    /// Push the chain forward: cache hits resolve inline, the first miss
    /// dispatches and leaves the chain waiting on [`tick`](Self::tick).
    fn advance_chain(&mut self) {
        loop {
            let step = match &self.chain {
                None => return,
                Some(chain) => chain
                    .stages
                    .get(chain.next)
                    .map(|&stage| (stage, chain.input.clone())),
            };
            let Some((stage, input)) = step else {
                if let Some(done) = self.chain.take() {
                    debug!(sequence = self.sequence, "filter chain complete");
                    self.filtered = Some(done.input);
                    self.base_dirty = true;
                }
                return;
            };
            let Some(image_id) = self.image.as_ref().map(|image| image.id()) else {
                self.chain = None;
                return;
            };

            let settings = self.state.filter_settings();
            match self.engine.request(stage, &settings, image_id, input, self.sequence) {
                Ok(Submission::Cached(raster)) => {
                    if let Some(chain) = &mut self.chain {
                        chain.input = raster;
                        chain.next += 1;
                    }
                }
                Ok(Submission::Pending(_)) => return,
                Err(e) => {
                    // No worker means no filtering; show the raw image
                    // rather than wait on work that will never run.
                    warn!("filter chain aborted: {e}");
                    self.abort_chain();
                    return;
                }
            }
        }
    }

    fn pump_outcomes(&mut self) {
        for outcome in self.engine.poll() {
            if outcome.sequence() != self.sequence {
                debug!(job = %outcome.job_id(), "discarding result from superseded settings");
                continue;
            }
            match outcome {
                JobOutcome::Completed { raster, kind, .. } => {
                    let advanced = match &mut self.chain {
                        Some(chain) if chain.stages.get(chain.next) == Some(&kind) => {
                            chain.input = raster;
                            chain.next += 1;
                            true
                        }
                        _ => false,
                    };
                    if advanced {
                        self.advance_chain();
                    }
                }
                JobOutcome::Failed { kind, message, .. } => {
                    warn!(kind = kind.label(), "filter stage failed: {message}");
                    self.abort_chain();
                }
                JobOutcome::TimedOut { job_id, kind, .. } => {
                    warn!(
                        job = %job_id,
                        kind = kind.label(),
                        "filter stage timed out; keeping unfiltered image"
                    );
                    self.abort_chain();
                }
            }
        }
    }

    fn abort_chain(&mut self) {
        self.chain = None;
        self.filtered = None;
        self.base_dirty = true;
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}
