use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use roentgen_core::config::ViewerConfig;
use roentgen_core::io::image_io::load_study_image;
use roentgen_core::viewer::ViewerSession;

use crate::convert::raster_to_color_image;
use crate::panels;

const LOG_CAPACITY: usize = 50;

/// Config file picked up from the working directory at startup.
const CONFIG_FILE: &str = "roentgen.toml";

/// Results handed back by file-dialog threads.
pub enum DialogResult {
    Open(PathBuf),
    ExportTo(PathBuf),
    ConfigLoaded(ViewerConfig),
}

pub struct RoentgenApp {
    pub session: ViewerSession,
    pub dialog_tx: mpsc::Sender<DialogResult>,
    dialog_rx: mpsc::Receiver<DialogResult>,
    pub base_texture: Option<egui::TextureHandle>,
    pub overlay_texture: Option<egui::TextureHandle>,
    base_seen: u64,
    overlay_seen: u64,
    pub text_input: String,
    pub prompt_was_open: bool,
    pub log_messages: Vec<String>,
    pub show_about: bool,
}

impl RoentgenApp {
    pub fn new() -> Self {
        let (dialog_tx, dialog_rx) = mpsc::channel();
        let mut log_messages = Vec::new();
        let config_path = Path::new(CONFIG_FILE);
        let session = if config_path.exists() {
            match ViewerConfig::load(config_path) {
                Ok(config) => {
                    log_messages.push(format!("Config loaded: {CONFIG_FILE}"));
                    ViewerSession::with_config(&config)
                }
                Err(err) => {
                    log_messages.push(format!("ERROR: {CONFIG_FILE}: {err}"));
                    ViewerSession::new()
                }
            }
        } else {
            ViewerSession::new()
        };
        Self {
            session,
            dialog_tx,
            dialog_rx,
            base_texture: None,
            overlay_texture: None,
            base_seen: 0,
            overlay_seen: 0,
            text_input: String::new(),
            prompt_was_open: false,
            log_messages,
            show_about: false,
        }
    }

    pub fn add_log(&mut self, message: String) {
        self.log_messages.push(message);
        if self.log_messages.len() > LOG_CAPACITY {
            let excess = self.log_messages.len() - LOG_CAPACITY;
            self.log_messages.drain(..excess);
        }
    }

    /// Drain results from file-dialog threads.
    fn poll_dialogs(&mut self) {
        while let Ok(result) = self.dialog_rx.try_recv() {
            match result {
                DialogResult::Open(path) => match load_study_image(&path) {
                    Ok(study) => {
                        self.add_log(format!(
                            "Opened: {} ({}x{})",
                            path.display(),
                            study.width(),
                            study.height()
                        ));
                        self.session.select_image(study);
                    }
                    Err(err) => {
                        self.add_log(format!("ERROR: {err}"));
                        self.session.image_load_failed(&err.to_string());
                    }
                },
                DialogResult::ExportTo(path) => match self.session.export_annotated_image() {
                    Ok(bytes) => match std::fs::write(&path, bytes) {
                        Ok(()) => self.add_log(format!("Saved: {}", path.display())),
                        Err(err) => self.add_log(format!("ERROR: {err}")),
                    },
                    Err(err) => self.add_log(format!("ERROR: {err}")),
                },
                DialogResult::ConfigLoaded(config) => {
                    self.apply_config(&config);
                    self.add_log("Config imported".into());
                }
            }
        }
    }

    fn apply_config(&mut self, config: &ViewerConfig) {
        self.session.set_brightness(config.display.brightness);
        self.session.set_contrast(config.display.contrast);
        self.session.set_noise_threshold(config.filters.noise_threshold);
        self.session.set_bone_removal(config.filters.bone_removal);
        self.session.set_flesh_removal(config.filters.flesh_removal);
        self.session.set_annotation_color(config.annotations.color);
    }

    /// Snapshot the current session settings as a config.
    pub fn current_config(&self) -> ViewerConfig {
        let state = self.session.state();
        let mut config = ViewerConfig::default();
        config.display.brightness = state.brightness;
        config.display.contrast = state.contrast;
        config.filters.noise_threshold = state.noise_threshold;
        config.filters.bone_removal = state.bone_removal;
        config.filters.flesh_removal = state.flesh_removal;
        config.annotations.color = self.session.annotation_color();
        config
    }

    /// Re-upload a layer texture only when the session re-rendered it.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        if self.session.base_revision() != self.base_seen {
            let image = raster_to_color_image(self.session.base_layer());
            self.base_texture = Some(ctx.load_texture("base", image, egui::TextureOptions::NEAREST));
            self.base_seen = self.session.base_revision();
        }
        if self.session.overlay_revision() != self.overlay_seen {
            let image = raster_to_color_image(self.session.overlay_layer());
            self.overlay_texture =
                Some(ctx.load_texture("overlay", image, egui::TextureOptions::NEAREST));
            self.overlay_seen = self.session.overlay_revision();
        }
    }
}

impl eframe::App for RoentgenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_dialogs();
        self.session.tick();
        self.sync_textures(ctx);

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::viewport::show(ctx, self);

        // About dialog
        if self.show_about {
            egui::Window::new("About Roentgen")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Roentgen");
                        ui.label("X-Ray Image Viewer");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }

        // Keep frames coming while the filter chain is in flight.
        if self.session.is_processing() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
