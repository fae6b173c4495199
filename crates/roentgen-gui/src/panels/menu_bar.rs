use roentgen_core::config::ViewerConfig;

use crate::app::{DialogResult, RoentgenApp};

pub fn show(ctx: &egui::Context, app: &mut RoentgenApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui.add(egui::Button::new("Open...").shortcut_text(ctx.format_shortcut(&open_shortcut))).clicked() {
                    ui.close();
                    open_file(app);
                }

                let export_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
                let has_image = app.session.image().is_some();
                if ui.add_enabled(has_image, egui::Button::new("Export...").shortcut_text(ctx.format_shortcut(&export_shortcut))).clicked() {
                    ui.close();
                    export_file(app);
                }

                ui.separator();

                if ui.button("Import Config...").clicked() {
                    ui.close();
                    import_config(app);
                }

                if ui.button("Export Config...").clicked() {
                    ui.close();
                    export_config(app);
                }

                ui.separator();

                let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom In").clicked() {
                    ui.close();
                    app.session.zoom_in();
                }
                if ui.button("Zoom Out").clicked() {
                    ui.close();
                    app.session.zoom_out();
                }
                ui.separator();
                if ui.button("Rotate Clockwise").clicked() {
                    ui.close();
                    app.session.rotate_by(90);
                }
                if ui.button("Rotate Counterclockwise").clicked() {
                    ui.close();
                    app.session.rotate_by(-90);
                }
                ui.separator();
                let maximize_label = if app.session.state().is_maximized {
                    "Restore"
                } else {
                    "Maximize"
                };
                if ui.button(maximize_label).clicked() {
                    ui.close();
                    app.session.toggle_maximized();
                    let maximized = app.session.state().is_maximized;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Maximized(maximized));
                }
                if ui.button("Reset View").clicked() {
                    ui.close();
                    app.session.reset_view();
                }
            });

            ui.menu_button("Annotations", |ui| {
                let has_any = !app.session.annotations().is_empty();
                if ui.add_enabled(has_any, egui::Button::new("Save As...")).clicked() {
                    ui.close();
                    save_annotations(app);
                }
                ui.separator();
                if ui.add_enabled(has_any, egui::Button::new("Clear All")).clicked() {
                    ui.close();
                    app.session.clear_annotations();
                    app.add_log("Annotations cleared".into());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
            open_file(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S))) {
            if app.session.image().is_some() {
                export_file(app);
            }
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

fn open_file(app: &mut RoentgenApp) {
    let dialog_tx = app.dialog_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = dialog_tx.send(DialogResult::Open(path));
        }
    });
}

fn export_file(app: &mut RoentgenApp) {
    let dialog_tx = app.dialog_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("annotated.png")
            .save_file()
        {
            let _ = dialog_tx.send(DialogResult::ExportTo(path));
        }
    });
}

fn import_config(app: &mut RoentgenApp) {
    let dialog_tx = app.dialog_tx.clone();
    std::thread::spawn(move || {
        let config = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .pick_file()
            .and_then(|path| {
                let content = std::fs::read_to_string(&path).ok()?;
                ViewerConfig::from_toml(&content).ok()
            });
        if let Some(config) = config {
            let _ = dialog_tx.send(DialogResult::ConfigLoaded(config));
        }
    });
}

/// Write the current annotation set as a TOML sidecar, loadable by
/// `roentgen annotate --overlay`.
fn save_annotations(app: &mut RoentgenApp) {
    let set = app.session.annotations().clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("annotations.toml")
            .save_file()
        {
            if let Ok(content) = toml::to_string_pretty(&set) {
                let _ = std::fs::write(path, content);
            }
        }
    });
}

fn export_config(app: &mut RoentgenApp) {
    let config = app.current_config();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("roentgen_config.toml")
            .save_file()
        {
            if let Ok(content) = config.to_toml() {
                let _ = std::fs::write(path, content);
            }
        }
    });
}
