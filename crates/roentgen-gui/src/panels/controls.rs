use roentgen_core::consts::{MAX_LEVEL, MIN_LEVEL};
use roentgen_core::tools::Tool;

use crate::app::RoentgenApp;
use crate::convert::{from_color32, to_color32};
use crate::panels::section_header;

const LEFT_PANEL_WIDTH: f32 = 260.0;

pub fn show(ctx: &egui::Context, app: &mut RoentgenApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                study_section(ui, app);
                view_section(ui, app);
                ui.separator();
                filter_section(ui, app);
                ui.separator();
                annotation_section(ui, app);
                measurement_section(ui, app);
            });
        });
}

/// Metadata readout for the open study. Hidden while nothing is loaded.
fn study_section(ui: &mut egui::Ui, app: &RoentgenApp) {
    let Some(image) = app.session.image() else {
        return;
    };
    section_header(ui, "Study", None);
    ui.add_space(4.0);

    let meta = &image.metadata;
    for (name, value) in [
        ("Modality", &meta.modality),
        ("Body part", &meta.body_part),
        ("Date", &meta.study_date),
        ("Institution", &meta.institution_name),
    ] {
        if let Some(value) = value {
            ui.weak(format!("{name}: {value}"));
        }
    }
    let state = app.session.state();
    if let (Some(center), Some(width)) = (state.window_center, state.window_width) {
        ui.weak(format!("Window: C {center:.0} / W {width:.0}"));
    }
    ui.separator();
}

fn view_section(ui: &mut egui::Ui, app: &mut RoentgenApp) {
    section_header(ui, "View", None);
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui.button("\u{2212}").clicked() {
            app.session.zoom_out();
        }
        ui.label(format!("{}%", app.session.state().zoom_percent()));
        if ui.button("+").clicked() {
            app.session.zoom_in();
        }
        ui.separator();
        if ui.button("\u{27f2}").clicked() {
            app.session.rotate_by(-90);
        }
        ui.label(format!("{}\u{b0}", app.session.state().rotation_deg));
        if ui.button("\u{27f3}").clicked() {
            app.session.rotate_by(90);
        }
    });

    ui.add_space(4.0);

    let mut brightness = app.session.state().brightness;
    if ui
        .add(
            egui::Slider::new(&mut brightness, MIN_LEVEL..=MAX_LEVEL)
                .text("Brightness")
                .fixed_decimals(2),
        )
        .changed()
    {
        app.session.set_brightness(brightness);
    }

    let mut contrast = app.session.state().contrast;
    if ui
        .add(
            egui::Slider::new(&mut contrast, MIN_LEVEL..=MAX_LEVEL)
                .text("Contrast")
                .fixed_decimals(2),
        )
        .changed()
    {
        app.session.set_contrast(contrast);
    }

    ui.add_space(4.0);
    if ui.button("Reset View").clicked() {
        app.session.reset_view();
    }
}

fn filter_section(ui: &mut egui::Ui, app: &mut RoentgenApp) {
    let status = if app.session.is_processing() {
        Some("processing...")
    } else {
        None
    };
    section_header(ui, "Filters", status);
    ui.add_space(4.0);

    if !app.session.is_filter_worker_available() {
        ui.colored_label(
            egui::Color32::from_rgb(220, 80, 80),
            "Filter worker offline; sliders disabled",
        );
    }
    let enabled = app.session.is_filter_worker_available() && app.session.image().is_some();

    ui.add_enabled_ui(enabled, |ui| {
        let mut noise = app.session.state().noise_threshold;
        if ui
            .add(
                egui::Slider::new(&mut noise, 0.0..=1.0)
                    .text("Noise reduction")
                    .fixed_decimals(2),
            )
            .changed()
        {
            app.session.set_noise_threshold(noise);
        }

        let mut bone = app.session.state().bone_removal;
        if ui
            .add(
                egui::Slider::new(&mut bone, 0.0..=1.0)
                    .text("Bone removal")
                    .fixed_decimals(2),
            )
            .changed()
        {
            app.session.set_bone_removal(bone);
        }

        let mut flesh = app.session.state().flesh_removal;
        if ui
            .add(
                egui::Slider::new(&mut flesh, 0.0..=1.0)
                    .text("Flesh removal")
                    .fixed_decimals(2),
            )
            .changed()
        {
            app.session.set_flesh_removal(flesh);
        }
    });
}

fn annotation_section(ui: &mut egui::Ui, app: &mut RoentgenApp) {
    let count = app.session.annotations().len();
    let status = (count > 0).then(|| format!("{count}"));
    section_header(ui, "Annotations", status.as_deref());
    ui.add_space(4.0);

    ui.horizontal_wrapped(|ui| {
        for tool in Tool::all() {
            let selected = app.session.active_tool() == tool;
            if ui.selectable_label(selected, tool.label()).clicked() {
                app.session.set_tool(tool);
            }
        }
    });

    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label("Color:");
        let mut color = to_color32(app.session.annotation_color());
        if ui.color_edit_button_srgba(&mut color).changed() {
            app.session.set_annotation_color(from_color32(color));
        }
    });

    ui.add_space(4.0);

    let has_any = !app.session.annotations().is_empty();
    if ui.add_enabled(has_any, egui::Button::new("Clear All")).clicked() {
        app.session.clear_annotations();
        app.add_log("Annotations cleared".into());
    }
}

fn measurement_section(ui: &mut egui::Ui, app: &RoentgenApp) {
    let measurements = app.session.annotations().measurements();
    if measurements.is_empty() {
        return;
    }
    ui.separator();
    let count = measurements.len().to_string();
    section_header(ui, "Measurements", Some(&count));
    ui.add_space(4.0);
    for measurement in measurements {
        ui.weak(format!(
            "{}: {}",
            measurement.kind.label(),
            measurement.kind.format_value()
        ));
    }
}
