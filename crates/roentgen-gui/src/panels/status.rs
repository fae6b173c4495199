use crate::app::RoentgenApp;

pub fn show(ctx: &egui::Context, app: &mut RoentgenApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Progress bar
        if let Some((stage, done, total)) = app.session.chain_progress() {
            let fraction = if total > 0 {
                done as f32 / total as f32
            } else {
                0.0
            };
            let detail = format!("{} ({}/{})", stage.label(), done + 1, total);
            ui.add(egui::ProgressBar::new(fraction).text(detail).animate(true));
        } else if app.session.is_processing() {
            ui.add(
                egui::ProgressBar::new(0.0)
                    .text("Applying filters...")
                    .animate(true),
            );
        } else {
            // Invisible placeholder — same height, no animation
            ui.add(egui::ProgressBar::new(0.0).text(""));
        }

        // Log area — fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.log_messages.is_empty() {
                    // Reserve space for 4 empty lines to prevent layout jump.
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.log_messages {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            if let Some(image) = app.session.image() {
                let name = image
                    .metadata
                    .original_filename
                    .as_deref()
                    .unwrap_or("unnamed");
                ui.label(name);
                ui.separator();
                ui.label(format!("{}x{}", image.width(), image.height()));
                ui.separator();
            }
            ui.label(format!("Zoom: {}%", app.session.state().zoom_percent()));
            ui.separator();
            ui.label(format!("{}\u{b0}", app.session.state().rotation_deg));
            ui.separator();
            ui.label(format!("Tool: {}", app.session.active_tool().label()));
            if !app.session.is_filter_worker_available() {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), "Worker offline");
            }
        });

        ui.add_space(2.0);
    });
}
