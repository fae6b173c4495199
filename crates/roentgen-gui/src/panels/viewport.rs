use roentgen_core::raster::PointF;
use roentgen_core::tools::Tool;

use crate::app::RoentgenApp;

pub fn show(ctx: &egui::Context, app: &mut RoentgenApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        app.session
            .set_canvas_size(rect.width().max(1.0) as u32, rect.height().max(1.0) as u32);

        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        if let Some(ref tex) = app.base_texture {
            ui.painter().image(tex.id(), rect, uv, egui::Color32::WHITE);
        }
        if let Some(ref tex) = app.overlay_texture {
            ui.painter().image(tex.id(), rect, uv, egui::Color32::WHITE);
        }

        handle_pointer(&response, app, rect);
        draw_gesture_preview(ui, app, rect);

        if app.session.image().is_none() && app.session.load_failure().is_none() {
            draw_placeholder(ui, rect);
        }

        text_prompt_window(ctx, app);
    });
}

/// Route pointer gestures into the session as canvas-local positions. A
/// plain click is a zero-length press/release pair, which the angle and
/// text tools consume and the drag tools discard as too small.
fn handle_pointer(response: &egui::Response, app: &mut RoentgenApp, rect: egui::Rect) {
    let to_canvas = |pos: egui::Pos2| PointF::new(pos.x - rect.min.x, pos.y - rect.min.y);

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            app.session.pointer_down(to_canvas(pos));
        }
    }
    if response.drag_stopped() {
        if let Some(pos) = response.interact_pointer_pos() {
            app.session.pointer_up(to_canvas(pos));
        }
    }
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let point = to_canvas(pos);
            app.session.pointer_down(point);
            app.session.pointer_up(point);
        }
    }
}

/// Rubber-band feedback for the gesture in progress, drawn in screen space
/// on top of both layers.
fn draw_gesture_preview(ui: &egui::Ui, app: &RoentgenApp, rect: egui::Rect) {
    let painter = ui.painter();
    let stroke = egui::Stroke::new(1.5, egui::Color32::from_white_alpha(160));
    let transform = app.session.current_transform();
    let project = |p: PointF| {
        let s = transform.to_screen(p);
        egui::pos2(rect.min.x + s.x, rect.min.y + s.y)
    };

    // Angle clicks placed so far.
    let clicks: Vec<egui::Pos2> = app.session.angle_points().iter().map(|p| project(*p)).collect();
    for click in &clicks {
        painter.circle_filled(*click, 3.0, stroke.color);
    }
    if clicks.len() == 2 {
        painter.line_segment([clicks[0], clicks[1]], stroke);
    }

    if !app.session.is_drawing() {
        return;
    }
    let Some(start) = app.session.gesture_start() else {
        return;
    };
    let Some(hover) = ui.input(|i| i.pointer.hover_pos()) else {
        return;
    };

    let anchor = project(start);
    match app.session.active_tool() {
        Tool::Line | Tool::Arrow | Tool::Ruler => {
            painter.line_segment([anchor, hover], stroke);
        }
        Tool::Rectangle | Tool::Roi => {
            painter.rect_stroke(
                egui::Rect::from_two_pos(anchor, hover),
                0.0,
                stroke,
                egui::epaint::StrokeKind::Outside,
            );
        }
        Tool::Circle => {
            painter.circle_stroke(anchor, anchor.distance(hover), stroke);
        }
        _ => {}
    }
}

fn draw_placeholder(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Open an image to begin",
        egui::FontId::proportional(18.0),
        egui::Color32::from_gray(100),
    );
}

/// Modal prompt fed by the text tool; commits or cancels the pending
/// anchor in the session.
fn text_prompt_window(ctx: &egui::Context, app: &mut RoentgenApp) {
    if app.session.pending_text_prompt().is_none() {
        app.prompt_was_open = false;
        return;
    }

    egui::Window::new("Add Text")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let edit = ui.text_edit_singleline(&mut app.text_input);
            if !app.prompt_was_open {
                edit.request_focus();
                app.prompt_was_open = true;
            }

            let submitted =
                edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.horizontal(|ui| {
                if ui.button("Add").clicked() || submitted {
                    let text = std::mem::take(&mut app.text_input);
                    app.session.commit_text(&text);
                }
                if ui.button("Cancel").clicked()
                    || ui.input(|i| i.key_pressed(egui::Key::Escape))
                {
                    app.text_input.clear();
                    app.session.cancel_text();
                }
            });
        });
}
