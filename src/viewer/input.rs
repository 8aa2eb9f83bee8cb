/*
 * Input Module
 *
 * Mouse handling for the viewer window:
 * - Left drag pans the camera
 * - Mouse wheel or trackpad pinch zooms about the cursor
 * - Right click drops an obstacle at the cursor
 * Clicks over the egui panel are left to egui.
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

use super::{drop_obstacle, Model};

pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    if model.camera.is_dragging {
        model.camera.drag(pos);
    }
    model.mouse_position = pos;
}

pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match button {
        MouseButton::Left => model.camera.start_drag(model.mouse_position),
        MouseButton::Right => {
            let at = model.camera.screen_to_world(model.mouse_position, app.window_rect());
            drop_obstacle(model, at);
        }
        _ => {}
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let scroll = match delta {
        MouseScrollDelta::LineDelta(x, y) => vec2(x, y),
        MouseScrollDelta::PixelDelta(pos) => vec2(pos.x as f32, pos.y as f32) * 0.01,
    };
    model.camera.zoom(scroll, model.mouse_position, app.window_rect());
}

// Pass events to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
