/*
 * Camera Module
 *
 * Maps world coordinates (origin top-left, y pointing down) onto the nannou
 * window (origin centre, y pointing up) and back, with zoom and drag panning.
 */

use nannou::prelude::*;

pub struct Camera {
    // World point shown at the centre of the window
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
    home: Vec2,
}

impl Camera {
    pub fn new(world_width: f32, world_height: f32) -> Self {
        let home = vec2(world_width / 2.0, world_height / 2.0);
        Self {
            position: home,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
            home,
        }
    }

    pub fn reset(&mut self) {
        self.position = self.home;
        self.zoom = 1.0;
        self.is_dragging = false;
    }

    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        let offset = (point - self.position) * self.zoom;
        vec2(offset.x, -offset.y) + window_rect.xy()
    }

    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        let centered = point - window_rect.xy();
        vec2(centered.x, -centered.y) / self.zoom + self.position
    }

    // Zoom about the cursor so the world point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;
        let before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        let after = self.screen_to_world(cursor_position, window_rect);
        self.position += before - after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    pub fn drag(&mut self, position: Vec2) {
        if !self.is_dragging {
            return;
        }
        let delta = position - self.last_cursor_pos;
        if delta.length_squared() > 0.0 {
            // Screen y is flipped relative to world y
            self.position -= vec2(delta.x, -delta.y) / self.zoom;
            self.last_cursor_pos = position;
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}
