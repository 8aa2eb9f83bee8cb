/*
 * Renderer Module
 *
 * Draws the world boundary, obstacles and every boid as a circle in its
 * flock's colour, scaled through the camera. With debug enabled it also shows
 * the perception radii and heading of the first boid plus a stats overlay.
 */

use nannou::prelude::*;

use super::ui::{self, PanelStatus};
use super::{to_view, Model};

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let camera = &model.camera;
    let world = &model.world;
    let zoom = camera.zoom;

    // World boundary
    let top_left = camera.world_to_screen(Vec2::ZERO, window_rect);
    let bottom_right = camera.world_to_screen(vec2(world.width(), world.height()), window_rect);
    let bounds = Rect::from_corners(top_left, bottom_right);
    draw.rect()
        .xy(bounds.xy())
        .wh(bounds.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    for obstacle in world.obstacles() {
        let at = camera.world_to_screen(to_view(obstacle.position), window_rect);
        draw.ellipse()
            .xy(at)
            .radius(obstacle.radius * zoom)
            .color(rgb(0.55, 0.27, 0.07))
            .stroke(GRAY)
            .stroke_weight(1.0);
    }

    for flock in world.flocks() {
        let [r, g, b] = flock.color.rgb;
        let color = rgb(r, g, b);
        let radius = (flock.params.size * zoom).max(1.0);
        for boid in &flock.boids {
            let at = camera.world_to_screen(to_view(boid.position), window_rect);
            if !window_rect.pad(-radius).contains(at) {
                continue;
            }
            draw.ellipse().xy(at).radius(radius).color(color);
        }
    }

    if model.panel.show_debug {
        if let Some((flock, boid)) = world
            .flocks()
            .iter()
            .find_map(|f| f.boids.first().map(|b| (f, b)))
        {
            let at = camera.world_to_screen(to_view(boid.position), window_rect);
            let radii = [
                (flock.params.separation_radius, RED),
                (flock.params.alignment_radius, GREEN),
                (flock.params.cohesion_radius, BLUE),
            ];
            for (radius, color) in radii {
                draw.ellipse()
                    .xy(at)
                    .radius(radius * zoom)
                    .no_fill()
                    .stroke(color)
                    .stroke_weight(1.0);
            }

            // Velocity vector, y flipped into screen space
            let heading = vec2(boid.velocity.x, -boid.velocity.y) * 5.0 * zoom;
            draw.arrow()
                .start(at)
                .end(at + heading)
                .color(YELLOW)
                .stroke_weight(2.0);
        }

        let status = PanelStatus {
            state: world.state(),
            status: &model.status,
            elapsed_secs: model.elapsed.as_secs_f32(),
            tick: world.tick_count(),
            flocks: world.flocks().len(),
            boids: world.boid_count(),
            obstacles: world.obstacles().len(),
            zoom,
        };
        ui::draw_debug_info(&draw, &model.debug_info, window_rect, &status);
    }

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}
