/*
 * UI Module
 *
 * The egui control panel. Drawing the panel never touches the world directly;
 * every button press or slider change becomes a `UiAction` that the viewer
 * applies between ticks.
 */

use nannou_egui::{egui, Egui};

use crate::error::{Result, SimError};
use crate::flock::{FlockSpec, VisualTag};
use crate::params::{parse_value, FlockParam, FlockParams};
use crate::world::SimState;
use crate::Vec2;

use super::debug::DebugInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SetAllRadius(FlockParam, f32),
    AddFlock(FlockSpec),
    AddObstacle(Vec2, f32),
    AddRandomObstacles(usize),
    Start,
    Pause,
    Resume,
    Reset,
    Export,
    ResetCamera,
    // Form input that failed to parse
    Rejected(String),
}

/// What the panel displays about the running simulation.
pub struct PanelStatus<'a> {
    pub state: SimState,
    pub status: &'a str,
    pub elapsed_secs: f32,
    pub tick: u64,
    pub flocks: usize,
    pub boids: usize,
    pub obstacles: usize,
    pub zoom: f32,
}

// Count stays a string so half-typed numbers survive between frames
pub struct FlockForm {
    pub color: [u8; 3],
    pub count: String,
    pub max_speed: f32,
    pub max_force: f32,
    pub size: f32,
}

impl Default for FlockForm {
    fn default() -> Self {
        let defaults = FlockParams::default();
        Self {
            color: VisualTag::BLUE.rgb,
            count: FlockSpec::default().count.to_string(),
            max_speed: defaults.max_speed,
            max_force: defaults.max_force,
            size: defaults.size,
        }
    }
}

pub struct ObstacleForm {
    pub x: String,
    pub y: String,
    pub radius: String,
    pub random_count: usize,
}

impl Default for ObstacleForm {
    fn default() -> Self {
        Self {
            x: "400".to_string(),
            y: "300".to_string(),
            radius: "30".to_string(),
            random_count: 5,
        }
    }
}

pub struct ControlPanel {
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    pub flock_form: FlockForm,
    pub obstacle_form: ObstacleForm,
    pub show_debug: bool,
    last_radii: [f32; 3],
}

impl Default for ControlPanel {
    fn default() -> Self {
        let defaults = FlockParams::default();
        let radii = [defaults.separation_radius, defaults.alignment_radius, defaults.cohesion_radius];
        Self {
            separation_radius: radii[0],
            alignment_radius: radii[1],
            cohesion_radius: radii[2],
            flock_form: FlockForm::default(),
            obstacle_form: ObstacleForm::default(),
            show_debug: false,
            last_radii: radii,
        }
    }
}

impl ControlPanel {
    fn radii(&self) -> [f32; 3] {
        [self.separation_radius, self.alignment_radius, self.cohesion_radius]
    }

    // Slider moves since the previous frame, as global parameter updates
    fn radius_changes(&mut self) -> Vec<UiAction> {
        let fields = [
            FlockParam::SeparationRadius,
            FlockParam::AlignmentRadius,
            FlockParam::CohesionRadius,
        ];
        let current = self.radii();
        let changes = fields
            .into_iter()
            .zip(current)
            .zip(self.last_radii)
            .filter(|((_, now), before)| now != before)
            .map(|((field, now), _)| UiAction::SetAllRadius(field, now))
            .collect();
        self.last_radii = current;
        changes
    }

    /// Build a flock from the form. New flocks pick up the global radius sliders.
    pub fn flock_spec(&self) -> Result<FlockSpec> {
        let form = &self.flock_form;
        let count = form
            .count
            .trim()
            .parse::<usize>()
            .map_err(|_| SimError::invalid("count", format!("`{}` is not a positive whole number", form.count)))?;
        let spec = FlockSpec {
            color: VisualTag { rgb: form.color },
            count,
            params: FlockParams {
                max_speed: form.max_speed,
                max_force: form.max_force,
                size: form.size,
                separation_radius: self.separation_radius,
                alignment_radius: self.alignment_radius,
                cohesion_radius: self.cohesion_radius,
            },
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn obstacle(&self) -> Result<(Vec2, f32)> {
        let form = &self.obstacle_form;
        let x = parse_value("x", &form.x)?;
        let y = parse_value("y", &form.y)?;
        let radius = parse_value("radius", &form.radius)?;
        Ok((Vec2::new(x, y), radius))
    }
}

pub fn update_ui(
    egui: &mut Egui,
    panel: &mut ControlPanel,
    status: &PanelStatus,
    debug_info: &DebugInfo,
) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.horizontal(|ui| match status.state {
                SimState::Idle => {
                    if ui.button("Start").clicked() {
                        actions.push(UiAction::Start);
                    }
                }
                SimState::Running => {
                    if ui.button("Pause").clicked() {
                        actions.push(UiAction::Pause);
                    }
                }
                SimState::Paused => {
                    if ui.button("Resume").clicked() {
                        actions.push(UiAction::Resume);
                    }
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    actions.push(UiAction::Reset);
                }
                if ui.button("Export CSV").clicked() {
                    actions.push(UiAction::Export);
                }
            });
            ui.label(format!("Status: {}", status.status));
            ui.label(format!("Time: {:.1} s", status.elapsed_secs));
            ui.separator();

            ui.collapsing("Perception Radii", |ui| {
                ui.add(
                    egui::Slider::new(&mut panel.separation_radius, FlockParams::get_separation_radius_range())
                        .text("Separation Radius"),
                );
                ui.add(egui::Slider::new(&mut panel.alignment_radius, FlockParams::get_radius_range()).text("Alignment Radius"));
                ui.add(egui::Slider::new(&mut panel.cohesion_radius, FlockParams::get_radius_range()).text("Cohesion Radius"));
            });

            ui.collapsing("Add Flock", |ui| {
                let form = &mut panel.flock_form;
                ui.horizontal(|ui| {
                    ui.label("Color");
                    ui.color_edit_button_srgb(&mut form.color);
                });
                let counts = FlockParams::get_count_range();
                labelled_field(ui, &format!("Boids ({}-{})", counts.start(), counts.end()), &mut form.count);
                ui.add(egui::Slider::new(&mut form.max_speed, FlockParams::get_max_speed_range()).text("Max Speed"));
                ui.add(egui::Slider::new(&mut form.max_force, FlockParams::get_max_force_range()).text("Max Force"));
                ui.add(egui::Slider::new(&mut form.size, FlockParams::get_size_range()).text("Boid Size"));
                if ui.button("Add Flock").clicked() {
                    actions.push(match panel.flock_spec() {
                        Ok(spec) => UiAction::AddFlock(spec),
                        Err(e) => UiAction::Rejected(e.to_string()),
                    });
                }
            });

            ui.collapsing("Obstacles", |ui| {
                let form = &mut panel.obstacle_form;
                labelled_field(ui, "X", &mut form.x);
                labelled_field(ui, "Y", &mut form.y);
                labelled_field(ui, "Radius", &mut form.radius);
                if ui.button("Add Obstacle").clicked() {
                    actions.push(match panel.obstacle() {
                        Ok((position, radius)) => UiAction::AddObstacle(position, radius),
                        Err(e) => UiAction::Rejected(e.to_string()),
                    });
                }
                ui.separator();
                ui.add(egui::Slider::new(&mut panel.obstacle_form.random_count, 1..=20).text("Count"));
                if ui.button("Add Random Obstacles").clicked() {
                    actions.push(UiAction::AddRandomObstacles(panel.obstacle_form.random_count));
                }
                ui.label("Right click in the world to drop an obstacle");
            });

            ui.collapsing("Camera Controls", |ui| {
                ui.label("Zoom: mouse wheel or trackpad pinch");
                ui.label("Pan: click and drag");
                if ui.button("Reset Camera").clicked() {
                    actions.push(UiAction::ResetCamera);
                }
                ui.label(format!("Zoom Level: {:.2}x", status.zoom));
            });

            ui.collapsing("Statistics", |ui| {
                ui.label(format!("Tick: {}", status.tick));
                ui.label(format!("Flocks: {}", status.flocks));
                ui.label(format!("Boids: {}", status.boids));
                ui.label(format!("Obstacles: {}", status.obstacles));
                ui.label(format!("Mean speed: {:.2}", debug_info.mean_speed));
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
            });

            ui.checkbox(&mut panel.show_debug, "Show Debug Info");
        });

    actions.extend(panel.radius_changes());
    actions
}

fn labelled_field(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.text_edit_singleline(value);
    });
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect, status: &PanelStatus) {
    let margin = 20.0;
    let line_height = 20.0;
    let lines = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0),
        format!("Ticks this frame: {}", debug_info.ticks_per_frame),
        format!("Tick: {}", status.tick),
        format!("Boids: {}", status.boids),
        format!("Zoom: {:.2}x", status.zoom),
    ];

    let panel_width = 200.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    draw.rect()
        .x_y(window_rect.right() - panel_width / 2.0, window_rect.top() - panel_height / 2.0)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;
    for (i, text) in lines.iter().enumerate() {
        draw.text(text)
            .x_y(text_x + 70.0, text_y - i as f32 * line_height)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
