/*
 * Viewer Module
 *
 * The interactive front end: a nannou window drawing the world, an egui
 * control panel, and a fixed-timestep loop that ticks the simulation at
 * 60 Hz while it is running and records every tick for CSV export.
 */

mod camera;
mod debug;
mod input;
mod renderer;
mod ui;

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::export::Recorder;
use crate::params::parse_value;
use crate::world::{SimState, World};

use camera::Camera;
use debug::DebugInfo;
use input::{mouse_moved, mouse_pressed, mouse_released, mouse_wheel, raw_window_event};
use renderer::view;
use ui::{ControlPanel, PanelStatus, UiAction};

const PHYSICS_HZ: f32 = 60.0;
// Longest frame the physics loop will try to catch up on
const MAX_FRAME_TIME: Duration = Duration::from_millis(250);
// Room beside the world for the control panel
const PANEL_WIDTH: f32 = 400.0;

/// Everything the viewer needs from the command line.
pub struct ViewerSetup {
    pub world: World,
    pub export_path: PathBuf,
}

// nannou builds the model from a plain fn pointer, so the initial world is
// handed over through this slot
static PENDING: Mutex<Option<ViewerSetup>> = Mutex::new(None);

/// Open the window and run until it is closed.
pub fn run(setup: ViewerSetup) {
    if let Ok(mut pending) = PENDING.lock() {
        *pending = Some(setup);
    }
    nannou::app(model).update(update).run();
}

pub struct Model {
    pub world: World,
    pub recorder: Recorder,
    pub export_path: PathBuf,
    pub egui: Egui,
    pub panel: ControlPanel,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    pub status: String,
    pub elapsed: Duration,
    // Fixed timestep physics variables
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
    pub last_update_time: Instant,
}

fn model(app: &App) -> Model {
    let setup = PENDING
        .lock()
        .ok()
        .and_then(|mut pending| pending.take())
        .expect("viewer::run stores the initial world before nannou starts");
    let world = setup.world;

    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size((world.width() + PANEL_WIDTH) as u32, (world.height() + 100.0) as u32)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_wheel(mouse_wheel)
        .raw_event(raw_window_event)
        .build()
        .unwrap();
    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let mut camera = Camera::new(world.width(), world.height());
    // Shift the world right so the panel does not cover it
    camera.position.x -= PANEL_WIDTH / 2.0;

    Model {
        camera,
        world,
        recorder: Recorder::new(),
        export_path: setup.export_path,
        egui,
        panel: ControlPanel::default(),
        debug_info: DebugInfo::default(),
        mouse_position: Vec2::ZERO,
        status: "Ready".to_string(),
        elapsed: Duration::ZERO,
        physics_accumulator: Duration::ZERO,
        physics_step_size: Duration::from_secs_f32(1.0 / PHYSICS_HZ),
        last_update_time: Instant::now(),
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let status = PanelStatus {
        state: model.world.state(),
        status: &model.status,
        elapsed_secs: model.elapsed.as_secs_f32(),
        tick: model.world.tick_count(),
        flocks: model.world.flocks().len(),
        boids: model.world.boid_count(),
        obstacles: model.world.obstacles().len(),
        zoom: model.camera.zoom,
    };
    let actions = ui::update_ui(&mut model.egui, &mut model.panel, &status, &model.debug_info);
    for action in actions {
        apply_action(model, action);
    }

    let now = Instant::now();
    let frame_time = now.duration_since(model.last_update_time).min(MAX_FRAME_TIME);
    model.last_update_time = now;

    if model.world.state() != SimState::Running {
        model.physics_accumulator = Duration::ZERO;
        model.debug_info.ticks_per_frame = 0;
        return;
    }

    model.elapsed += frame_time;
    model.physics_accumulator += frame_time;
    let mut ticks = 0;
    while model.physics_accumulator >= model.physics_step_size {
        match model.world.tick() {
            Ok(summary) => {
                model.recorder.record(summary.tick, &model.world.snapshot());
                model.debug_info.mean_speed = summary.mean_speed;
            }
            Err(e) => {
                warn!(error = %e, "tick failed");
                break;
            }
        }
        model.physics_accumulator -= model.physics_step_size;
        ticks += 1;
    }
    model.debug_info.ticks_per_frame = ticks;
}

fn apply_action(model: &mut Model, action: UiAction) {
    let world = &mut model.world;
    let outcome = match action {
        UiAction::SetAllRadius(field, value) => world.set_all_groups_param(field, value).map(|_| None),
        UiAction::AddFlock(spec) => world
            .add_group(spec)
            .map(|id| Some(format!("Added flock {id} with {} boids", spec.count))),
        UiAction::AddObstacle(position, radius) => world
            .add_obstacle(position, radius)
            .map(|_| Some(format!("Added obstacle at ({:.0}, {:.0})", position.x, position.y))),
        UiAction::AddRandomObstacles(count) => {
            let placed = world.add_random_obstacles(count);
            Ok(Some(format!("Added {placed} of {count} obstacles")))
        }
        UiAction::Start => world.start().map(|_| Some("Simulation running".to_string())),
        UiAction::Pause => world.pause().map(|_| Some("Simulation paused".to_string())),
        UiAction::Resume => world.resume().map(|_| Some("Simulation running".to_string())),
        UiAction::Reset => {
            world.reset();
            model.recorder.clear();
            model.elapsed = Duration::ZERO;
            Ok(Some("Simulation reset".to_string()))
        }
        UiAction::Export => {
            export(model);
            Ok(None)
        }
        UiAction::ResetCamera => {
            model.camera.reset();
            Ok(None)
        }
        UiAction::Rejected(message) => Ok(Some(message)),
    };

    match outcome {
        Ok(Some(message)) => model.status = message,
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "control panel action rejected");
            model.status = e.to_string();
        }
    }
}

fn export(model: &mut Model) {
    if model.recorder.is_empty() {
        model.status = "No data to export".to_string();
        return;
    }
    model.status = match model.recorder.export_to_path(&model.export_path) {
        Ok(()) => format!("Data exported to {}", model.export_path.display()),
        Err(e) => {
            warn!(error = %e, path = %model.export_path.display(), "export failed");
            format!("Export failed: {e}")
        }
    };
}

// Right click: drop an obstacle at the cursor using the panel's radius
fn drop_obstacle(model: &mut Model, at: Vec2) {
    let position = to_world(at);
    let result = parse_value("radius", &model.panel.obstacle_form.radius)
        .and_then(|radius| model.world.add_obstacle(position, radius));
    match result {
        Ok(id) => {
            info!(obstacle = %id, "placed obstacle from cursor");
            model.status = format!("Added obstacle at ({:.0}, {:.0})", position.x, position.y);
        }
        Err(e) => model.status = e.to_string(),
    }
}

// nannou and the simulation use different glam releases
fn to_world(v: Vec2) -> crate::Vec2 {
    crate::Vec2::new(v.x, v.y)
}

fn to_view(v: crate::Vec2) -> Vec2 {
    vec2(v.x, v.y)
}
