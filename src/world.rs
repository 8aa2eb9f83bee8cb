/*
 * World Module
 *
 * The simulation itself: owns every flock, boid and obstacle, runs the
 * Idle/Running/Paused state machine and advances one tick at a time.
 *
 * A tick runs three strict phases:
 * 1. Force phase: steering forces for every boid, computed only from a
 *    read-only snapshot taken before the tick (optionally in parallel)
 * 2. Integration phase: velocity, speed limit, position, acceleration reset
 * 3. Boundary phase: the world's wrap or bounce policy
 *
 * Configuration changes (new flocks, obstacles, parameter edits) arrive
 * between ticks; nothing observes a half-finished tick.
 */

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::boid::{Boid, BoidId, BoidSeed, BoidSnapshot, BoidState};
use crate::config::WorldConfig;
use crate::error::{Result, SimError};
use crate::flock::{check_count, Flock, FlockId, FlockSpec, VisualTag};
use crate::obstacle::{Obstacle, ObstacleId};
use crate::params::{parse_value, FlockParam, FlockParams};
use crate::placement::{initial_velocity, PlacementAllocator, SpawnStrategy};
use crate::steering::{flocking_force, FlockContext};

// Random obstacle placement, matching the interactive "add multiple obstacles" tool
const RANDOM_OBSTACLE_EDGE: f32 = 50.0;
const RANDOM_OBSTACLE_RADIUS: (f32, f32) = (20.0, 60.0);
const RANDOM_OBSTACLE_GAP: f32 = 20.0;
const RANDOM_OBSTACLE_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimState {
    Idle,
    Running,
    Paused,
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimState::Idle => "idle",
            SimState::Running => "running",
            SimState::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub boids: usize,
    pub mean_speed: f32,
}

pub struct World {
    config: WorldConfig,
    flocks: Vec<Flock>,
    obstacles: Vec<Obstacle>,
    tick_count: u64,
    state: SimState,
    allocator: PlacementAllocator,
    rng: ChaCha8Rng,
    next_flock_id: u32,
    next_boid_id: u32,
    next_obstacle_id: u32,
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let allocator = PlacementAllocator::new(
            config.width,
            config.height,
            config.region_size,
            config.spawn_std_dev,
            config.spawn_margin_per_size,
        )?;
        info!(
            width = config.width,
            height = config.height,
            boundary = ?config.boundary,
            regions = allocator.total_regions(),
            "created world"
        );

        Ok(Self {
            rng: seeded_rng(config.seed),
            config,
            flocks: Vec::new(),
            obstacles: Vec::new(),
            tick_count: 0,
            state: SimState::Idle,
            allocator,
            next_flock_id: 1,
            next_boid_id: 0,
            next_obstacle_id: 0,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn width(&self) -> f32 {
        self.config.width
    }

    pub fn height(&self) -> f32 {
        self.config.height
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn flocks(&self) -> &[Flock] {
        &self.flocks
    }

    pub fn flock(&self, id: FlockId) -> Option<&Flock> {
        self.flocks.iter().find(|f| f.id == id)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn boid_count(&self) -> usize {
        self.flocks.iter().map(Flock::len).sum()
    }

    pub fn available_regions(&self) -> usize {
        self.allocator.available()
    }

    // ------------------------------------------------------------------
    // Population
    // ------------------------------------------------------------------

    /// Create a flock of `spec.count` boids placed by the configured spawn
    /// strategy. On error the world is left untouched.
    pub fn add_group(&mut self, spec: FlockSpec) -> Result<FlockId> {
        if let Err(e) = spec.validate() {
            warn!(error = %e, "rejected flock");
            return Err(e);
        }

        let size = spec.params.size;
        let mut kinematics = Vec::with_capacity(spec.count);
        match self.config.spawn {
            SpawnStrategy::Regions => {
                let region = self.allocator.next_region().map_err(|e| {
                    warn!(error = %e, "flock placement failed");
                    SimError::from(e)
                })?;
                for _ in 0..spec.count {
                    let position = self.allocator.spawn_position(&region, size, &mut self.rng);
                    let velocity = initial_velocity(spec.params.max_speed, &mut self.rng);
                    kinematics.push((position, velocity));
                }
            }
            SpawnStrategy::Uniform => {
                for _ in 0..spec.count {
                    let position = self.allocator.uniform_position(&mut self.rng);
                    let velocity = initial_velocity(spec.params.max_speed, &mut self.rng);
                    kinematics.push((position, velocity));
                }
            }
        }

        Ok(self.insert_flock(spec.color, spec.params, kinematics))
    }

    /// Create a flock whose boids start exactly at `seeds`, bypassing the
    /// spawn allocator. `spec.count` is ignored.
    pub fn add_group_at(&mut self, spec: FlockSpec, seeds: &[BoidSeed]) -> Result<FlockId> {
        if let Err(e) = check_seeds(&spec, seeds) {
            warn!(error = %e, "rejected flock");
            return Err(e);
        }

        let kinematics = seeds.iter().map(|s| (s.position, s.velocity)).collect();
        Ok(self.insert_flock(spec.color, spec.params, kinematics))
    }

    fn insert_flock(&mut self, color: VisualTag, params: FlockParams, kinematics: Vec<(Vec2, Vec2)>) -> FlockId {
        let id = FlockId(self.next_flock_id);
        self.next_flock_id += 1;

        let mut flock = Flock::new(id, color, params);
        flock.boids = kinematics
            .into_iter()
            .map(|(position, velocity)| {
                let boid_id = BoidId(self.next_boid_id);
                self.next_boid_id += 1;
                Boid::new(boid_id, id, position, velocity)
            })
            .collect();

        info!(flock = %id, boids = flock.len(), color = %color.to_hex(), "added flock");
        self.flocks.push(flock);
        id
    }

    pub fn add_obstacle(&mut self, position: Vec2, radius: f32) -> Result<ObstacleId> {
        if !position.is_finite() {
            return Err(SimError::invalid("position", format!("obstacle position {position} is not finite")));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::invalid("radius", format!("obstacle radius must be positive, got {radius}")));
        }

        let id = ObstacleId(self.next_obstacle_id);
        self.next_obstacle_id += 1;
        self.obstacles.push(Obstacle { id, position, radius });
        info!(obstacle = %id, x = position.x, y = position.y, radius, "added obstacle");
        Ok(id)
    }

    /// Scatter up to `count` obstacles that do not overlap existing ones.
    /// Stops at the first obstacle that cannot be placed; returns how many were added.
    pub fn add_random_obstacles(&mut self, count: usize) -> usize {
        let axis = |extent: f32| {
            if extent > 2.0 * RANDOM_OBSTACLE_EDGE {
                RANDOM_OBSTACLE_EDGE..extent - RANDOM_OBSTACLE_EDGE
            } else {
                0.0..extent
            }
        };
        let (xs, ys) = (axis(self.config.width), axis(self.config.height));

        for placed in 0..count {
            let spot = (0..RANDOM_OBSTACLE_ATTEMPTS).find_map(|_| {
                let position = Vec2::new(self.rng.gen_range(xs.clone()), self.rng.gen_range(ys.clone()));
                let radius = self.rng.gen_range(RANDOM_OBSTACLE_RADIUS.0..RANDOM_OBSTACLE_RADIUS.1);
                let overlaps = self
                    .obstacles
                    .iter()
                    .any(|o| o.is_near(position, radius + RANDOM_OBSTACLE_GAP));
                (!overlaps).then_some((position, radius))
            });

            let Some((position, radius)) = spot else {
                warn!(placed, requested = count, "could not place all obstacles without overlap");
                return placed;
            };
            let id = ObstacleId(self.next_obstacle_id);
            self.next_obstacle_id += 1;
            self.obstacles.push(Obstacle { id, position, radius });
        }

        info!(placed = count, "added random obstacles");
        count
    }

    // ------------------------------------------------------------------
    // Live parameters
    // ------------------------------------------------------------------

    pub fn set_group_params(&mut self, flock_id: FlockId, field: FlockParam, value: f32) -> Result<()> {
        let flock = self
            .flocks
            .iter_mut()
            .find(|f| f.id == flock_id)
            .ok_or(SimError::UnknownFlock(flock_id))?;

        if let Err(e) = flock.params.set(field, value) {
            warn!(flock = %flock_id, error = %e, "rejected parameter change");
            return Err(e);
        }
        debug!(flock = %flock_id, %field, value, "updated flock parameter");
        Ok(())
    }

    /// Text input from a control surface: both the field name and the value are parsed.
    pub fn set_group_param_str(&mut self, flock_id: FlockId, field: &str, value: &str) -> Result<()> {
        let field: FlockParam = field.parse()?;
        let value = parse_value(field.name(), value)?;
        self.set_group_params(flock_id, field, value)
    }

    /// Apply one value to every flock, as the global sliders do.
    pub fn set_all_groups_param(&mut self, field: FlockParam, value: f32) -> Result<()> {
        field.check(value)?;
        for flock in &mut self.flocks {
            flock.params.set(field, value)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    fn transition(&mut self, action: &'static str, from: SimState, to: SimState) -> Result<()> {
        if self.state != from {
            return Err(SimError::InvalidTransition {
                action,
                state: self.state,
            });
        }
        self.state = to;
        info!(from = %from, to = %to, "simulation {action}");
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition("start", SimState::Idle, SimState::Running)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.transition("pause", SimState::Running, SimState::Paused)
    }

    pub fn resume(&mut self) -> Result<()> {
        self.transition("resume", SimState::Paused, SimState::Running)
    }

    /// Drop every flock, boid and obstacle and return to `Idle`. A seeded
    /// world also rewinds its random source.
    pub fn reset(&mut self) {
        self.flocks.clear();
        self.obstacles.clear();
        self.tick_count = 0;
        self.state = SimState::Idle;
        self.allocator.reset();
        self.next_flock_id = 1;
        self.next_boid_id = 0;
        self.next_obstacle_id = 0;
        if let Some(seed) = self.config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        info!("simulation reset");
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    // Force phase: one force per boid, per flock, from the pre-tick snapshot
    fn force_phase(&self) -> Vec<Vec<Vec2>> {
        let weights = &self.config.weights;
        self.flocks
            .iter()
            .map(|flock| {
                let members: Vec<BoidState> = flock.boids.iter().map(Boid::state).collect();
                let index = self.config.spatial_index.build(&members);
                let ctx = FlockContext {
                    members: &members,
                    index: index.as_ref(),
                    params: &flock.params,
                    obstacles: &self.obstacles,
                    weights,
                    obstacle_margin: self.config.obstacle_margin,
                };

                let forces: Vec<Vec2> = if self.config.parallel {
                    members.par_iter().map(|agent| flocking_force(agent, &ctx)).collect()
                } else {
                    members.iter().map(|agent| flocking_force(agent, &ctx)).collect()
                };
                forces
            })
            .collect()
    }

    /// The combined steering force each boid would receive on the next tick,
    /// without changing anything.
    pub fn compute_forces(&self) -> Vec<(BoidId, Vec2)> {
        self.flocks
            .iter()
            .zip(self.force_phase())
            .flat_map(|(flock, forces)| flock.boids.iter().map(|b| b.id).zip(forces))
            .collect()
    }

    /// Advance the world by one step. Only valid while `Running`.
    pub fn tick(&mut self) -> Result<TickSummary> {
        if self.state != SimState::Running {
            return Err(SimError::NotRunning(self.state));
        }

        let forces = self.force_phase();

        let (width, height) = (self.config.width, self.config.height);
        let boundary = self.config.boundary;
        let mut speed_total = 0.0;
        for (flock, forces) in self.flocks.iter_mut().zip(forces) {
            let max_speed = flock.params.max_speed;
            for (boid, force) in flock.boids.iter_mut().zip(forces) {
                boid.apply_force(force);
                boid.update(max_speed);
                boundary.apply(boid, width, height);
                speed_total += boid.velocity.length();
            }
        }

        self.tick_count += 1;
        let boids = self.boid_count();
        let summary = TickSummary {
            tick: self.tick_count,
            boids,
            mean_speed: if boids > 0 { speed_total / boids as f32 } else { 0.0 },
        };
        debug!(tick = summary.tick, boids, mean_speed = summary.mean_speed, "tick");
        Ok(summary)
    }

    /// Every live boid, flock by flock in creation order.
    pub fn snapshot(&self) -> Vec<BoidSnapshot> {
        self.flocks
            .iter()
            .flat_map(|flock| flock.boids.iter().map(Boid::snapshot))
            .collect()
    }
}

// Explicit seeds replace the spec's count
fn check_seeds(spec: &FlockSpec, seeds: &[BoidSeed]) -> Result<()> {
    spec.params.validate()?;
    check_count(seeds.len())?;
    if let Some(bad) = seeds
        .iter()
        .find(|s| !s.position.is_finite() || !s.velocity.is_finite())
    {
        return Err(SimError::invalid("seed", format!("non-finite boid seed {bad:?}")));
    }
    Ok(())
}
