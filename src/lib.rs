/*
 * Boid Flocking Simulation - Module Definitions
 *
 * The simulation core (boids, flocks, obstacles, neighbor queries, steering,
 * boundary handling, spawn placement and the world tick) plus the collaborators
 * layered on top of it: scenario configuration, CSV recording and, behind the
 * `viewer` feature, the interactive nannou front end.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidId, BoidSeed, BoidSnapshot, BoidState};
pub use boundary::BoundaryPolicy;
pub use config::{Scenario, WorldConfig};
pub use error::{ConfigError, PlacementError, SimError};
pub use export::Recorder;
pub use flock::{Flock, FlockId, FlockSpec, VisualTag};
pub use obstacle::{Obstacle, ObstacleId, ObstacleSpec};
pub use params::{FlockParam, FlockParams, MAX_FLOCK_SIZE};
pub use placement::SpawnStrategy;
pub use spatial_grid::{NeighborIndex, SpatialGrid, SpatialIndexKind};
pub use steering::SteeringWeights;
pub use world::{SimState, TickSummary, World};

// Define modules
pub mod boid;
pub mod boundary;
pub mod config;
pub mod error;
pub mod export;
pub mod flock;
pub mod obstacle;
pub mod params;
pub mod placement;
pub mod spatial_grid;
pub mod steering;
pub mod world;

#[cfg(feature = "viewer")]
pub mod viewer;

// Re-exported so downstream code does not need its own glam dependency
pub use glam::Vec2;
