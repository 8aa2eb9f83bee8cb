/*
 * Configuration Module
 *
 * World-level settings and scenario files. Everything has a default so a
 * scenario file only needs the values it changes, e.g.
 *
 *   [world]
 *   width = 1000.0
 *   boundary = "wrap"
 *   seed = 42
 *
 *   [[flocks]]
 *   color = "#ff4500"
 *   count = 40
 *   max_speed = 5.0
 *
 *   [[obstacles]]
 *   x = 400.0
 *   y = 300.0
 *   radius = 30.0
 */

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::boundary::BoundaryPolicy;
use crate::error::{ConfigError, Result};
use crate::flock::FlockSpec;
use crate::obstacle::ObstacleSpec;
use crate::placement::SpawnStrategy;
use crate::spatial_grid::SpatialIndexKind;
use crate::steering::SteeringWeights;
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub boundary: BoundaryPolicy,
    pub spawn: SpawnStrategy,
    // Edge length of each spawn region
    pub region_size: f32,
    // Standard deviation of the Gaussian scatter around a region centre
    pub spawn_std_dev: f32,
    // Region inset per unit of boid size
    pub spawn_margin_per_size: f32,
    // Extra clearance added to obstacle radius + boid size
    pub obstacle_margin: f32,
    pub weights: SteeringWeights,
    pub spatial_index: SpatialIndexKind,
    pub parallel: bool,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            boundary: BoundaryPolicy::Bounce,
            spawn: SpawnStrategy::Regions,
            region_size: 200.0,
            spawn_std_dev: 20.0,
            spawn_margin_per_size: 10.0,
            obstacle_margin: 20.0,
            weights: SteeringWeights::default(),
            spatial_index: SpatialIndexKind::BruteForce,
            parallel: false,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("region_size", self.region_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("spawn_std_dev", self.spawn_std_dev),
            ("spawn_margin_per_size", self.spawn_margin_per_size),
            ("obstacle_margin", self.obstacle_margin),
            ("weights.separation", self.weights.separation),
            ("weights.alignment", self.weights.alignment),
            ("weights.cohesion", self.weights.cohesion),
            ("weights.avoidance", self.weights.avoidance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")));
            }
        }

        if let SpatialIndexKind::Grid { cell_size } = self.spatial_index {
            if !(cell_size.is_finite() && cell_size > 0.0) {
                return Err(ConfigError::Invalid(format!("grid cell_size must be positive, got {cell_size}")));
            }
        }
        Ok(())
    }
}

/// A world configuration plus the flocks and obstacles to create at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub world: WorldConfig,
    pub flocks: Vec<FlockSpec>,
    pub obstacles: Vec<ObstacleSpec>,
    // Extra obstacles scattered at random after the explicit ones
    pub random_obstacles: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            flocks: vec![FlockSpec::default()],
            obstacles: Vec::new(),
            random_obstacles: 0,
        }
    }
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.world.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_toml_str(&text)?;
        info!(path = %path.display(), flocks = scenario.flocks.len(), "loaded scenario");
        Ok(scenario)
    }

    /// Create the world and populate it. Stays `Idle` until started.
    pub fn build(&self) -> Result<World> {
        let mut world = World::new(self.world.clone())?;
        self.populate(&mut world)?;
        Ok(world)
    }

    /// Add this scenario's flocks and obstacles to an (usually freshly reset) world.
    pub fn populate(&self, world: &mut World) -> Result<()> {
        for obstacle in &self.obstacles {
            world.add_obstacle(obstacle.position(), obstacle.radius)?;
        }
        if self.random_obstacles > 0 {
            world.add_random_obstacles(self.random_obstacles);
        }
        for spec in &self.flocks {
            world.add_group(*spec)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flock::VisualTag;

    #[test]
    fn empty_file_gives_defaults() {
        let scenario = Scenario::from_toml_str("").unwrap();
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn parses_full_scenario() {
        let text = r##"
            random_obstacles = 2

            [world]
            width = 1000
            boundary = "wrap"
            spawn = "uniform"
            seed = 42
            spatial_index = { kind = "grid", cell_size = 50.0 }

            [world.weights]
            separation = 2.0

            [[flocks]]
            color = "#ff4500"
            count = 12
            max_speed = 5.0
            max_force = 0.1
            separation_radius = 20.0
            alignment_radius = 0.0
            cohesion_radius = 40.0
            size = 2.0

            [[obstacles]]
            x = 400.0
            y = 300.0
            radius = 30.0
        "##;
        let scenario = Scenario::from_toml_str(text).unwrap();

        assert_eq!(scenario.world.width, 1000.0);
        assert_eq!(scenario.world.height, 600.0);
        assert_eq!(scenario.world.boundary, BoundaryPolicy::Wrap);
        assert_eq!(scenario.world.spawn, SpawnStrategy::Uniform);
        assert_eq!(scenario.world.seed, Some(42));
        assert_eq!(scenario.world.spatial_index, SpatialIndexKind::Grid { cell_size: 50.0 });
        assert_eq!(scenario.world.weights.separation, 2.0);
        assert_eq!(scenario.world.weights.avoidance, 3.0);

        let flock = scenario.flocks[0];
        assert_eq!(flock.color, VisualTag::new(0xff, 0x45, 0x00));
        assert_eq!(flock.count, 12);
        assert_eq!(flock.params.alignment_radius, 0.0);
        assert_eq!(scenario.obstacles[0].radius, 30.0);
        assert_eq!(scenario.random_obstacles, 2);
    }

    #[test]
    fn rejects_invalid_world() {
        let err = Scenario::from_toml_str("[world]\nwidth = -5.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Scenario::from_toml_str("[world]\nboundary = \"teleport\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_scenario_builds_one_flock() {
        let world = Scenario::default().build().unwrap();
        assert_eq!(world.flocks().len(), 1);
        assert_eq!(world.boid_count(), 30);
    }
}
