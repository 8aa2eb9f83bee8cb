/*
 * Obstacle Module
 *
 * Static circular exclusion zones. Obstacles never move once added and are
 * only removed by a world reset.
 */

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleId(pub u32);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub position: Vec2,
    pub radius: f32,
}

impl Obstacle {
    // Whether a point lies within `buffer` of the obstacle's rim
    pub fn is_near(&self, point: Vec2, buffer: f32) -> bool {
        point.distance(self.position) < self.radius + buffer
    }
}

/// Obstacle entry of a scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl ObstacleSpec {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
