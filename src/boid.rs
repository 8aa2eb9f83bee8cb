/*
 * Boid Module
 *
 * This module defines the Boid struct: one flocking particle with a position,
 * velocity and accumulated acceleration. Steering forces are accumulated with
 * `apply_force` during the force phase and consumed by `update` during the
 * integration phase, which also enforces the owning flock's speed limit.
 */

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::flock::FlockId;

/// Identifier of a boid, unique within a `World`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoidId(pub u32);

impl fmt::Display for BoidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub id: BoidId,
    pub flock_id: FlockId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Boid {
    pub fn new(id: BoidId, flock_id: FlockId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            flock_id,
            position,
            velocity,
            acceleration: Vec2::ZERO,
        }
    }

    // Apply a force to the boid
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    // Integrate one step: velocity, speed limit, position, then clear acceleration
    pub fn update(&mut self, max_speed: f32) {
        self.velocity += self.acceleration;

        let speed = self.velocity.length();
        if speed > max_speed {
            self.velocity = self.velocity / speed * max_speed;
        }

        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    pub fn state(&self) -> BoidState {
        BoidState {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
        }
    }

    pub fn snapshot(&self) -> BoidSnapshot {
        BoidSnapshot {
            boid_id: self.id,
            flock_id: self.flock_id,
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// Read-only kinematic state captured before a tick; neighbor queries and
/// steering only ever look at these, never at boids being integrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidState {
    pub id: BoidId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// One entry of `World::snapshot`, handed to renderers and recorders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoidSnapshot {
    pub boid_id: BoidId,
    pub flock_id: FlockId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Initial kinematics for a boid placed explicitly via `World::add_group_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoidSeed {
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
}

impl BoidSeed {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boid(velocity: Vec2) -> Boid {
        Boid::new(BoidId(0), FlockId(1), Vec2::ZERO, velocity)
    }

    #[test]
    fn update_limits_speed_and_clears_acceleration() {
        let mut b = boid(Vec2::new(3.0, 0.0));
        b.apply_force(Vec2::new(0.0, 4.0));
        b.update(2.0);

        assert!((b.velocity.length() - 2.0).abs() < 1e-5);
        assert_eq!(b.acceleration, Vec2::ZERO);
        assert_eq!(b.position, b.velocity);
    }

    #[test]
    fn update_keeps_slow_velocity() {
        let mut b = boid(Vec2::new(1.0, 1.0));
        b.update(4.0);

        assert_eq!(b.velocity, Vec2::new(1.0, 1.0));
        assert_eq!(b.position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn forces_accumulate_until_update() {
        let mut b = boid(Vec2::ZERO);
        b.apply_force(Vec2::new(0.5, 0.0));
        b.apply_force(Vec2::new(0.25, -0.5));

        assert_eq!(b.acceleration, Vec2::new(0.75, -0.5));
    }
}
