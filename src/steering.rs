/*
 * Steering Module
 *
 * The flocking rules, each producing a velocity-correcting force:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 * 4. Obstacle avoidance: Push away from nearby obstacles
 *
 * Every rule funnels through `steer` (Reynolds: steering = desired - velocity,
 * limited to the flock's max force) and returns the zero vector when it has
 * nothing to react to.
 */

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::boid::BoidState;
use crate::obstacle::Obstacle;
use crate::params::FlockParams;
use crate::spatial_grid::NeighborIndex;

/// Relative weights used when combining the four behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringWeights {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub avoidance: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            separation: 1.5,
            alignment: 1.0,
            cohesion: 1.0,
            avoidance: 3.0,
        }
    }
}

/// Turn `vector` into a steering force: aim at `target_speed` along it,
/// subtract the current velocity and cap the result at `max_force`.
pub fn steer(vector: Vec2, target_speed: f32, current_velocity: Vec2, max_force: f32) -> Vec2 {
    let length = vector.length();
    if length == 0.0 {
        return Vec2::ZERO;
    }

    let desired = vector / length * target_speed;
    let steering = desired - current_velocity;

    let force = steering.length();
    if force > max_force {
        steering / force * max_force
    } else {
        steering
    }
}

// Calculate separation force (avoid crowding neighbors)
pub fn separation(agent: &BoidState, neighbors: &[&BoidState], params: &FlockParams) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }

    let mut sum = Vec2::ZERO;
    for other in neighbors {
        let diff = agent.position - other.position;
        let d = diff.length();
        // Coincident boids count as neighbors but contribute no direction
        if d > 0.0 {
            sum += diff / d;
        }
    }
    sum /= neighbors.len() as f32;

    steer(sum, params.max_speed, agent.velocity, params.max_force)
}

// Calculate alignment force (steer towards average heading of neighbors)
pub fn alignment(agent: &BoidState, neighbors: &[&BoidState], params: &FlockParams) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }

    let average = neighbors.iter().map(|n| n.velocity).sum::<Vec2>() / neighbors.len() as f32;
    steer(average, params.max_speed, agent.velocity, params.max_force)
}

// Calculate cohesion force (steer towards average position of neighbors)
pub fn cohesion(agent: &BoidState, neighbors: &[&BoidState], params: &FlockParams) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }

    let center = neighbors.iter().map(|n| n.position).sum::<Vec2>() / neighbors.len() as f32;
    steer(center - agent.position, params.max_speed, agent.velocity, params.max_force)
}

/// Push away from every obstacle whose buffer (`radius + size + margin`) the
/// agent is inside. The per-obstacle unit vectors are summed; `steer` keeps
/// only the direction of that sum.
pub fn avoid_obstacles(agent: &BoidState, obstacles: &[Obstacle], params: &FlockParams, margin: f32) -> Vec2 {
    let mut sum = Vec2::ZERO;
    for obstacle in obstacles {
        if !obstacle.is_near(agent.position, params.size + margin) {
            continue;
        }
        let diff = agent.position - obstacle.position;
        let d = diff.length();
        if d > 0.0 {
            sum += diff / d;
        }
    }

    steer(sum, params.max_speed, agent.velocity, params.max_force)
}

/// Inputs shared by every agent of one flock during the force phase.
pub struct FlockContext<'a> {
    pub members: &'a [BoidState],
    pub index: &'a dyn NeighborIndex,
    pub params: &'a FlockParams,
    pub obstacles: &'a [Obstacle],
    pub weights: &'a SteeringWeights,
    pub obstacle_margin: f32,
}

/// The weighted sum of all behaviors for one agent, computed purely from the
/// pre-tick snapshot in `ctx`.
pub fn flocking_force(agent: &BoidState, ctx: &FlockContext<'_>) -> Vec2 {
    let params = ctx.params;
    let query = |radius: f32| ctx.index.neighbors_within(agent, radius, ctx.members);

    let mut force = separation(agent, &query(params.separation_radius), params) * ctx.weights.separation
        + alignment(agent, &query(params.alignment_radius), params) * ctx.weights.alignment
        + cohesion(agent, &query(params.cohesion_radius), params) * ctx.weights.cohesion;

    if !ctx.obstacles.is_empty() {
        force += avoid_obstacles(agent, ctx.obstacles, params, ctx.obstacle_margin) * ctx.weights.avoidance;
    }

    force
}
