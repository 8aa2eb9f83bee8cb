/*
 * Boundary Module
 *
 * What happens to a boid that leaves the world rectangle [0, width] x [0, height].
 * One policy applies to the whole world for its lifetime.
 */

use serde::{Deserialize, Serialize};

use crate::boid::Boid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Re-enter from the opposite edge, keeping the velocity.
    Wrap,
    /// Clamp to the edge and reflect the velocity component.
    #[default]
    Bounce,
}

impl BoundaryPolicy {
    pub fn apply(self, boid: &mut Boid, width: f32, height: f32) {
        match self {
            BoundaryPolicy::Wrap => {
                boid.position.x = wrap_axis(boid.position.x, width);
                boid.position.y = wrap_axis(boid.position.y, height);
            }
            BoundaryPolicy::Bounce => {
                bounce_axis(&mut boid.position.x, &mut boid.velocity.x, width);
                bounce_axis(&mut boid.position.y, &mut boid.velocity.y, height);
            }
        }
    }
}

// Only coordinates strictly outside [0, extent] move; the overshoot carries over
fn wrap_axis(value: f32, extent: f32) -> f32 {
    if value > extent || value < 0.0 {
        value.rem_euclid(extent)
    } else {
        value
    }
}

fn bounce_axis(value: &mut f32, velocity: &mut f32, extent: f32) {
    if *value >= extent {
        *value = extent;
        *velocity = -*velocity;
    } else if *value <= 0.0 {
        *value = 0.0;
        *velocity = -*velocity;
    }
}
