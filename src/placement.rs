/*
 * Placement Module
 *
 * Spawn placement for new flocks. The world is cut into a grid of square,
 * non-overlapping regions; every flock added with the region strategy takes the
 * next unused region and its boids are scattered around the region centre with
 * a Gaussian, then clamped inside the region so neighbouring flocks start apart.
 */

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PlacementError};

/// How `add_group` positions new boids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnStrategy {
    /// One region per flock; fails once the regions run out.
    #[default]
    Regions,
    /// Uniformly anywhere in the world; never fails.
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub center: Vec2,
    pub size: f32,
}

impl Region {
    // Clamp `point` into the region, keeping `margin` away from its edges
    pub fn clamp_inside(&self, point: Vec2, margin: f32) -> Vec2 {
        let half = self.size / 2.0;
        let inset = |c: f32, p: f32| {
            let lo = c - half + margin;
            let hi = c + half - margin;
            // Margin wider than the region collapses onto the centre
            if lo > hi {
                c
            } else {
                p.clamp(lo, hi)
            }
        };
        Vec2::new(inset(self.center.x, point.x), inset(self.center.y, point.y))
    }
}

pub struct PlacementAllocator {
    width: f32,
    height: f32,
    region_size: f32,
    margin_per_size: f32,
    scatter: Normal<f32>,
    total: usize,
    free: VecDeque<Region>,
}

impl PlacementAllocator {
    pub fn new(
        width: f32,
        height: f32,
        region_size: f32,
        spawn_std_dev: f32,
        margin_per_size: f32,
    ) -> Result<Self, ConfigError> {
        if !(region_size.is_finite() && region_size > 0.0) {
            return Err(ConfigError::Invalid(format!("region_size must be positive, got {region_size}")));
        }
        // Normal::new accepts a negative deviation, so reject it here
        if !(spawn_std_dev.is_finite() && spawn_std_dev >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "spawn_std_dev must be finite and non-negative, got {spawn_std_dev}"
            )));
        }
        let scatter = Normal::new(0.0, spawn_std_dev)
            .map_err(|e| ConfigError::Invalid(format!("spawn_std_dev {spawn_std_dev}: {e}")))?;

        let mut allocator = Self {
            width,
            height,
            region_size,
            margin_per_size,
            scatter,
            total: 0,
            free: VecDeque::new(),
        };
        allocator.reset();
        Ok(allocator)
    }

    /// Re-derive the full region list, forgetting every allocation.
    pub fn reset(&mut self) {
        self.free = divide_into_regions(self.width, self.height, self.region_size);
        self.total = self.free.len();
    }

    pub fn total_regions(&self) -> usize {
        self.total
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    // Pop the next unused region in insertion order
    pub fn next_region(&mut self) -> Result<Region, PlacementError> {
        self.free.pop_front().ok_or(PlacementError {
            total_regions: self.total,
        })
    }

    pub fn spawn_position<R: Rng + ?Sized>(&self, region: &Region, boid_size: f32, rng: &mut R) -> Vec2 {
        let offset = Vec2::new(self.scatter.sample(rng), self.scatter.sample(rng));
        region.clamp_inside(region.center + offset, boid_size * self.margin_per_size)
    }

    pub fn uniform_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(rng.gen_range(0.0..self.width), rng.gen_range(0.0..self.height))
    }
}

// Region centres at size/2, 3*size/2, ... while inside the world, column by column
fn divide_into_regions(width: f32, height: f32, region_size: f32) -> VecDeque<Region> {
    let centers = |extent: f32| {
        (0..)
            .map(move |i| region_size / 2.0 + i as f32 * region_size)
            .take_while(move |&c| c < extent)
    };

    let mut regions = VecDeque::new();
    for x in centers(width) {
        for y in centers(height) {
            regions.push_back(Region {
                center: Vec2::new(x, y),
                size: region_size,
            });
        }
    }
    regions
}

/// Random heading with a speed drawn uniformly from `[1, max_speed]`.
pub fn initial_velocity<R: Rng + ?Sized>(max_speed: f32, rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let speed = if max_speed > 1.0 {
        rng.gen_range(1.0..=max_speed)
    } else {
        max_speed
    };
    Vec2::from_angle(angle) * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn allocator() -> PlacementAllocator {
        PlacementAllocator::new(800.0, 600.0, 200.0, 20.0, 10.0).unwrap()
    }

    #[test]
    fn regions_tile_the_world_column_by_column() {
        let mut alloc = allocator();
        assert_eq!(alloc.total_regions(), 12);

        let first: Vec<Vec2> = (0..4).map(|_| alloc.next_region().unwrap().center).collect();
        assert_eq!(
            first,
            vec![
                Vec2::new(100.0, 100.0),
                Vec2::new(100.0, 300.0),
                Vec2::new(100.0, 500.0),
                Vec2::new(300.0, 100.0),
            ]
        );
        assert_eq!(alloc.available(), 8);
    }

    #[test]
    fn exhausted_allocator_reports_placement_error() {
        let mut alloc = PlacementAllocator::new(200.0, 200.0, 200.0, 20.0, 10.0).unwrap();
        assert!(alloc.next_region().is_ok());
        assert_eq!(alloc.next_region(), Err(PlacementError { total_regions: 1 }));

        alloc.reset();
        assert_eq!(alloc.available(), 1);
    }

    #[test]
    fn spawned_positions_stay_inside_region_margin() {
        let alloc = allocator();
        let region = Region {
            center: Vec2::new(300.0, 300.0),
            size: 200.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..500 {
            let p = alloc.spawn_position(&region, 3.0, &mut rng);
            assert!((230.0..=370.0).contains(&p.x), "{p}");
            assert!((230.0..=370.0).contains(&p.y), "{p}");
        }
    }

    #[test]
    fn oversized_margin_collapses_to_centre() {
        let region = Region {
            center: Vec2::new(100.0, 100.0),
            size: 200.0,
        };
        assert_eq!(region.clamp_inside(Vec2::new(0.0, 190.0), 150.0), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn initial_speed_is_between_one_and_max() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let speed = initial_velocity(4.0, &mut rng).length();
            assert!((1.0 - 1e-4..=4.0 + 1e-4).contains(&speed));
        }
        let slow = initial_velocity(0.5, &mut rng).length();
        assert!((slow - 0.5).abs() < 1e-5);
    }

    #[test]
    fn invalid_scatter_is_a_config_error() {
        assert!(PlacementAllocator::new(800.0, 600.0, 200.0, -1.0, 10.0).is_err());
        assert!(PlacementAllocator::new(800.0, 600.0, 200.0, f32::NAN, 10.0).is_err());
        assert!(PlacementAllocator::new(800.0, 600.0, 200.0, f32::INFINITY, 10.0).is_err());
        assert!(PlacementAllocator::new(800.0, 600.0, 200.0, 0.0, 10.0).is_ok());
    }
}
