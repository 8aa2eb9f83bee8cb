/*
 * Spatial Grid Module
 *
 * Neighbor-within-radius lookups over the members of one flock. A neighbor is
 * any candidate other than the agent itself whose Euclidean distance to the
 * agent is strictly less than the radius.
 *
 * Two implementations share the `NeighborIndex` trait:
 * - `BruteForce`: the baseline linear scan over every candidate
 * - `SpatialGrid`: a uniform hash grid that only inspects nearby cells
 *
 * Both return the identical neighbor set in candidate order, so swapping the
 * index never changes the forces a tick produces.
 */

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::boid::BoidState;

/// Linear scan over `candidates`: every `c` with `c.id != agent.id` and
/// `distance(agent, c) < radius`, in candidate order.
pub fn neighbors_within<'a>(agent: &BoidState, radius: f32, candidates: &'a [BoidState]) -> Vec<&'a BoidState> {
    candidates
        .iter()
        .filter(|c| is_neighbor(agent, c, radius))
        .collect()
}

#[inline]
fn is_neighbor(agent: &BoidState, candidate: &BoidState, radius: f32) -> bool {
    candidate.id != agent.id && agent.position.distance(candidate.position) < radius
}

/// Common behaviour exposed by neighborhood indices.
pub trait NeighborIndex: Send + Sync {
    /// Rebuild internal structures from the candidate set used by later queries.
    fn rebuild(&mut self, candidates: &[BoidState]);

    /// Neighbors of `agent` among `candidates`, which must be the slice passed
    /// to the last `rebuild`.
    fn neighbors_within<'a>(&self, agent: &BoidState, radius: f32, candidates: &'a [BoidState]) -> Vec<&'a BoidState>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl NeighborIndex for BruteForce {
    fn rebuild(&mut self, _candidates: &[BoidState]) {}

    fn neighbors_within<'a>(&self, agent: &BoidState, radius: f32, candidates: &'a [BoidState]) -> Vec<&'a BoidState> {
        neighbors_within(agent, radius, candidates)
    }
}

pub struct SpatialGrid {
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    // Convert world coordinates to grid cell coordinates
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    // Clear the grid
    pub fn clear(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
    }

    // Insert a candidate index into the grid
    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec2) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(index);
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|c| !c.is_empty()).count()
    }
}

impl NeighborIndex for SpatialGrid {
    fn rebuild(&mut self, candidates: &[BoidState]) {
        self.clear();
        for (i, state) in candidates.iter().enumerate() {
            self.insert(i, state.position);
        }
    }

    fn neighbors_within<'a>(&self, agent: &BoidState, radius: f32, candidates: &'a [BoidState]) -> Vec<&'a BoidState> {
        if radius <= 0.0 || candidates.is_empty() {
            return Vec::new();
        }

        // Number of cells to look at in each direction
        let reach = (radius / self.cell_size).ceil();
        let window = (2.0 * reach + 1.0) * (2.0 * reach + 1.0);
        if !reach.is_finite() || window >= candidates.len() as f32 {
            // Walking the cells would cost more than scanning everyone
            return neighbors_within(agent, radius, candidates);
        }

        let reach = reach as i32;
        let (cx, cy) = self.cell_of(agent.position);
        let mut found = Vec::new();

        for y_offset in -reach..=reach {
            for x_offset in -reach..=reach {
                let Some(cell) = self.cells.get(&(cx + x_offset, cy + y_offset)) else {
                    continue;
                };
                found.extend(
                    cell.iter()
                        .copied()
                        .filter(|&i| is_neighbor(agent, &candidates[i], radius)),
                );
            }
        }

        // Restore candidate order so results match the linear scan exactly
        found.sort_unstable();
        found.into_iter().map(|i| &candidates[i]).collect()
    }
}

/// Which neighbor index the world builds for each flock every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SpatialIndexKind {
    #[default]
    BruteForce,
    Grid { cell_size: f32 },
}

impl SpatialIndexKind {
    pub fn build(&self, candidates: &[BoidState]) -> Box<dyn NeighborIndex> {
        let mut index: Box<dyn NeighborIndex> = match *self {
            SpatialIndexKind::BruteForce => Box::new(BruteForce),
            SpatialIndexKind::Grid { cell_size } => Box::new(SpatialGrid::new(cell_size)),
        };
        index.rebuild(candidates);
        index
    }
}
