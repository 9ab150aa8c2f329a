use std::sync::{Arc, RwLock};

use glam::Vec2;

use crate::config::SimConfig;
use crate::grid::SpatialGrid;

/// Position and velocity of a boid as last committed by its own thread.
///
/// This is the only cross-boid view of a boid's state, neighbours read it
/// under the same lock as the grid, never the boid's private fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// The single shared mutable resource of the simulation: the occupancy grid
/// together with the published per-boid states. Everything in here is read
/// under the shared side and mutated under the exclusive side of one
/// readers-writer lock, see [`SharedWorld`].
pub struct World {
    grid: SpatialGrid,
    published: Vec<AgentState>,
}

/// Handle passed by reference to every boid task at construction time.
pub type SharedWorld = Arc<RwLock<World>>;

impl World {
    pub fn new(config: &SimConfig) -> Self {
        World {
            grid: SpatialGrid::new(config.width, config.height),
            published: Vec::with_capacity(config.population),
        }
    }

    pub fn shared(config: &SimConfig) -> SharedWorld {
        Arc::new(RwLock::new(World::new(config)))
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Publishes a newly created boid and marks its initial cell.
    ///
    /// Ids index into the published table and must arrive in sequence,
    /// a gap would leave later `state` lookups out of bounds.
    pub fn register(&mut self, id: usize, state: AgentState) {
        assert_eq!(
            id,
            self.published.len(),
            "boid ids must be registered in sequence"
        );

        self.published.push(state);
        let (cell_x, cell_y) = self.grid.cell_of(state.position);
        self.grid.set(cell_x, cell_y, id);
    }

    pub fn state(&self, id: usize) -> AgentState {
        self.published[id]
    }

    /// Removes the boid's own marker from the cell its position rounds to.
    ///
    /// A peer that rounded into the same cell may have overwritten the
    /// marker, in that case the cell is left alone.
    pub fn displace(&mut self, id: usize, position: Vec2) {
        let (cell_x, cell_y) = self.grid.cell_of(position);
        if self.grid.occupant(cell_x, cell_y) == Some(id) {
            self.grid.clear(cell_x, cell_y);
        }
    }

    /// Publishes the boid's new state and marks its new cell.
    pub fn place(&mut self, id: usize, state: AgentState) {
        let (cell_x, cell_y) = self.grid.cell_of(state.position);
        self.grid.set(cell_x, cell_y, id);
        self.published[id] = state;
    }

    /// Renderer-facing snapshot, one position per boid in id order.
    pub fn positions(&self) -> Vec<Vec2> {
        self.published.iter().map(|state| state.position).collect()
    }

    pub fn states(&self) -> &[AgentState] {
        &self.published
    }
}
