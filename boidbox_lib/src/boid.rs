use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use glam::Vec2;

use crate::config::SimConfig;
use crate::math_helpers::{distance, Limit};
use crate::world::{AgentState, SharedWorld, World};

/// One autonomous flocking entity.
///
/// Position and velocity here are private to the boid's own update thread,
/// peers only ever see the copy published in [`World`]. A tick runs three
/// strictly ordered phases: survey under the shared lock, steer on local
/// values only, commit under the exclusive lock.
#[derive(Debug, Clone, Copy)]
pub struct Boid {
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Order-independent sums collected over the visible neighbourhood.
#[derive(Debug, Default, Clone, Copy)]
struct NeighbourSummary {
    count: f32,
    velocity_sum: Vec2,
    position_sum: Vec2,
    repulsion_sum: Vec2,
}

impl Boid {
    pub fn new(id: usize, position: Vec2, velocity: Vec2) -> Self {
        Boid {
            id,
            position,
            velocity,
        }
    }

    /// One full sense-steer-commit cycle.
    pub fn tick(&mut self, world: &RwLock<World>, config: &SimConfig) {
        let summary = {
            let world = world.read().unwrap();
            self.survey(&world, config)
        };

        // steering needs no lock, it only folds the survey sums and own state
        let acceleration = self.steer(&summary, config);

        let mut world = world.write().unwrap();
        self.commit(&mut world, acceleration, config);
    }

    /// Sensing phase: scan the cropped grid box around the boid and fold every
    /// true neighbour into the summary.
    ///
    /// The grid only narrows the candidate set, membership is decided by the
    /// true distance of the published position being under the view radius.
    fn survey(&self, world: &World, config: &SimConfig) -> NeighbourSummary {
        let mut summary = NeighbourSummary::default();

        for other_id in world.grid().occupied_within(self.position, config.view_radius) {
            if other_id == self.id {
                continue;
            }

            let other = world.state(other_id);
            let dist = distance(self.position, other.position);
            // a peer sharing the exact position would divide by zero below,
            // skip it the same way anything out of view is skipped
            if dist <= 0. || dist >= config.view_radius {
                continue;
            }

            summary.count += 1.;
            summary.velocity_sum += other.velocity;
            summary.position_sum += other.position;
            summary.repulsion_sum += (self.position - other.position) / dist;
        }

        summary
    }

    /// Computing phase: border term plus the three classic steering terms.
    fn steer(&self, summary: &NeighbourSummary, config: &SimConfig) -> Vec2 {
        let mut acceleration = Vec2::new(
            Self::border_repulsion(self.position.x, config.width, config.view_radius),
            Self::border_repulsion(self.position.y, config.height, config.view_radius),
        );

        if summary.count > 0. {
            let avg_velocity = summary.velocity_sum / summary.count;
            let avg_position = summary.position_sum / summary.count;

            let alignment = (avg_velocity - self.velocity) * config.adjust_rate;
            let cohesion = (avg_position - self.position) * config.adjust_rate;
            let separation = summary.repulsion_sum * config.adjust_rate;

            acceleration += alignment + cohesion + separation;
        }

        acceleration
    }

    /// Repulsion on one axis, `1/pos` off the low edge and `1/(pos - max)`
    /// off the high edge, zero outside the view-radius band. Grows without
    /// bound towards an edge, the velocity clamp keeps the result finite.
    fn border_repulsion(pos: f32, max_edge: f32, view_radius: f32) -> f32 {
        if pos < view_radius {
            1. / pos
        } else if pos > max_edge - view_radius {
            1. / (pos - max_edge)
        } else {
            0.
        }
    }

    /// Committing phase: one exclusive critical section spanning the clear of
    /// the old cell and the set of the new one, so no reader ever observes a
    /// torn move.
    fn commit(&mut self, world: &mut World, acceleration: Vec2, config: &SimConfig) {
        world.displace(self.id, self.position);

        self.velocity =
            (self.velocity + acceleration).limit(config.velocity_min, config.velocity_max);
        self.position += self.velocity;

        world.place(
            self.id,
            AgentState {
                position: self.position,
                velocity: self.velocity,
            },
        );
    }

    /// Run-forever wrapper around [`Boid::tick`]: loops on its own thread
    /// until `stop` is raised, sleeping `tick_interval` between ticks purely
    /// to pace the simulation. Returns the boid when it winds down.
    pub fn run(
        mut self,
        world: SharedWorld,
        config: SimConfig,
        stop: Arc<AtomicBool>,
    ) -> JoinHandle<Boid> {
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                self.tick(&world, &config);
                thread::sleep(config.tick_interval);
            }
            self
        })
    }
}
