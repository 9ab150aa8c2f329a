use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use glam::Vec2;
use itertools::Itertools;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::boid::Boid;
use crate::config::{ConfigError, SimConfig};
use crate::world::{AgentState, SharedWorld, World};

lazy_static! {
    // shared so that boid creation stays cheap no matter which thread asks
    static ref FLOCK_RNG: Mutex<Xoshiro256PlusPlus> =
        Mutex::new(Xoshiro256PlusPlus::from_entropy());
}

/// Owns the shared world and the population of boids, and drives them either
/// deterministically with [`Flock::tick_once`] or live with one free-running
/// thread per boid between [`Flock::start`] and [`Flock::stop`].
pub struct Flock {
    config: SimConfig,
    world: SharedWorld,
    boids: Vec<Boid>,
    handles: Vec<JoinHandle<Boid>>,
    stop: Arc<AtomicBool>,
}

impl Flock {
    /// Validates the configuration and places the population at random,
    /// registering every boid's initial cell.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        // reject before placement, spawn_boids samples the velocity clamp range
        config.validate()?;

        let boids = spawn_boids(&config);
        Flock::with_boids(config, boids)
    }

    /// Same as [`Flock::new`] but with caller-chosen initial placement,
    /// used by tests and replayable runs.
    pub fn with_boids(config: SimConfig, boids: Vec<Boid>) -> Result<Self, ConfigError> {
        config.validate()?;

        let world = World::shared(&config);
        {
            let mut world = world.write().unwrap();
            for boid in &boids {
                world.register(
                    boid.id,
                    AgentState {
                        position: boid.position,
                        velocity: boid.velocity,
                    },
                );
            }
        }

        Ok(Flock {
            config,
            world,
            boids,
            handles: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Advances every boid by exactly one tick on the calling thread.
    ///
    /// This is the bounded, deterministic way to drive the simulation, the
    /// phases still take the same locks as the live threads do.
    pub fn tick_once(&mut self) {
        for boid in self.boids.iter_mut() {
            boid.tick(&self.world, &self.config);
        }
    }

    /// Hands every boid its own free-running thread. No-op when live.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        self.stop.store(false, Ordering::Relaxed);
        self.handles = self
            .boids
            .drain(..)
            .map(|boid| {
                boid.run(
                    Arc::clone(&self.world),
                    self.config.clone(),
                    Arc::clone(&self.stop),
                )
            })
            .collect_vec();
    }

    /// Raises the stop signal and joins every boid thread back into the
    /// flock, so a stopped flock can be ticked or restarted.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }

        self.stop.store(true, Ordering::Relaxed);
        self.boids = self
            .handles
            .drain(..)
            .map(|handle| handle.join().expect("boid thread panicked"))
            .collect_vec();
    }

    /// Renderer-facing snapshot of all published positions, in id order.
    pub fn positions(&self) -> Vec<Vec2> {
        self.world.read().unwrap().positions()
    }

    /// Snapshot of all published states, in id order.
    pub fn snapshot(&self) -> Vec<AgentState> {
        self.world.read().unwrap().states().to_vec()
    }
}

impl Drop for Flock {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Uniform random placement over the whole area, velocity components drawn
/// from the clamp range.
fn spawn_boids(config: &SimConfig) -> Vec<Boid> {
    let mut rng = FLOCK_RNG.lock().unwrap();

    (0..config.population)
        .map(|id| {
            Boid::new(
                id,
                Vec2::new(
                    rng.gen::<f32>() * config.width,
                    rng.gen::<f32>() * config.height,
                ),
                Vec2::new(
                    rng.gen_range(config.velocity_min..config.velocity_max),
                    rng.gen_range(config.velocity_min..config.velocity_max),
                ),
            )
        })
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use glam::Vec2;

    use super::Flock;
    use crate::boid::Boid;
    use crate::config::{ConfigError, SimConfig};
    use crate::math_helpers::distance;

    fn small_config(population: usize) -> SimConfig {
        SimConfig {
            width: 50.,
            height: 50.,
            population,
            view_radius: 10.,
            tick_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SimConfig {
            width: 0.,
            ..small_config(3)
        };

        assert!(matches!(
            Flock::new(config),
            Err(ConfigError::EmptyArea { .. })
        ));
    }

    #[test]
    fn new_reports_an_empty_velocity_range_instead_of_panicking() {
        let config = SimConfig {
            velocity_min: 1.,
            velocity_max: -1.,
            ..small_config(3)
        };

        // must surface the error before random placement samples the range
        assert!(matches!(
            Flock::new(config),
            Err(ConfigError::EmptyVelocityRange { .. })
        ));
    }

    #[test]
    fn random_placement_starts_in_bounds() {
        let flock = Flock::new(small_config(64)).unwrap();

        for position in flock.positions() {
            assert!(position.x >= 0. && position.x < 50.);
            assert!(position.y >= 0. && position.y < 50.);
        }
    }

    #[test]
    fn mutually_visible_boids_velocities_converge() {
        let config = small_config(3);
        let boids = vec![
            Boid::new(0, Vec2::new(5., 5.), Vec2::new(0.2, 0.)),
            Boid::new(1, Vec2::new(6., 5.), Vec2::new(-0.2, 0.)),
            // isolated, only ever sees the border
            Boid::new(2, Vec2::new(40., 40.), Vec2::new(0.5, 0.5)),
        ];
        let mut flock = Flock::with_boids(config, boids).unwrap();

        let initial = flock.snapshot();
        let initial_gap = distance(initial[0].velocity, initial[1].velocity);

        for _ in 0..100 {
            flock.tick_once();
        }

        let after = flock.snapshot();
        let final_gap = distance(after[0].velocity, after[1].velocity);

        assert!(
            final_gap < initial_gap,
            "velocities diverged: {final_gap} >= {initial_gap}"
        );
    }

    #[test]
    fn concurrent_ticks_never_duplicate_a_grid_marker() {
        let config = small_config(0);
        let spawn_at = |id: usize| {
            Boid::new(
                id,
                Vec2::new(5. + 5. * id as f32, 25.),
                Vec2::new(0.5, -0.5),
            )
        };
        let boids: Vec<Boid> = (0..8).map(spawn_at).collect();
        let flock = Flock::with_boids(config.clone(), boids).unwrap();
        let world = flock.world();

        let handles: Vec<_> = (0..8)
            .map(|id| {
                let world = flock.world();
                let config = config.clone();
                let mut boid = spawn_at(id);
                thread::spawn(move || {
                    for _ in 0..300 {
                        boid.tick(&world, &config);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let world = world.read().unwrap();
        for id in 0..8 {
            assert!(
                world.grid().occurrences(id) <= 1,
                "id {id} occupies more than one cell"
            );
        }
    }

    #[test]
    fn start_stop_round_trip_returns_boids_in_bounds() {
        let mut flock = Flock::new(small_config(16)).unwrap();

        flock.start();
        assert!(flock.is_running());
        thread::sleep(Duration::from_millis(25));
        flock.stop();
        assert!(!flock.is_running());

        for position in flock.positions() {
            assert!(position.x >= 0. && position.x < 50.);
            assert!(position.y >= 0. && position.y < 50.);
        }

        // a stopped flock can keep going deterministically
        flock.tick_once();
    }
}
