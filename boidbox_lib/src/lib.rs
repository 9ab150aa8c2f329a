use config::{ConfigError, SimConfig};
use flock::Flock;
use recorder::{BoidSample, FlockWatcher};

pub mod boid;
pub mod flock;
pub mod grid;
pub mod world;

pub mod config;
pub mod math_helpers;
pub mod recorder;

/// Runs a bounded, deterministic simulation of `no_ticks` ticks and returns
/// the recorded samples, saving them according to the config's save options.
pub fn flock_base(no_ticks: u64, config: SimConfig) -> Result<Vec<BoidSample>, ConfigError> {
    let save_options = config.save.clone();
    let mut flock = Flock::new(config.clone())?;
    let mut watcher = FlockWatcher::new(config.sample_rate);

    (0..no_ticks).for_each(|_| {
        flock.tick_once();
        watcher.watch(&flock);
    });

    Ok(watcher.pop_data_save(&save_options))
}
