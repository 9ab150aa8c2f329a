use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;

use boidbox_lib::flock::Flock;
use boidbox_lib::flock_base;
use boidbox_lib::recorder::FlockWatcher;

mod cliargs;

fn main() {
    let args = cliargs::Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error in configuration:\n{err}");
            process::exit(1);
        }
    };

    match args.live {
        Some(seconds) => run_live(config, seconds),
        None => run_ticked(config, args.ticks),
    }
}

/// Bounded deterministic run on the main thread.
fn run_ticked(config: boidbox_lib::config::SimConfig, ticks: u64) {
    let population = config.population;

    match flock_base(ticks, config) {
        Ok(data) => println!(
            "ran {ticks} ticks of {population} boids, {samples} samples recorded",
            samples = data.len()
        ),
        Err(err) => {
            eprintln!("Error in configuration:\n{err}");
            process::exit(1);
        }
    }
}

/// One free-running thread per boid, stopped after the requested wall time.
fn run_live(config: boidbox_lib::config::SimConfig, seconds: u64) {
    let save_options = config.save.clone();
    let sample_rate = config.sample_rate;
    let population = config.population;

    let mut flock = match Flock::new(config) {
        Ok(flock) => flock,
        Err(err) => {
            eprintln!("Error in configuration:\n{err}");
            process::exit(1);
        }
    };
    let mut watcher = FlockWatcher::new(sample_rate);

    flock.start();
    let deadline = std::time::Instant::now() + Duration::from_secs(seconds);
    while std::time::Instant::now() < deadline {
        watcher.watch(&flock);
        thread::sleep(Duration::from_millis(16));
    }
    flock.stop();

    let data = watcher.pop_data_save(&save_options);
    println!(
        "ran {population} boid threads for {seconds}s, {samples} samples recorded",
        samples = data.len()
    );
}
