use std::{fs::OpenOptions, mem};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SaveOptions;
use crate::flock::Flock;

/// One recorded observation of one boid.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct BoidSample {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub tick: u64,
}

/// Accumulates snapshots of the flock at a configurable sample rate, the
/// poll-side collaborator of the simulation (a renderer would poll the same
/// snapshot).
pub struct FlockWatcher {
    samples: Vec<BoidSample>,
    ticker: u64,
    sample_rate: u64,
}

const PREFIX: &str = "flock-data";

impl FlockWatcher {
    pub fn new(sample_rate: u64) -> Self {
        FlockWatcher {
            samples: Vec::new(),
            ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection, a no-op on off-sample ticks.
    pub fn watch(&mut self, flock: &Flock) {
        if !self.should_sample() {
            return;
        }

        let tick = self.ticker / self.sample_rate;
        let mut current: Vec<BoidSample> = flock
            .snapshot()
            .iter()
            .enumerate()
            .map(|(id, state)| BoidSample {
                id,
                x: state.position.x,
                y: state.position.y,
                vx: state.velocity.x,
                vy: state.velocity.y,
                tick,
            })
            .collect();

        self.samples.append(&mut current);
    }

    pub fn restart(&mut self) {
        self.samples.clear();
        self.ticker = 0;
    }

    pub fn pop_data(&mut self) -> Vec<BoidSample> {
        mem::take(&mut self.samples)
    }

    /// Saves the collected data in CSV format, then returns it while emptying
    /// the watcher's memory.
    ///
    /// Depending on save options, either overwrites the fixed-name file or
    /// writes a new timestamped one.
    pub fn pop_data_save(&mut self, save_options: &SaveOptions) -> Vec<BoidSample> {
        let data = self.pop_data();

        if !save_options.enabled {
            return data;
        }

        if let Some(path) = &save_options.path {
            let file_path = format!(
                "{path}{file_name}",
                file_name = FlockWatcher::dataset_name(save_options, Utc::now())
            );

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(file_path)
                .expect("Can't open file");
            let mut wtr = csv::Writer::from_writer(file);

            data.iter().for_each(|sample| {
                wtr.serialize(sample).expect("Can't serialize data point");
            });
            wtr.flush().expect("Can't write data file");
        }

        data
    }

    fn dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.timestamp {
            true => format!("{PREFIX}_{datetime}.csv", datetime = now.timestamp_millis()),
            false => format!("{PREFIX}.csv"),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.ticker += 1;

        self.ticker % self.sample_rate == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::FlockWatcher;
    use crate::config::{SaveOptions, SimConfig};
    use crate::flock::Flock;

    #[test]
    fn dataset_name_timestamped() {
        let expected = "flock-data_1668038059490.csv";
        let save_options = SaveOptions {
            enabled: true,
            path: Some("".to_owned()),
            timestamp: true,
        };
        let dt = Utc.timestamp_millis_opt(1668038059490).unwrap();

        assert_eq!(FlockWatcher::dataset_name(&save_options, dt), expected);
    }

    #[test]
    fn dataset_name_overwrite() {
        let expected = "flock-data.csv";
        let save_options = SaveOptions {
            enabled: true,
            path: Some("".to_owned()),
            timestamp: false,
        };
        let dt = Utc.timestamp_millis_opt(1668038059490).unwrap();

        assert_eq!(FlockWatcher::dataset_name(&save_options, dt), expected);
    }

    #[test]
    fn watch_respects_the_sample_rate() {
        let config = SimConfig {
            width: 20.,
            height: 20.,
            population: 4,
            view_radius: 5.,
            ..Default::default()
        };
        let mut flock = Flock::new(config).unwrap();
        let mut watcher = FlockWatcher::new(3);

        for _ in 0..9 {
            flock.tick_once();
            watcher.watch(&flock);
        }

        // 9 ticks at a rate of 3 gives 3 samples of 4 boids each
        assert_eq!(watcher.pop_data().len(), 12);
    }
}
