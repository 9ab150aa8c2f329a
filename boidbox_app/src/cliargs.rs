use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use boidbox_lib::config::SimConfig;

/// Headless driver for the concurrent boids-in-a-box simulation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Optional TOML config file, individual flags take precedence over it
    #[arg(short, long = "config")]
    pub config_path: Option<PathBuf>,

    /// number of boids
    #[arg(short = 'n', long)]
    pub no_boids: Option<usize>,

    /// simulation area width
    #[arg(short = 'x', long)]
    pub width: Option<f32>,

    /// simulation area height
    #[arg(short = 'y', long)]
    pub height: Option<f32>,

    /// how far one boid perceives another
    #[arg(long = "view_radius")]
    pub view_radius: Option<f32>,

    /// scaling of the steering terms
    #[arg(long = "adj_rate")]
    pub adjust_rate: Option<f32>,

    /// pacing delay between ticks of a live boid thread, in milliseconds
    #[arg(long = "tick_ms")]
    pub tick_ms: Option<u64>,

    /// sample every n-th tick when recording
    #[arg(short = 'r', long)]
    pub sample_rate: Option<u64>,

    /// save recorded samples as CSV
    #[arg(short = 's', long)]
    pub save: bool,

    /// timestamp the CSV file name instead of overwriting
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    /// number of ticks for the deterministic headless run
    #[arg(long, default_value_t = 1000)]
    pub ticks: u64,

    /// run one free thread per boid for this many seconds instead of the
    /// ticked loop
    #[arg(long)]
    pub live: Option<u64>,
}

impl Args {
    /// Builds the simulation config: file defaults first, then flag
    /// overrides, then validation.
    pub fn to_config(&self) -> Result<SimConfig, Box<dyn Error>> {
        let mut config: SimConfig = match &self.config_path {
            Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
            None => Default::default(),
        };

        if let Some(no_boids) = self.no_boids {
            config.population = no_boids;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(view_radius) = self.view_radius {
            config.view_radius = view_radius;
        }
        if let Some(adjust_rate) = self.adjust_rate {
            config.adjust_rate = adjust_rate;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval = Duration::from_millis(tick_ms);
        }
        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if self.save {
            config.save.enabled = true;
        }
        if self.save_timestamp {
            config.save.timestamp = true;
        }

        config.validate()?;

        Ok(config)
    }
}
