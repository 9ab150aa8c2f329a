use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A malformed configuration is a fatal startup condition, nothing in here is
/// recoverable per tick.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("simulation area must be at least 1x1, got {width}x{height}")]
    EmptyArea { width: f32, height: f32 },
    #[error("view radius {radius} does not fit a {width}x{height} area")]
    RadiusTooLarge {
        radius: f32,
        width: f32,
        height: f32,
    },
    #[error("view radius must not be negative, got {0}")]
    NegativeRadius(f32),
    #[error("velocity clamp range [{lower}, {upper}] is empty")]
    EmptyVelocityRange { lower: f32, upper: f32 },
}

/// Simulation parameters, supplied at startup and never changed at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// width of the enclosed area, positions live in [0, width)
    pub width: f32,
    /// height of the enclosed area, positions live in [0, height)
    pub height: f32,
    /// number of boids, one update thread each
    pub population: usize,
    /// maximum distance at which one boid perceives another
    pub view_radius: f32,
    /// scaling applied to each of the three steering terms
    pub adjust_rate: f32,
    /// per-axis velocity clamp, lower bound
    pub velocity_min: f32,
    /// per-axis velocity clamp, upper bound
    pub velocity_max: f32,
    /// pacing delay between two ticks of the same boid
    pub tick_interval: Duration,
    /// sample every n-th tick when recording
    pub sample_rate: u64,
    pub save: SaveOptions,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1. || self.height < 1. {
            return Err(ConfigError::EmptyArea {
                width: self.width,
                height: self.height,
            });
        }

        if self.view_radius < 0. {
            return Err(ConfigError::NegativeRadius(self.view_radius));
        }

        // radius 0 is the degenerate non-interacting configuration and is allowed
        if self.view_radius > self.width.min(self.height) {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.view_radius,
                width: self.width,
                height: self.height,
            });
        }

        if self.velocity_min >= self.velocity_max {
            return Err(ConfigError::EmptyVelocityRange {
                lower: self.velocity_min,
                upper: self.velocity_max,
            });
        }

        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            width: 640.,
            height: 360.,
            population: 500,
            view_radius: 13.,
            adjust_rate: 0.015,
            velocity_min: -1.,
            velocity_max: 1.,
            tick_interval: Duration::from_millis(5),
            sample_rate: 1,
            save: SaveOptions {
                enabled: false,
                path: Some("./".to_owned()),
                timestamp: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOptions {
    pub enabled: bool,
    pub path: Option<String>,
    pub timestamp: bool,
}
