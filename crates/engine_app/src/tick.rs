//! Fixed-timestep tick loop.
//!
//! Each tick:
//!
//! 1. Update every live entity in creation order, publishing the events
//!    its components emitted before the next entity updates.
//! 2. Purge entities queued for destruction.
//! 3. Advance the tick counter.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::world::{TickSummary, World};

/// Configuration for the tick loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl TickConfig {
    /// Check that the tick rate is a positive, finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tick.tick_rate must be a positive number, got {}",
                self.tick_rate
            )));
        }
        Ok(())
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// Drives a [`World`] at a fixed rate.
#[derive(Debug)]
pub struct TickLoop {
    /// Tick configuration.
    config: TickConfig,
    /// The simulated world.
    world: World,
}

impl TickLoop {
    /// Create a tick loop around a world.
    ///
    /// Fails if `config` does not describe a usable tick rate.
    pub fn new(config: TickConfig, world: World) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, world })
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.world.tick_id()
    }

    /// Returns the tick configuration.
    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns a mutable reference to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Consume the loop and hand back the world.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    /// Run a single tick without pacing.
    pub fn tick(&mut self) -> TickSummary {
        self.world.tick()
    }

    /// Run the loop for the configured number of ticks, or indefinitely.
    pub fn run(&mut self) {
        self.run_with(|_, _| {});
    }

    /// Run the loop, calling `after_tick` once each tick has finished.
    ///
    /// The hook sees the world between ticks, which is where scripted input
    /// (damage, pickups, saves) gets injected.
    pub fn run_with(&mut self, mut after_tick: impl FnMut(&mut World, &TickSummary)) {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            let summary = self.world.tick();
            after_tick(&mut self.world, &summary);

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = summary.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}
