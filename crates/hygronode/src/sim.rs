//! Simulated sensor for running the node on a host.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hygronode_core::{Error, Result, SensorFault, SensorReader};
use hygronode_types::Reading;

/// Random-walk humidity and temperature around fixed centres.
#[derive(Debug)]
pub struct SimulatedSensor<R = StdRng> {
    rng: R,
    humidity: f32,
    temperature: f32,
    humidity_base: f32,
    humidity_variation: f32,
    /// Fraction of the variation a single step may move.
    step: f32,
}

impl SimulatedSensor<StdRng> {
    /// Sensor seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Reproducible sensor.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulatedSensor<R> {
    /// Sensor centred on 45% rH and 21°C, wandering ±15%.
    pub fn with_rng(mut rng: R) -> Self {
        let humidity_base = 45.0;
        let humidity_variation = 15.0;
        let humidity = humidity_base + (rng.random::<f32>() - 0.5) * humidity_variation;
        Self {
            rng,
            humidity,
            temperature: 21.0,
            humidity_base,
            humidity_variation,
            step: 0.4,
        }
    }

    fn advance(&mut self) {
        let delta = (self.rng.random::<f32>() - 0.5) * self.humidity_variation * self.step;
        self.humidity = (self.humidity + delta).clamp(
            self.humidity_base - self.humidity_variation,
            self.humidity_base + self.humidity_variation,
        );

        let drift = (self.rng.random::<f32>() - 0.5) * 0.5;
        self.temperature = (self.temperature + drift).clamp(15.0, 28.0);
    }
}

impl Default for SimulatedSensor<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Rng + Send> SensorReader for SimulatedSensor<R> {
    async fn sample(&mut self) -> Result<Reading> {
        self.advance();
        Reading::from_measurement(self.temperature, self.humidity)
            .map_err(|e| Error::Sensor(SensorFault::InvalidData(e.to_string())))
    }
}
