//! Bounded retries for boot-time operations.
//!
//! The control loop itself never retries: a failed sample is replaced by
//! the previous one. Retries are reserved for boot, where the node probes
//! the sensor a fixed number of times before it starts cycling.
//!
//! # Example
//!
//! ```
//! use hygronode_core::{Error, RetryConfig, with_retry};
//!
//! # async fn example() -> Result<(), Error> {
//! let answer = with_retry(&RetryConfig::for_sensor_probe(), "probe", async || {
//!     Ok::<_, Error>(42)
//! })
//! .await?;
//! assert_eq!(answer, 42);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Error, Result, SensorFault};

/// How often and how patiently to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = try once).
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::for_sensor_probe()
    }
}

impl RetryConfig {
    /// Boot-time sensor probe: 10 retries, one second apart.
    pub fn for_sensor_probe() -> Self {
        Self {
            max_retries: 10,
            delay: Duration::from_secs(1),
        }
    }

    /// Set the retry count.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Retries need a non-zero delay.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > 0 && self.delay.is_zero() {
            return Err(Error::invalid_config(
                "retry delay must be > 0 when retries are enabled",
            ));
        }
        Ok(())
    }
}

/// Run `operation` until it succeeds, fails with a permanent error, or the
/// retries run out. The last error is returned in the latter two cases.
///
/// `operation` is an async closure, so it may borrow mutable state such as
/// a sensor handle across attempts.
pub async fn with_retry<F, T>(config: &RetryConfig, name: &str, mut operation: F) -> Result<T>
where
    F: AsyncFnMut() -> Result<T>,
{
    let mut retry = 0;
    loop {
        let error = match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!("{} succeeded on retry {}", name, retry);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if retry >= config.max_retries || !is_transient(&error) {
            return Err(error);
        }

        retry += 1;
        warn!(
            "{} failed ({}/{}): {}; next try in {:?}",
            name,
            retry,
            config.max_retries + 1,
            error,
            config.delay
        );
        sleep(config.delay).await;
    }
}

/// Whether another attempt could plausibly succeed.
fn is_transient(error: &Error) -> bool {
    match error {
        Error::Sensor(fault) => !matches!(fault, SensorFault::InvalidData(_)),
        Error::Transport { .. } | Error::Io(_) | Error::AssociationFailed { .. } => true,
        Error::Display(_) | Error::DisplayInit(_) | Error::InvalidConfig(_) | Error::Parse(_) => {
            false
        }
    }
}
