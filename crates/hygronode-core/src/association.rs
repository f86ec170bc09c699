//! Waiting for the radio to associate.
//!
//! Association is retried with a fixed delay. Whether the wait is bounded is
//! an explicit [`AssociationPolicy`] knob: the shipped node waits forever,
//! because it has nothing else to do, which also means a slow network
//! stretches the sampling period. Tests and hosts can bound it instead.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traits::NetworkTransport;

/// Delay between association attempts inside a transmit cycle.
pub const DEFAULT_CYCLE_RETRY_DELAY: Duration = Duration::from_millis(500);
/// Delay between association attempts at boot.
pub const DEFAULT_BOOT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How long to keep trying to associate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationPolicy {
    /// Maximum number of attempts (None = unlimited).
    pub max_attempts: Option<u32>,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for AssociationPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_CYCLE_RETRY_DELAY)
    }
}

impl AssociationPolicy {
    /// Retry forever with the given delay.
    pub fn unbounded(retry_delay: Duration) -> Self {
        Self {
            max_attempts: None,
            retry_delay,
        }
    }

    /// Give up after `max_attempts` attempts.
    pub fn bounded(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            retry_delay,
        }
    }

    /// Boot-time default: unbounded, 5 s between attempts.
    pub fn for_boot() -> Self {
        Self::unbounded(DEFAULT_BOOT_RETRY_DELAY)
    }

    /// Set maximum number of attempts.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the delay between attempts.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Whether this policy can give up.
    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some()
    }

    /// Validate the policy.
    ///
    /// Checks that:
    /// - a bounded policy allows at least one attempt
    /// - an unbounded policy has a non-zero delay
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == Some(0) {
            return Err(Error::invalid_config(
                "association max_attempts must be > 0",
            ));
        }
        if self.max_attempts.is_none() && self.retry_delay.is_zero() {
            return Err(Error::invalid_config(
                "unbounded association requires a non-zero retry_delay",
            ));
        }
        Ok(())
    }
}

/// Retry [`NetworkTransport::associate`] until it succeeds or the policy
/// gives up.
///
/// Returns the number of attempts made.
pub async fn wait_for_association<T>(transport: &mut T, policy: &AssociationPolicy) -> Result<u32>
where
    T: NetworkTransport + ?Sized,
{
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);

        match transport.associate().await {
            Ok(()) => {
                if attempts > 1 {
                    info!("Associated after {} attempts", attempts);
                } else {
                    debug!("Associated");
                }
                return Ok(attempts);
            }
            Err(e) => {
                if let Some(max) = policy.max_attempts
                    && attempts >= max
                {
                    warn!("Association failed after {} attempts: {}", attempts, e);
                    return Err(Error::AssociationFailed { attempts });
                }
                debug!(attempt = attempts, error = %e, "association pending");
                sleep(policy.retry_delay).await;
            }
        }
    }
}
