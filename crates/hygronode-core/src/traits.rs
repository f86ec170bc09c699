//! Trait abstractions for the node's hardware collaborators.
//!
//! The [`Controller`](crate::Controller) only talks to the sensor, the
//! display and the radio through these traits, so the same control loop
//! drives real drivers, the host UDP transport and the mocks in
//! [`crate::mock`].
//!
//! Collaborators are owned by the controller and used from a single task,
//! hence `&mut self` everywhere and no interior mutability.

use std::net::SocketAddr;

use async_trait::async_trait;

use hygronode_types::Reading;

use crate::display::StatusIcons;
use crate::error::Result;

/// A temperature/humidity sensor.
///
/// # Example
///
/// ```ignore
/// use hygronode_core::{Result, SensorReader};
///
/// async fn log_sample<S: SensorReader>(sensor: &mut S) -> Result<()> {
///     let reading = sensor.sample().await?;
///     println!("{}", reading);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SensorReader: Send {
    /// Take one measurement.
    ///
    /// Must return in bounded time; the control loop does not retry.
    async fn sample(&mut self) -> Result<Reading>;
}

/// A small status panel.
#[async_trait]
pub trait DisplayRenderer: Send {
    /// Bring the panel up. Called once at boot; failure halts the node.
    async fn init(&mut self) -> Result<()>;

    /// Redraw the whole panel.
    ///
    /// `reading` is `None` until the first successful sample.
    async fn render(&mut self, icons: StatusIcons, reading: Option<&Reading>) -> Result<()>;
}

/// The radio and its datagram socket.
///
/// The radio is asleep between transmit events. A transmit event is always
/// `wake`, one or more `associate` attempts, zero or more sends, `sleep`.
#[async_trait]
pub trait NetworkTransport: Send {
    /// Power the radio up.
    async fn wake(&mut self) -> Result<()>;

    /// Make one association attempt.
    ///
    /// Returns `Ok(())` once the link is usable. Callers retry according to
    /// an [`AssociationPolicy`](crate::AssociationPolicy).
    async fn associate(&mut self) -> Result<()>;

    /// Send a single datagram.
    async fn send_datagram(&mut self, target: SocketAddr, payload: &[u8]) -> Result<()>;

    /// Drop the link and power the radio down.
    async fn sleep(&mut self) -> Result<()>;
}

/// Source of wall-clock time for message timestamps.
pub trait Clock: Send {
    /// Seconds since the Unix epoch.
    fn unix_seconds(&self) -> i64;
}

/// [`Clock`] backed by the host's system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        time::OffsetDateTime::now_utc().unix_timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.unix_seconds() > 1_577_836_800);
    }
}
