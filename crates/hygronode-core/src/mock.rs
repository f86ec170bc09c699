//! Mock collaborators for testing.
//!
//! These implement the traits in [`crate::traits`] without hardware, so the
//! controller can be driven end to end in unit and integration tests.
//!
//! # Features
//!
//! - **Scripted samples**: queue readings and sensor faults in order
//! - **Recorded output**: every frame and every transport call is kept
//! - **Failure injection**: failed display init, slow association, failed sends

use std::collections::VecDeque;
use std::net::SocketAddr;

use async_trait::async_trait;

use hygronode_types::{Reading, SensorMessage};

use crate::display::{Frame, StatusIcons};
use crate::error::{Error, Result, SensorFault};
use crate::traits::{Clock, DisplayRenderer, NetworkTransport, SensorReader};

/// A sensor that replays a script.
///
/// Each call to [`sample`](SensorReader::sample) pops the next scripted
/// outcome. Once the script is exhausted the fallback is returned.
///
/// # Example
///
/// ```
/// use hygronode_core::{MockSensor, SensorFault, SensorReader};
/// use hygronode_types::Reading;
///
/// #[tokio::main]
/// async fn main() {
///     let mut sensor = MockSensor::new(Reading::new(21, 45).unwrap())
///         .then_fail(SensorFault::Timeout);
///
///     assert!(sensor.sample().await.is_err());
///     assert_eq!(sensor.sample().await.unwrap().humidity_percent, 45);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockSensor {
    script: VecDeque<std::result::Result<Reading, SensorFault>>,
    fallback: std::result::Result<Reading, SensorFault>,
    sample_count: u32,
}

impl MockSensor {
    /// Sensor that always returns `reading` once the script is empty.
    pub fn new(reading: Reading) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Ok(reading),
            sample_count: 0,
        }
    }

    /// Sensor that is not present on the bus.
    pub fn absent() -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Err(SensorFault::NotFound),
            sample_count: 0,
        }
    }

    /// Sensor that reports the given humidities in order at a fixed 21°C.
    pub fn with_humidity_sequence(humidity: impl IntoIterator<Item = u8>) -> Self {
        let script: VecDeque<_> = humidity
            .into_iter()
            .map(|h| Reading::new(21, h).map_err(|e| SensorFault::InvalidData(e.to_string())))
            .collect();
        let fallback = script
            .back()
            .cloned()
            .unwrap_or(Err(SensorFault::NotFound));
        Self {
            script,
            fallback,
            sample_count: 0,
        }
    }

    /// Queue a successful sample.
    #[must_use]
    pub fn then(mut self, reading: Reading) -> Self {
        self.script.push_back(Ok(reading));
        self
    }

    /// Queue a failed sample.
    #[must_use]
    pub fn then_fail(mut self, fault: SensorFault) -> Self {
        self.script.push_back(Err(fault));
        self
    }

    /// Replace the fallback outcome.
    pub fn set_fallback(&mut self, outcome: std::result::Result<Reading, SensorFault>) {
        self.fallback = outcome;
    }

    /// Number of samples taken so far.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
}

#[async_trait]
impl SensorReader for MockSensor {
    async fn sample(&mut self) -> Result<Reading> {
        self.sample_count += 1;
        let outcome = self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        outcome.map_err(Error::Sensor)
    }
}

/// A display that records every frame.
#[derive(Debug, Default)]
pub struct MockDisplay {
    fail_init: bool,
    initialized: bool,
    frames: Vec<RenderedFrame>,
}

/// One call to [`DisplayRenderer::render`] as seen by [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Icons requested.
    pub icons: StatusIcons,
    /// Reading shown, if any.
    pub reading: Option<Reading>,
}

impl RenderedFrame {
    /// Lay the frame out as the panel would.
    pub fn compose(&self) -> Frame {
        Frame::compose(self.icons, self.reading.as_ref())
    }
}

impl MockDisplay {
    /// Create a working display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a display whose initialization fails.
    pub fn broken() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// Whether `init` succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// All frames rendered so far.
    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<&RenderedFrame> {
        self.frames.last()
    }

    /// Forget recorded frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[async_trait]
impl DisplayRenderer for MockDisplay {
    async fn init(&mut self) -> Result<()> {
        if self.fail_init {
            return Err(Error::DisplayInit("mock panel did not acknowledge".to_string()));
        }
        self.initialized = true;
        Ok(())
    }

    async fn render(&mut self, icons: StatusIcons, reading: Option<&Reading>) -> Result<()> {
        self.frames.push(RenderedFrame {
            icons,
            reading: reading.copied(),
        });
        Ok(())
    }
}

/// A call made against [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Radio powered up.
    Wake,
    /// Association attempt and its outcome.
    Associate { success: bool },
    /// Datagram handed to the network.
    Sent {
        target: SocketAddr,
        payload: Vec<u8>,
    },
    /// Datagram rejected.
    SendFailed { target: SocketAddr },
    /// Radio powered down.
    Sleep,
}

/// A radio that records calls and can be told to misbehave.
#[derive(Debug, Default)]
pub struct MockTransport {
    awake: bool,
    associated: bool,
    association_failures: u32,
    send_failures: u32,
    events: Vec<TransportEvent>,
}

impl MockTransport {
    /// Create a transport that associates on the first attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` association attempts.
    #[must_use]
    pub fn with_association_failures(mut self, count: u32) -> Self {
        self.association_failures = count;
        self
    }

    /// Fail the next `count` sends.
    #[must_use]
    pub fn with_send_failures(mut self, count: u32) -> Self {
        self.send_failures = count;
        self
    }

    /// Fail the next `count` association attempts from now on.
    pub fn fail_associations(&mut self, count: u32) {
        self.association_failures = count;
    }

    /// Fail the next `count` sends from now on.
    pub fn fail_sends(&mut self, count: u32) {
        self.send_failures = count;
    }

    /// Whether the last association succeeded and the radio has not slept since.
    pub fn is_associated(&self) -> bool {
        self.associated
    }

    /// Whether the radio is powered.
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// All recorded calls.
    pub fn events(&self) -> &[TransportEvent] {
        &self.events
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Payloads that were sent, decoded as text.
    pub fn sent_payloads(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TransportEvent::Sent { payload, .. } => {
                    Some(String::from_utf8_lossy(payload).into_owned())
                }
                _ => None,
            })
            .collect()
    }

    /// Sent payloads parsed back into messages.
    pub fn sent_messages(&self) -> Result<Vec<SensorMessage>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TransportEvent::Sent { payload, .. } => Some(payload),
                _ => None,
            })
            .map(|payload| SensorMessage::parse_bytes(payload).map_err(Error::from))
            .collect()
    }

    /// Number of wake calls.
    pub fn wake_count(&self) -> usize {
        self.count(|e| matches!(e, TransportEvent::Wake))
    }

    /// Number of sleep calls.
    pub fn sleep_count(&self) -> usize {
        self.count(|e| matches!(e, TransportEvent::Sleep))
    }

    fn count(&self, predicate: impl Fn(&TransportEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

#[async_trait]
impl NetworkTransport for MockTransport {
    async fn wake(&mut self) -> Result<()> {
        self.awake = true;
        self.events.push(TransportEvent::Wake);
        Ok(())
    }

    async fn associate(&mut self) -> Result<()> {
        if !self.awake {
            self.events.push(TransportEvent::Associate { success: false });
            return Err(Error::transport("associate", "radio is asleep"));
        }
        if self.association_failures > 0 {
            self.association_failures -= 1;
            self.events.push(TransportEvent::Associate { success: false });
            return Err(Error::transport("associate", "access point not responding"));
        }
        self.associated = true;
        self.events.push(TransportEvent::Associate { success: true });
        Ok(())
    }

    async fn send_datagram(&mut self, target: SocketAddr, payload: &[u8]) -> Result<()> {
        if !self.associated || self.send_failures > 0 {
            self.send_failures = self.send_failures.saturating_sub(1);
            self.events.push(TransportEvent::SendFailed { target });
            return Err(Error::transport("send", "packet not accepted"));
        }
        self.events.push(TransportEvent::Sent {
            target,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    async fn sleep(&mut self) -> Result<()> {
        self.awake = false;
        self.associated = false;
        self.events.push(TransportEvent::Sleep);
        Ok(())
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: i64,
}

impl FixedClock {
    /// Clock frozen at `unix_seconds`.
    pub fn new(unix_seconds: i64) -> Self {
        Self { now: unix_seconds }
    }

    /// Move the clock forward.
    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
    }
}

impl Clock for FixedClock {
    fn unix_seconds(&self) -> i64 {
        self.now
    }
}
