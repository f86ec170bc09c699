//! The duty-cycle controller.
//!
//! One [`Controller`] owns every piece of node state: the last good reading,
//! the transmit policy and the hardware handles. Each call to
//! [`Controller::run_cycle`] samples, decides and optionally transmits, and
//! always leaves the radio asleep.

use std::future::Future;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use hygronode_types::{Reading, SensorMessage};

use crate::association::wait_for_association;
use crate::config::NodeConfig;
use crate::display::StatusIcons;
use crate::error::{Error, Result};
use crate::policy::{Decision, TransmitPolicy, TransmitReason};
use crate::retry::with_retry;
use crate::traits::{Clock, DisplayRenderer, NetworkTransport, SensorReader, SystemClock};

/// Running counters, cumulative since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    /// Completed cycles.
    pub cycles: u64,
    /// Cycles where the policy chose to transmit.
    pub transmissions: u64,
    /// Cycles where the policy chose to stay quiet.
    pub skips: u64,
    /// Datagrams accepted by the transport.
    pub datagrams_sent: u64,
    /// Failed sensor reads, including the boot probe.
    pub sensor_faults: u64,
    /// Datagrams the transport rejected.
    pub send_failures: u64,
    /// Association attempts, successful or not.
    pub association_attempts: u64,
}

/// What happened to a transmit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitOutcome {
    /// The policy skipped; the radio was not touched.
    Skipped,
    /// Both datagrams were sent.
    Sent,
    /// There is no reading to send yet.
    NoReading,
    /// The radio would not wake.
    WakeFailed,
    /// The association bound was reached.
    AssociationFailed { attempts: u32 },
    /// A send failed; later datagrams of the event were dropped.
    SendFailed { sent: usize },
}

/// Summary of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Whether this cycle produced a fresh reading.
    pub sampled: bool,
    /// Humidity the policy saw (None when nothing has been read yet).
    pub humidity: Option<u8>,
    /// Policy decision.
    pub decision: Decision,
    /// Result of acting on the decision.
    pub outcome: TransmitOutcome,
}

/// Drives sensor, display and radio through the duty cycle.
pub struct Controller<S, D, T, C = SystemClock> {
    config: NodeConfig,
    sensor: S,
    display: D,
    transport: T,
    clock: C,
    policy: TransmitPolicy,
    reading: Option<Reading>,
    stats: NodeStats,
}

impl<S, D, T> Controller<S, D, T, SystemClock>
where
    S: SensorReader,
    D: DisplayRenderer,
    T: NetworkTransport,
{
    /// Create a controller using the system clock.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: NodeConfig, sensor: S, display: D, transport: T) -> Result<Self> {
        config.validate()?;
        let policy = TransmitPolicy::new(config.policy.clone());
        Ok(Self {
            config,
            sensor,
            display,
            transport,
            clock: SystemClock,
            policy,
            reading: None,
            stats: NodeStats::default(),
        })
    }
}

impl<S, D, T, C> Controller<S, D, T, C>
where
    S: SensorReader,
    D: DisplayRenderer,
    T: NetworkTransport,
    C: Clock,
{
    /// Replace the clock used to stamp messages.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Controller<S, D, T, C2> {
        Controller {
            config: self.config,
            sensor: self.sensor,
            display: self.display,
            transport: self.transport,
            clock,
            policy: self.policy,
            reading: self.reading,
            stats: self.stats,
        }
    }

    /// Bring the node up.
    ///
    /// Probes the sensor, initializes the display and performs the first
    /// association. Only a display failure is fatal.
    pub async fn boot(&mut self) -> Result<()> {
        info!(
            node_id = %self.config.node_id,
            target = %self.config.target(),
            "Booting node"
        );

        let sensor = &mut self.sensor;
        match with_retry(&self.config.sensor_probe, "sensor probe", async || {
            sensor.sample().await
        })
        .await
        {
            Ok(reading) => {
                info!("Sensor found: {}", reading);
                self.reading = Some(reading);
            }
            Err(e) => {
                self.stats.sensor_faults += 1;
                error!("Sensor not responding, continuing without data: {}", e);
            }
        }

        self.display.init().await.map_err(|e| match e {
            Error::DisplayInit(_) => e,
            other => Error::DisplayInit(other.to_string()),
        })?;

        self.show(StatusIcons::network()).await;
        match self.transport.wake().await {
            Ok(()) => {
                let policy = self.config.boot_association.clone();
                match wait_for_association(&mut self.transport, &policy).await {
                    Ok(attempts) => {
                        self.stats.association_attempts += u64::from(attempts);
                        info!("Network joined");
                    }
                    Err(e) => {
                        if let Error::AssociationFailed { attempts } = e {
                            self.stats.association_attempts += u64::from(attempts);
                        }
                        warn!("Initial association failed: {}", e);
                    }
                }
            }
            Err(e) => warn!("Radio did not wake at boot: {}", e),
        }
        self.put_radio_to_sleep().await;
        self.show(StatusIcons::idle()).await;

        Ok(())
    }

    /// Run one sample-decide-transmit cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.stats.cycles += 1;

        self.show(StatusIcons::sensing()).await;
        let sampled = match self.sensor.sample().await {
            Ok(reading) => {
                self.reading = Some(reading);
                true
            }
            Err(e) => {
                self.stats.sensor_faults += 1;
                warn!("Sensor read failed, keeping previous reading: {}", e);
                false
            }
        };
        self.show(StatusIcons::idle()).await;

        let humidity = self.reading.map(|r| r.humidity_percent);
        let decision = self.policy.evaluate(humidity);
        let outcome = match decision {
            Decision::Skip => {
                self.stats.skips += 1;
                TransmitOutcome::Skipped
            }
            Decision::Transmit(reason) => {
                self.stats.transmissions += 1;
                self.transmit(reason).await
            }
        };

        CycleReport {
            sampled,
            humidity,
            decision,
            outcome,
        }
    }

    /// Run `cycles` cycles, sleeping one sample period between them.
    ///
    /// Returns the report of the final cycle; totals are in [`stats`](Self::stats).
    pub async fn run_for(&mut self, cycles: u64) -> Option<CycleReport> {
        let mut last = None;
        for n in 0..cycles {
            if n > 0 {
                sleep(self.config.sample_period).await;
            }
            last = Some(self.run_cycle().await);
        }
        last
    }

    /// Cycle until `shutdown` resolves.
    ///
    /// Shutdown is only observed between cycles, so the radio is never left
    /// awake.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self.run_cycle().await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} cycles", self.stats.cycles);
                    return;
                }
                _ = sleep(self.config.sample_period) => {}
            }
        }
    }

    async fn transmit(&mut self, reason: TransmitReason) -> TransmitOutcome {
        self.show(StatusIcons::network()).await;

        let outcome = match self.transport.wake().await {
            Ok(()) => self.associate_and_send(reason).await,
            Err(e) => {
                warn!("Radio did not wake: {}", e);
                TransmitOutcome::WakeFailed
            }
        };

        self.show(StatusIcons::network()).await;
        self.put_radio_to_sleep().await;
        self.show(StatusIcons::idle()).await;
        outcome
    }

    async fn associate_and_send(&mut self, reason: TransmitReason) -> TransmitOutcome {
        let policy = self.config.association.clone();
        match wait_for_association(&mut self.transport, &policy).await {
            Ok(attempts) => self.stats.association_attempts += u64::from(attempts),
            Err(e) => {
                let attempts = match e {
                    Error::AssociationFailed { attempts } => attempts,
                    _ => 1,
                };
                self.stats.association_attempts += u64::from(attempts);
                warn!("Skipping transmission: {}", e);
                return TransmitOutcome::AssociationFailed { attempts };
            }
        }

        let Some(reading) = self.reading else {
            warn!(%reason, "No reading yet, nothing to send");
            return TransmitOutcome::NoReading;
        };

        self.show(StatusIcons::transmitting()).await;
        let epoch = self.clock.unix_seconds();
        let target = self.config.target();
        let messages = SensorMessage::pair_for(&self.config.node_id, epoch, &reading);

        for (sent, message) in messages.iter().enumerate() {
            let payload = message.encode();
            if let Err(e) = self.transport.send_datagram(target, payload.as_bytes()).await {
                self.stats.send_failures += 1;
                warn!("Failed to send {} datagram: {}", message.kind, e);
                return TransmitOutcome::SendFailed { sent };
            }
            self.stats.datagrams_sent += 1;
            debug!(%target, payload = %payload, "sent");
        }

        info!(%reason, epoch, "Transmitted {}", reading);
        TransmitOutcome::Sent
    }

    async fn put_radio_to_sleep(&mut self) {
        if let Err(e) = self.transport.sleep().await {
            warn!("Radio did not go to sleep: {}", e);
        }
    }

    async fn show(&mut self, icons: StatusIcons) {
        let icons = icons.with_budget_pending(self.policy.budget() > 0);
        if let Err(e) = self.display.render(icons, self.reading.as_ref()).await {
            debug!("Display render failed: {}", e);
        }
    }

    /// Node configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport, for injecting faults mid-run.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Mutable access to the sensor.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// The clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Transmit policy state.
    pub fn policy(&self) -> &TransmitPolicy {
        &self.policy
    }

    /// Last good reading.
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// Counters.
    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }
}
