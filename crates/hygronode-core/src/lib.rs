//! Duty-cycle controller for a battery-powered humidity and temperature node.
//!
//! The node wakes once per sample period, reads the sensor, and decides
//! whether the reading is worth powering the radio for. The decision uses
//! two-threshold hysteresis around a humidifier's on/off state plus a
//! budget of guaranteed transmissions and a periodic heartbeat.
//!
//! # Modules
//!
//! - [`policy`]: the transmit decision ([`TransmitPolicy`])
//! - [`controller`]: the sample/decide/transmit loop ([`Controller`])
//! - [`traits`]: hardware seams ([`SensorReader`], [`DisplayRenderer`],
//!   [`NetworkTransport`], [`Clock`])
//! - [`association`]: waiting for the radio to join the network
//! - [`display`]: status panel layout and a log-backed renderer
//! - [`udp`]: multicast transport over tokio
//! - [`mock`]: in-memory implementations for tests
//!
//! # Example
//!
//! ```
//! use hygronode_core::{Decision, PolicyConfig, TransmitPolicy};
//!
//! let mut policy = TransmitPolicy::new(PolicyConfig::default().initial_budget(0));
//! assert_eq!(policy.evaluate(Some(45)), Decision::Skip);
//! assert!(policy.evaluate(Some(30)).is_transmit());
//! ```

pub mod association;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod mock;
pub mod policy;
pub mod retry;
pub mod traits;
pub mod udp;

pub use association::{AssociationPolicy, wait_for_association};
pub use config::NodeConfig;
pub use controller::{Controller, CycleReport, NodeStats, TransmitOutcome};
pub use display::{Element, Frame, Icon, StatusIcons, TracingDisplay};
pub use error::{Error, Result, SensorFault};
pub use mock::{FixedClock, MockDisplay, MockSensor, MockTransport, RenderedFrame, TransportEvent};
pub use policy::{Decision, PolicyConfig, TransmitPolicy, TransmitReason};
pub use retry::{RetryConfig, with_retry};
pub use traits::{Clock, DisplayRenderer, NetworkTransport, SensorReader, SystemClock};
pub use udp::UdpMulticastTransport;

pub use hygronode_types::{MessageKind, Reading, SensorMessage};
