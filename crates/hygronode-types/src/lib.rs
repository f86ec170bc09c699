//! Shared types for the hygronode environmental sensor node.
//!
//! This crate holds the data that crosses component boundaries: the
//! temperature/humidity [`Reading`] produced by the sensor, and the
//! [`SensorMessage`] broadcast over UDP multicast.
//!
//! # Example
//!
//! ```
//! use hygronode_types::{MessageKind, Reading, SensorMessage};
//!
//! let reading = Reading::new(22, 38).unwrap();
//! let [humidity, temperature] = SensorMessage::pair_for("1", 1_700_000_000, &reading);
//!
//! assert_eq!(humidity.kind, MessageKind::Humidity);
//! assert_eq!(temperature.data, 22);
//! ```

pub mod error;
pub mod message;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use message::SensorMessage;
pub use types::{
    MAX_HUMIDITY_PERCENT, MAX_TEMPERATURE_C, MIN_TEMPERATURE_C, MessageKind, Reading,
    UNKNOWN_HUMIDITY_SENTINEL,
};
