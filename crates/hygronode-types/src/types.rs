//! Core types for sensor data.

use core::fmt;

use crate::error::{ParseError, ParseResult};

/// Humidity value the legacy firmware used to mean "no sample yet".
///
/// A [`Reading`] never carries this meaning: an absent reading is `None`.
/// The constant only survives as the value the transmit policy evaluates
/// when no humidity has been measured yet.
pub const UNKNOWN_HUMIDITY_SENTINEL: u8 = 100;

/// Highest relative humidity a sensor can report.
pub const MAX_HUMIDITY_PERCENT: u8 = 100;

/// Lowest temperature the sensor can measure, in °C.
pub const MIN_TEMPERATURE_C: i32 = -40;
/// Highest temperature the sensor can measure, in °C.
pub const MAX_TEMPERATURE_C: i32 = 85;

/// One temperature/humidity sample.
///
/// Values are whole units: the sensor's fractional output is truncated
/// toward zero when the reading is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature_c: i32,
    /// Relative humidity percentage (0-100).
    pub humidity_percent: u8,
}

impl Reading {
    /// Create a reading from whole-unit values.
    ///
    /// Returns an error when humidity is above 100 % or the temperature is
    /// outside the sensor's -40..=85 °C range.
    pub fn new(temperature_c: i32, humidity_percent: u8) -> ParseResult<Self> {
        if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&temperature_c) {
            return Err(ParseError::InvalidMeasurement(format!(
                "temperature {}°C outside {}..={}°C",
                temperature_c, MIN_TEMPERATURE_C, MAX_TEMPERATURE_C
            )));
        }
        if humidity_percent > MAX_HUMIDITY_PERCENT {
            return Err(ParseError::InvalidMeasurement(format!(
                "humidity {}% exceeds {}%",
                humidity_percent, MAX_HUMIDITY_PERCENT
            )));
        }
        Ok(Self {
            temperature_c,
            humidity_percent,
        })
    }

    /// Build a reading from raw sensor output.
    ///
    /// Both values are truncated toward zero. Non-finite values, temperatures
    /// outside the sensor range and relative humidity outside `0.0..=100.0`
    /// are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use hygronode_types::Reading;
    ///
    /// let reading = Reading::from_measurement(21.8, 44.9).unwrap();
    /// assert_eq!(reading.temperature_c, 21);
    /// assert_eq!(reading.humidity_percent, 44);
    /// assert!(Reading::from_measurement(21.0, 104.0).is_err());
    /// ```
    pub fn from_measurement(temperature_c: f32, relative_humidity: f32) -> ParseResult<Self> {
        let range = MIN_TEMPERATURE_C as f32..(MAX_TEMPERATURE_C + 1) as f32;
        if !range.contains(&temperature_c) {
            return Err(ParseError::InvalidMeasurement(format!(
                "temperature {} outside {}..={}°C",
                temperature_c, MIN_TEMPERATURE_C, MAX_TEMPERATURE_C
            )));
        }
        if !(0.0..=f32::from(MAX_HUMIDITY_PERCENT)).contains(&relative_humidity) {
            return Err(ParseError::InvalidMeasurement(format!(
                "relative humidity {} outside 0-100",
                relative_humidity
            )));
        }
        Self::new(temperature_c as i32, relative_humidity as u8)
    }

    /// Temperature converted to whole degrees Fahrenheit for display.
    ///
    /// Integer arithmetic, so the result truncates like the panel readout.
    /// Saturates instead of overflowing for values built without validation.
    #[must_use]
    pub fn temperature_f(&self) -> i32 {
        (self.temperature_c.saturating_mul(9) / 5).saturating_add(32)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}°C ({}°F), {}% rH",
            self.temperature_c,
            self.temperature_f(),
            self.humidity_percent
        )
    }
}

/// Which quantity a broadcast message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Relative humidity in percent.
    Humidity,
    /// Temperature in degrees Celsius.
    Temperature,
}

impl MessageKind {
    /// The literal used in the payload's `type` field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Humidity => "humidity",
            MessageKind::Temperature => "temperature",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "humidity" => Ok(MessageKind::Humidity),
            "temperature" => Ok(MessageKind::Temperature),
            other => Err(ParseError::UnknownType(other.to_string())),
        }
    }
}
