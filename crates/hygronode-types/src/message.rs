//! Broadcast message encoding.
//!
//! Every transmit event produces two independent datagrams, one per
//! [`MessageKind`]. The payload is a flat JSON-like object in which every
//! value is a quoted string:
//!
//! ```text
//! { "id": "1", "epoch": "1700000000", "type": "humidity", "data": "45"}
//! ```
//!
//! The byte layout (spacing included) is fixed because receivers in the field
//! match on it. Encoding is plain string formatting, so the node id must not
//! contain characters that need JSON escaping.

use serde::Deserialize;

use crate::error::{ParseError, ParseResult};
use crate::types::{MessageKind, Reading};

/// One decoded or to-be-encoded broadcast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorMessage {
    /// Node identifier.
    pub id: String,
    /// Unix timestamp in seconds.
    pub epoch: i64,
    /// Quantity carried in `data`.
    pub kind: MessageKind,
    /// Whole-unit value (percent for humidity, Celsius for temperature).
    pub data: i32,
}

/// Shape of the payload on the wire; all fields are strings.
#[derive(Deserialize)]
struct RawMessage {
    id: String,
    epoch: String,
    #[serde(rename = "type")]
    kind: String,
    data: String,
}

impl SensorMessage {
    /// Humidity message for a reading.
    pub fn humidity(id: impl Into<String>, epoch: i64, reading: &Reading) -> Self {
        Self {
            id: id.into(),
            epoch,
            kind: MessageKind::Humidity,
            data: i32::from(reading.humidity_percent),
        }
    }

    /// Temperature message for a reading (Celsius).
    pub fn temperature(id: impl Into<String>, epoch: i64, reading: &Reading) -> Self {
        Self {
            id: id.into(),
            epoch,
            kind: MessageKind::Temperature,
            data: reading.temperature_c,
        }
    }

    /// Both messages for a reading, humidity first.
    pub fn pair_for(id: &str, epoch: i64, reading: &Reading) -> [Self; 2] {
        [
            Self::humidity(id, epoch, reading),
            Self::temperature(id, epoch, reading),
        ]
    }

    /// Encode to the wire text.
    ///
    /// # Examples
    ///
    /// ```
    /// use hygronode_types::{Reading, SensorMessage};
    ///
    /// let reading = Reading::new(21, 45).unwrap();
    /// let msg = SensorMessage::humidity("1", 1700000000, &reading);
    /// assert_eq!(
    ///     msg.encode(),
    ///     r#"{ "id": "1", "epoch": "1700000000", "type": "humidity", "data": "45"}"#
    /// );
    /// ```
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{{ \"id\": \"{}\", \"epoch\": \"{}\", \"type\": \"{}\", \"data\": \"{}\"}}",
            self.id,
            self.epoch,
            self.kind.as_str(),
            self.data
        )
    }

    /// Decode a payload produced by [`encode`](Self::encode).
    pub fn parse(payload: &str) -> ParseResult<Self> {
        Self::from_raw(serde_json::from_str(payload)?)
    }

    /// Decode a raw datagram.
    pub fn parse_bytes(payload: &[u8]) -> ParseResult<Self> {
        Self::from_raw(serde_json::from_slice(payload)?)
    }

    fn from_raw(raw: RawMessage) -> ParseResult<Self> {
        let epoch = raw
            .epoch
            .parse::<i64>()
            .map_err(|_| ParseError::NotAnInteger {
                field: "epoch",
                value: raw.epoch.clone(),
            })?;
        let data = raw
            .data
            .parse::<i32>()
            .map_err(|_| ParseError::NotAnInteger {
                field: "data",
                value: raw.data.clone(),
            })?;
        Ok(Self {
            id: raw.id,
            epoch,
            kind: raw.kind.parse()?,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_payload_bytes() {
        let reading = Reading::new(-4, 80).unwrap();
        let msg = SensorMessage::temperature("1", 42, &reading);
        assert_eq!(
            msg.encode(),
            "{ \"id\": \"1\", \"epoch\": \"42\", \"type\": \"temperature\", \"data\": \"-4\"}"
        );
    }

    #[test]
    fn test_pair_shares_id_and_epoch() {
        let reading = Reading::new(23, 37).unwrap();
        let [humidity, temperature] = SensorMessage::pair_for("node-7", 1_700_000_123, &reading);

        let humidity = SensorMessage::parse(&humidity.encode()).unwrap();
        let temperature = SensorMessage::parse(&temperature.encode()).unwrap();

        assert_eq!(humidity.id, "node-7");
        assert_eq!(temperature.id, "node-7");
        assert_eq!(humidity.epoch, 1_700_000_123);
        assert_eq!(temperature.epoch, 1_700_000_123);
        assert_eq!((humidity.kind, humidity.data), (MessageKind::Humidity, 37));
        assert_eq!(
            (temperature.kind, temperature.data),
            (MessageKind::Temperature, 23)
        );
    }

    #[test]
    fn test_parse_bytes() {
        let payload = br#"{ "id": "1", "epoch": "9", "type": "humidity", "data": "100"}"#;
        let msg = SensorMessage::parse_bytes(payload).unwrap();
        assert_eq!(msg.data, 100);
        assert_eq!(msg.kind, MessageKind::Humidity);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let payload = r#"{ "id": "1", "epoch": "9", "type": "co2", "data": "800"}"#;
        assert!(matches!(
            SensorMessage::parse(payload),
            Err(ParseError::UnknownType(t)) if t == "co2"
        ));
    }

    #[test]
    fn test_parse_rejects_unquoted_numbers() {
        // Values must be strings on the wire.
        let payload = r#"{ "id": "1", "epoch": 9, "type": "humidity", "data": "40"}"#;
        assert!(matches!(
            SensorMessage::parse(payload),
            Err(ParseError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_integer_data() {
        let payload = r#"{ "id": "1", "epoch": "9", "type": "humidity", "data": "40.5"}"#;
        assert!(matches!(
            SensorMessage::parse(payload),
            Err(ParseError::NotAnInteger { field: "data", .. })
        ));
    }
}
