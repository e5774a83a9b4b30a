//! SMS message types: inbound payloads and stored message records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON payload accepted by the test inbound endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundSms {
    pub phone: String,
    pub text: String,
}

/// Direction of a stored message relative to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(format!("invalid message direction: '{other}'")),
        }
    }
}

/// A message about to be persisted.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub phone: String,
    pub direction: Direction,
    pub text: String,
}

impl NewMessage {
    pub fn inbound(phone: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            direction: Direction::In,
            text: text.into(),
        }
    }

    pub fn outbound(phone: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            direction: Direction::Out,
            text: text.into(),
        }
    }
}

/// A persisted message row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub phone: String,
    pub direction: Direction,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display_and_parse() {
        assert_eq!(Direction::In.to_string(), "in");
        assert_eq!("out".parse::<Direction>().unwrap(), Direction::Out);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_inbound_sms_deserialize() {
        let sms: InboundSms =
            serde_json::from_str(r#"{"phone":"+27123456789","text":"Dumela"}"#).unwrap();
        assert_eq!(sms.phone, "+27123456789");
        assert_eq!(sms.text, "Dumela");
    }
}
