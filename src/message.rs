//! `{value: ...}` payload envelopes for inbound and outbound bus messages.

use crate::error::{Result, SignageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Into::into)
    }
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_slice(payload)
        .map_err(|e| SignageError::MalformedMessage(format!("invalid envelope: {}", e)))?;
    Ok(envelope.value)
}

/// Parse a setseconds payload: a non-negative integer or a string of decimal digits.
pub fn parse_seconds(payload: &[u8]) -> Result<u64> {
    let value: Value = decode(payload)?;
    match &value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            SignageError::MalformedMessage(format!("seconds must be a non-negative integer: {}", n))
        }),
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| {
            SignageError::MalformedMessage(format!("seconds is not a non-negative integer: {:?}", s))
        }),
        other => Err(SignageError::MalformedMessage(format!(
            "seconds has unexpected type: {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Reset,
    Pause,
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlAction::Start => "START",
            ControlAction::Reset => "RESET",
            ControlAction::Pause => "PAUSE",
        };
        f.write_str(name)
    }
}

pub fn parse_control(payload: &[u8]) -> Result<ControlAction> {
    let action: String = decode(payload)?;
    match action.as_str() {
        "START" => Ok(ControlAction::Start),
        "RESET" => Ok(ControlAction::Reset),
        "PAUSE" => Ok(ControlAction::Pause),
        other => Err(SignageError::MalformedMessage(format!(
            "unknown control action: {:?}",
            other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryRequest {
    Client { uuid: String },
    Dashboard,
}

#[derive(Deserialize)]
struct RawDiscovery {
    uuid: Option<String>,
    role: Option<String>,
}

pub fn parse_discovery(payload: &[u8]) -> Result<DiscoveryRequest> {
    let raw: RawDiscovery = decode(payload)?;
    match raw.role.as_deref() {
        Some("client") => match raw.uuid {
            Some(uuid) if uuid.contains(['/', '+', '#']) => Err(SignageError::MalformedMessage(
                format!("client uuid is not a topic segment: {:?}", uuid),
            )),
            Some(uuid) if !uuid.is_empty() => Ok(DiscoveryRequest::Client { uuid }),
            _ => Err(SignageError::MalformedMessage(
                "client discovery without uuid".into(),
            )),
        },
        Some("dashboard") => Ok(DiscoveryRequest::Dashboard),
        Some(role) => Err(SignageError::MalformedMessage(format!(
            "unknown discovery role: {:?}",
            role
        ))),
        None => Err(SignageError::MalformedMessage(
            "discovery without role".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds(br#"{"value": 90}"#).unwrap(), 90);
        assert_eq!(parse_seconds(br#"{"value": "45"}"#).unwrap(), 45);
        assert_eq!(parse_seconds(br#"{"value": 0}"#).unwrap(), 0);
    }

    #[test]
    fn test_parse_seconds_rejects_invalid_values() {
        let payloads: [&[u8]; 7] = [
            br#"{"value": -1}"#,
            br#"{"value": "-5"}"#,
            br#"{"value": "ten"}"#,
            br#"{"value": 1.5}"#,
            br#"{"value": null}"#,
            br#"{"seconds": 10}"#,
            b"not json",
        ];
        for payload in payloads {
            let err = parse_seconds(payload).unwrap_err();
            assert!(
                matches!(err, SignageError::MalformedMessage(_)),
                "payload {:?} gave {:?}",
                String::from_utf8_lossy(payload),
                err
            );
        }
    }

    #[test]
    fn test_parse_control() {
        assert_eq!(parse_control(br#"{"value":"START"}"#).unwrap(), ControlAction::Start);
        assert_eq!(parse_control(br#"{"value":"RESET"}"#).unwrap(), ControlAction::Reset);
        assert_eq!(parse_control(br#"{"value":"PAUSE"}"#).unwrap(), ControlAction::Pause);
        assert!(parse_control(br#"{"value":"start"}"#).is_err());
        assert!(parse_control(br#"{"value":3}"#).is_err());
    }

    #[test]
    fn test_parse_discovery() {
        assert_eq!(
            parse_discovery(br#"{"value":{"uuid":"abc","role":"client"}}"#).unwrap(),
            DiscoveryRequest::Client { uuid: "abc".into() }
        );
        assert_eq!(
            parse_discovery(br#"{"value":{"role":"dashboard"}}"#).unwrap(),
            DiscoveryRequest::Dashboard
        );
        assert!(parse_discovery(br#"{"value":{"role":"client"}}"#).is_err());
        assert!(parse_discovery(br#"{"value":{"uuid":"","role":"client"}}"#).is_err());
        assert!(parse_discovery(br#"{"value":{"uuid":"abc","role":"kiosk"}}"#).is_err());
        assert!(parse_discovery(br#"{"value":{"uuid":"abc"}}"#).is_err());
        assert!(parse_discovery(br#"{"value":"abc"}"#).is_err());
    }

    #[test]
    fn test_parse_discovery_rejects_uuid_with_topic_characters() {
        let payloads: [&[u8]; 4] = [
            br#"{"value":{"uuid":"a/b","role":"client"}}"#,
            br#"{"value":{"uuid":"+","role":"client"}}"#,
            br#"{"value":{"uuid":"abc#","role":"client"}}"#,
            br#"{"value":{"uuid":"/","role":"client"}}"#,
        ];
        for payload in payloads {
            let err = parse_discovery(payload).unwrap_err();
            assert_eq!(err.to_error_code(), "MALFORMED_MESSAGE");
        }

        // Dashboards ignore the uuid
        assert_eq!(
            parse_discovery(br#"{"value":{"uuid":"a/b","role":"dashboard"}}"#).unwrap(),
            DiscoveryRequest::Dashboard
        );
    }

    #[test]
    fn test_envelope_encoding() {
        let bytes = Envelope::new(3u64).to_bytes().unwrap();
        assert_eq!(bytes, br#"{"value":3}"#);
    }
}
