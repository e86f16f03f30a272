// Common Crate - messages.rs
// common/src/messages.rs
use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// Geographic coordinate pair carried by every guess
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(alias = "Lat")]
    pub lat: f64,
    #[serde(alias = "Lng")]
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject NaN and infinite components
    pub fn validated(self) -> Result<Self, HubError> {
        if self.lat.is_finite() && self.lng.is_finite() {
            Ok(self)
        } else {
            Err(HubError::NonFiniteCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Why a guess is being broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpCode {
    Connect,
    Disconnect,
    Message,
    Bot,
}

/// Broadcast unit, serialized to clients exactly as the web client expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    #[serde(rename = "Location")]
    pub location: LatLng,
    #[serde(rename = "Distance", default)]
    pub distance: f64,
    #[serde(rename = "Ident", default, skip_serializing_if = "String::is_empty")]
    pub identity: String,
    #[serde(rename = "OpCode")]
    pub opcode: OpCode,
}

impl Guess {
    /// Synthetic guess announcing a new session
    pub fn connect(identity: impl Into<String>) -> Self {
        Self::lifecycle(identity.into(), OpCode::Connect)
    }

    /// Synthetic guess announcing a session teardown
    pub fn disconnect(identity: impl Into<String>) -> Self {
        Self::lifecycle(identity.into(), OpCode::Disconnect)
    }

    /// Guess injected by an upstream feed under its configured name
    pub fn bot(name: impl Into<String>, location: LatLng) -> Self {
        Self {
            location,
            distance: 0.0,
            identity: name.into(),
            opcode: OpCode::Bot,
        }
    }

    fn lifecycle(identity: String, opcode: OpCode) -> Self {
        Self {
            location: LatLng::default(),
            distance: 0.0,
            identity,
            opcode,
        }
    }
}

/// Guess as submitted by a client. Any `Ident` or `OpCode` on the wire is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundGuess {
    #[serde(rename = "Location", alias = "location")]
    pub location: LatLng,
    #[serde(rename = "Distance", alias = "distance", default)]
    pub distance: f64,
}

impl InboundGuess {
    /// Decode a client frame, rejecting non-finite coordinates
    pub fn parse(payload: &[u8]) -> Result<Self, HubError> {
        let inbound: InboundGuess = serde_json::from_slice(payload)?;
        inbound.location.validated()?;
        Ok(inbound)
    }

    /// Stamp the server-assigned identity onto the guess
    pub fn into_message(self, identity: &str) -> Guess {
        Guess {
            location: self.location,
            distance: self.distance,
            identity: identity.to_string(),
            opcode: OpCode::Message,
        }
    }
}

/// Decode an upstream feed body of the form `{"lat": .., "lng": ..}`
pub fn parse_coordinate(payload: &[u8]) -> Result<LatLng, HubError> {
    let location: LatLng = serde_json::from_slice(payload)?;
    location.validated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guess_wire_format_matches_web_client() {
        let guess = Guess {
            location: LatLng::new(10.0, 20.0),
            distance: 3.5,
            identity: "abc".into(),
            opcode: OpCode::Message,
        };

        let value = serde_json::to_value(&guess).unwrap();
        assert_eq!(
            value,
            json!({
                "Location": { "lat": 10.0, "lng": 20.0 },
                "Distance": 3.5,
                "Ident": "abc",
                "OpCode": "message"
            })
        );
    }

    #[test]
    fn empty_identity_is_omitted() {
        let guess = Guess::connect("");
        let value = serde_json::to_value(&guess).unwrap();
        assert!(value.get("Ident").is_none());
        assert_eq!(value["OpCode"], "connect");
    }

    #[test]
    fn inbound_ignores_client_identity_and_opcode() {
        let payload = br#"{"Location":{"lat":1.5,"lng":-2.5},"Distance":12,"Ident":"spoofed","OpCode":"bot"}"#;
        let guess = InboundGuess::parse(payload).unwrap().into_message("server-id");

        assert_eq!(guess.identity, "server-id");
        assert_eq!(guess.opcode, OpCode::Message);
        assert_eq!(guess.location, LatLng::new(1.5, -2.5));
        assert_eq!(guess.distance, 12.0);
    }

    #[test]
    fn inbound_accepts_lowercase_fields_and_missing_distance() {
        let guess = InboundGuess::parse(br#"{"location":{"lat":10,"lng":20}}"#).unwrap();
        assert_eq!(guess.location, LatLng::new(10.0, 20.0));
        assert_eq!(guess.distance, 0.0);
    }

    #[test]
    fn inbound_without_location_is_rejected() {
        assert!(matches!(
            InboundGuess::parse(br#"{"Distance":5}"#),
            Err(HubError::Payload(_))
        ));
        assert!(InboundGuess::parse(b"not json").is_err());
    }

    #[test]
    fn coordinate_parse() {
        assert_eq!(
            parse_coordinate(br#"{"lat":1,"lng":2}"#).unwrap(),
            LatLng::new(1.0, 2.0)
        );
        assert!(parse_coordinate(br#"{"lat":1}"#).is_err());
        assert!(parse_coordinate(br#"[1,2]"#).is_err());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let err = LatLng::new(f64::NAN, 0.0).validated().unwrap_err();
        assert!(matches!(err, HubError::NonFiniteCoordinate { .. }));
        assert!(LatLng::new(0.0, f64::INFINITY).validated().is_err());
    }

    #[test]
    fn bot_guess_has_zero_distance() {
        let guess = Guess::bot("bot", LatLng::new(1.0, 2.0));
        let value = serde_json::to_value(&guess).unwrap();
        assert_eq!(
            value,
            json!({
                "Location": { "lat": 1.0, "lng": 2.0 },
                "Distance": 0.0,
                "Ident": "bot",
                "OpCode": "bot"
            })
        );
    }
}
