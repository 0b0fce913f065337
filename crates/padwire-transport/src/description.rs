use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of session description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Offer => "offer",
            Self::Pranswer => "pranswer",
            Self::Answer => "answer",
            Self::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

/// Session description exchanged with the signaling endpoint.
///
/// Serializes as `{"type": "...", "sdp": "..."}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    /// An offer carrying `sdp`.
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    /// An answer carrying `sdp`.
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

// SDP bodies are long; only their size is useful in logs.
impl fmt::Debug for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDescription")
            .field("sdp_type", &self.sdp_type)
            .field("sdp", &format_args!("<{} bytes>", self.sdp.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_and_sdp() {
        let offer = SessionDescription::offer("v=0\r\n");
        let json: serde_json::Value = serde_json::to_value(&offer).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "offer", "sdp": "v=0\r\n" }));
    }

    #[test]
    fn parses_answer() {
        let answer: SessionDescription =
            serde_json::from_str(r#"{"sdp":"v=0","type":"answer"}"#).unwrap();
        assert_eq!(answer, SessionDescription::answer("v=0"));
    }

    #[test]
    fn rejects_unknown_type() {
        let result = serde_json::from_str::<SessionDescription>(r#"{"sdp":"v=0","type":"hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_sdp() {
        let result = serde_json::from_str::<SessionDescription>(r#"{"type":"answer"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn debug_hides_body() {
        let offer = SessionDescription::offer("a=secret-ish");
        let debug = format!("{offer:?}");
        assert!(debug.contains("<12 bytes>"));
        assert!(!debug.contains("secret"));
    }
}
