use crate::infrastructure::error::{P2PError, Result};
use pairplay_core::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// SDP offer or answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Trickled ICE candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: Some("0".to_string()),
            sdp_m_line_index: Some(0),
        }
    }
}

/// Typed view of the opaque `rtc:*` relay payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcSignal {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
}

impl RtcSignal {
    /// Parse an `rtc:*` frame; other frames yield `None`
    pub fn from_message(message: &Message) -> Result<Option<Self>> {
        let signal = match message {
            Message::RtcOffer { data } => Self::Offer(serde_json::from_value(data.clone())?),
            Message::RtcAnswer { data } => Self::Answer(serde_json::from_value(data.clone())?),
            Message::RtcIce { data } => Self::Candidate(serde_json::from_value(data.clone())?),
            _ => return Ok(None),
        };
        Ok(Some(signal))
    }

    pub fn into_message(self) -> Result<Message> {
        Ok(match self {
            Self::Offer(desc) => Message::RtcOffer {
                data: serde_json::to_value(desc)?,
            },
            Self::Answer(desc) => Message::RtcAnswer {
                data: serde_json::to_value(desc)?,
            },
            Self::Candidate(candidate) => Message::RtcIce {
                data: serde_json::to_value(candidate)?,
            },
        })
    }

    /// Reject a description whose SDP type does not match the frame
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Offer(desc) if desc.kind != SdpKind::Offer => {
                Err(P2PError::UnexpectedSignal("rtc:offer carrying an answer"))
            }
            Self::Answer(desc) if desc.kind != SdpKind::Answer => {
                Err(P2PError::UnexpectedSignal("rtc:answer carrying an offer"))
            }
            _ => Ok(()),
        }
    }
}
