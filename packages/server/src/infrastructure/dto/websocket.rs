//! WebSocket message DTOs.
//!
//! Inbound frames are JSON envelopes discriminated by `type`; outbound frames are
//! `ServerEvent`s serialized the same way. Field names on the wire are camelCase.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::ValueObjectError;

/// Identifier as sent by clients: either a JSON string or a JSON integer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Text(value) => value,
            WireId::Number(value) => value.to_string(),
        }
    }
}

/// Envelope sent by a client over the WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEnvelope {
    JoinProject {
        project_id: WireId,
        user_id: WireId,
    },
    LeaveProject {
        project_id: WireId,
    },
    Typing {
        project_id: WireId,
        user_id: WireId,
        is_typing: bool,
    },
    #[serde(other)]
    Unknown,
}

/// Why an inbound frame could not be turned into an envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("envelope has no string `type` field")]
    MissingType,

    #[error("unknown envelope type '{0}'")]
    UnknownType(String),

    #[error("invalid '{kind}' envelope: {source}")]
    InvalidFields {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] ValueObjectError),
}

/// Parse one inbound text frame
pub fn parse_envelope(text: &str) -> Result<ClientEnvelope, EnvelopeError> {
    let value: Value = serde_json::from_str(text).map_err(EnvelopeError::Malformed)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingType)?
        .to_string();

    match serde_json::from_value::<ClientEnvelope>(value) {
        Ok(ClientEnvelope::Unknown) => Err(EnvelopeError::UnknownType(kind)),
        Ok(envelope) => Ok(envelope),
        Err(source) => Err(EnvelopeError::InvalidFields { kind, source }),
    }
}

/// Event pushed to clients
///
/// The collaborator events (`new_message`, `new_photo`, `new_report`, `photo_deleted`)
/// carry the collaborator's fields verbatim next to `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    JoinedProject {
        project_id: String,
    },
    UserTyping {
        user_id: String,
        is_typing: bool,
    },
    NewMessage {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    NewPhoto {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    NewReport {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    PhotoDeleted {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
}

impl ServerEvent {
    /// Events that collaborators (message / photo / report handlers) may publish
    pub fn is_collaborator_event(&self) -> bool {
        matches!(
            self,
            ServerEvent::NewMessage { .. }
                | ServerEvent::NewPhoto { .. }
                | ServerEvent::NewReport { .. }
                | ServerEvent::PhotoDeleted { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::JoinedProject { .. } => "joined_project",
            ServerEvent::UserTyping { .. } => "user_typing",
            ServerEvent::NewMessage { .. } => "new_message",
            ServerEvent::NewPhoto { .. } => "new_photo",
            ServerEvent::NewReport { .. } => "new_report",
            ServerEvent::PhotoDeleted { .. } => "photo_deleted",
        }
    }
}
