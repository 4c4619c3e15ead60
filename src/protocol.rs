/*!
 * Wire Protocol
 *
 * Line-delimited JSON envelope exchanged with observers. Payload validation
 * lives here: a structurally invalid command is rejected with an ERR reply
 * and never reaches the engine.
 */

use crate::core::types::Pid;
use crate::sim::{ProcessSpec, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Malformed command payloads. Caller errors, never fatal to the session.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Missing payload for {0}")]
    MissingPayload(&'static str),

    #[error("Bad payload for {kind}: {reason}")]
    BadPayload { kind: &'static str, reason: String },
}

/// The message envelope: a type tag, an optional payload, and an optional
/// sender identifier. One JSON object per line on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Message {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            client_id: None,
        }
    }

    /// Full-state broadcast sent after every completed mutation
    pub fn update(snapshot: &Snapshot) -> Self {
        Self {
            kind: "UPDATE".into(),
            // Snapshot serialization cannot fail: every field is plain data
            data: serde_json::to_value(snapshot).ok(),
            client_id: None,
        }
    }

    /// Human-readable rejection of a command
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "ERR".into(),
            data: Some(Value::String(message.into())),
            client_id: None,
        }
    }

    pub fn parse_line(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Serialize with the trailing newline delimiter
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Deserialize)]
struct RemovePayload {
    pid: Pid,
}

#[derive(Deserialize)]
struct AlgorithmPayload {
    algorithm: String,
}

#[derive(Deserialize)]
struct QuantumPayload {
    quantum: u64,
}

/// A validated inbound command, ready for the coordinator
#[derive(Debug, Clone)]
pub enum Request {
    Add(ProcessSpec),
    Remove(Pid),
    Start,
    TogglePause,
    Reset,
    SetAlgorithm(String),
    SetQuantum(u64),
    GetState,
    Tick,
    Bye,
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    data: Option<Value>,
) -> Result<T, ProtocolError> {
    let data = data.ok_or(ProtocolError::MissingPayload(kind))?;
    serde_json::from_value(data).map_err(|e| ProtocolError::BadPayload {
        kind,
        reason: e.to_string(),
    })
}

impl TryFrom<Message> for Request {
    type Error = ProtocolError;

    fn try_from(msg: Message) -> Result<Self, Self::Error> {
        match msg.kind.as_str() {
            "ADD" => Ok(Request::Add(payload::<ProcessSpec>("ADD", msg.data)?)),
            "REM" => Ok(Request::Remove(
                payload::<RemovePayload>("REM", msg.data)?.pid,
            )),
            "START" => Ok(Request::Start),
            "PAUSE" => Ok(Request::TogglePause),
            "RESET" => Ok(Request::Reset),
            "ALGO" => Ok(Request::SetAlgorithm(
                payload::<AlgorithmPayload>("ALGO", msg.data)?.algorithm,
            )),
            "QUANTUM" => Ok(Request::SetQuantum(
                payload::<QuantumPayload>("QUANTUM", msg.data)?.quantum,
            )),
            "STATE" => Ok(Request::GetState),
            "TICK" => Ok(Request::Tick),
            "BYE" => Ok(Request::Bye),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}
