//! Event types for the Consentry approval protocol
//!
//! A `PromptEvent` is produced by an agent that wants to perform a sensitive
//! action. A human answer becomes a `DecisionEvent`, signed so it can be bound
//! to an approver identity. `StatusEvent` is unsigned device telemetry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::{ConsentryError, Result};

/// Unique identifier for a protocol event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// Generate a new random event ID
    pub fn new() -> Self {
        Self(format!("evt_{}", Uuid::new_v4()))
    }

    /// Create from an existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which client produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Lite,
    Pro,
    Desktop,
    Mobile,
    Agent,
    /// Forward-compatibility catch-all for components this build doesn't know
    Unknown,
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "lite" => Self::Lite,
            "pro" => Self::Pro,
            "desktop" => Self::Desktop,
            "mobile" => Self::Mobile,
            "agent" => Self::Agent,
            _ => Self::Unknown,
        })
    }
}

/// Origin of an action request; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    pub component: Component,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EventSource {
    pub fn new(component: Component, session_id: impl Into<String>) -> Self {
        Self {
            component,
            session_id: session_id.into(),
            device_id: None,
            user_id: None,
        }
    }
}

/// Category of sensitive action requiring approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Shell,
    FileWrite,
    FileDelete,
    Network,
    System,
    Power,
    /// Unrecognized action type; still parses so it can be rejected and audited
    Unknown,
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "shell" => Self::Shell,
            "file_write" => Self::FileWrite,
            "file_delete" => Self::FileDelete,
            "network" => Self::Network,
            "system" => Self::System,
            "power" => Self::Power,
            _ => Self::Unknown,
        })
    }
}

/// The action an agent wants permission to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<String>,
}

impl ActionRequest {
    pub fn new(action_type: ActionType, command: impl Into<String>) -> Self {
        Self {
            action_type,
            command: command.into(),
            parameters: None,
            estimated_impact: None,
        }
    }
}

/// Assessed risk of an action request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// A request for human approval, emitted by an agent
///
/// `id` must be unique for the lifetime of the system and `nonce` must never
/// repeat; both are enforced upstream by construction (`PromptEvent::new`) and
/// downstream by the replay guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEvent {
    pub id: EventId,
    pub timestamp: i64,
    pub nonce: String,
    pub source: EventSource,
    pub action: ActionRequest,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl PromptEvent {
    /// Create a prompt with a fresh ID, nonce and current timestamp
    pub fn new(source: EventSource, action: ActionRequest, risk_level: RiskLevel) -> Self {
        Self {
            id: EventId::new(),
            timestamp: crate::current_timestamp_ms(),
            nonce: crate::generate_nonce(),
            source,
            action,
            risk_level,
            context: None,
        }
    }

    /// Check required fields at the trust boundary
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(ConsentryError::malformed("prompt id is empty"));
        }
        if self.nonce.is_empty() {
            return Err(ConsentryError::malformed("prompt nonce is empty"));
        }
        if self.source.session_id.is_empty() {
            return Err(ConsentryError::malformed("source session_id is empty"));
        }
        if self.action.command.is_empty() {
            return Err(ConsentryError::malformed("action command is empty"));
        }
        Ok(())
    }
}

/// The kind of decision a human made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    Reject,
    Modify,
}

impl DecisionKind {
    /// Wire name of the decision, as signed and audited
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Modify => "modify",
        }
    }
}

/// A signed human decision about a prompt; immutable once signed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub id: EventId,
    pub prompt_id: EventId,
    pub timestamp: i64,
    pub decision: DecisionKind,
    /// Detached Ed25519 signature (base64) over the canonical encoding of
    /// `{prompt_id, decision, timestamp, modifications?}`
    pub signature: String,
    /// Base64 public key the signature must verify against
    pub signer_public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifications: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DecisionEvent {
    /// The exact payload covered by `signature`
    ///
    /// A verifier reconstructing this from the event must obtain bytes
    /// identical to what the signer encoded, so both sides go through this
    /// single function.
    pub fn signing_payload(&self) -> Value {
        decision_signing_payload(
            &self.prompt_id,
            self.decision,
            self.timestamp,
            self.modifications.as_ref(),
        )
    }

    /// Check required fields at the trust boundary
    pub fn validate(&self) -> Result<()> {
        if self.prompt_id.as_str().is_empty() {
            return Err(ConsentryError::malformed("decision prompt_id is empty"));
        }
        if self.signature.is_empty() {
            return Err(ConsentryError::malformed("decision signature is empty"));
        }
        if self.signer_public_key.is_empty() {
            return Err(ConsentryError::malformed(
                "decision signer_public_key is empty",
            ));
        }
        Ok(())
    }
}

/// Build the unsigned decision payload in its fixed field set
///
/// `modifications` is omitted entirely when absent, never encoded as null.
pub fn decision_signing_payload(
    prompt_id: &EventId,
    decision: DecisionKind,
    timestamp: i64,
    modifications: Option<&Value>,
) -> Value {
    let mut payload = serde_json::Map::new();
    payload.insert("prompt_id".into(), Value::String(prompt_id.0.clone()));
    payload.insert("decision".into(), Value::String(decision.as_str().into()));
    payload.insert("timestamp".into(), Value::Number(timestamp.into()));
    if let Some(mods) = modifications {
        payload.insert("modifications".into(), mods.clone());
    }
    Value::Object(payload)
}

/// Device availability states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Error,
    Busy,
}

/// Resource telemetry attached to a status event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
}

/// Unsigned device telemetry; the canonical example of a record type that is
/// allowed into the chain without a signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub id: EventId,
    pub timestamp: i64,
    pub source: EventSource,
    pub status: DeviceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<StatusMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
