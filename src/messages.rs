//! Typed messages exchanged over a Live session.
//!
//! Outbound intents and inbound server messages are domain-level types; the
//! codec module translates them to and from the wire envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Blob, Content, FunctionCall, FunctionResponse, Turns};

// ── Outbound ────────────────────────────────────────────────────────────

/// An outbound message a caller wants to send.
///
/// Each variant maps to exactly one wire envelope.
#[derive(Debug, Clone)]
pub enum ClientIntent {
    /// Ordered turns plus a turn-completion flag.
    Content(ClientContent),
    /// An unordered media chunk.
    RealtimeInput(RealtimeInput),
    /// One or more function-call results.
    ToolResponse(Vec<FunctionResponse>),
}

/// Ordered conversational content with a completion flag.
#[derive(Debug, Clone)]
pub struct ClientContent {
    /// Turns to append, if any.
    pub turns: Option<Turns>,
    /// Whether the client's turn is complete. Defaults to true.
    pub turn_complete: bool,
}

impl Default for ClientContent {
    fn default() -> Self {
        Self { turns: None, turn_complete: true }
    }
}

impl ClientContent {
    /// Content carrying the given turns, turn complete.
    pub fn turns(turns: impl Into<Turns>) -> Self {
        Self { turns: Some(turns.into()), turn_complete: true }
    }

    /// Set the turn-completion flag.
    pub fn with_turn_complete(mut self, turn_complete: bool) -> Self {
        self.turn_complete = turn_complete;
        self
    }
}

/// Realtime media input.
///
/// Realtime input is delivered with no ordering guarantee relative to other
/// realtime inputs or to client content turns. That trades determinism for
/// latency; callers needing strict ordering should use
/// [`ClientContent`] instead.
#[derive(Debug, Clone, Default)]
pub struct RealtimeInput {
    /// Media chunks to stream.
    pub media_chunks: Vec<Blob>,
    /// Realtime text input.
    pub text: Option<String>,
}

impl RealtimeInput {
    /// A single raw PCM audio chunk.
    pub fn audio(data: Vec<u8>) -> Self {
        Self { media_chunks: vec![Blob::audio_pcm(data)], ..Default::default() }
    }

    /// A single media chunk.
    pub fn blob(blob: Blob) -> Self {
        Self { media_chunks: vec![blob], ..Default::default() }
    }

    /// Realtime text.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }
}

// ── Inbound ─────────────────────────────────────────────────────────────

/// A typed inbound message decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Setup acknowledgement. Always the first message on a connection.
    SetupComplete,
    /// Incremental model output.
    Content(ServerContent),
    /// The model requests one or more function calls.
    ToolCall(ToolCall),
    /// Previously issued tool calls were cancelled.
    ToolCallCancellation(ToolCallCancellation),
    /// The server is about to terminate the connection.
    GoAway(GoAway),
    /// Unrecognized message, kept for forward compatibility.
    Unknown(Value),
}

/// Incremental content from the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    /// The model's partial turn, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_turn: Option<Content>,
    /// The model finished its turn.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub turn_complete: bool,
    /// Generation was interrupted by user activity.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interrupted: bool,
    /// The model finished generating (audio may still be flushing).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generation_complete: bool,
}

/// A batch of function calls requested by the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(default)]
    pub function_calls: Vec<FunctionCall>,
}

/// Cancellation of in-flight tool calls by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolCallCancellation {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Server-initiated termination notice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    /// Remaining time before the connection is dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left: Option<String>,
}
