//! Domain types shared by the send and receive paths.
//!
//! Content parts follow the Gemini wire shapes (camelCase JSON). Binary
//! payloads are carried as raw bytes internally and serialized as base64 on
//! the wire so consumers never deal with the encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Backend;
use crate::error::{LiveError, Result};

// ── Custom serde for base64-encoded payloads ────────────────────────────

pub(crate) mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = base64::engine::general_purpose::STANDARD.encode(bytes);
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

// ── Content model ───────────────────────────────────────────────────────

/// A single conversational turn: a role plus ordered parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// "user" or "model". Defaults to "user" during normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Some("user".to_string()), parts: vec![Part::text(text)] }
    }

    /// A model turn holding a single text part.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self { role: Some("model".to_string()), parts: vec![Part::text(text)] }
    }
}

/// One part of a turn. Exactly one field is expected to be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    /// A plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }

    /// An inline media part.
    pub fn inline_data(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            inline_data: Some(Blob { mime_type: mime_type.into(), data }),
            ..Default::default()
        }
    }
}

/// Raw media bytes plus their MIME type. Base64 on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { mime_type: mime_type.into(), data }
    }

    /// Raw 16-bit PCM audio.
    pub fn audio_pcm(data: Vec<u8>) -> Self {
        Self::new("audio/pcm", data)
    }
}

// ── Function calling ────────────────────────────────────────────────────

/// A function call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Call id to echo back in the matching [`FunctionResponse`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

/// The result of executing a function call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// Id of the tool call being answered. Required by the Gemini Developer
    /// API backend; omitted from the Vertex AI wire envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

impl FunctionResponse {
    /// Create a response without a call id.
    pub fn new(name: impl Into<String>, response: Value) -> Self {
        Self { id: None, name: name.into(), response }
    }

    /// Attach the call id from the server's tool call.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// ── Loosely-typed turn input ────────────────────────────────────────────

/// Turn input accepted by the send path before normalization.
#[derive(Debug, Clone)]
pub enum Turns {
    /// A single user text turn.
    Text(String),
    /// One pre-built turn.
    Content(Content),
    /// An ordered sequence of turns.
    Contents(Vec<Content>),
    /// Untyped JSON: a string, a Content object, or an array of either.
    Json(Value),
}

impl From<&str> for Turns {
    fn from(text: &str) -> Self {
        Turns::Text(text.to_string())
    }
}

impl From<String> for Turns {
    fn from(text: String) -> Self {
        Turns::Text(text)
    }
}

impl From<Content> for Turns {
    fn from(content: Content) -> Self {
        Turns::Content(content)
    }
}

impl From<Vec<Content>> for Turns {
    fn from(contents: Vec<Content>) -> Self {
        Turns::Contents(contents)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn content_from_json(value: Value) -> Result<Content> {
    match value {
        Value::String(text) => Ok(Content::user_text(text)),
        Value::Object(_) => serde_json::from_value::<Content>(value).map_err(|e| {
            LiveError::encode(format!("turn object is not a valid Content: {e}"))
        }),
        other => Err(LiveError::encode(format!(
            "each turn must be a string or a Content object; got {}",
            json_kind(&other)
        ))),
    }
}

fn default_role(mut content: Content) -> Content {
    if content.role.is_none() {
        content.role = Some("user".to_string());
    }
    content
}

/// Normalize loosely-typed turn input into an ordered list of turns.
///
/// Turns with no role default to "user". Untyped JSON that does not
/// represent turns fails with an error naming the offending shape.
pub fn normalize_turns(turns: Turns) -> Result<Vec<Content>> {
    match turns {
        Turns::Text(text) => Ok(vec![Content::user_text(text)]),
        Turns::Content(content) => Ok(vec![default_role(content)]),
        Turns::Contents(contents) => Ok(contents.into_iter().map(default_role).collect()),
        Turns::Json(Value::Array(items)) => items
            .into_iter()
            .map(|item| content_from_json(item).map(default_role))
            .collect(),
        Turns::Json(value @ (Value::String(_) | Value::Object(_))) => {
            Ok(vec![default_role(content_from_json(value)?)])
        }
        Turns::Json(other) => Err(LiveError::encode(format!(
            "turns must be a string, a Content object, or an array of them; got {}",
            json_kind(&other)
        ))),
    }
}

// ── Model-name normalization ────────────────────────────────────────────

/// Normalize a user-supplied model identifier for the given backend.
///
/// Vertex AI resolves bare names against the `publishers/google` namespace;
/// the Gemini Developer API resolves them against `models/`.
pub fn normalize_model(backend: Backend, name: &str) -> String {
    match backend {
        Backend::VertexAi => {
            if name.starts_with("projects/")
                || name.starts_with("publishers/")
                || name.starts_with("models/")
            {
                name.to_string()
            } else if let Some((publisher, model)) = name.split_once('/') {
                format!("publishers/{publisher}/models/{model}")
            } else {
                format!("publishers/google/models/{name}")
            }
        }
        Backend::GeminiApi => {
            if name.starts_with("models/") || name.starts_with("tunedModels/") {
                name.to_string()
            } else {
                format!("models/{name}")
            }
        }
    }
}

/// Qualify a `publishers/...` reference with the configured project and
/// location to form the fully-qualified Vertex AI resource path.
pub(crate) fn qualify_vertex_model(model: &str, project: &str, location: &str) -> String {
    if model.starts_with("publishers/") {
        format!("projects/{project}/locations/{location}/{model}")
    } else {
        model.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_model_gemini_api() {
        assert_eq!(
            normalize_model(Backend::GeminiApi, "gemini-2.0-flash-live-001"),
            "models/gemini-2.0-flash-live-001"
        );
        assert_eq!(normalize_model(Backend::GeminiApi, "models/x"), "models/x");
        assert_eq!(normalize_model(Backend::GeminiApi, "tunedModels/y"), "tunedModels/y");
    }

    #[test]
    fn test_normalize_model_vertex() {
        assert_eq!(
            normalize_model(Backend::VertexAi, "gemini-2.0-flash-live-001"),
            "publishers/google/models/gemini-2.0-flash-live-001"
        );
        assert_eq!(
            normalize_model(Backend::VertexAi, "meta/llama-3"),
            "publishers/meta/models/llama-3"
        );
        assert_eq!(
            normalize_model(Backend::VertexAi, "projects/p/locations/l/publishers/google/models/m"),
            "projects/p/locations/l/publishers/google/models/m"
        );
    }

    #[test]
    fn test_qualify_vertex_model() {
        assert_eq!(
            qualify_vertex_model("publishers/google/models/m", "p", "l"),
            "projects/p/locations/l/publishers/google/models/m"
        );
        assert_eq!(qualify_vertex_model("projects/p/x", "p", "l"), "projects/p/x");
    }

    #[test]
    fn test_normalize_turns_text() {
        let turns = normalize_turns(Turns::from("hello")).unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role.as_deref(), Some("user"));
        assert_eq!(turns[0].parts[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_normalize_turns_defaults_role() {
        let content = Content { role: None, parts: vec![Part::text("hi")] };
        let turns = normalize_turns(Turns::from(content)).unwrap();
        assert_eq!(turns[0].role.as_deref(), Some("user"));
    }

    #[test]
    fn test_normalize_turns_json_array() {
        let turns = normalize_turns(Turns::Json(json!([
            "first",
            {"role": "model", "parts": [{"text": "second"}]}
        ])))
        .unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role.as_deref(), Some("model"));
    }

    #[test]
    fn test_normalize_turns_rejects_bad_shape() {
        let err = normalize_turns(Turns::Json(json!(42))).unwrap_err();
        assert!(err.to_string().contains("a number"), "unexpected message: {err}");
    }

    #[test]
    fn test_blob_base64_on_wire() {
        let blob = Blob::audio_pcm(b"hello".to_vec());
        let json = serde_json::to_string(&blob).unwrap();
        assert!(json.contains("aGVsbG8="));
        let back: Blob = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, b"hello");
    }
}
