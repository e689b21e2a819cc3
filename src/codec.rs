//! Wire codec for the Live protocol.
//!
//! [`WireFormat`] translates domain messages to and from the
//! backend-specific wire JSON. The two backends share most envelope shapes
//! and diverge only at the margins: the response-modality default, the
//! tool-response id policy, and setup assembly. Keeping both policies here
//! makes the divergence auditable side by side.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::client::Backend;
use crate::config::LiveConfig;
use crate::error::{LiveError, Result};
use crate::messages::{
    ClientContent, ClientIntent, GoAway, RealtimeInput, ServerContent, ServerMessage, ToolCall,
    ToolCallCancellation,
};
use crate::tool::FunctionDeclaration;
use crate::types::{Blob, Content, FunctionResponse, normalize_turns};

// ── Outbound wire envelopes ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_content: Option<ClientContentEnvelope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    realtime_input: Option<RealtimeInputEnvelope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_response: Option<ToolResponseEnvelope>,
}

impl ClientMessage {
    fn empty() -> Self {
        Self { client_content: None, realtime_input: None, tool_response: None }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientContentEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    turns: Option<Vec<Content>>,
    turn_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeInputEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    media_chunks: Option<Vec<Blob>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolResponseEnvelope {
    function_responses: Vec<FunctionResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Setup {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolEnvelope>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolEnvelope {
    function_declarations: Vec<FunctionDeclaration>,
}

// ── Codec ───────────────────────────────────────────────────────────────

/// Backend-specific wire translation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WireFormat {
    backend: Backend,
}

impl WireFormat {
    pub(crate) fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Response modalities injected when the caller specified none.
    pub(crate) fn default_response_modalities(&self) -> Option<Vec<String>> {
        match self.backend {
            // Matches the Gemini Developer API's server-side default.
            Backend::VertexAi => Some(vec!["AUDIO".to_string()]),
            Backend::GeminiApi => None,
        }
    }

    /// Build the setup frame from the fully-resolved model and config.
    pub(crate) fn encode_setup(
        &self,
        model: &str,
        config: &LiveConfig,
        declarations: Vec<FunctionDeclaration>,
    ) -> Result<String> {
        let mut generation_config = Map::new();
        if let Some(modalities) = &config.response_modalities {
            generation_config.insert("responseModalities".to_string(), json!(modalities));
        }
        if let Some(voice) = &config.voice {
            generation_config.insert(
                "speechConfig".to_string(),
                json!({
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice } }
                }),
            );
        }
        if let Some(temperature) = config.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }

        let setup = Setup {
            model: model.to_string(),
            generation_config: (!generation_config.is_empty())
                .then(|| Value::Object(generation_config)),
            system_instruction: config.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![crate::types::Part::text(text.as_str())],
            }),
            tools: (!declarations.is_empty())
                .then(|| vec![ToolEnvelope { function_declarations: declarations }]),
        };

        let mut setup_value = serde_json::to_value(&setup)?;
        if let Some(extra) = &config.extra {
            merge_extra(&mut setup_value, extra)?;
        }
        if let Some(map) = setup_value.as_object_mut() {
            // A pass-through `config` key would duplicate fields the setup
            // already carries; the servers reject it.
            if map.remove("config").is_some() {
                tracing::warn!("dropping duplicate top-level `config` key from setup frame");
            }
        }

        Ok(serde_json::to_string(&json!({ "setup": setup_value }))?)
    }

    /// Encode a client intent as a single text frame.
    pub(crate) fn encode_intent(&self, intent: ClientIntent) -> Result<String> {
        let message = match intent {
            ClientIntent::Content(content) => self.encode_client_content(content)?,
            ClientIntent::RealtimeInput(input) => self.encode_realtime_input(input),
            ClientIntent::ToolResponse(responses) => self.encode_tool_response(responses)?,
        };
        Ok(serde_json::to_string(&message)?)
    }

    fn encode_client_content(&self, content: ClientContent) -> Result<ClientMessage> {
        let turns = content.turns.map(normalize_turns).transpose()?;
        Ok(ClientMessage {
            client_content: Some(ClientContentEnvelope {
                turns,
                turn_complete: content.turn_complete,
            }),
            ..ClientMessage::empty()
        })
    }

    fn encode_realtime_input(&self, input: RealtimeInput) -> ClientMessage {
        ClientMessage {
            realtime_input: Some(RealtimeInputEnvelope {
                media_chunks: (!input.media_chunks.is_empty()).then_some(input.media_chunks),
                text: input.text,
            }),
            ..ClientMessage::empty()
        }
    }

    fn encode_tool_response(&self, responses: Vec<FunctionResponse>) -> Result<ClientMessage> {
        if responses.is_empty() {
            return Err(LiveError::encode("functionResponses is required"));
        }

        let function_responses = match self.backend {
            Backend::GeminiApi => {
                for response in &responses {
                    if response.id.is_none() {
                        return Err(LiveError::encode(format!(
                            "FunctionResponse for `{}` is missing `id`; the Gemini API \
                             requires the id declared by the prior ToolCall.functionCalls entry",
                            response.name
                        )));
                    }
                }
                responses
            }
            // Vertex AI does not accept ids on the wire.
            Backend::VertexAi => responses
                .into_iter()
                .map(|response| FunctionResponse { id: None, ..response })
                .collect(),
        };

        Ok(ClientMessage {
            tool_response: Some(ToolResponseEnvelope { function_responses }),
            ..ClientMessage::empty()
        })
    }

    /// Decode one inbound frame into a typed server message.
    pub(crate) fn decode_server_message(&self, text: &str) -> Result<ServerMessage> {
        let value: Value = serde_json::from_str(text)?;

        let Some(map) = value.as_object() else {
            return Err(LiveError::protocol(format!(
                "server message is not a JSON object: {text}"
            )));
        };

        if map.contains_key("setupComplete") {
            return Ok(ServerMessage::SetupComplete);
        }
        if let Some(tool_call) = map.get("toolCall") {
            let decoded: ToolCall = serde_json::from_value(tool_call.clone())?;
            return Ok(ServerMessage::ToolCall(decoded));
        }
        if let Some(cancellation) = map.get("toolCallCancellation") {
            let decoded: ToolCallCancellation = serde_json::from_value(cancellation.clone())?;
            return Ok(ServerMessage::ToolCallCancellation(decoded));
        }
        if let Some(content) = map.get("serverContent") {
            let decoded: ServerContent = serde_json::from_value(content.clone())?;
            return Ok(ServerMessage::Content(decoded));
        }
        if let Some(go_away) = map.get("goAway") {
            let decoded: GoAway = serde_json::from_value(go_away.clone())?;
            return Ok(ServerMessage::GoAway(decoded));
        }

        Ok(ServerMessage::Unknown(value))
    }
}

fn merge_extra(setup: &mut Value, extra: &Value) -> Result<()> {
    let Some(extra_map) = extra.as_object() else {
        return Err(LiveError::encode(format!(
            "extra setup fields must be a JSON object, got: {extra}"
        )));
    };
    if let Some(map) = setup.as_object_mut() {
        for (key, value) in extra_map {
            map.insert(key.clone(), value.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Turns;

    fn gemini() -> WireFormat {
        WireFormat::new(Backend::GeminiApi)
    }

    fn vertex() -> WireFormat {
        WireFormat::new(Backend::VertexAi)
    }

    #[test]
    fn test_client_content_default_sends_turn_complete_only() {
        let frame = gemini()
            .encode_intent(ClientIntent::Content(ClientContent::default()))
            .unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value, json!({ "clientContent": { "turnComplete": true } }));
    }

    #[test]
    fn test_client_content_turn_complete_false_has_no_turns_key() {
        let content = ClientContent::default().with_turn_complete(false);
        let frame = gemini().encode_intent(ClientIntent::Content(content)).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value, json!({ "clientContent": { "turnComplete": false } }));
    }

    #[test]
    fn test_client_content_with_text_turn() {
        let content = ClientContent::turns(Turns::from("hello"));
        let frame = vertex().encode_intent(ClientIntent::Content(content)).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value["clientContent"]["turns"],
            json!([{ "role": "user", "parts": [{ "text": "hello" }] }])
        );
        assert_eq!(value["clientContent"]["turnComplete"], json!(true));
    }

    #[test]
    fn test_tool_response_empty_is_rejected() {
        let err = gemini().encode_intent(ClientIntent::ToolResponse(vec![])).unwrap_err();
        assert_eq!(err.to_string(), "Encoding error: functionResponses is required");
    }

    #[test]
    fn test_tool_response_missing_id_rejected_on_gemini_api() {
        let response = FunctionResponse::new("get_weather", json!({"temp": 20}));
        let err = gemini().encode_intent(ClientIntent::ToolResponse(vec![response])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("get_weather"), "unexpected message: {message}");
        assert!(message.contains("ToolCall.functionCalls"), "unexpected message: {message}");
    }

    #[test]
    fn test_tool_response_missing_id_allowed_on_vertex() {
        let response = FunctionResponse::new("get_weather", json!({"temp": 20}));
        let frame =
            vertex().encode_intent(ClientIntent::ToolResponse(vec![response])).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        let entry = &value["toolResponse"]["functionResponses"][0];
        assert_eq!(entry["name"], "get_weather");
        assert!(entry.get("id").is_none());
    }

    #[test]
    fn test_tool_response_id_stripped_on_vertex() {
        let response = FunctionResponse::new("f", json!({})).with_id("call-1");
        let frame =
            vertex().encode_intent(ClientIntent::ToolResponse(vec![response])).unwrap();
        assert!(!frame.contains("call-1"));
    }

    #[test]
    fn test_realtime_input_audio_envelope() {
        let frame = gemini()
            .encode_intent(ClientIntent::RealtimeInput(RealtimeInput::audio(b"pcm".to_vec())))
            .unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        let chunk = &value["realtimeInput"]["mediaChunks"][0];
        assert_eq!(chunk["mimeType"], "audio/pcm");
        assert_eq!(chunk["data"], "cGNt");
    }

    #[test]
    fn test_setup_strips_duplicate_config_key() {
        let config = LiveConfig::new()
            .with_extra(json!({ "config": { "responseModalities": ["TEXT"] }, "cachedContent": "c/1" }));
        let frame = gemini().encode_setup("models/m", &config, vec![]).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert!(value["setup"].get("config").is_none());
        assert_eq!(value["setup"]["cachedContent"], "c/1");
    }

    #[test]
    fn test_setup_carries_model_and_generation_config() {
        let config = LiveConfig::new()
            .with_modalities(vec!["AUDIO".to_string()])
            .with_voice("Kore")
            .with_temperature(0.7)
            .with_instruction("Be brief.");
        let frame = vertex().encode_setup("projects/p/locations/l/publishers/google/models/m", &config, vec![]).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        let setup = &value["setup"];
        assert_eq!(setup["model"], "projects/p/locations/l/publishers/google/models/m");
        assert_eq!(setup["generationConfig"]["responseModalities"], json!(["AUDIO"]));
        assert_eq!(
            setup["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert_eq!(setup["systemInstruction"]["parts"][0]["text"], "Be brief.");
    }

    #[test]
    fn test_setup_includes_function_declarations() {
        let decls = vec![FunctionDeclaration::new("search").with_description("Web search")];
        let frame = gemini().encode_setup("models/m", &LiveConfig::new(), decls).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value["setup"]["tools"][0]["functionDeclarations"][0]["name"],
            "search"
        );
    }

    #[test]
    fn test_decode_setup_complete() {
        let message = gemini().decode_server_message(r#"{"setupComplete": {}}"#).unwrap();
        assert_eq!(message, ServerMessage::SetupComplete);
    }

    #[test]
    fn test_decode_server_content_text_delta() {
        let message = vertex()
            .decode_server_message(
                r#"{"serverContent": {"modelTurn": {"role": "model", "parts": [{"text": "hi"}]}}}"#,
            )
            .unwrap();
        match message {
            ServerMessage::Content(content) => {
                let turn = content.model_turn.unwrap();
                assert_eq!(turn.parts[0].text.as_deref(), Some("hi"));
                assert!(!content.turn_complete);
            }
            other => panic!("expected Content, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_tool_call() {
        let message = gemini()
            .decode_server_message(
                r#"{"toolCall": {"functionCalls": [{"id": "c1", "name": "f", "args": {"x": 1}}]}}"#,
            )
            .unwrap();
        match message {
            ServerMessage::ToolCall(call) => {
                assert_eq!(call.function_calls[0].id.as_deref(), Some("c1"));
                assert_eq!(call.function_calls[0].name, "f");
            }
            other => panic!("expected ToolCall, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_go_away() {
        let message =
            gemini().decode_server_message(r#"{"goAway": {"timeLeft": "10s"}}"#).unwrap();
        assert_eq!(
            message,
            ServerMessage::GoAway(GoAway { time_left: Some("10s".to_string()) })
        );
    }

    #[test]
    fn test_decode_unknown_keeps_payload() {
        let message = gemini().decode_server_message(r#"{"usageMetadata": {}}"#).unwrap();
        assert!(matches!(message, ServerMessage::Unknown(_)));
    }

    #[test]
    fn test_decode_malformed_json_is_an_error() {
        assert!(gemini().decode_server_message("{not json").is_err());
    }

    mod roundtrip {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Text turns survive encoding for both backends.
            #[test]
            fn prop_client_content_roundtrip(
                text in "[^\\x00]{1,64}",
                turn_complete in any::<bool>(),
            ) {
                for codec in [gemini(), vertex()] {
                    let content = ClientContent::turns(Turns::from(text.clone()))
                        .with_turn_complete(turn_complete);
                    let frame = codec.encode_intent(ClientIntent::Content(content)).unwrap();
                    let value: Value = serde_json::from_str(&frame).unwrap();
                    prop_assert_eq!(
                        value["clientContent"]["turns"][0]["parts"][0]["text"].as_str(),
                        Some(text.as_str())
                    );
                    prop_assert_eq!(
                        value["clientContent"]["turnComplete"].as_bool(),
                        Some(turn_complete)
                    );
                }
            }

            /// Media bytes survive the base64 wire encoding.
            #[test]
            fn prop_realtime_input_roundtrip(data in proptest::collection::vec(any::<u8>(), 1..256)) {
                let input = RealtimeInput::audio(data.clone());
                let frame = gemini().encode_intent(ClientIntent::RealtimeInput(input)).unwrap();
                let value: Value = serde_json::from_str(&frame).unwrap();
                let chunk: Blob =
                    serde_json::from_value(value["realtimeInput"]["mediaChunks"][0].clone()).unwrap();
                prop_assert_eq!(chunk.data, data);
            }

            /// Tool responses keep name, id and payload on the Gemini API wire.
            #[test]
            fn prop_tool_response_roundtrip(
                name in "[a-z_]{1,20}",
                id in "[a-z0-9\\-]{1,16}",
                payload in "[^\\x00]{0,64}",
            ) {
                let response = FunctionResponse::new(name.clone(), json!({"output": payload}))
                    .with_id(id.clone());
                let frame = gemini()
                    .encode_intent(ClientIntent::ToolResponse(vec![response.clone()]))
                    .unwrap();
                let value: Value = serde_json::from_str(&frame).unwrap();
                let decoded: FunctionResponse =
                    serde_json::from_value(value["toolResponse"]["functionResponses"][0].clone())
                        .unwrap();
                prop_assert_eq!(decoded, response);
            }

            /// Server content frames decode back to the structure that
            /// produced them.
            #[test]
            fn prop_server_content_roundtrip(
                text in "[^\\x00]{1,64}",
                turn_complete in any::<bool>(),
            ) {
                let content = ServerContent {
                    model_turn: Some(Content {
                        role: Some("model".to_string()),
                        parts: vec![crate::types::Part::text(text)],
                    }),
                    turn_complete,
                    ..Default::default()
                };
                let frame = json!({ "serverContent": &content }).to_string();
                let decoded = vertex().decode_server_message(&frame).unwrap();
                prop_assert_eq!(decoded, ServerMessage::Content(content));
            }
        }
    }
}
