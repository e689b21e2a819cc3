//! Session configuration.

use serde_json::Value;

use crate::tool::LiveTool;

/// Configuration for a Live session, applied through the setup frame.
#[derive(Debug, Clone, Default)]
pub struct LiveConfig {
    /// System instruction for the session.
    pub system_instruction: Option<String>,

    /// Response modalities: `["TEXT"]`, `["AUDIO"]`, or both. When unset,
    /// Vertex AI sessions default to `["AUDIO"]` to match the Gemini
    /// Developer API's behavior.
    pub response_modalities: Option<Vec<String>>,

    /// Prebuilt voice for audio output.
    pub voice: Option<String>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Tools available to the model. Callable tools are resolved to static
    /// declarations before the setup frame is sent.
    pub tools: Vec<LiveTool>,

    /// Extra setup fields merged verbatim into the setup envelope. A stray
    /// top-level `config` key is stripped before transmission.
    pub extra: Option<Value>,
}

impl LiveConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system instruction.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the response modalities.
    pub fn with_modalities(mut self, modalities: Vec<String>) -> Self {
        self.response_modalities = Some(modalities);
        self
    }

    /// Text-only responses.
    pub fn with_text_only(self) -> Self {
        self.with_modalities(vec!["TEXT".to_string()])
    }

    /// Audio-only responses.
    pub fn with_audio_only(self) -> Self {
        self.with_modalities(vec!["AUDIO".to_string()])
    }

    /// Set the output voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: impl Into<LiveTool>) -> Self {
        self.tools.push(tool.into());
        self
    }

    /// Merge extra fields into the setup envelope.
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }
}
