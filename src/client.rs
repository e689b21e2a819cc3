//! Client construction and the connect handshake.
//!
//! A [`LiveClient`] holds the per-client API configuration (backend,
//! endpoint base, credentials), which is read-only after construction.
//! [`LiveClient::connect`] performs the full handshake and returns an open
//! [`LiveSession`]; any failure along the way rejects the whole call and no
//! partial session is ever returned.

use http::HeaderMap;
use http::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use url::Url;

use crate::auth::AuthProvider;
use crate::codec::WireFormat;
use crate::config::LiveConfig;
use crate::error::{LiveError, Result};
use crate::session::LiveSession;
use crate::tool::materialize_tools;
use crate::transport::{Transport, WsTransport};
use crate::types::{normalize_model, qualify_vertex_model};

/// Which of the two service backends governs wire format and auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Gemini Developer API: API-key (or ephemeral-token) auth in the URL.
    GeminiApi,
    /// Vertex AI: project/location-scoped resources, OAuth header auth.
    VertexAi,
}

/// Default endpoint for the Gemini Developer API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default websocket API version per backend.
const GEMINI_API_VERSION: &str = "v1beta";
const VERTEX_API_VERSION: &str = "v1beta1";

/// Rewrite an https/http base URL to its websocket scheme and strip the
/// trailing slash.
fn websocket_base(base_url: &Url) -> Result<String> {
    let mut url = base_url.clone();
    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        "wss" | "ws" => return Ok(url.as_str().trim_end_matches('/').to_string()),
        other => {
            return Err(LiveError::config(format!("unsupported base URL scheme: {other}")));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| LiveError::config("base URL does not accept a websocket scheme"))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Build the Vertex AI bidi websocket URL.
pub fn build_vertex_url(base_url: &Url, api_version: &str) -> Result<String> {
    let base = websocket_base(base_url)?;
    Ok(format!(
        "{base}/ws/google.cloud.aiplatform.{api_version}.LlmBidiService/BidiGenerateContent"
    ))
}

/// Build the Gemini Developer API bidi websocket URL.
///
/// Keys with the `auth_tokens/` prefix are ephemeral tokens and select the
/// constrained method with `access_token` as the query parameter. Without a
/// key the bare websocket base is returned.
pub fn build_gemini_url(base_url: &Url, api_version: &str, api_key: Option<&str>) -> Result<String> {
    let base = websocket_base(base_url)?;
    let Some(api_key) = api_key else {
        return Ok(base);
    };
    let (method, key_param) = if api_key.starts_with("auth_tokens/") {
        ("BidiGenerateContentConstrained", "access_token")
    } else {
        ("BidiGenerateContent", "key")
    };
    Ok(format!(
        "{base}/ws/google.ai.generativelanguage.{api_version}.GenerativeService.{method}?{key_param}={api_key}"
    ))
}

/// Client for establishing Live sessions.
pub struct LiveClient {
    backend: Backend,
    base_url: Url,
    api_version: String,
    project: Option<String>,
    location: Option<String>,
    api_key: Option<SecretString>,
    auth: Option<Arc<dyn AuthProvider>>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for LiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveClient")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("project", &self.project)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl LiveClient {
    /// Create a builder.
    pub fn builder() -> LiveClientBuilder {
        LiveClientBuilder::default()
    }

    /// The backend this client talks to.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Establish a Live session for the given model.
    ///
    /// Resolves the model name, materializes tools, opens the websocket and
    /// transmits the setup frame before returning. The call suspends until
    /// the transport reports the channel open; an error or close before
    /// open fails the connect instead of hanging it.
    pub async fn connect(&self, model: &str, config: LiveConfig) -> Result<LiveSession> {
        let codec = WireFormat::new(self.backend);

        let mut model = normalize_model(self.backend, model);
        if self.backend == Backend::VertexAi {
            // Builder validation guarantees project/location for Vertex.
            let project = self.project.as_deref().unwrap_or_default();
            let location = self.location.as_deref().unwrap_or_default();
            model = qualify_vertex_model(&model, project, location);
        }

        let declarations = materialize_tools(&config.tools).await?;

        let mut config = config;
        if config.response_modalities.is_none() {
            if let Some(default) = codec.default_response_modalities() {
                tracing::debug!(modalities = ?default, "no response modality set, using default");
                config.response_modalities = Some(default);
            }
        }

        let url = match self.backend {
            Backend::VertexAi => build_vertex_url(&self.base_url, &self.api_version)?,
            Backend::GeminiApi => build_gemini_url(
                &self.base_url,
                &self.api_version,
                self.api_key.as_ref().map(|key| key.expose_secret()),
            )?,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, http::HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth {
            auth.inject_auth_headers(&mut headers).await?;
        }

        let (sink, source) = self.transport.connect(&url, headers).await?;

        let setup_frame = codec.encode_setup(&model, &config, declarations)?;
        let session = LiveSession::new(codec, sink, source);
        session.send_setup_frame(setup_frame).await?;

        tracing::info!(
            session_id = %session.session_id(),
            model = %model,
            backend = ?self.backend,
            "Live session established"
        );
        Ok(session)
    }
}

/// Builder for [`LiveClient`]. Configuration errors surface at `build()`,
/// before any connection attempt.
#[derive(Default)]
pub struct LiveClientBuilder {
    api_key: Option<SecretString>,
    project: Option<String>,
    location: Option<String>,
    base_url: Option<Url>,
    api_version: Option<String>,
    auth: Option<Arc<dyn AuthProvider>>,
    transport: Option<Arc<dyn Transport>>,
}

impl LiveClientBuilder {
    /// Use the Gemini Developer API with the given API key or
    /// `auth_tokens/...` ephemeral token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Use Vertex AI with the given project and location.
    pub fn vertex(mut self, project: impl Into<String>, location: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self.location = Some(location.into());
        self
    }

    /// Override the https base URL.
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Override the websocket API version segment.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the auth provider (required for Vertex AI).
    pub fn auth_provider(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Replace the websocket transport. Mainly useful in tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<LiveClient> {
        let vertex = self.project.is_some() || self.location.is_some();

        if vertex {
            if self.api_key.is_some() {
                return Err(LiveError::config(
                    "api_key and project/location are mutually exclusive",
                ));
            }
            let project = self
                .project
                .filter(|p| !p.is_empty())
                .ok_or_else(|| LiveError::config("Vertex AI requires a non-empty project"))?;
            let location = self
                .location
                .filter(|l| !l.is_empty())
                .ok_or_else(|| LiveError::config("Vertex AI requires a non-empty location"))?;
            let auth = self
                .auth
                .ok_or_else(|| LiveError::config("Vertex AI requires an auth provider"))?;

            let base_url = match self.base_url {
                Some(url) => url,
                None => Url::parse(&format!("https://{location}-aiplatform.googleapis.com"))
                    .map_err(|e| LiveError::config(format!("invalid location in base URL: {e}")))?,
            };

            Ok(LiveClient {
                backend: Backend::VertexAi,
                base_url,
                api_version: self.api_version.unwrap_or_else(|| VERTEX_API_VERSION.to_string()),
                project: Some(project),
                location: Some(location),
                api_key: None,
                auth: Some(auth),
                transport: self.transport.unwrap_or_else(|| Arc::new(WsTransport)),
            })
        } else {
            let base_url = match self.base_url {
                Some(url) => url,
                None => Url::parse(GEMINI_API_BASE_URL)
                    .map_err(|e| LiveError::config(format!("invalid base URL: {e}")))?,
            };

            Ok(LiveClient {
                backend: Backend::GeminiApi,
                base_url,
                api_version: self.api_version.unwrap_or_else(|| GEMINI_API_VERSION.to_string()),
                project: None,
                location: None,
                api_key: self.api_key,
                auth: self.auth,
                transport: self.transport.unwrap_or_else(|| Arc::new(WsTransport)),
            })
        }
    }
}
