//! # gemini-live
//!
//! Bidirectional streaming client for the Gemini Live API.
//!
//! This crate implements the Live session protocol layer: it opens a duplex
//! websocket to either the Gemini Developer API or Vertex AI, performs the
//! backend-specific handshake (URL routing, auth, the initial setup frame),
//! encodes typed client intents into wire frames, and decodes asynchronous
//! server frames back into typed messages.
//!
//! ## Architecture
//!
//! ```text
//!   LiveClient ── connect() ──► LiveSession ◄──── duplex frames ────► server
//!       │                          │  ▲
//!       │ model/tool resolution    │  │ WireFormat codec
//!       │ URL + auth handshake     ▼  │ (per-backend envelopes)
//!       └── Transport (websocket factory, swappable in tests)
//! ```
//!
//! Credential refresh, REST endpoints, and the wider resource namespaces
//! (files, caches, batches, tuning) are deliberately out of scope; the
//! session consumes narrow collaborator traits ([`AuthProvider`],
//! [`Transport`], [`CallableTool`]) instead.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gemini_live::{LiveClient, LiveConfig, ServerMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LiveClient::builder()
//!         .api_key(std::env::var("GOOGLE_API_KEY")?)
//!         .build()?;
//!
//!     let config = LiveConfig::new()
//!         .with_instruction("You are a helpful assistant.")
//!         .with_text_only();
//!
//!     let session = client.connect("gemini-2.0-flash-live-001", config).await?;
//!     session.send_text("Hello!").await?;
//!
//!     while let Some(message) = session.receive().await {
//!         match message? {
//!             ServerMessage::Content(content) => println!("{content:?}"),
//!             ServerMessage::GoAway(_) => break,
//!             _ => {}
//!         }
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
mod codec;
pub mod config;
pub mod error;
pub mod messages;
pub mod session;
pub mod tool;
pub mod transport;
pub mod types;

// Re-exports
pub use auth::{AuthProvider, StaticTokenProvider};
pub use client::{Backend, LiveClient, LiveClientBuilder, build_gemini_url, build_vertex_url};
pub use config::LiveConfig;
pub use error::{LiveError, Result};
pub use messages::{
    ClientContent, ClientIntent, GoAway, RealtimeInput, ServerContent, ServerMessage, ToolCall,
    ToolCallCancellation,
};
pub use session::LiveSession;
pub use tool::{CallableTool, FunctionDeclaration, LiveTool};
pub use transport::{Frame, FrameSink, FrameSource, Transport, WsTransport};
pub use types::{
    Blob, Content, FunctionCall, FunctionResponse, Part, Turns, normalize_model, normalize_turns,
};
