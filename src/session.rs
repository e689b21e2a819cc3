//! Live session protocol engine.
//!
//! A [`LiveSession`] owns exactly one duplex connection. Sends are
//! fire-and-forget: the encoded frame is handed to the transport without
//! waiting for any server reply, so backpressure and cross-send ordering
//! are the transport's responsibility. Inbound frames are decoded and
//! yielded in transport-delivery order with no buffering or reordering.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_live::{LiveClient, LiveConfig, ServerMessage};
//!
//! let client = LiveClient::builder().api_key(api_key).build()?;
//! let session = client.connect("gemini-2.0-flash-live-001", LiveConfig::new()).await?;
//!
//! session.send_text("Hello").await?;
//! while let Some(message) = session.receive().await {
//!     match message? {
//!         ServerMessage::Content(content) => { /* render deltas */ }
//!         ServerMessage::ToolCall(call) => { /* run tools, respond */ }
//!         _ => {}
//!     }
//! }
//! ```

use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::codec::WireFormat;
use crate::error::{LiveError, Result};
use crate::messages::{ClientContent, ClientIntent, RealtimeInput, ServerMessage};
use crate::transport::{Frame, FrameSink, FrameSource};
use crate::types::FunctionResponse;

/// One active Live connection plus its protocol state.
///
/// The first message received on any session is the setup acknowledgement
/// ([`ServerMessage::SetupComplete`]); nothing before it is a response to a
/// client intent.
pub struct LiveSession {
    session_id: String,
    connected: Arc<AtomicBool>,
    codec: WireFormat,
    sender: Arc<Mutex<Box<dyn FrameSink>>>,
    receiver: Arc<Mutex<Box<dyn FrameSource>>>,
}

impl LiveSession {
    pub(crate) fn new(
        codec: WireFormat,
        sink: Box<dyn FrameSink>,
        source: Box<dyn FrameSource>,
    ) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            connected: Arc::new(AtomicBool::new(true)),
            codec,
            sender: Arc::new(Mutex::new(sink)),
            receiver: Arc::new(Mutex::new(source)),
        }
    }

    /// Transmit the setup envelope as the first outbound frame.
    pub(crate) async fn send_setup_frame(&self, frame: String) -> Result<()> {
        tracing::debug!(raw_setup = %frame, "Sending setup frame");
        self.send_frame(frame).await
    }

    /// Get the session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether the connection is still open as far as the session knows.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send_frame(&self, text: String) -> Result<()> {
        let mut sender = self.sender.lock().await;
        sender.send_text(text).await
    }

    /// Encode and transmit a client intent as a single text frame.
    ///
    /// Encoding failures surface here, before the transport is touched.
    pub async fn send(&self, intent: ClientIntent) -> Result<()> {
        let frame = self.codec.encode_intent(intent)?;
        self.send_frame(frame).await
    }

    /// Send ordered conversational content.
    pub async fn send_client_content(&self, content: ClientContent) -> Result<()> {
        self.send(ClientIntent::Content(content)).await
    }

    /// Send realtime media input. No ordering guarantee relative to other
    /// realtime inputs or client content.
    pub async fn send_realtime_input(&self, input: RealtimeInput) -> Result<()> {
        self.send(ClientIntent::RealtimeInput(input)).await
    }

    /// Send one or more function-call results.
    ///
    /// A single response passes as `[response]`; an empty sequence is
    /// rejected before anything reaches the transport.
    pub async fn send_tool_response(
        &self,
        responses: impl IntoIterator<Item = FunctionResponse> + Send,
    ) -> Result<()> {
        self.send(ClientIntent::ToolResponse(responses.into_iter().collect())).await
    }

    /// Send a single user text turn, completing the turn.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.send_client_content(ClientContent::turns(text)).await
    }

    /// Send a chunk of raw PCM audio as realtime input.
    pub async fn send_audio(&self, data: Vec<u8>) -> Result<()> {
        self.send_realtime_input(RealtimeInput::audio(data)).await
    }

    /// Receive the next server message.
    ///
    /// Binary frames are decoded as UTF-8 text before JSON decoding. A
    /// malformed payload is returned as an error; transport closure ends
    /// the stream with `None`. Messages are yielded in the order the
    /// transport delivered them.
    pub async fn receive(&self) -> Option<Result<ServerMessage>> {
        let mut receiver = self.receiver.lock().await;

        match receiver.next_frame().await {
            Some(Ok(Frame::Text(text))) => Some(self.codec.decode_server_message(&text)),
            Some(Ok(Frame::Binary(data))) => match String::from_utf8(data) {
                Ok(text) => Some(self.codec.decode_server_message(&text)),
                Err(e) => {
                    Some(Err(LiveError::protocol(format!("invalid UTF-8 in binary frame: {e}"))))
                }
            },
            Some(Ok(Frame::Close(reason))) => {
                tracing::debug!(?reason, "server closed the connection");
                self.connected.store(false, Ordering::SeqCst);
                None
            }
            Some(Err(e)) => {
                self.connected.store(false, Ordering::SeqCst);
                Some(Err(e))
            }
            None => {
                self.connected.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    /// Server messages as a stream, in delivery order.
    pub fn messages(&self) -> Pin<Box<dyn Stream<Item = Result<ServerMessage>> + Send + '_>> {
        Box::pin(futures::stream::unfold(self, |session| async move {
            let message = session.receive().await?;
            Some((message, session))
        }))
    }

    /// Close the underlying connection. No further sends are valid
    /// afterwards; the engine does not guard against them beyond what the
    /// transport itself rejects.
    pub async fn close(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        let mut sender = self.sender.lock().await;
        sender.close().await
    }
}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("session_id", &self.session_id)
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .finish()
    }
}
