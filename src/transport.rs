//! Duplex transport abstraction.
//!
//! A [`Transport`] opens a message-oriented duplex channel to a URL and
//! hands back its two halves. The connect future resolves only once the
//! channel is open; a pre-open error or close rejects it instead of
//! hanging the caller.
//!
//! The production implementation is [`WsTransport`] over tokio-tungstenite.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use http::HeaderMap;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::error::{LiveError, Result};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// One inbound message from the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A text frame.
    Text(String),
    /// A binary frame. The session decodes it as UTF-8 text.
    Binary(Vec<u8>),
    /// The peer closed the channel, with an optional reason.
    Close(Option<String>),
}

/// Outbound half of a connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Transmit one text frame.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the channel. Idempotence is the transport's concern.
    async fn close(&mut self) -> Result<()>;
}

/// Inbound half of a connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, `Some(Err)` on a transport error, `None` once the
    /// stream has ended.
    async fn next_frame(&mut self) -> Option<Result<Frame>>;
}

/// Factory for duplex connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection; resolves when the channel is open.
    async fn connect(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>)>;
}

/// WebSocket transport over tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>)> {
        let mut request = url
            .into_client_request()
            .map_err(|e| LiveError::connection(format!("failed to create client request: {e}")))?;
        request.headers_mut().extend(headers);

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| LiveError::connection(format!("WebSocket connect error: {e}")))?;

        let (sink, source) = stream.split();
        Ok((Box::new(WsFrameSink(sink)), Box::new(WsFrameSource(source))))
    }
}

struct WsFrameSink(WsSink);

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.0
            .send(Message::Text(text))
            .await
            .map_err(|e| LiveError::connection(format!("send error: {e}")))
    }

    async fn close(&mut self) -> Result<()> {
        self.0
            .send(Message::Close(None))
            .await
            .map_err(|e| LiveError::connection(format!("close error: {e}")))
    }
}

struct WsFrameSource(WsSource);

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        loop {
            return match self.0.next().await? {
                Ok(Message::Text(text)) => Some(Ok(Frame::Text(text))),
                Ok(Message::Binary(data)) => Some(Ok(Frame::Binary(data))),
                Ok(Message::Close(close)) => {
                    Some(Ok(Frame::Close(close.map(|c| c.reason.to_string()))))
                }
                // Control frames are transport plumbing, not messages.
                Ok(_) => continue,
                Err(e) => Some(Err(LiveError::connection(format!("receive error: {e}")))),
            };
        }
    }
}
