//! Frame transport
//!
//! The collector reads text frames through [`FrameSource`]. Production runs
//! use [`WebSocketSource`]; tests feed frames from memory.

use async_trait::async_trait;
use certdb_core::{CertDbError, Result};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// A stream of text frames
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame
    ///
    /// `None` means the peer closed the stream. `Err(Transport)` means the
    /// connection failed; any other error is a single bad frame and the
    /// stream can still be read.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Release the connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;

    /// Address the frames come from, for logging
    fn endpoint(&self) -> &str;
}

/// Websocket client over plain TCP or TLS
pub struct WebSocketSource {
    endpoint: String,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl WebSocketSource {
    /// Perform the websocket handshake with `url`
    pub async fn connect(url: &url::Url) -> Result<Self> {
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| CertDbError::Transport(format!("failed to connect to {url} - {e}")))?;

        tracing::debug!(
            "Websocket handshake with {} completed ({})",
            url,
            response.status()
        );

        Ok(Self {
            endpoint: url.to_string(),
            stream: Some(stream),
        })
    }
}

#[async_trait]
impl FrameSource for WebSocketSource {
    async fn recv(&mut self) -> Option<Result<String>> {
        let stream = self.stream.as_mut()?;

        loop {
            let msg = match stream.next().await? {
                Ok(msg) => msg,
                Err(e) => {
                    return Some(Err(CertDbError::Transport(format!(
                        "failed to receive from {} - {e}",
                        self.endpoint
                    ))))
                }
            };

            match msg {
                Message::Text(text) => return Some(Ok(text)),
                Message::Binary(bytes) => {
                    return Some(String::from_utf8(bytes).map_err(|_| {
                        CertDbError::Decode("binary frame is not valid UTF-8".into())
                    }))
                }
                Message::Close(frame) => {
                    tracing::debug!("Peer closed {}: {:?}", self.endpoint, frame);
                    return None;
                }
                // Pings are answered by tungstenite itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        match stream.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed)
            | Err(tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(CertDbError::Transport(format!(
                "failed to close {} - {e}",
                self.endpoint
            ))),
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
