use super::{code_points, TransportError};
use crate::config::TranslationConfig;
use crate::payload::RawResponse;
use crate::retry::RetryPolicy;
use aleph_types::ProcessingRequest;
use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

const ERROR_TEXT_MARKER: &str = "Error during translation task";

/// One decoded frame from the translation socket.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationFrame {
    /// Keep-alive; must be answered with a pong frame.
    Ping,
    /// Terminal failure reported by the service.
    Error(String),
    /// Zero or more text fragments, optionally with the terminal marker.
    Content { fragments: Vec<String>, done: bool },
}

impl TranslationFrame {
    pub fn parse(text: &str) -> Result<Self, TransportError> {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) if text.contains(ERROR_TEXT_MARKER) => {
                return Ok(TranslationFrame::Error(text.trim().to_string()));
            }
            Err(e) => {
                return Err(TransportError::InvalidResponse {
                    detail: format!("translation frame is not JSON: {}", e),
                });
            }
        };

        if let Some(map) = value.as_object() {
            if map.get("type").and_then(Value::as_str) == Some("ping") {
                return Ok(TranslationFrame::Ping);
            }
            if let Some(message) = map.get("error") {
                let message = match message {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Ok(TranslationFrame::Error(message));
            }
        }

        let mut fragments = Vec::new();
        collect_out(&value, &mut fragments);

        Ok(TranslationFrame::Content {
            fragments,
            done: is_done(&value),
        })
    }
}

/// Gather `out` strings in document order, descending through lists and nested `out` values.
fn collect_out(value: &Value, fragments: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_out(item, fragments);
            }
        }
        Value::Object(map) => match map.get("out") {
            Some(Value::String(text)) => fragments.push(text.clone()),
            Some(nested) => collect_out(nested, fragments),
            None => {}
        },
        _ => {}
    }
}

fn is_done(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(is_done),
        Value::Object(map) => map.get("stage").and_then(Value::as_str) == Some("done"),
        _ => false,
    }
}

/// WebSocket client for the translation service.
///
/// Holds no connection; every call opens and closes its own socket.
pub struct TranslationClient {
    ws_url: String,
    retry: RetryPolicy,
}

impl TranslationClient {
    pub fn new(config: &TranslationConfig, retry: RetryPolicy) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
            retry,
        }
    }

    /// The single request frame sent after connecting.
    pub fn request_frame(request: &ProcessingRequest) -> Value {
        json!({
            "text": request.text,
            "direction": request.direction().as_str(),
            "genre": request.options.translation_genre.as_str(),
            "temperature": request.temperature(),
        })
    }

    pub async fn call(&self, request: &ProcessingRequest) -> Result<RawResponse, TransportError> {
        let frame = Self::request_frame(request).to_string();

        info!(
            "Translation request - Direction: {} | Genre: {} | Text: {}",
            request.direction(),
            request.options.translation_genre,
            code_points(&request.text)
        );

        let fragments = self
            .retry
            .run(
                "Translation session",
                |_| session(&self.ws_url, &frame, request.timeout),
                TransportError::is_transient,
            )
            .await?;

        Ok(RawResponse::Translation { fragments })
    }
}

/// One connect/send/read/close exchange, bounded as a whole by `timeout`.
async fn session(url: &str, frame: &str, timeout: Duration) -> Result<Vec<String>, TransportError> {
    let exchange = async {
        debug!("Opening translation socket: {}", url);
        let (mut ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(TransportError::from_socket)?;

        debug!("Sending translation frame: {}", frame);
        let outcome = match ws.send(Message::Text(frame.to_string())).await {
            Ok(()) => read_fragments(&mut ws).await,
            Err(e) => Err(TransportError::from_socket(e)),
        };

        if let Err(e) = ws.close(None).await {
            debug!("Translation socket close: {}", e);
        }
        outcome
    };

    // Dropping the exchange future on expiry drops the socket with it.
    match tokio::time::timeout(timeout, exchange).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("Translation session exceeded {:?}", timeout);
            Err(TransportError::Timeout { after: timeout })
        }
    }
}

/// Read frames until done, a remote error, or the peer closes.
async fn read_fragments<S>(ws: &mut S) -> Result<Vec<String>, TransportError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>
        + futures_util::Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    let mut fragments = Vec::new();

    while let Some(message) = ws.next().await {
        let text = match message.map_err(TransportError::from_socket)? {
            Message::Text(text) => text,
            Message::Binary(bytes) => String::from_utf8(bytes).map_err(|_| {
                TransportError::InvalidResponse {
                    detail: "binary frame is not valid UTF-8".to_string(),
                }
            })?,
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        debug!("Received translation frame: {}", text);

        match TranslationFrame::parse(&text)? {
            TranslationFrame::Ping => {
                let pong = json!({"type": "pong"}).to_string();
                ws.send(Message::Text(pong))
                    .await
                    .map_err(TransportError::from_socket)?;
            }
            TranslationFrame::Error(message) => {
                error!("Translation service error: {}", message);
                return Err(TransportError::Remote { message });
            }
            TranslationFrame::Content {
                fragments: mut batch,
                done,
            } => {
                fragments.append(&mut batch);
                if done {
                    info!("Translation complete - {} fragment(s)", fragments.len());
                    return Ok(fragments);
                }
            }
        }
    }

    if fragments.is_empty() {
        Err(TransportError::Connect {
            detail: "socket closed before any translation arrived".to_string(),
        })
    } else {
        debug!("Socket closed without done marker, using {} fragment(s)", fragments.len());
        Ok(fragments)
    }
}
