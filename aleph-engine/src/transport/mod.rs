//! Network access to the linguistic services.

mod nakdan;
mod translation;

pub use nakdan::NakdanClient;
pub use translation::{TranslationClient, TranslationFrame};

use crate::payload::RawResponse;
use aleph_types::{ErrorInfo, ErrorKind, Operation, ProcessingRequest};
use std::future::Future;
use std::time::Duration;
use tokio_tungstenite::tungstenite;

/// Failure at the network boundary.
///
/// Display text is for logs. Users see [`TransportError::to_error_info`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {detail}")]
    Connect { detail: String },

    #[error("no response within {after:?}")]
    Timeout { after: Duration },

    #[error("service answered HTTP {status}")]
    Status { status: u16 },

    #[error("invalid response: {detail}")]
    InvalidResponse { detail: String },

    #[error("service reported an error: {message}")]
    Remote { message: String },
}

impl TransportError {
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout { after: timeout }
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            TransportError::InvalidResponse {
                detail: err.to_string(),
            }
        } else {
            TransportError::Connect {
                detail: err.to_string(),
            }
        }
    }

    pub fn from_socket(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::Http(response) => TransportError::Status {
                status: response.status().as_u16(),
            },
            tungstenite::Error::Utf8 => TransportError::InvalidResponse {
                detail: "frame is not valid UTF-8".to_string(),
            },
            other => TransportError::Connect {
                detail: other.to_string(),
            },
        }
    }

    /// Connection failures, timeouts and 5xx responses may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Connect { .. } | TransportError::Timeout { .. } => true,
            TransportError::Status { status } => *status >= 500,
            TransportError::InvalidResponse { .. } | TransportError::Remote { .. } => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Connect { .. } | TransportError::Timeout { .. } => ErrorKind::Connection,
            TransportError::Status { status } if *status >= 500 => ErrorKind::Connection,
            TransportError::Status { .. } | TransportError::Remote { .. } => {
                ErrorKind::ProcessingFailure
            }
            TransportError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
        }
    }

    /// User-safe description; never includes the underlying error text.
    pub fn to_error_info(&self) -> ErrorInfo {
        let detail = match self {
            TransportError::Timeout { .. } => "The linguistic service took too long to respond",
            TransportError::Connect { .. } => "The linguistic service could not be reached",
            TransportError::Status { status } if *status >= 500 => {
                "The linguistic service is temporarily unavailable"
            }
            TransportError::Status { .. } => "The linguistic service rejected the request",
            TransportError::InvalidResponse { .. } => {
                "The linguistic service returned an unexpected response"
            }
            TransportError::Remote { .. } => "The linguistic service could not process this text",
        };
        ErrorInfo::new(self.kind(), detail)
    }
}

/// Anything that can turn a validated request into a raw service response.
///
/// Implemented by [`DictaService`] for the live endpoints and by test doubles.
pub trait LinguisticService: Send + Sync {
    fn call(
        &self,
        request: &ProcessingRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Live client: HTTP for vowelize/analyze/lemmatize, WebSocket for translate.
///
/// Each call opens its own connection, so one instance is shared by all
/// concurrent invocations.
pub struct DictaService {
    nakdan: NakdanClient,
    translation: TranslationClient,
}

impl DictaService {
    pub fn new(nakdan: NakdanClient, translation: TranslationClient) -> Self {
        Self {
            nakdan,
            translation,
        }
    }
}

impl LinguisticService for DictaService {
    async fn call(&self, request: &ProcessingRequest) -> Result<RawResponse, TransportError> {
        match request.operation {
            Operation::Vowelize | Operation::Analyze | Operation::Lemmatize => {
                self.nakdan.call(request).await
            }
            Operation::Translate => self.translation.call(request).await,
        }
    }
}

/// Render text as code points so Hebrew survives any log sink.
pub(crate) fn code_points(text: &str) -> String {
    text.chars()
        .map(|ch| format!("U+{:04X}", ch as u32))
        .collect::<Vec<_>>()
        .join(" ")
}
