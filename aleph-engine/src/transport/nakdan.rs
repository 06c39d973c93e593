use super::{code_points, TransportError};
use crate::config::NakdanConfig;
use crate::payload::{parse_token_records, RawResponse, TokenRecord};
use crate::retry::RetryPolicy;
use aleph_types::{Operation, ProcessingRequest};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for the vowelizer and morphological analyzer.
pub struct NakdanClient {
    vowelize_url: String,
    analyze_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl NakdanClient {
    pub fn new(config: &NakdanConfig, retry: RetryPolicy) -> Self {
        Self {
            vowelize_url: config.vowelize_url.clone(),
            analyze_url: config.analyze_url.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            retry,
        }
    }

    /// Endpoint and JSON body for a request.
    pub fn endpoint(&self, request: &ProcessingRequest) -> (&str, Value) {
        let genre = request.options.analysis_genre.as_str();

        match request.operation {
            Operation::Analyze | Operation::Lemmatize => {
                let mut payload = json!({
                    "task": "analyze",
                    "data": request.text,
                    "genre": genre,
                    "freturnfullmorphstr": true,
                    "addmorph": true,
                    "keepmetagim": true,
                    "keepnikud": true,
                    "keepqq": true,
                    "newjson": true,
                });
                if let Some(key) = &self.api_key {
                    payload["apiKey"] = Value::String(key.clone());
                }
                (self.analyze_url.as_str(), payload)
            }
            Operation::Vowelize | Operation::Translate => {
                let payload = json!({
                    "task": "nakdan",
                    "data": request.text,
                    "genre": genre,
                });
                (self.vowelize_url.as_str(), payload)
            }
        }
    }

    /// POST the request, retrying transient failures per the policy.
    pub async fn call(&self, request: &ProcessingRequest) -> Result<RawResponse, TransportError> {
        let (url, payload) = self.endpoint(request);

        info!(
            "Nakdan request - URL: {} | Task: {} | Text: {}",
            url,
            payload["task"].as_str().unwrap_or_default(),
            code_points(&request.text)
        );

        let records = self
            .retry
            .run(
                "Nakdan request",
                |_| post_once(url, &payload, request.timeout),
                TransportError::is_transient,
            )
            .await?;

        Ok(RawResponse::Tokens {
            source: request.text.clone(),
            records,
        })
    }
}

/// One attempt. The client is built and dropped here, so the connection is
/// released on every exit path.
async fn post_once(
    url: &str,
    payload: &Value,
    timeout: Duration,
) -> Result<Vec<TokenRecord>, TransportError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Connect {
            detail: e.to_string(),
        })?;

    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| TransportError::from_reqwest(e, timeout))?;

    let status = response.status();
    let cache = response
        .headers()
        .get("x-gg-cache-status")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("N/A")
        .to_string();

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::from_reqwest(e, timeout))?;

    info!(
        "Nakdan response - Status: {} | Length: {} bytes | Cache: {}",
        status.as_u16(),
        body.len(),
        cache
    );
    debug!("Raw response: {}", String::from_utf8_lossy(&body));

    parse_token_records(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_types::{AnalysisGenre, RequestOptions};

    fn client(api_key: Option<&str>) -> NakdanClient {
        let config = NakdanConfig {
            vowelize_url: "http://vowelize.test/api".to_string(),
            analyze_url: "http://analyze.test/addnikud".to_string(),
            api_key: api_key.map(str::to_string),
        };
        NakdanClient::new(&config, RetryPolicy::immediate(3))
    }

    #[test]
    fn test_vowelize_payload() {
        let request = ProcessingRequest::new("שלום", Operation::Vowelize);
        let client = client(Some("secret"));
        let (url, payload) = client.endpoint(&request);

        assert_eq!(url, "http://vowelize.test/api");
        assert_eq!(payload["task"], "nakdan");
        assert_eq!(payload["data"], "שלום");
        assert_eq!(payload["genre"], "modern");
        assert!(payload.get("apiKey").is_none());
    }

    #[test]
    fn test_analyze_payload() {
        let request = ProcessingRequest::new("שלום", Operation::Lemmatize).with_options(
            RequestOptions {
                analysis_genre: AnalysisGenre::Biblical,
                ..RequestOptions::default()
            },
        );
        let client = client(Some("secret"));
        let (url, payload) = client.endpoint(&request);

        assert_eq!(url, "http://analyze.test/addnikud");
        assert_eq!(payload["task"], "analyze");
        assert_eq!(payload["genre"], "biblical");
        assert_eq!(payload["apiKey"], "secret");
        assert_eq!(payload["newjson"], true);
        assert_eq!(payload["freturnfullmorphstr"], true);
    }

    #[test]
    fn test_blank_api_key_omitted() {
        let request = ProcessingRequest::new("שלום", Operation::Analyze);
        let client = client(Some("  "));
        let (_, payload) = client.endpoint(&request);
        assert!(payload.get("apiKey").is_none());
    }
}
