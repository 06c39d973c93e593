//! Wire shapes returned by the linguistic services.
//!
//! The vowelizer and analyzer reply with a JSON array whose elements are either a
//! bare string (a pass-through token or separator) or an object describing one
//! token. Fields come and go across API versions, so everything is optional and
//! the variants are matched exhaustively by the normalizer.

use crate::transport::TransportError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw service output handed from the transport to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Token records from the vowelizer/analyzer, with the text they were computed for.
    Tokens {
        source: String,
        records: Vec<TokenRecord>,
    },
    /// Translated text fragments in arrival order.
    Translation { fragments: Vec<String> },
}

/// One element of the vowelizer/analyzer response array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenRecord {
    Plain(String),
    Analyzed(AnalyzedToken),
    /// Numbers, arrays and other non-token values; kept so one odd element does
    /// not reject the batch.
    Unrecognized(Value),
}

/// Field decoder that turns `null` or a value of the wrong type into the default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Any object decodes as a token; a field that is absent, `null` or of the wrong
/// type takes its default instead of rejecting the record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzedToken {
    #[serde(default, deserialize_with = "lenient")]
    pub word: String,
    #[serde(default, deserialize_with = "lenient")]
    pub options: Vec<Candidate>,
    /// Tab-delimited header/value feature block.
    #[serde(default, rename = "BGU")]
    pub bgu: Option<Value>,
    /// Dependency blob; carried but not interpreted.
    #[serde(default, rename = "UD")]
    pub ud: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub sep: bool,
}

impl AnalyzedToken {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.options.first()
    }

    /// The BGU block when it is a string.
    pub fn bgu_block(&self) -> Option<&str> {
        self.bgu.as_ref().and_then(Value::as_str)
    }
}

/// A ranked vowelization candidate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    /// Plain vowelized rendering (vowelizer task).
    Text(String),
    /// `[rendering, [[feature, lemma, ...], ...], ...]` (analyzer task).
    Detailed(Vec<Value>),
    Unrecognized(Value),
}

impl Candidate {
    /// The vowelized rendering, if present and non-empty.
    pub fn rendering(&self) -> Option<&str> {
        let text = match self {
            Candidate::Text(text) => Some(text.as_str()),
            Candidate::Detailed(items) => items.first().and_then(Value::as_str),
            Candidate::Unrecognized(_) => None,
        };
        text.filter(|t| !t.trim().is_empty())
    }

    /// Lemma from the nested feature array: `candidate[1][0][1]`.
    pub fn nested_lemma(&self) -> Option<&str> {
        let Candidate::Detailed(items) = self else {
            return None;
        };
        items
            .get(1)?
            .as_array()?
            .first()?
            .as_array()?
            .get(1)?
            .as_str()
            .filter(|lemma| !lemma.trim().is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Tokens(Vec<TokenRecord>),
    Wrapped { data: Vec<TokenRecord> },
}

/// Decode a vowelizer/analyzer body into token records.
///
/// The top level must be an array (or an object wrapping one under `data`).
pub fn parse_token_records(body: &[u8]) -> Result<Vec<TokenRecord>, TransportError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| TransportError::InvalidResponse {
        detail: format!("response is not JSON: {}", e),
    })?;

    match serde_json::from_value::<ResponseBody>(value) {
        Ok(ResponseBody::Tokens(records)) | Ok(ResponseBody::Wrapped { data: records }) => {
            Ok(records)
        }
        Err(_) => Err(TransportError::InvalidResponse {
            detail: "expected a JSON array of token records".to_string(),
        }),
    }
}
