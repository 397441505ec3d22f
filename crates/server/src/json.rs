//! JSON envelope helpers shared by every handler.
//!
//! Responses are written as a single top-level object ("envelope") whose keys
//! name the payloads. Request bodies are decoded strictly: the body is size
//! capped, unknown keys are rejected, and nothing may follow the first value.
//! Decode failures map to client-safe [`DecodeError`] diagnostics.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use http_body_util::LengthLimitError;
use serde::{
    Deserialize, Serialize,
    de::{DeserializeOwned, IgnoredAny},
};
use serde_json::{Map, Value, error::Category, ser::PrettyFormatter};
use thiserror::Error;

use crate::error::ApiError;

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Top-level response object. Keys serialize in sorted order.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn new(key: &str, payload: impl Serialize) -> Result<Self, serde_json::Error> {
        Self::default().with(key, payload)
    }

    pub fn with(mut self, key: &str, payload: impl Serialize) -> Result<Self, serde_json::Error> {
        self.0.insert(key.to_string(), serde_json::to_value(payload)?);
        Ok(self)
    }
}

/// Serializes `data` as tab-indented JSON followed by a newline.
///
/// `headers` are applied first, then `Content-Type: application/json` and the
/// status code. Serialization failures are returned to the caller.
pub fn write_json<T: Serialize>(
    status: StatusCode,
    data: T,
    headers: HeaderMap,
) -> Result<Response, serde_json::Error> {
    let mut body = Vec::with_capacity(128);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"\t"));
    data.serialize(&mut serializer)?;
    body.push(b'\n');

    let mut response = Response::new(Body::from(body));
    response.headers_mut().extend(headers);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    *response.status_mut() = status;

    Ok(response)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body contains badly-formed JSON (at character {0})")]
    BadlyFormedAt(usize),

    #[error("body contains badly-formed JSON")]
    BadlyFormed,

    #[error("body contains incorrect JSON type for field {0:?}")]
    IncorrectTypeField(String),

    #[error("body contains incorrect JSON type (at character {0})")]
    IncorrectTypeAt(usize),

    #[error("body must not be empty")]
    Empty,

    #[error("body contains unknown key {0:?}")]
    UnknownKey(String),

    #[error("body must not be larger than {0} bytes")]
    TooLarge(usize),

    #[error("body must only contain a single JSON value")]
    MultipleValues,

    #[error("{0}")]
    Other(String),
}

/// Buffers `body` (up to [`MAX_BODY_BYTES`]) and decodes it strictly into `T`.
pub async fn read_json<T: DeserializeOwned + Default>(body: Body) -> Result<T, DecodeError> {
    let bytes = read_body(body, MAX_BODY_BYTES).await?;
    decode_json(&bytes)
}

/// Collects the body, stopping as soon as more than `limit` bytes arrive.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, DecodeError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        let too_large = std::error::Error::source(&err)
            .is_some_and(|source| source.is::<LengthLimitError>());
        if too_large {
            DecodeError::TooLarge(limit)
        } else {
            DecodeError::Other(err.to_string())
        }
    })
}

/// Strictly decodes a single JSON value from `bytes`.
///
/// The first value is scanned for syntax before it is mapped onto `T`, so a
/// broken body is always reported as badly-formed. A literal `null` decodes
/// to `T::default()`.
pub fn decode_json<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, DecodeError> {
    if bytes
        .iter()
        .all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
    {
        return Err(DecodeError::Empty);
    }

    let mut scanner = serde_json::Deserializer::from_slice(bytes);
    IgnoredAny::deserialize(&mut scanner).map_err(|err| syntax_error(bytes, &err))?;

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value: Option<T> = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| classify(bytes, err))?;

    deserializer
        .end()
        .map_err(|_| DecodeError::MultipleValues)?;

    Ok(value.unwrap_or_default())
}

fn syntax_error(bytes: &[u8], err: &serde_json::Error) -> DecodeError {
    match err.classify() {
        Category::Eof => DecodeError::BadlyFormed,
        _ => DecodeError::BadlyFormedAt(byte_offset(bytes, err.line(), err.column())),
    }
}

fn classify(bytes: &[u8], err: serde_path_to_error::Error<serde_json::Error>) -> DecodeError {
    let field = err.path().to_string();
    let has_field = err.path().iter().next().is_some();
    let inner = err.into_inner();
    let offset = byte_offset(bytes, inner.line(), inner.column());

    match inner.classify() {
        Category::Syntax => DecodeError::BadlyFormedAt(offset),
        Category::Eof => DecodeError::BadlyFormed,
        Category::Io => DecodeError::Other(message(&inner)),
        Category::Data => {
            let msg = message(&inner);
            if let Some(rest) = msg.strip_prefix("unknown field `") {
                DecodeError::UnknownKey(unknown_field_name(rest).to_string())
            } else if msg.starts_with("invalid type:")
                || msg.starts_with("invalid value:")
                || msg.starts_with("invalid length")
            {
                if has_field {
                    DecodeError::IncorrectTypeField(field)
                } else {
                    DecodeError::IncorrectTypeAt(offset)
                }
            } else {
                DecodeError::Other(msg)
            }
        }
    }
}

/// Extracts the key from the tail of serde's "unknown field `<key>`, ..."
/// message. The key itself may contain backticks.
fn unknown_field_name(rest: &str) -> &str {
    let end = rest
        .find("`, expected ")
        .or_else(|| rest.find("`, there are no fields"))
        .or_else(|| rest.rfind('`'))
        .unwrap_or(rest.len());
    &rest[..end]
}

/// The decoder's message without its trailing `at line L column C`.
fn message(err: &serde_json::Error) -> String {
    let full = err.to_string();
    let location = format!(" at line {} column {}", err.line(), err.column());
    full.strip_suffix(&location).unwrap_or(&full).to_string()
}

/// Converts a 1-based line and column into a byte offset into `bytes`.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = bytes
        .split(|&b| b == b'\n')
        .take(line - 1)
        .map(|l| l.len() + 1)
        .sum();
    line_start + column
}

/// Request body extractor that applies [`read_json`] and rejects with a
/// 400 envelope carrying the decode diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<S, T> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let value = read_json(req.into_body()).await?;
        Ok(StrictJson(value))
    }
}
