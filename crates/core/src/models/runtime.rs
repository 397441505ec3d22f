//! Movie runtime in minutes, carried over JSON as the string `"<n> mins"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid runtime format")]
pub struct InvalidRuntimeFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

/// Encodes a runtime as a JSON string literal, quotes included.
pub fn encode(runtime: Runtime) -> String {
    format!("\"{}\"", display(runtime))
}

/// Decodes a JSON string literal produced by [`encode`].
pub fn decode(json: &str) -> Result<Runtime, InvalidRuntimeFormat> {
    let unquoted: String = serde_json::from_str(json).map_err(|_| InvalidRuntimeFormat)?;
    parse(&unquoted)
}

fn display(runtime: Runtime) -> String {
    format!("{} mins", runtime.0)
}

/// Parses the unquoted `<n> mins` form.
fn parse(value: &str) -> Result<Runtime, InvalidRuntimeFormat> {
    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || parts[1] != "mins" {
        return Err(InvalidRuntimeFormat);
    }

    let digits = parts[0];
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return Err(InvalidRuntimeFormat);
    }

    digits
        .parse::<i32>()
        .map(Runtime)
        .map_err(|_| InvalidRuntimeFormat)
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&display(*self))
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => parse(&s).map_err(de::Error::custom),
            _ => Err(de::Error::custom(InvalidRuntimeFormat)),
        }
    }
}
