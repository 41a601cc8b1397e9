//! `application/x-www-form-urlencoded` payload decoding.
//!
//! Stricter than a browser-side parser: every `&`-separated segment must
//! contain exactly one `=`, so `foo`, `a=b=c` and a trailing `&` are all
//! rejected rather than guessed at.

use thiserror::Error;

use crate::store::SubmissionRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("segment '{0}' is not a single key=value pair")]
    MalformedPair(String),
}

/// Decode one form body into a record.
///
/// Keys and values are `+`→space and percent-decoded after splitting, so an
/// encoded `%26` or `%3D` lands in the value instead of breaking the pair.
/// Invalid percent-encoded UTF-8 is replaced, not rejected. A repeated key
/// keeps its last value.
pub fn decode_form(payload: &[u8]) -> Result<SubmissionRecord, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    let mut record = SubmissionRecord::new();

    for segment in text.split('&') {
        if segment.matches('=').count() != 1 {
            return Err(DecodeError::MalformedPair(segment.to_string()));
        }
        let (key, value) = url::form_urlencoded::parse(segment.as_bytes())
            .next()
            .ok_or_else(|| DecodeError::MalformedPair(segment.to_string()))?;
        record.insert(key.into_owned(), value.into_owned());
    }

    Ok(record)
}
