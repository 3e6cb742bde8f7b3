//! Cursor validator implementation
//!
//! Validation operates on the decoded bytes as well as the wire form, since
//! base64 can carry arbitrary bytes past a charset check on the encoded text.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum encoded cursor length, in characters
pub const DEFAULT_MAX_ENCODED_LEN: usize = 512;

/// Maximum decoded cursor length, in bytes
pub const DEFAULT_MAX_DECODED_LEN: usize = 512;

// Padding stays mandatory; non-zero trailing bits in the last symbol are accepted
const DECODE_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true);
const STANDARD_DECODER: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, DECODE_CONFIG);
const URL_SAFE_DECODER: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, DECODE_CONFIG);

/// Reasons a cursor is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor exceeds maximum allowed length of {max} characters")]
    TooLong { max: usize },

    #[error("cursor format is invalid: malformed base64 encoding")]
    MalformedBase64,

    #[error("cursor format is invalid: contains null bytes")]
    NullByte,

    #[error("cursor exceeds maximum decoded size of {max} bytes")]
    DecodedTooLong { max: usize },

    #[error("cursor format is invalid: not valid UTF-8")]
    InvalidUtf8,
}

/// Size bounds applied by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorLimits {
    /// Maximum length of the token as received
    #[serde(default = "default_max_encoded_len")]
    pub max_encoded_len: usize,

    /// Maximum length of the token after base64 decoding
    #[serde(default = "default_max_decoded_len")]
    pub max_decoded_len: usize,
}

fn default_max_encoded_len() -> usize {
    DEFAULT_MAX_ENCODED_LEN
}

fn default_max_decoded_len() -> usize {
    DEFAULT_MAX_DECODED_LEN
}

impl Default for CursorLimits {
    fn default() -> Self {
        Self {
            max_encoded_len: DEFAULT_MAX_ENCODED_LEN,
            max_decoded_len: DEFAULT_MAX_DECODED_LEN,
        }
    }
}

/// A continue token that passed every validator rule
///
/// The wrapped string is the token exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ValidatedCursor(String);

impl ValidatedCursor {
    /// The token as sent by the client
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the raw token
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ValidatedCursor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stateless continue-token validator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorValidator {
    limits: CursorLimits,
}

impl CursorValidator {
    /// Create a validator with the given limits
    pub fn new(limits: CursorLimits) -> Self {
        Self { limits }
    }

    /// The limits this validator enforces
    pub fn limits(&self) -> CursorLimits {
        self.limits
    }

    /// Validate a token. The empty string is the first page and always valid.
    pub fn validate(&self, token: &str) -> Result<(), CursorError> {
        self.decode(token).map(|_| ())
    }

    /// Validate a token and wrap it so it can be handed to a list source.
    ///
    /// Returns `Ok(None)` for the empty (first page) token.
    pub fn validate_owned(&self, token: String) -> Result<Option<ValidatedCursor>, CursorError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.validate(&token)?;
        Ok(Some(ValidatedCursor(token)))
    }

    /// Boolean form of [`validate`](Self::validate), used for tokens issued
    /// by the upstream source rather than sent by a client
    pub fn is_valid_continue_token(&self, token: &str) -> bool {
        self.validate(token).is_ok()
    }

    /// Run every rule in order, returning the decoded bytes on success
    fn decode(&self, token: &str) -> Result<Vec<u8>, CursorError> {
        if token.is_empty() {
            return Ok(Vec::new());
        }

        if token.len() > self.limits.max_encoded_len {
            return Err(CursorError::TooLong {
                max: self.limits.max_encoded_len,
            });
        }

        let decoded = STANDARD_DECODER
            .decode(token)
            .or_else(|_| URL_SAFE_DECODER.decode(token))
            .map_err(|_| CursorError::MalformedBase64)?;

        if decoded.contains(&0x00) {
            return Err(CursorError::NullByte);
        }

        if decoded.len() > self.limits.max_decoded_len {
            return Err(CursorError::DecodedTooLong {
                max: self.limits.max_decoded_len,
            });
        }

        if !decoded.is_empty() && std::str::from_utf8(&decoded).is_err() {
            return Err(CursorError::InvalidUtf8);
        }

        Ok(decoded)
    }
}
