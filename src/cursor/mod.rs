//! Cursor validation module
//!
//! Continue tokens are opaque to this crate. They are only checked for shape
//! and content safety before they are allowed anywhere near the upstream
//! list source.
//!
//! # Overview
//!
//! [`CursorValidator`] applies, in order: encoded length, base64 decoding
//! (standard, then URL-safe), null-byte rejection, decoded length and UTF-8
//! validity. A [`ValidatedCursor`] can only be produced by the validator.

mod validator;

pub use validator::{
    CursorError, CursorLimits, CursorValidator, ValidatedCursor, DEFAULT_MAX_DECODED_LEN,
    DEFAULT_MAX_ENCODED_LEN,
};
