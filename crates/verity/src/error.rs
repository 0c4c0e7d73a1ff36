//! Unified error type for the Verity crates.

use verity_adt::AdtError;
use verity_codec::{CodecError, DecodeError};

/// Top-level error wrapping every crate-specific error.
///
/// The `#[from]` attributes generate `From` impls, so `?` converts a
/// [`CodecError`] or an [`AdtError`] into a `VerityError` automatically.
#[derive(Debug, thiserror::Error)]
pub enum VerityError {
    /// The input was JSON of the wrong shape.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An ADT invariant was violated (e.g. an empty non-empty list).
    #[error(transparent)]
    Adt(#[from] AdtError),

    /// The input was not valid JSON text.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerityError {
    /// The failure as a serializable tree.
    ///
    /// Codec failures project structurally; anything else becomes
    /// [`DecodeError::Custom`] with the rendered message.
    pub fn to_decode_error(&self) -> DecodeError {
        match self {
            Self::Codec(err) => DecodeError::from(err),
            Self::Adt(_) | Self::Json(_) => DecodeError::Custom {
                message: self.to_string(),
            },
        }
    }
}
