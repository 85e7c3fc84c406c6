//! Unmarshalling error type.

use thiserror::Error;

use crate::hessian::DecodeError;
use super::MAX_STATUS_CODE_DEPTH;

/// Error returned when a Hessian stream does not carry a well-formed
/// XACML object graph.
///
/// Byte-level failures keep their offset through the wrapped
/// [`DecodeError`]; structural failures name the entity and field that
/// did not match. On any error no partial object graph is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UnmarshalError {
    /// The byte stream itself could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A typed slot held the wrong node kind or a map with an unexpected
    /// wire class name.
    #[error("{context}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// The entity (and field) being unmarshalled, e.g.
        /// `Attribute.values`.
        context: String,
        /// What the wire contract requires there.
        expected: &'static str,
        /// What the stream carried.
        found: String,
    },

    /// A required field was absent or null.
    #[error("{class}: required field `{field}` is missing or null")]
    MissingRequired {
        /// Wire class short name.
        class: &'static str,
        /// The missing field key.
        field: &'static str,
    },

    /// An integer field does not name a valid enum variant.
    #[error("{class}.{field}: {value} is not a valid code")]
    EnumOutOfRange {
        /// Wire class short name.
        class: &'static str,
        /// The field key.
        field: &'static str,
        /// The out-of-range wire code.
        value: i32,
    },

    /// A status-code chain nested deeper than
    /// [`MAX_STATUS_CODE_DEPTH`](super::MAX_STATUS_CODE_DEPTH).
    #[error("status code chain deeper than {max} levels")]
    DepthExceeded {
        /// The enforced cap.
        max: usize,
    },
}

impl UnmarshalError {
    pub(crate) fn depth_exceeded() -> Self {
        Self::DepthExceeded {
            max: MAX_STATUS_CODE_DEPTH,
        }
    }
}
