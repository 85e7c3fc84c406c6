//! Codec error types.

use thiserror::Error;

/// Error returned when a Hessian stream cannot be decoded.
///
/// Carries the byte offset of the node (or length field) that failed, so
/// a rejected server payload can be diagnosed from a hex dump.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode error at offset {offset}: {kind}")]
pub struct DecodeError {
    /// Byte offset into the input at which decoding failed.
    pub offset: usize,
    /// What went wrong.
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) const fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self { offset, kind }
    }

    pub(crate) const fn truncated(offset: usize) -> Self {
        Self::new(offset, DecodeErrorKind::Truncated)
    }
}

/// The taxonomy of decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// The cursor ran off the end of the input mid-node.
    #[error("input truncated")]
    Truncated,

    /// The first byte of a node is not a known tag.
    #[error("unknown tag byte 0x{tag:02x}")]
    UnknownTag {
        /// The offending byte.
        tag: u8,
    },

    /// A string chunk is not valid UTF-8, or its UTF-16 code-unit count
    /// does not line up with the decoded characters.
    #[error("invalid UTF-8 in string chunk")]
    BadUtf8,

    /// An `R` node names an index outside the reference table, or a
    /// container whose children are still being read.
    #[error("reference {index} out of range (table holds {size} containers)")]
    BadRef {
        /// The index carried by the `R` node.
        index: i32,
        /// Reference-table size at the time of the lookup.
        size: usize,
    },

    /// A non-final string or binary chunk was not followed by another
    /// chunk of the same kind.
    #[error("chunk continuation expected, found tag 0x{tag:02x}")]
    ChunkMismatch {
        /// The tag that interrupted the chunk sequence.
        tag: u8,
    },

    /// A map terminated with an odd number of child nodes.
    #[error("map has an odd number of child nodes")]
    OddMapChildren,

    /// Containers nested deeper than the decoder allows.
    #[error("container nesting exceeds {max} levels")]
    DepthExceeded {
        /// The enforced cap.
        max: usize,
    },

    /// Cumulative string/binary payload exceeded the stream cap.
    #[error("cumulative payload exceeds {max} bytes")]
    PayloadTooLarge {
        /// The enforced cap in bytes.
        max: usize,
    },
}

/// Error returned when a value tree cannot be serialized.
///
/// Serialization is pure and cannot fail on well-formed trees of
/// reasonable size; these are programmer errors surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// A required field was not set on the graph being marshalled.
    ///
    /// The typed request model sets required fields at construction, so
    /// this is unreachable through the public marshalling surface; it is
    /// part of the error taxonomy shared with the decode side.
    #[error("required field `{path}` is missing")]
    MissingRequired {
        /// Dotted path of the missing field, e.g.
        /// `Request.subjects[2].attributes[0].id`.
        path: String,
    },

    /// A single string or binary value is too large to chunk under the
    /// stream size cap.
    #[error("value of {size} bytes exceeds the {max} byte cap")]
    Oversize {
        /// Size of the offending value in bytes.
        size: usize,
        /// The enforced cap in bytes.
        max: usize,
    },
}
