//! Hessian 1.0 binary codec (the subset the PEPd wire protocol uses).
//!
//! A Hessian stream is a self-describing sequence of tagged nodes. Every
//! node starts with a one-byte tag; containers nest and are terminated by
//! `z`:
//!
//! ```text
//! tag   node     follow-on bytes
//! ----  -------  ------------------------------------------------------
//! N     Null     —
//! T / F Bool     —
//! I     Int32    4 bytes big-endian
//! L     Int64    8 bytes big-endian
//! D     Double   8 bytes IEEE-754 big-endian
//! d     Date     8 bytes big-endian signed millis since the Unix epoch
//! S     String   u16 length (UTF-16 code units), payload encoded as UTF-8
//! s     String   non-final chunk, same payload, concatenated with the next
//! B / b Binary   u16 byte length, raw bytes (b = non-final chunk)
//! V     List     optional `t` type block, optional `l` length block,
//!                child nodes, `z`
//! M     Map      optional `t` type block, (key, value) node pairs, `z`
//! R     Ref      4-byte big-endian index into the reference table
//! ```
//!
//! # Reference table
//!
//! Each stream carries an implicit table of containers, keyed by insertion
//! order. The decoder claims a slot the moment a `V`/`M` header (tag plus
//! optional `t`/`l` blocks) has been consumed, before any children are
//! read. An `R` node resolves to the completed container at that index;
//! an out-of-range index, or a reference to a container whose children are
//! still being read, is a decode error. Scalars and strings are never
//! referenced. The encoder does not maintain a table: the tree-shaped
//! [`Value`] cannot alias containers, so no `R` nodes are ever emitted by
//! the domain mapping.
//!
//! # Bounds
//!
//! Decoding is strict and bounded. Chunk lengths are validated before
//! allocation, cumulative string/binary payload is capped at
//! [`MAX_PAYLOAD_BYTES`], and container nesting is capped at
//! [`MAX_DEPTH`]. Unknown tags fail with [`DecodeErrorKind::UnknownTag`];
//! the codec never skips bytes it does not understand.
//!
//! Both [`serialize`] and [`deserialize`] are single-pass, linear in the
//! input size, and synchronous.

mod error;
mod reader;
mod value;
mod writer;

pub use error::{DecodeError, DecodeErrorKind, EncodeError};
pub use reader::deserialize;
pub use value::{List, Map, Value};
pub use writer::serialize;

/// Maximum payload length of a single string or binary chunk.
///
/// The wire length field is an unsigned 16-bit integer; for strings it
/// counts UTF-16 code units, for binary nodes it counts raw bytes.
pub const MAX_CHUNK_LEN: usize = u16::MAX as usize;

/// Cap on the cumulative reassembled string and binary payload of one
/// stream (16 MiB). Typical XACML payloads are well under 64 KiB.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Cap on container nesting depth during decoding.
pub const MAX_DEPTH: usize = 64;
