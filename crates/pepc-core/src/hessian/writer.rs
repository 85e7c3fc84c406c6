//! Streaming encoder: value tree to bytes.

use bytes::{BufMut, Bytes, BytesMut};

use super::error::EncodeError;
use super::value::{List, Map, Value};
use super::{MAX_CHUNK_LEN, MAX_PAYLOAD_BYTES};

/// Serializes a value tree into a Hessian stream.
///
/// Output is deterministic: the same tree yields byte-identical output on
/// every call, since lists and maps are insertion-ordered.
///
/// # Errors
///
/// Returns [`EncodeError::Oversize`] when a single string or binary value
/// exceeds the stream payload cap and cannot be chunked.
pub fn serialize(value: &Value) -> Result<Bytes, EncodeError> {
    let mut encoder = Encoder::new();
    encoder.write_value(value)?;
    Ok(encoder.buf.freeze())
}

struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    fn write_value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.buf.put_u8(b'N'),
            Value::Bool(true) => self.buf.put_u8(b'T'),
            Value::Bool(false) => self.buf.put_u8(b'F'),
            Value::Int32(i) => {
                self.buf.put_u8(b'I');
                self.buf.put_i32(*i);
            },
            Value::Int64(i) => {
                self.buf.put_u8(b'L');
                self.buf.put_i64(*i);
            },
            Value::Double(d) => {
                self.buf.put_u8(b'D');
                self.buf.put_u64(d.to_bits());
            },
            Value::Date(ms) => {
                self.buf.put_u8(b'd');
                self.buf.put_i64(*ms);
            },
            Value::String(s) => self.write_string(s)?,
            Value::Binary(b) => self.write_binary(b)?,
            Value::List(list) => self.write_list(list)?,
            Value::Map(map) => self.write_map(map)?,
            Value::Ref(index) => {
                self.buf.put_u8(b'R');
                #[allow(clippy::cast_possible_wrap)] // Wire field is int32.
                self.buf.put_i32(*index as i32);
            },
        }
        Ok(())
    }

    /// Writes a string as one final `S` chunk, or a run of `s` chunks
    /// capped at [`MAX_CHUNK_LEN`] UTF-16 code units followed by a final
    /// `S` chunk. Characters are never split across chunks.
    fn write_string(&mut self, s: &str) -> Result<(), EncodeError> {
        if s.len() > MAX_PAYLOAD_BYTES {
            return Err(EncodeError::Oversize {
                size: s.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }

        let mut chunk_start = 0usize;
        let mut chunk_units = 0usize;
        for (byte_index, c) in s.char_indices() {
            let width = c.len_utf16();
            if chunk_units + width > MAX_CHUNK_LEN {
                self.put_string_chunk(b's', chunk_units, &s[chunk_start..byte_index]);
                chunk_start = byte_index;
                chunk_units = 0;
            }
            chunk_units += width;
        }
        self.put_string_chunk(b'S', chunk_units, &s[chunk_start..]);
        Ok(())
    }

    fn put_string_chunk(&mut self, tag: u8, units: usize, body: &str) {
        self.buf.put_u8(tag);
        #[allow(clippy::cast_possible_truncation)] // units <= MAX_CHUNK_LEN.
        self.buf.put_u16(units as u16);
        self.buf.put_slice(body.as_bytes());
    }

    fn write_binary(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        if bytes.len() > MAX_PAYLOAD_BYTES {
            return Err(EncodeError::Oversize {
                size: bytes.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }

        let mut chunks = bytes.chunks(MAX_CHUNK_LEN).peekable();
        loop {
            // An empty binary still needs one final chunk on the wire.
            let chunk = chunks.next().unwrap_or_default();
            let tag = if chunks.peek().is_some() { b'b' } else { b'B' };
            self.buf.put_u8(tag);
            #[allow(clippy::cast_possible_truncation)] // chunk <= MAX_CHUNK_LEN.
            self.buf.put_u16(chunk.len() as u16);
            self.buf.put_slice(chunk);
            if chunks.peek().is_none() {
                return Ok(());
            }
        }
    }

    fn write_type_name(&mut self, name: &str) -> Result<(), EncodeError> {
        if name.len() > MAX_CHUNK_LEN {
            return Err(EncodeError::Oversize {
                size: name.len(),
                max: MAX_CHUNK_LEN,
            });
        }
        self.buf.put_u8(b't');
        #[allow(clippy::cast_possible_truncation)] // Checked above.
        self.buf.put_u16(name.len() as u16);
        self.buf.put_slice(name.as_bytes());
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<(), EncodeError> {
        self.buf.put_u8(b'V');
        if let Some(name) = list.type_name() {
            self.write_type_name(name)?;
        }
        for element in list {
            self.write_value(element)?;
        }
        self.buf.put_u8(b'z');
        Ok(())
    }

    fn write_map(&mut self, map: &Map) -> Result<(), EncodeError> {
        self.buf.put_u8(b'M');
        if let Some(name) = map.type_name() {
            self.write_type_name(name)?;
        }
        for (key, value) in map.entries() {
            self.write_value(key)?;
            self.write_value(value)?;
        }
        self.buf.put_u8(b'z');
        Ok(())
    }
}
