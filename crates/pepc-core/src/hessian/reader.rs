//! Streaming decoder: bytes to value tree.

use super::error::{DecodeError, DecodeErrorKind};
use super::value::{List, Map, Value};
use super::{MAX_DEPTH, MAX_PAYLOAD_BYTES};

/// Decodes one value tree from the front of `input`.
///
/// Trailing bytes after the root node are ignored; the PEPd sends exactly
/// one root object per HTTP body.
///
/// # Errors
///
/// Returns a [`DecodeError`] carrying the byte offset of the failure on
/// truncated input, unknown tags, invalid UTF-8, bad references, odd map
/// child counts, interrupted chunk sequences, or when the nesting or
/// payload caps are exceeded.
pub fn deserialize(input: &[u8]) -> Result<Value, DecodeError> {
    Decoder::new(input).read_value()
}

/// Cursor over an immutable byte slice.
///
/// Every read validates the remaining length first, so a truncated stream
/// fails with the offset at which the missing bytes were expected.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    const fn offset(&self) -> usize {
        self.pos
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| DecodeError::truncated(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| DecodeError::truncated(self.pos))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| DecodeError::truncated(self.buf.len()))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.read_slice(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        let bytes = self.read_slice(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    fn read_f64(&mut self) -> Result<f64, DecodeError> {
        let bytes = self.read_slice(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_bits(u64::from_be_bytes(raw)))
    }
}

/// One decode pass over a single stream.
struct Decoder<'a> {
    input: ByteReader<'a>,
    /// Container table, keyed by insertion order. A slot is claimed when
    /// the container header is consumed and filled when its children are
    /// complete; `None` marks a container still being read.
    refs: Vec<Option<Value>>,
    depth: usize,
    payload_bytes: usize,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input: ByteReader::new(input),
            refs: Vec::new(),
            depth: 0,
            payload_bytes: 0,
        }
    }

    fn read_value(&mut self) -> Result<Value, DecodeError> {
        let offset = self.input.offset();
        let tag = self.input.read_u8()?;
        match tag {
            b'N' => Ok(Value::Null),
            b'T' => Ok(Value::Bool(true)),
            b'F' => Ok(Value::Bool(false)),
            b'I' => Ok(Value::Int32(self.input.read_i32()?)),
            b'L' => Ok(Value::Int64(self.input.read_i64()?)),
            b'D' => Ok(Value::Double(self.input.read_f64()?)),
            b'd' => Ok(Value::Date(self.input.read_i64()?)),
            b'S' | b's' => self.read_string(tag).map(Value::String),
            b'B' | b'b' => self.read_binary(tag).map(Value::Binary),
            b'V' => self.read_list(offset),
            b'M' => self.read_map(offset),
            b'R' => self.read_ref(offset),
            tag => Err(DecodeError::new(offset, DecodeErrorKind::UnknownTag { tag })),
        }
    }

    /// Reads a chunked string. `tag` is the tag already consumed; `s`
    /// chunks are concatenated until the final `S` chunk.
    fn read_string(&mut self, mut tag: u8) -> Result<String, DecodeError> {
        let mut out = String::new();
        loop {
            self.read_string_chunk(&mut out)?;
            if tag == b'S' {
                return Ok(out);
            }
            let offset = self.input.offset();
            tag = self.input.read_u8()?;
            if tag != b'S' && tag != b's' {
                return Err(DecodeError::new(
                    offset,
                    DecodeErrorKind::ChunkMismatch { tag },
                ));
            }
        }
    }

    /// Reads one string chunk body: a u16 UTF-16 code-unit count followed
    /// by that many code units encoded as UTF-8.
    fn read_string_chunk(&mut self, out: &mut String) -> Result<(), DecodeError> {
        let units = usize::from(self.input.read_u16()?);
        let body_start = self.input.offset();
        let mut remaining = units;
        while remaining > 0 {
            let char_offset = self.input.offset();
            let c = self.read_utf8_char(char_offset)?;
            let width = c.len_utf16();
            if width > remaining {
                // A supplementary-plane character straddling the declared
                // code-unit count.
                return Err(DecodeError::new(char_offset, DecodeErrorKind::BadUtf8));
            }
            remaining -= width;
            out.push(c);
        }
        self.bump_payload(self.input.offset() - body_start, body_start)
    }

    /// Decodes a single UTF-8 scalar value, rejecting overlong forms and
    /// surrogate code points.
    fn read_utf8_char(&mut self, offset: usize) -> Result<char, DecodeError> {
        let bad = || DecodeError::new(offset, DecodeErrorKind::BadUtf8);
        let first = self.input.read_u8()?;
        let (continuations, mut code_point) = match first {
            0x00..=0x7F => return Ok(char::from(first)),
            0xC0..=0xDF => (1usize, u32::from(first & 0x1F)),
            0xE0..=0xEF => (2, u32::from(first & 0x0F)),
            0xF0..=0xF7 => (3, u32::from(first & 0x07)),
            _ => return Err(bad()),
        };
        for _ in 0..continuations {
            let byte = self.input.read_u8()?;
            if byte & 0xC0 != 0x80 {
                return Err(bad());
            }
            code_point = (code_point << 6) | u32::from(byte & 0x3F);
        }
        const MIN_FOR_LEN: [u32; 4] = [0, 0x80, 0x800, 0x1_0000];
        if code_point < MIN_FOR_LEN[continuations] {
            return Err(bad());
        }
        char::from_u32(code_point).ok_or_else(bad)
    }

    fn read_binary(&mut self, mut tag: u8) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        loop {
            let len_offset = self.input.offset();
            let len = usize::from(self.input.read_u16()?);
            self.bump_payload(len, len_offset)?;
            out.extend_from_slice(self.input.read_slice(len)?);
            if tag == b'B' {
                return Ok(out);
            }
            let offset = self.input.offset();
            tag = self.input.read_u8()?;
            if tag != b'B' && tag != b'b' {
                return Err(DecodeError::new(
                    offset,
                    DecodeErrorKind::ChunkMismatch { tag },
                ));
            }
        }
    }

    /// A `t` block: u16 byte length followed by a UTF-8 type name.
    fn read_type_name(&mut self) -> Result<String, DecodeError> {
        let len = usize::from(self.input.read_u16()?);
        let offset = self.input.offset();
        let bytes = self.input.read_slice(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::new(offset, DecodeErrorKind::BadUtf8))
    }

    fn read_list(&mut self, offset: usize) -> Result<Value, DecodeError> {
        self.enter(offset)?;
        let mut list = List::new();
        if self.input.peek_u8()? == b't' {
            self.input.read_u8()?;
            list = List::typed(self.read_type_name()?);
        }
        if self.input.peek_u8()? == b'l' {
            // Declared length is advisory; children run to the `z`
            // terminator regardless.
            self.input.read_u8()?;
            let _declared = self.input.read_i32()?;
        }
        let slot = self.claim_ref_slot();
        while self.input.peek_u8()? != b'z' {
            let child = self.read_value()?;
            list.push(child);
        }
        self.input.read_u8()?;
        self.leave();
        let value = Value::List(list);
        self.refs[slot] = Some(value.clone());
        Ok(value)
    }

    fn read_map(&mut self, offset: usize) -> Result<Value, DecodeError> {
        self.enter(offset)?;
        let mut map = Map::new();
        if self.input.peek_u8()? == b't' {
            self.input.read_u8()?;
            map = Map::typed(self.read_type_name()?);
        }
        let slot = self.claim_ref_slot();
        loop {
            if self.input.peek_u8()? == b'z' {
                self.input.read_u8()?;
                break;
            }
            let key = self.read_value()?;
            if self.input.peek_u8()? == b'z' {
                return Err(DecodeError::new(offset, DecodeErrorKind::OddMapChildren));
            }
            let value = self.read_value()?;
            map.push(key, value);
        }
        self.leave();
        let value = Value::Map(map);
        self.refs[slot] = Some(value.clone());
        Ok(value)
    }

    fn read_ref(&mut self, offset: usize) -> Result<Value, DecodeError> {
        let index = self.input.read_i32()?;
        let resolved = usize::try_from(index)
            .ok()
            .and_then(|i| self.refs.get(i))
            .and_then(Option::as_ref);
        match resolved {
            Some(value) => Ok(value.clone()),
            None => Err(DecodeError::new(
                offset,
                DecodeErrorKind::BadRef {
                    index,
                    size: self.refs.len(),
                },
            )),
        }
    }

    fn claim_ref_slot(&mut self) -> usize {
        self.refs.push(None);
        self.refs.len() - 1
    }

    fn enter(&mut self, offset: usize) -> Result<(), DecodeError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(DecodeError::new(
                offset,
                DecodeErrorKind::DepthExceeded { max: MAX_DEPTH },
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn bump_payload(&mut self, len: usize, offset: usize) -> Result<(), DecodeError> {
        self.payload_bytes += len;
        if self.payload_bytes > MAX_PAYLOAD_BYTES {
            return Err(DecodeError::new(
                offset,
                DecodeErrorKind::PayloadTooLarge {
                    max: MAX_PAYLOAD_BYTES,
                },
            ));
        }
        Ok(())
    }
}
