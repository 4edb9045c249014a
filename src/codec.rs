//! Framing codec
//!
//! Every frame is an 8-byte header (big-endian `u32` kind, big-endian `u32`
//! payload length) followed by the payload. Multi-field payloads (file
//! transfers) pack each field as a big-endian `u32` length plus its bytes.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::FramingError;
use crate::types::MessageKind;

/// Header size in bytes
pub const HEADER_LEN: usize = 8;

/// Default upper bound for a single payload (64 MiB)
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// One header-plus-payload unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(kind: MessageKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Kind-5 control frame with a textual body
    pub fn control(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Control, text.into().into_bytes())
    }

    /// Header followed by payload, ready for a single write
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.kind.as_u32().to_be_bytes());
        buf.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Payload as UTF-8 text
    pub fn text(&self) -> Result<&str, FramingError> {
        std::str::from_utf8(&self.payload).map_err(|_| FramingError::InvalidUtf8)
    }
}

/// Read exactly one frame
///
/// Blocks until the full header and the full payload have arrived.
/// A stream that closes part-way yields `FramingError::Closed`.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> Result<Frame, FramingError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;

    let kind = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let kind = MessageKind::try_from(kind)?;
    if len > max_payload {
        return Err(FramingError::FrameTooLarge {
            len,
            max: max_payload,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    Ok(Frame { kind, payload })
}

/// Write one frame as a single buffer and flush it
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&frame.encode()).await?;
    writer.flush().await?;
    Ok(())
}

/// Pack fields as consecutive `u32` length-prefixed byte strings
pub fn pack_fields(fields: &[&[u8]]) -> Vec<u8> {
    let total: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut buf = Vec::with_capacity(total);
    for field in fields {
        buf.extend_from_slice(&(field.len() as u32).to_be_bytes());
        buf.extend_from_slice(field);
    }
    buf
}

/// Split a payload into exactly `count` length-prefixed fields
///
/// Rejects truncated prefixes, lengths running past the end and trailing bytes.
pub fn unpack_fields(payload: &[u8], count: usize) -> Result<Vec<&[u8]>, FramingError> {
    let mut fields = Vec::with_capacity(count);
    let mut rest = payload;

    for index in 0..count {
        if rest.len() < 4 {
            return Err(FramingError::MalformedFields(format!(
                "field {} length prefix truncated",
                index
            )));
        }
        let (prefix, tail) = rest.split_at(4);
        let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        if tail.len() < len {
            return Err(FramingError::MalformedFields(format!(
                "field {} declares {} bytes, {} available",
                index,
                len,
                tail.len()
            )));
        }
        let (field, tail) = tail.split_at(len);
        fields.push(field);
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(FramingError::MalformedFields(format!(
            "{} trailing bytes",
            rest.len()
        )));
    }

    Ok(fields)
}
