//! Bulk attribute stream.
//!
//! Each record is a 4-byte big-endian signed length followed by that many bytes
//! of text, zero-padded to a multiple of 4. A negative length carries the error
//! code of an attribute that failed to read and has no payload. The stream has
//! no terminator; its extent is the byte count returned by the packer.

use crate::{AttrError, AttributeTable, ChannelInfo, Result};
use serde::Serialize;
use tracing::warn;

const LEN_FIELD: usize = 4;

/// Round a payload length up to the record alignment.
pub fn round_up4(len: usize) -> usize {
    (len + 3) & !3
}

/// Read every attribute of `table` in order and pack the results into `out`.
///
/// A failing attribute becomes a negative-length record instead of aborting the
/// whole read. Fails with `BufferTooSmall` before writing past `out`.
pub fn pack_all<D>(
    dev: &mut D,
    table: &AttributeTable<D>,
    channel: &ChannelInfo,
    out: &mut [u8],
) -> Result<usize> {
    let mut cursor = 0usize;
    for attr in table.iter() {
        let (len, payload) = match attr.read(dev, channel) {
            Ok(text) => match i32::try_from(text.len()) {
                Ok(n) => (n, Some(text)),
                Err(_) => {
                    return Err(AttrError::BufferTooSmall {
                        needed: text.len(),
                        available: out.len(),
                    })
                }
            },
            Err(e) => {
                warn!(attr = attr.name(), error = %e, "attribute failed in bulk read");
                (e.code(), None)
            }
        };

        let body = payload.as_ref().map_or(0, |p| round_up4(p.len()));
        let needed = cursor + LEN_FIELD + body;
        if needed > out.len() {
            return Err(AttrError::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }

        out[cursor..cursor + LEN_FIELD].copy_from_slice(&len.to_be_bytes());
        cursor += LEN_FIELD;
        if let Some(p) = payload {
            let bytes = p.as_bytes();
            out[cursor..cursor + bytes.len()].copy_from_slice(bytes);
            out[cursor + bytes.len()..cursor + body].fill(0);
            cursor += body;
        }
    }
    Ok(cursor)
}

/// One record of a bulk stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkRecord {
    Value(String),
    Failed(i32),
}

/// Split a bulk stream back into records.
///
/// Padding bytes are ignored; a stream cut inside a length field or payload is
/// `MalformedStream`.
pub fn unpack(buf: &[u8]) -> Result<Vec<BulkRecord>> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    while cursor < buf.len() {
        let field = buf
            .get(cursor..cursor + LEN_FIELD)
            .ok_or(AttrError::MalformedStream("truncated length field"))?;
        let mut raw = [0u8; LEN_FIELD];
        raw.copy_from_slice(field);
        let len = i32::from_be_bytes(raw);
        cursor += LEN_FIELD;

        let Ok(n) = usize::try_from(len) else {
            out.push(BulkRecord::Failed(len));
            continue;
        };
        let payload = buf
            .get(cursor..cursor + n)
            .ok_or(AttrError::MalformedStream("truncated payload"))?;
        let text = std::str::from_utf8(payload)
            .map_err(|_| AttrError::MalformedStream("payload is not UTF-8"))?;
        out.push(BulkRecord::Value(text.to_string()));
        cursor = (cursor + round_up4(n)).min(buf.len());
    }
    Ok(out)
}
