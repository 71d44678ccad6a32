use crate::{pack::pack_all, AttrError, AttributeTable, ChannelInfo, Result};
use tracing::debug;

/// Channel number embedded in a channel name.
///
/// The first run of decimal digits wins ("altvoltage0" -> 0, "voltage2" -> 2);
/// names without digits are channel 0. Oversized numbers saturate.
pub fn parse_channel_number(name: &str) -> i32 {
    let digits = name
        .bytes()
        .skip_while(|b| !b.is_ascii_digit())
        .take_while(|b| b.is_ascii_digit());
    let mut n: i32 = 0;
    for d in digits {
        n = n.saturating_mul(10).saturating_add(i32::from(d - b'0'));
    }
    n
}

/// Index of the attribute called `name`. First exact, case-sensitive match wins.
pub fn resolve<D>(name: &str, table: &AttributeTable<D>) -> Result<usize> {
    table
        .iter()
        .position(|a| a.name() == name)
        .ok_or_else(|| AttrError::AttributeNotFound(name.to_string()))
}

/// Read one attribute into `out`, or every attribute when `attr` is empty.
///
/// Returns the number of bytes written.
pub fn read_attribute<D>(
    dev: &mut D,
    table: &AttributeTable<D>,
    channel: &str,
    is_output: bool,
    attr: &str,
    out: &mut [u8],
) -> Result<usize> {
    let info = ChannelInfo::new(channel, is_output);
    if attr.is_empty() {
        debug!(channel, attrs = table.len(), "bulk read");
        return pack_all(dev, table, &info, out);
    }
    let idx = resolve(attr, table)?;
    let handler = table
        .get(idx)
        .ok_or_else(|| AttrError::AttributeNotFound(attr.to_string()))?;
    debug!(channel, attr, "read");
    let text = handler.read(dev, &info)?;
    copy_text(&text, out)
}

/// Apply `input` to one attribute. Returns the number of bytes consumed.
///
/// Bulk write (empty `attr`) has no defined input format and is rejected.
pub fn write_attribute<D>(
    dev: &mut D,
    table: &AttributeTable<D>,
    channel: &str,
    is_output: bool,
    attr: &str,
    input: &[u8],
) -> Result<usize> {
    let info = ChannelInfo::new(channel, is_output);
    if attr.is_empty() {
        return Err(AttrError::Unsupported("bulk attribute write"));
    }
    let idx = resolve(attr, table)?;
    let handler = table
        .get(idx)
        .ok_or_else(|| AttrError::AttributeNotFound(attr.to_string()))?;
    let text = input_text(input)?;
    debug!(channel, attr, value = text, "write");
    handler.write(dev, &info, text)?;
    Ok(input.len())
}

fn copy_text(text: &str, out: &mut [u8]) -> Result<usize> {
    let bytes = text.as_bytes();
    if bytes.len() > out.len() {
        return Err(AttrError::BufferTooSmall {
            needed: bytes.len(),
            available: out.len(),
        });
    }
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}

/// Client payloads may carry a C string terminator and a trailing newline.
fn input_text(input: &[u8]) -> Result<&str> {
    let end = input.iter().position(|&b| b == 0).unwrap_or(input.len());
    let text = std::str::from_utf8(&input[..end])
        .map_err(|_| AttrError::InvalidArgument("value is not valid UTF-8".into()))?;
    Ok(text.trim())
}
