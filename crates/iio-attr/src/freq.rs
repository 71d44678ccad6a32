use crate::{AttrError, Result};
use core::fmt;
use serde::Serialize;
use tracing::warn;

const MICRO: i32 = 1_000_000;

/// A frequency stored as whole hertz plus a micro-hertz fraction.
///
/// Keeping the two parts separate lets table lookups compare integers instead
/// of floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrequencyEntry {
    pub integer_hz: i32,
    pub fractional_micro_hz: i32,
}

impl FrequencyEntry {
    pub const fn new(integer_hz: i32, fractional_micro_hz: i32) -> Self {
        Self {
            integer_hz,
            fractional_micro_hz,
        }
    }

    /// Split a value into truncated whole hertz and truncated micro-hertz.
    ///
    /// Arithmetic is in `f32`, matching the width the value was parsed at.
    pub fn from_f32(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(AttrError::InvalidArgument(format!(
                "frequency is not finite: {value}"
            )));
        }
        let integer_hz = value as i32;
        let micro = (value * MICRO as f32) as i64 % i64::from(MICRO);
        Ok(Self {
            integer_hz,
            fractional_micro_hz: micro as i32,
        })
    }

    pub fn as_f32(self) -> f32 {
        self.integer_hz as f32 + self.fractional_micro_hz as f32 / MICRO as f32
    }
}

impl fmt::Display for FrequencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.integer_hz, self.fractional_micro_hz)
    }
}

/// Fixed mapping between hardware filter codes (the position) and frequencies.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyTable {
    name: &'static str,
    entries: &'static [FrequencyEntry],
}

impl FrequencyTable {
    pub const fn new(name: &'static str, entries: &'static [FrequencyEntry]) -> Self {
        assert!(!entries.is_empty(), "frequency table must not be empty");
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest valid code.
    pub fn last_index(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn entries(&self) -> &'static [FrequencyEntry] {
        self.entries
    }

    /// Clamp a code read back from hardware into the table's range.
    pub fn clamp_index(&self, index: usize) -> usize {
        let last = self.last_index();
        if index > last {
            warn!(table = self.name, index, last, "filter code out of range, clamping");
            last
        } else {
            index
        }
    }

    /// Frequency for a hardware code. Out-of-range codes map to the last entry.
    pub fn decode(&self, index: usize) -> FrequencyEntry {
        self.entries[self.clamp_index(index)]
    }

    /// Hardware code for an exactly matching frequency.
    ///
    /// There is no nearest-match fallback: a value that does not equal a table
    /// entry after the whole/micro split is `ValueNotSupported`.
    pub fn encode(&self, value: f32) -> Result<usize> {
        let wanted = FrequencyEntry::from_f32(value)?;
        self.entries
            .iter()
            .position(|e| *e == wanted)
            .ok_or_else(|| {
                AttrError::ValueNotSupported(format!("{value} Hz is not a {} setting", self.name))
            })
    }

    /// Parse decimal text and encode it.
    pub fn encode_text(&self, text: &str) -> Result<usize> {
        let t = text.trim();
        let value: f32 = t
            .parse()
            .map_err(|_| AttrError::InvalidArgument(format!("not a number: '{t}'")))?;
        self.encode(value)
    }

    /// Every legal value, space separated, in code order.
    pub fn available(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: &[FrequencyEntry] = &[
        FrequencyEntry::new(10, 0),
        FrequencyEntry::new(2, 500000),
        FrequencyEntry::new(0, 125000),
    ];
    const TABLE: FrequencyTable = FrequencyTable::new("test", STEPS);

    #[test]
    fn test_split_truncates() {
        let e = FrequencyEntry::from_f32(2.5).unwrap();
        assert_eq!(e, FrequencyEntry::new(2, 500000));
        let e = FrequencyEntry::from_f32(0.9999999).unwrap();
        assert_eq!(e.integer_hz, 0);
    }

    #[test]
    fn test_split_rejects_non_finite() {
        assert!(matches!(
            FrequencyEntry::from_f32(f32::NAN),
            Err(AttrError::InvalidArgument(_))
        ));
        assert!(matches!(
            FrequencyEntry::from_f32(f32::INFINITY),
            Err(AttrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display_pads_fraction() {
        assert_eq!(FrequencyEntry::new(0, 11000).to_string(), "0.011000");
        assert_eq!(FrequencyEntry::new(480, 0).to_string(), "480.000000");
    }

    #[test]
    fn test_decode_clamps() {
        assert_eq!(TABLE.decode(1), FrequencyEntry::new(2, 500000));
        assert_eq!(TABLE.decode(3), TABLE.decode(2));
        assert_eq!(TABLE.decode(usize::MAX), TABLE.decode(2));
    }

    #[test]
    fn test_encode_exact_only() {
        assert_eq!(TABLE.encode(10.0).unwrap(), 0);
        assert_eq!(TABLE.encode(0.125).unwrap(), 2);
        assert!(matches!(
            TABLE.encode(2.4),
            Err(AttrError::ValueNotSupported(_))
        ));
    }

    #[test]
    fn test_encode_negative_never_matches() {
        assert!(matches!(
            TABLE.encode(-2.5),
            Err(AttrError::ValueNotSupported(_))
        ));
    }

    #[test]
    fn test_round_trip_through_text() {
        for i in 0..TABLE.len() {
            let text = TABLE.decode(i).to_string();
            assert_eq!(TABLE.encode_text(&text).unwrap(), i, "{text}");
        }
    }

    #[test]
    fn test_encode_text_rejects_garbage() {
        assert!(matches!(
            TABLE.encode_text("fast"),
            Err(AttrError::InvalidArgument(_))
        ));
        assert!(matches!(
            TABLE.encode_text(""),
            Err(AttrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_available_lists_in_order() {
        assert_eq!(TABLE.available(), "10.000000 2.500000 0.125000");
    }
}
