use crate::{Result, TransportError};
use core::fmt;

/// 8-bit register address
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RegAddr(pub u8);

impl RegAddr {
    pub fn raw(self) -> u8 {
        self.0
    }

    /// Address `n` registers past this one, failing on wrap-around.
    pub fn offset(self, n: usize) -> Result<Self> {
        u8::try_from(usize::from(self.0) + n)
            .map(RegAddr)
            .map_err(|_| TransportError::InvalidAddress(self.0))
    }
}

impl From<u8> for RegAddr {
    fn from(v: u8) -> Self {
        RegAddr(v)
    }
}

impl fmt::Display for RegAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{raw:02X}", raw = self.0)
    }
}

#[derive(Clone, Debug)]
pub struct BusInfo {
    pub name: String,
    pub driver: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_within_range() {
        let a = RegAddr(0x08).offset(1).unwrap();
        assert_eq!(a, RegAddr(0x09));
    }

    #[test]
    fn test_offset_wraps_is_error() {
        let err = RegAddr(0xFF).offset(1).unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(0xFF)));
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(RegAddr(0x12).to_string(), "0x12");
    }
}
