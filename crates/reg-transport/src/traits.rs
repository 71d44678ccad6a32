use crate::{BusInfo, RegAddr, Result};

/// A minimal blocking register interface.
pub trait RegisterBus {
    /// Open a device by name (e.g., "spi0.1", "mock0").
    fn open(name: &str) -> Result<Self>
    where
        Self: Sized;

    /// Attempt to list available devices for this backend.
    fn list() -> Result<Vec<BusInfo>>;

    /// Read one register.
    fn read_reg(&mut self, addr: RegAddr) -> Result<u8>;

    /// Write one register.
    fn write_reg(&mut self, addr: RegAddr, value: u8) -> Result<()>;

    /// Read consecutive registers starting at `addr`.
    ///
    /// The default issues one transfer per register; backends with burst reads
    /// should override it.
    fn read_many(&mut self, addr: RegAddr, buf: &mut [u8]) -> Result<()> {
        for (i, slot) in buf.iter_mut().enumerate() {
            let a = addr.offset(i)?;
            *slot = self.read_reg(a)?;
        }
        Ok(())
    }
}
