use crate::{BusInfo, RegAddr, RegisterBus, Result, TransportError};
use std::collections::HashSet;
use tracing::trace;

/// A simple in-process register file. Each bus instance is independent.
pub struct MockBus {
    name: String,
    regs: [u8; 256],
    read_only: HashSet<u8>,
    fail_reads: HashSet<u8>,
    fail_writes: HashSet<u8>,
}

impl MockBus {
    /// Open a mock bus with its register file seeded from `(addr, value)` pairs.
    pub fn with_registers(name: &str, preset: &[(u8, u8)]) -> Self {
        let mut bus = Self::blank(name);
        for &(addr, value) in preset {
            bus.regs[usize::from(addr)] = value;
        }
        bus
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            regs: [0u8; 256],
            read_only: HashSet::new(),
            fail_reads: HashSet::new(),
            fail_writes: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backdoor write that bypasses read-only masks and fault injection.
    pub fn set_register(&mut self, addr: u8, value: u8) {
        self.regs[usize::from(addr)] = value;
    }

    /// Backdoor read that bypasses fault injection.
    pub fn register(&self, addr: u8) -> u8 {
        self.regs[usize::from(addr)]
    }

    /// Silently ignore bus writes to `addr`, like identification registers.
    pub fn read_only(&mut self, addr: u8) {
        self.read_only.insert(addr);
    }

    /// Make every bus read of `addr` fail with an I/O error.
    pub fn fail_reads_at(&mut self, addr: u8) {
        self.fail_reads.insert(addr);
    }

    /// Make every bus write of `addr` fail with an I/O error.
    pub fn fail_writes_at(&mut self, addr: u8) {
        self.fail_writes.insert(addr);
    }

    /// Remove all injected faults.
    pub fn clear_faults(&mut self) {
        self.fail_reads.clear();
        self.fail_writes.clear();
    }
}

impl RegisterBus for MockBus {
    fn open(name: &str) -> Result<Self> {
        Ok(Self::blank(name))
    }

    fn list() -> Result<Vec<BusInfo>> {
        Ok(vec![BusInfo {
            name: "mock0".to_string(),
            driver: "mock".to_string(),
        }])
    }

    fn read_reg(&mut self, addr: RegAddr) -> Result<u8> {
        if self.fail_reads.contains(&addr.raw()) {
            return Err(TransportError::Io(format!("injected read fault at {addr}")));
        }
        let value = self.regs[usize::from(addr.raw())];
        trace!(bus = %self.name, %addr, value, "reg read");
        Ok(value)
    }

    fn write_reg(&mut self, addr: RegAddr, value: u8) -> Result<()> {
        if self.fail_writes.contains(&addr.raw()) {
            return Err(TransportError::Io(format!("injected write fault at {addr}")));
        }
        trace!(bus = %self.name, %addr, value, "reg write");
        if !self.read_only.contains(&addr.raw()) {
            self.regs[usize::from(addr.raw())] = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_and_read() {
        let mut bus = MockBus::with_registers("mock0", &[(0x00, 0xAD), (0x11, 0x25)]);
        assert_eq!(bus.read_reg(RegAddr(0x00)).unwrap(), 0xAD);
        assert_eq!(bus.read_reg(RegAddr(0x11)).unwrap(), 0x25);
        assert_eq!(bus.read_reg(RegAddr(0x05)).unwrap(), 0x00);
    }

    #[test]
    fn test_write_then_read() -> anyhow::Result<()> {
        let mut bus = MockBus::open("mock0")?;
        bus.write_reg(RegAddr(0x05), 0x7F)?;
        assert_eq!(bus.read_reg(RegAddr(0x05))?, 0x7F);
        Ok(())
    }

    #[test]
    fn test_read_only_register_ignores_writes() {
        let mut bus = MockBus::with_registers("mock0", &[(0x00, 0xAD)]);
        bus.read_only(0x00);
        bus.write_reg(RegAddr(0x00), 0x11).unwrap();
        assert_eq!(bus.register(0x00), 0xAD);
    }

    #[test]
    fn test_injected_faults() {
        let mut bus = MockBus::with_registers("mock0", &[]);
        bus.fail_reads_at(0x08);
        bus.fail_writes_at(0x10);
        assert!(matches!(
            bus.read_reg(RegAddr(0x08)),
            Err(TransportError::Io(_))
        ));
        assert!(matches!(
            bus.write_reg(RegAddr(0x10), 1),
            Err(TransportError::Io(_))
        ));
        bus.clear_faults();
        assert!(bus.read_reg(RegAddr(0x08)).is_ok());
    }

    #[test]
    fn test_read_many_is_consecutive() {
        let mut bus = MockBus::with_registers("mock0", &[(0x08, 0x34), (0x09, 0x12)]);
        let mut buf = [0u8; 2];
        bus.read_many(RegAddr(0x08), &mut buf).unwrap();
        assert_eq!(buf, [0x34, 0x12]);
    }

    #[test]
    fn test_read_many_past_end_fails() {
        let mut bus = MockBus::with_registers("mock0", &[]);
        let mut buf = [0u8; 2];
        assert!(bus.read_many(RegAddr(0xFF), &mut buf).is_err());
    }
}
