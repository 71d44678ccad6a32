use crate::{regs, HPF_3DB_TABLE, LPF_3DB_TABLE};
use iio_attr::{AttrError, Result};
use reg_transport::{RegAddr, RegisterBus};
use tracing::{debug, info};

/// Sensor channels, numbered as in the channel names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adxrs290Channel {
    X,
    Y,
    Temp,
}

impl Adxrs290Channel {
    pub const ALL: [Adxrs290Channel; 3] = [Self::X, Self::Y, Self::Temp];

    pub fn from_number(n: i32) -> Result<Self> {
        match n {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Temp),
            other => Err(AttrError::InvalidArgument(format!(
                "no ADXRS290 channel {other}"
            ))),
        }
    }

    pub fn number(self) -> i32 {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Temp => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "anglvel0",
            Self::Y => "anglvel1",
            Self::Temp => "temp2",
        }
    }

    /// First of the two little-endian data registers.
    pub fn data_reg(self) -> RegAddr {
        match self {
            Self::X => regs::DATAX0,
            Self::Y => regs::DATAY0,
            Self::Temp => regs::TEMP0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adxrs290Mode {
    Standby,
    #[default]
    Measurement,
}

/// Settings applied when the device is brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adxrs290Init {
    pub mode: Adxrs290Mode,
    /// Low-pass filter code, index into [`LPF_3DB_TABLE`].
    pub lpf: u8,
    /// High-pass filter code, index into [`HPF_3DB_TABLE`].
    pub hpf: u8,
}

/// Keep the low `bits` bits of `raw` and sign-extend them.
pub fn sign_extend(raw: u16, bits: u32) -> i32 {
    debug_assert!((1..=16).contains(&bits));
    let mask = (1u32 << bits) - 1;
    let v = u32::from(raw) & mask;
    if v & (1 << (bits - 1)) != 0 {
        v as i32 - (1i32 << bits)
    } else {
        v as i32
    }
}

/// An ADXRS290 on a register bus, plus the direct-register cursor.
pub struct Adxrs290<B> {
    bus: B,
    direct_reg: RegAddr,
}

impl<B: RegisterBus> Adxrs290<B> {
    /// Probe the identification registers and apply `init`.
    pub fn new(bus: B, init: Adxrs290Init) -> Result<Self> {
        let mut dev = Self::unchecked(bus);
        for (reg, expected) in [
            (regs::ADI_ID, regs::ADI_ID_VAL),
            (regs::MEMS_ID, regs::MEMS_ID_VAL),
            (regs::DEV_ID, regs::DEV_ID_VAL),
        ] {
            let got = dev.reg_read(reg)?;
            if got != expected {
                return Err(AttrError::InvalidArgument(format!(
                    "unexpected id at {reg}: 0x{got:02X} (want 0x{expected:02X})"
                )));
            }
        }
        dev.set_lpf(init.lpf)?;
        dev.set_hpf(init.hpf)?;
        dev.set_mode(init.mode)?;
        info!(lpf = %LPF_3DB_TABLE.decode(usize::from(init.lpf)),
              hpf = %HPF_3DB_TABLE.decode(usize::from(init.hpf)),
              mode = ?init.mode, "adxrs290 ready");
        Ok(dev)
    }

    /// Wrap a bus without probing or configuring the part.
    pub fn unchecked(bus: B) -> Self {
        Self {
            bus,
            direct_reg: RegAddr(0),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    pub fn reg_read(&mut self, addr: RegAddr) -> Result<u8> {
        Ok(self.bus.read_reg(addr)?)
    }

    pub fn reg_write(&mut self, addr: RegAddr, value: u8) -> Result<()> {
        Ok(self.bus.write_reg(addr, value)?)
    }

    /// Register read by the direct register access attribute.
    pub fn direct_reg(&self) -> RegAddr {
        self.direct_reg
    }

    pub fn select_direct_reg(&mut self, addr: u32) -> Result<()> {
        let addr = checked_addr(addr)?;
        debug!(%addr, "direct register selected");
        self.direct_reg = addr;
        Ok(())
    }

    /// Raw 16-bit sample of a channel.
    pub fn get_rate_data(&mut self, channel: Adxrs290Channel) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.bus.read_many(channel.data_reg(), &mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    /// Temperature sample, sign-extended from its 12-bit field.
    pub fn get_temp_data(&mut self) -> Result<i32> {
        let raw = self.get_rate_data(Adxrs290Channel::Temp)?;
        Ok(sign_extend(raw as u16, regs::TEMP_BITS))
    }

    pub fn get_lpf(&mut self) -> Result<u8> {
        Ok(self.reg_read(regs::FILTER)? & regs::FILTER_LPF_MASK)
    }

    pub fn get_hpf(&mut self) -> Result<u8> {
        Ok((self.reg_read(regs::FILTER)? & regs::FILTER_HPF_MASK) >> regs::FILTER_HPF_SHIFT)
    }

    pub fn set_lpf(&mut self, code: u8) -> Result<()> {
        if usize::from(code) > LPF_3DB_TABLE.last_index() {
            return Err(AttrError::InvalidArgument(format!("low-pass code {code}")));
        }
        self.update_filter(regs::FILTER_LPF_MASK, code)
    }

    pub fn set_hpf(&mut self, code: u8) -> Result<()> {
        if usize::from(code) > HPF_3DB_TABLE.last_index() {
            return Err(AttrError::InvalidArgument(format!("high-pass code {code}")));
        }
        self.update_filter(regs::FILTER_HPF_MASK, code << regs::FILTER_HPF_SHIFT)
    }

    fn update_filter(&mut self, mask: u8, bits: u8) -> Result<()> {
        let cur = self.reg_read(regs::FILTER)?;
        let next = (cur & !mask) | (bits & mask);
        self.reg_write(regs::FILTER, next)
    }

    pub fn set_mode(&mut self, mode: Adxrs290Mode) -> Result<()> {
        let cur = self.reg_read(regs::POWER_CTL)?;
        let next = match mode {
            Adxrs290Mode::Measurement => cur | regs::POWER_MEASUREMENT | regs::POWER_TSM,
            Adxrs290Mode::Standby => cur & !regs::POWER_MEASUREMENT,
        };
        self.reg_write(regs::POWER_CTL, next)
    }

    pub fn mode(&mut self) -> Result<Adxrs290Mode> {
        let cur = self.reg_read(regs::POWER_CTL)?;
        Ok(if cur & regs::POWER_MEASUREMENT != 0 {
            Adxrs290Mode::Measurement
        } else {
            Adxrs290Mode::Standby
        })
    }

    pub fn serial_number(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.bus.read_many(regs::SN0, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn data_ready(&mut self) -> Result<bool> {
        Ok(self.reg_read(regs::DATA_READY)? & 0x01 != 0)
    }
}

pub(crate) fn checked_addr(addr: u32) -> Result<RegAddr> {
    match u8::try_from(addr) {
        Ok(a) if a <= regs::MAX_REG_ADDR => Ok(RegAddr(a)),
        _ => Err(AttrError::InvalidArgument(format!(
            "register 0x{addr:X} beyond 0x{:02X}",
            regs::MAX_REG_ADDR
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reg_transport::MockBus;

    fn bus() -> MockBus {
        MockBus::with_registers("mock0", &regs::power_on_defaults())
    }

    #[test]
    fn test_sign_extend_temperature() {
        assert_eq!(sign_extend(0xF234, 12), 564);
        assert_eq!(sign_extend(0xF800, 12), -2048);
        assert_eq!(sign_extend(0x0FFF, 12), -1);
        assert_eq!(sign_extend(0x07FF, 12), 2047);
        assert_eq!(sign_extend(0x8000, 16), -32768);
    }

    #[test]
    fn test_probe_and_init() {
        let init = Adxrs290Init {
            mode: Adxrs290Mode::Measurement,
            lpf: 4,
            hpf: 7,
        };
        let mut dev = Adxrs290::new(bus(), init).unwrap();
        assert_eq!(dev.get_lpf().unwrap(), 4);
        assert_eq!(dev.get_hpf().unwrap(), 7);
        assert_eq!(dev.mode().unwrap(), Adxrs290Mode::Measurement);
        assert_eq!(dev.bus().register(regs::FILTER.raw()), 0x74);
    }

    #[test]
    fn test_probe_rejects_wrong_part() {
        let mut b = bus();
        b.set_register(regs::DEV_ID.raw(), 0x00);
        let err = Adxrs290::new(b, Adxrs290Init::default()).err().unwrap();
        assert!(matches!(err, AttrError::InvalidArgument(_)));
    }

    #[test]
    fn test_probe_surfaces_transport_error() {
        let mut b = bus();
        b.fail_reads_at(regs::ADI_ID.raw());
        let err = Adxrs290::new(b, Adxrs290Init::default()).err().unwrap();
        assert!(matches!(err, AttrError::Transport(_)));
    }

    #[test]
    fn test_filter_updates_preserve_other_field() {
        let mut dev = Adxrs290::unchecked(bus());
        dev.set_hpf(10).unwrap();
        dev.set_lpf(3).unwrap();
        assert_eq!(dev.get_hpf().unwrap(), 10);
        assert_eq!(dev.get_lpf().unwrap(), 3);
        assert!(matches!(dev.set_lpf(8), Err(AttrError::InvalidArgument(_))));
        assert!(matches!(dev.set_hpf(11), Err(AttrError::InvalidArgument(_))));
    }

    #[test]
    fn test_rate_data_is_little_endian() {
        let mut b = bus();
        b.set_register(0x0A, 0x34);
        b.set_register(0x0B, 0xFE);
        let mut dev = Adxrs290::unchecked(b);
        assert_eq!(dev.get_rate_data(Adxrs290Channel::Y).unwrap(), -460);
    }

    #[test]
    fn test_temperature_ignores_upper_nibble() {
        let mut b = bus();
        b.set_register(0x0C, 0x00);
        b.set_register(0x0D, 0xF8);
        let mut dev = Adxrs290::unchecked(b);
        assert_eq!(dev.get_temp_data().unwrap(), -2048);
    }

    #[test]
    fn test_standby_clears_measurement() {
        let mut dev = Adxrs290::new(bus(), Adxrs290Init::default()).unwrap();
        dev.set_mode(Adxrs290Mode::Standby).unwrap();
        assert_eq!(dev.mode().unwrap(), Adxrs290Mode::Standby);
    }

    #[test]
    fn test_serial_number() {
        let mut b = bus();
        for (i, v) in [0x78, 0x56, 0x34, 0x12].into_iter().enumerate() {
            b.set_register(0x04 + i as u8, v);
        }
        let mut dev = Adxrs290::unchecked(b);
        assert_eq!(dev.serial_number().unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_direct_register_cursor_bounds() {
        let mut dev = Adxrs290::unchecked(bus());
        dev.select_direct_reg(0x12).unwrap();
        assert_eq!(dev.direct_reg(), RegAddr(0x12));
        assert!(dev.select_direct_reg(0x13).is_err());
        assert!(dev.select_direct_reg(0x1_0005).is_err());
        assert_eq!(dev.direct_reg(), RegAddr(0x12));
    }
}
