//! ADXRS290 register map.

use reg_transport::RegAddr;

pub const ADI_ID: RegAddr = RegAddr(0x00);
pub const MEMS_ID: RegAddr = RegAddr(0x01);
pub const DEV_ID: RegAddr = RegAddr(0x02);
pub const REV_ID: RegAddr = RegAddr(0x03);
pub const SN0: RegAddr = RegAddr(0x04);
pub const DATAX0: RegAddr = RegAddr(0x08);
pub const DATAY0: RegAddr = RegAddr(0x0A);
pub const TEMP0: RegAddr = RegAddr(0x0C);
pub const POWER_CTL: RegAddr = RegAddr(0x10);
pub const FILTER: RegAddr = RegAddr(0x11);
pub const DATA_READY: RegAddr = RegAddr(0x12);

/// Highest address reachable through direct register access.
pub const MAX_REG_ADDR: u8 = 0x12;

pub const ADI_ID_VAL: u8 = 0xAD;
pub const MEMS_ID_VAL: u8 = 0x1D;
pub const DEV_ID_VAL: u8 = 0x92;

// POWER_CTL
pub const POWER_MEASUREMENT: u8 = 1 << 1;
pub const POWER_TSM: u8 = 1 << 0;

// FILTER: LPF code in bits 2:0, HPF code in bits 7:4
pub const FILTER_LPF_MASK: u8 = 0x07;
pub const FILTER_HPF_MASK: u8 = 0xF0;
pub const FILTER_HPF_SHIFT: u32 = 4;

/// Temperature data width in bits.
pub const TEMP_BITS: u32 = 12;

/// Register values of a freshly powered part.
pub fn power_on_defaults() -> Vec<(u8, u8)> {
    vec![
        (ADI_ID.raw(), ADI_ID_VAL),
        (MEMS_ID.raw(), MEMS_ID_VAL),
        (DEV_ID.raw(), DEV_ID_VAL),
        (REV_ID.raw(), 0x01),
    ]
}
