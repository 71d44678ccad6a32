//! adxrs290: ADXRS290 gyroscope attributes
//!
//! Register-backed device accessors for the ADXRS290 dual-axis angular rate
//! sensor and the attribute tables that expose its rate, temperature and filter
//! settings as text.

pub mod regs;

mod filter;
pub use filter::{HPF_3DB_TABLE, LPF_3DB_TABLE};

mod device;
pub use device::{sign_extend, Adxrs290, Adxrs290Channel, Adxrs290Init, Adxrs290Mode};

mod attrs;
pub use attrs::{
    anglvel_attributes, attr_device, channel_registry, debug_attributes, temp_attributes,
    ATTR_DIRECT_REG, ATTR_HPF, ATTR_HPF_AVAILABLE, ATTR_LPF, ATTR_LPF_AVAILABLE, ATTR_RAW,
    ATTR_SCALE,
};
