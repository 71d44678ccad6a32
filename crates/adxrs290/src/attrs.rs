use crate::device::checked_addr;
use crate::{Adxrs290, Adxrs290Channel, HPF_3DB_TABLE, LPF_3DB_TABLE};
use iio_attr::{
    AttrDevice, AttrError, Attribute, AttributeTable, ChannelInfo, ChannelRegistry,
    FrequencyTable, Result,
};
use reg_transport::RegisterBus;
use tracing::debug;

pub const ATTR_RAW: &str = "raw";
pub const ATTR_SCALE: &str = "scale";
pub const ATTR_HPF: &str = "filter_high_pass_3db_frequency";
pub const ATTR_LPF: &str = "filter_low_pass_3db_frequency";
pub const ATTR_HPF_AVAILABLE: &str = "filter_high_pass_3db_frequency_available";
pub const ATTR_LPF_AVAILABLE: &str = "filter_low_pass_3db_frequency_available";
pub const ATTR_DIRECT_REG: &str = "direct_reg_access";

// 1 LSB = 0.1 degC, reported in milli-degC
const TEMP_SCALE: &str = "100";
// 1 LSB = 0.005 deg/s = 0.000087266 rad/s
const ANGLVEL_SCALE: &str = "0.000087266";

fn get_raw<B: RegisterBus>(dev: &mut Adxrs290<B>, ch: &ChannelInfo) -> Result<String> {
    let value = match Adxrs290Channel::from_number(ch.number)? {
        Adxrs290Channel::Temp => dev.get_temp_data()?,
        axis => i32::from(dev.get_rate_data(axis)?),
    };
    Ok(value.to_string())
}

fn get_scale<B: RegisterBus>(_dev: &mut Adxrs290<B>, ch: &ChannelInfo) -> Result<String> {
    let scale = match Adxrs290Channel::from_number(ch.number)? {
        Adxrs290Channel::Temp => TEMP_SCALE,
        _ => ANGLVEL_SCALE,
    };
    Ok(scale.to_string())
}

fn get_hpf<B: RegisterBus>(dev: &mut Adxrs290<B>, _ch: &ChannelInfo) -> Result<String> {
    let code = dev.get_hpf()?;
    Ok(HPF_3DB_TABLE.decode(usize::from(code)).to_string())
}

fn set_hpf<B: RegisterBus>(dev: &mut Adxrs290<B>, _ch: &ChannelInfo, value: &str) -> Result<()> {
    let code = filter_code(&HPF_3DB_TABLE, value)?;
    dev.set_hpf(code)
}

fn get_lpf<B: RegisterBus>(dev: &mut Adxrs290<B>, _ch: &ChannelInfo) -> Result<String> {
    let code = dev.get_lpf()?;
    Ok(LPF_3DB_TABLE.decode(usize::from(code)).to_string())
}

fn set_lpf<B: RegisterBus>(dev: &mut Adxrs290<B>, _ch: &ChannelInfo, value: &str) -> Result<()> {
    let code = filter_code(&LPF_3DB_TABLE, value)?;
    dev.set_lpf(code)
}

fn filter_code(table: &FrequencyTable, value: &str) -> Result<u8> {
    let idx = table.encode_text(value)?;
    debug!(table = table.name(), value, code = idx, "filter code");
    u8::try_from(idx).map_err(|_| AttrError::InvalidArgument(format!("filter code {idx}")))
}

fn get_hpf_available<B: RegisterBus>(_dev: &mut Adxrs290<B>, _ch: &ChannelInfo) -> Result<String> {
    Ok(HPF_3DB_TABLE.available())
}

fn get_lpf_available<B: RegisterBus>(_dev: &mut Adxrs290<B>, _ch: &ChannelInfo) -> Result<String> {
    Ok(LPF_3DB_TABLE.available())
}

fn get_direct_reg<B: RegisterBus>(dev: &mut Adxrs290<B>, _ch: &ChannelInfo) -> Result<String> {
    let addr = dev.direct_reg();
    Ok(dev.reg_read(addr)?.to_string())
}

/// Accepts `"0xADDR 0xVALUE"` to poke a register, or a lone address to select
/// the register that the next read returns.
fn set_direct_reg<B: RegisterBus>(
    dev: &mut Adxrs290<B>,
    _ch: &ChannelInfo,
    value: &str,
) -> Result<()> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    match tokens.as_slice() {
        [addr, val] => {
            let addr = parse_hex(addr)?;
            let val = parse_hex(val)?;
            let addr = checked_addr(addr)?;
            dev.reg_write(addr, (val & 0xFF) as u8)
        }
        [addr] => {
            let addr = parse_addr(addr)?;
            dev.select_direct_reg(addr)
        }
        _ => Err(AttrError::InvalidArgument(format!(
            "expected '0xADDR 0xVALUE' or 'ADDR', got '{value}'"
        ))),
    }
}

fn parse_hex(token: &str) -> Result<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .ok_or_else(|| AttrError::InvalidArgument(format!("expected 0x prefix: '{token}'")))?;
    u32::from_str_radix(digits, 16)
        .map_err(|_| AttrError::InvalidArgument(format!("bad hex number: '{token}'")))
}

fn parse_addr(token: &str) -> Result<u32> {
    if token.starts_with("0x") || token.starts_with("0X") {
        return parse_hex(token);
    }
    token
        .parse()
        .map_err(|_| AttrError::InvalidArgument(format!("bad register address: '{token}'")))
}

/// Attributes of the two angular-rate channels.
pub fn anglvel_attributes<B: RegisterBus>() -> Result<AttributeTable<Adxrs290<B>>> {
    AttributeTable::new([
        Attribute::read_only(ATTR_RAW, get_raw),
        Attribute::read_only(ATTR_SCALE, get_scale),
        Attribute::read_write(ATTR_HPF, get_hpf, set_hpf),
        Attribute::read_write(ATTR_LPF, get_lpf, set_lpf),
        Attribute::read_only(ATTR_HPF_AVAILABLE, get_hpf_available),
        Attribute::read_only(ATTR_LPF_AVAILABLE, get_lpf_available),
    ])
}

/// Attributes of the temperature channel.
pub fn temp_attributes<B: RegisterBus>() -> Result<AttributeTable<Adxrs290<B>>> {
    AttributeTable::new([
        Attribute::read_only(ATTR_RAW, get_raw),
        Attribute::read_only(ATTR_SCALE, get_scale),
    ])
}

pub fn debug_attributes<B: RegisterBus>() -> Result<AttributeTable<Adxrs290<B>>> {
    AttributeTable::new([Attribute::read_write(
        ATTR_DIRECT_REG,
        get_direct_reg,
        set_direct_reg,
    )])
}

/// Every channel of the part with its attribute table.
pub fn channel_registry<B: RegisterBus>() -> Result<ChannelRegistry<Adxrs290<B>>> {
    let mut reg = ChannelRegistry::new();
    for ch in Adxrs290Channel::ALL {
        let table = match ch {
            Adxrs290Channel::Temp => temp_attributes()?,
            _ => anglvel_attributes()?,
        };
        reg.insert(ch.name(), table)?;
    }
    reg.set_debug(debug_attributes()?);
    Ok(reg)
}

pub fn attr_device<B: RegisterBus>(dev: Adxrs290<B>) -> Result<AttrDevice<Adxrs290<B>>> {
    Ok(AttrDevice::new(dev, channel_registry()?))
}
