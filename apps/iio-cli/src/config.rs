use adxrs290::{regs, Adxrs290, Adxrs290Init, Adxrs290Mode, HPF_3DB_TABLE, LPF_3DB_TABLE};
use anyhow::{bail, Context};
use iio_attr::{AttrDevice, FrequencyTable, MetricsHub, DEFAULT_BUFFER_SIZE};
use reg_transport::MockBus;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CONFIG: &str = "configs/adxrs290.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default = "default_bus")]
    pub bus: String,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default)]
    pub init: InitSettings,
    #[serde(default)]
    pub registers: Vec<RegisterPreset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lpf_hz: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpf_hz: Option<f32>,
    #[serde(default = "default_measurement")]
    pub measurement: bool,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            lpf_hz: None,
            hpf_hz: None,
            measurement: true,
        }
    }
}

/// Initial content of one mock register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPreset {
    pub addr: u8,
    pub value: u8,
}

fn default_driver() -> String {
    "adxrs290".to_string()
}

fn default_bus() -> String {
    "mock0".to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_measurement() -> bool {
    true
}

pub fn load_descriptor_file(path: impl AsRef<Path>) -> anyhow::Result<DeviceDescriptor> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading descriptor: {}", path.display()))?;
    parse_descriptor(&raw).with_context(|| format!("decoding descriptor: {}", path.display()))
}

pub fn parse_descriptor(raw: &str) -> anyhow::Result<DeviceDescriptor> {
    let desc: DeviceDescriptor = serde_yaml::from_str(raw).context("parsing yaml")?;
    if desc.driver != "adxrs290" {
        bail!("unsupported driver '{}'", desc.driver);
    }
    if desc.buffer_size == 0 {
        bail!("buffer_size must be positive");
    }
    Ok(desc)
}

fn filter_code(table: &FrequencyTable, hz: Option<f32>) -> anyhow::Result<u8> {
    let Some(hz) = hz else {
        return Ok(0);
    };
    let idx = table.encode(hz).with_context(|| {
        format!(
            "{} filter {hz} Hz (available: {})",
            table.name(),
            table.available()
        )
    })?;
    Ok(u8::try_from(idx)?)
}

impl DeviceDescriptor {
    pub fn init_params(&self) -> anyhow::Result<Adxrs290Init> {
        Ok(Adxrs290Init {
            mode: if self.init.measurement {
                Adxrs290Mode::Measurement
            } else {
                Adxrs290Mode::Standby
            },
            lpf: filter_code(&LPF_3DB_TABLE, self.init.lpf_hz)?,
            hpf: filter_code(&HPF_3DB_TABLE, self.init.hpf_hz)?,
        })
    }

    /// Mock register file: power-on identification plus the configured presets.
    pub fn open_bus(&self) -> MockBus {
        let mut preset = regs::power_on_defaults();
        preset.extend(self.registers.iter().map(|r| (r.addr, r.value)));
        let mut bus = MockBus::with_registers(&self.bus, &preset);
        for id in [regs::ADI_ID, regs::MEMS_ID, regs::DEV_ID, regs::REV_ID] {
            bus.read_only(id.raw());
        }
        bus
    }

    pub fn build(
        &self,
        metrics: Option<MetricsHub>,
    ) -> anyhow::Result<AttrDevice<Adxrs290<MockBus>>> {
        let init = self.init_params()?;
        let dev = Adxrs290::new(self.open_bus(), init)
            .with_context(|| format!("probing {} on {}", self.id, self.bus))?;
        let mut attr = adxrs290::attr_device(dev)?.with_buffer_size(self.buffer_size);
        if let Some(m) = metrics {
            attr = attr.with_metrics(m);
        }
        info!(id = %self.id, bus = %self.bus, "device ready");
        Ok(attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
id: gyro0
bus: mock0
init:
  lpf_hz: 56.6
  hpf_hz: 0.7
registers:
  - { addr: 0x08, value: 0x34 }
  - { addr: 0x09, value: 0xFE }
";

    #[test]
    fn test_defaults_fill_in() {
        let desc = parse_descriptor("id: g").unwrap();
        assert_eq!(desc.driver, "adxrs290");
        assert_eq!(desc.bus, "mock0");
        assert_eq!(desc.buffer_size, 4096);
        assert!(desc.init.measurement);
        assert!(desc.registers.is_empty());
    }

    #[test]
    fn test_filter_hz_maps_to_codes() {
        let desc = parse_descriptor(SAMPLE).unwrap();
        let init = desc.init_params().unwrap();
        assert_eq!(init.lpf, 4);
        assert_eq!(init.hpf, 7);
        assert_eq!(init.mode, Adxrs290Mode::Measurement);
    }

    #[test]
    fn test_unknown_frequency_rejected() {
        let desc = parse_descriptor("id: g\ninit:\n  lpf_hz: 12.5\n").unwrap();
        assert!(desc.init_params().is_err());
    }

    #[test]
    fn test_other_driver_rejected() {
        assert!(parse_descriptor("id: g\ndriver: adxl345\n").is_err());
    }

    #[test]
    fn test_build_reads_presets() {
        let desc = parse_descriptor(SAMPLE).unwrap();
        let mut dev = desc.build(None).unwrap();
        assert_eq!(dev.read("anglvel0", false, "raw").unwrap(), b"-460");
        assert_eq!(
            dev.read("anglvel0", false, "filter_low_pass_3db_frequency").unwrap(),
            b"56.600000"
        );
    }

    #[test]
    fn test_id_registers_survive_writes() {
        let desc = parse_descriptor("id: g").unwrap();
        let mut dev = desc.build(None).unwrap();
        dev.write_debug("direct_reg_access", b"0x00 0x11").unwrap();
        assert_eq!(dev.read_debug("direct_reg_access").unwrap(), b"173");
    }

    #[test]
    fn test_shipped_config_parses() {
        let raw = include_str!("../../../configs/adxrs290.yaml");
        let desc = parse_descriptor(raw).unwrap();
        assert_eq!(desc.id, "gyro0");
        assert!(desc.build(None).is_ok());
    }
}
