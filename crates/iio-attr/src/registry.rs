use crate::{
    dispatch::{read_attribute, write_attribute},
    AttrError, AttributeTable, MetricsHub, Result,
};
use tracing::debug;

/// Output capacity per request unless configured otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 0x1000;

const DEBUG_SCOPE: &str = "debug";

/// Attribute tables keyed by channel name, in registration order.
pub struct ChannelRegistry<D> {
    channels: Vec<(String, AttributeTable<D>)>,
    debug: Option<AttributeTable<D>>,
}

impl<D> Default for ChannelRegistry<D> {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            debug: None,
        }
    }
}

impl<D> ChannelRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: &str, table: AttributeTable<D>) -> Result<()> {
        if self.channels.iter().any(|(name, _)| name == channel) {
            return Err(AttrError::DuplicateAttribute(channel.to_string()));
        }
        self.channels.push((channel.to_string(), table));
        Ok(())
    }

    pub fn set_debug(&mut self, table: AttributeTable<D>) {
        self.debug = Some(table);
    }

    pub fn table(&self, channel: &str) -> Result<&AttributeTable<D>> {
        self.channels
            .iter()
            .find(|(name, _)| name == channel)
            .map(|(_, t)| t)
            .ok_or_else(|| AttrError::ChannelNotFound(channel.to_string()))
    }

    pub fn debug_table(&self) -> Result<&AttributeTable<D>> {
        self.debug
            .as_ref()
            .ok_or_else(|| AttrError::ChannelNotFound(DEBUG_SCOPE.to_string()))
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &AttributeTable<D>)> {
        self.channels.iter().map(|(n, t)| (n.as_str(), t))
    }
}

/// A device together with its attribute tables.
///
/// Requests against one `AttrDevice` are serialized by `&mut self`, so per-device
/// state such as a register cursor is never shared between concurrent callers.
pub struct AttrDevice<D> {
    device: D,
    registry: ChannelRegistry<D>,
    buffer_size: usize,
    metrics: Option<MetricsHub>,
}

impl<D> AttrDevice<D> {
    pub fn new(device: D, registry: ChannelRegistry<D>) -> Self {
        Self {
            device,
            registry,
            buffer_size: DEFAULT_BUFFER_SIZE,
            metrics: None,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn registry(&self) -> &ChannelRegistry<D> {
        &self.registry
    }

    pub fn metrics(&self) -> Option<&MetricsHub> {
        self.metrics.as_ref()
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.registry.channels().map(|(n, _)| n)
    }

    /// Read one attribute, or the packed bulk stream when `attr` is empty.
    pub fn read(&mut self, channel: &str, is_output: bool, attr: &str) -> Result<Vec<u8>> {
        let result = self.registry.table(channel).and_then(|table| {
            let mut out = vec![0u8; self.buffer_size];
            let n = read_attribute(&mut self.device, table, channel, is_output, attr, &mut out)?;
            out.truncate(n);
            Ok(out)
        });
        self.observe_read(attr, &result);
        result
    }

    pub fn write(
        &mut self,
        channel: &str,
        is_output: bool,
        attr: &str,
        value: &[u8],
    ) -> Result<usize> {
        let result = self.registry.table(channel).and_then(|table| {
            write_attribute(&mut self.device, table, channel, is_output, attr, value)
        });
        self.observe_write(&result);
        result
    }

    pub fn read_debug(&mut self, attr: &str) -> Result<Vec<u8>> {
        let result = self.registry.debug_table().and_then(|table| {
            let mut out = vec![0u8; self.buffer_size];
            let n = read_attribute(&mut self.device, table, "", false, attr, &mut out)?;
            out.truncate(n);
            Ok(out)
        });
        self.observe_read(attr, &result);
        result
    }

    pub fn write_debug(&mut self, attr: &str, value: &[u8]) -> Result<usize> {
        let result = self
            .registry
            .debug_table()
            .and_then(|table| write_attribute(&mut self.device, table, "", false, attr, value));
        self.observe_write(&result);
        result
    }

    fn observe_read<T>(&self, attr: &str, result: &Result<T>) {
        if let Err(e) = result {
            debug!(attr, error = %e, "read failed");
        }
        if let Some(m) = &self.metrics {
            if attr.is_empty() {
                m.attr.bulk_reads.inc();
            } else {
                m.attr.reads.inc();
            }
            if result.is_err() {
                m.attr.failures.inc();
            }
        }
    }

    fn observe_write<T>(&self, result: &Result<T>) {
        if let Err(e) = result {
            debug!(error = %e, "write failed");
        }
        if let Some(m) = &self.metrics {
            m.attr.writes.inc();
            if result.is_err() {
                m.attr.failures.inc();
            }
        }
    }
}
