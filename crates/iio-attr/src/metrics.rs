use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

#[derive(Clone)]
pub struct AttrMetrics {
    pub reads: IntCounter,
    pub writes: IntCounter,
    pub bulk_reads: IntCounter,
    pub failures: IntCounter,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub attr: AttrMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let reads = IntCounter::new("iio_attr_reads", "Total attribute reads")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let writes = IntCounter::new("iio_attr_writes", "Total attribute writes")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let bulk_reads = IntCounter::new("iio_attr_bulk_reads", "Total bulk attribute reads")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let failures = IntCounter::new("iio_attr_failures", "Attribute requests that failed")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let attr = AttrMetrics {
            reads,
            writes,
            bulk_reads,
            failures,
        };
        let _ = registry.register(Box::new(attr.reads.clone()));
        let _ = registry.register(Box::new(attr.writes.clone()));
        let _ = registry.register(Box::new(attr.bulk_reads.clone()));
        let _ = registry.register(Box::new(attr.failures.clone()));
        Ok(Self { registry, attr })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_show_in_text() {
        let hub = MetricsHub::new().unwrap();
        hub.attr.reads.inc();
        hub.attr.reads.inc();
        hub.attr.failures.inc();
        let text = hub.encode_text();
        assert!(text.contains("iio_attr_reads 2"));
        assert!(text.contains("iio_attr_failures 1"));
        assert!(text.contains("iio_attr_writes 0"));
    }
}
