//! iio-attr: named, textual attributes over device registers
//!
//! A device contributes ordered tables of attribute handlers, one per channel
//! class. Requests are resolved by attribute name and dispatched to a handler,
//! or, for the empty name, every handler in the table is read and packed into a
//! single length-prefixed buffer.

mod error;
pub use error::{AttrError, Result};

mod types;
pub use types::{Attribute, AttributeTable, ChannelInfo, ReadFn, WriteFn};

mod freq;
pub use freq::{FrequencyEntry, FrequencyTable};

mod dispatch;
pub use dispatch::{parse_channel_number, read_attribute, resolve, write_attribute};

mod pack;
pub use pack::{pack_all, round_up4, unpack, BulkRecord};

mod registry;
pub use registry::{AttrDevice, ChannelRegistry, DEFAULT_BUFFER_SIZE};

mod metrics;
pub use metrics::{AttrMetrics, MetricsHub};
