use iio_attr::{FrequencyEntry, FrequencyTable};

/// Low-pass 3 dB cut-off per FILTER LPF code.
pub const LPF_3DB_TABLE: FrequencyTable = FrequencyTable::new(
    "low-pass",
    &[
        FrequencyEntry::new(480, 0),
        FrequencyEntry::new(320, 0),
        FrequencyEntry::new(160, 0),
        FrequencyEntry::new(80, 0),
        FrequencyEntry::new(56, 600000),
        FrequencyEntry::new(40, 0),
        FrequencyEntry::new(28, 300000),
        FrequencyEntry::new(20, 0),
    ],
);

/// High-pass 3 dB cut-off per FILTER HPF code. Code 0 bypasses the filter.
pub const HPF_3DB_TABLE: FrequencyTable = FrequencyTable::new(
    "high-pass",
    &[
        FrequencyEntry::new(0, 0),
        FrequencyEntry::new(0, 11000),
        FrequencyEntry::new(0, 22000),
        FrequencyEntry::new(0, 44000),
        FrequencyEntry::new(0, 87000),
        FrequencyEntry::new(0, 175000),
        FrequencyEntry::new(0, 350000),
        FrequencyEntry::new(0, 700000),
        FrequencyEntry::new(1, 400000),
        FrequencyEntry::new(2, 800000),
        FrequencyEntry::new(11, 300000),
    ],
);
