use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use adxrs290::{Adxrs290, ATTR_DIRECT_REG};
use iio_attr::{unpack, AttrDevice, BulkRecord, MetricsHub};
use reg_transport::{MockBus, RegisterBus};

mod config;
use config::{load_descriptor_file, DeviceDescriptor, DEFAULT_CONFIG};

type Device = AttrDevice<Adxrs290<MockBus>>;

#[derive(Parser, Debug)]
#[command(
    name = "iio",
    version,
    about = "Sensor channel attribute tool",
    disable_help_subcommand = true
)]
struct Cli {
    /// Device descriptor (YAML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Print prometheus counters after the command
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List register buses, channels and their attributes
    List,
    /// Read one attribute, or every attribute of the channel when --attr is omitted
    Read {
        #[arg(long)]
        channel: String,
        /// Address the output direction of the channel
        #[arg(long, action = ArgAction::SetTrue)]
        output: bool,
        #[arg(long, default_value = "")]
        attr: String,
        /// Emit JSON instead of text
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Write one attribute
    Write {
        #[arg(long)]
        channel: String,
        #[arg(long, action = ArgAction::SetTrue)]
        output: bool,
        #[arg(long)]
        attr: String,
        #[arg(long)]
        value: String,
    },
    /// Peek a register, or poke it when --value is given
    Reg {
        /// Register address, decimal or 0x-prefixed hex
        #[arg(long)]
        addr: String,
        #[arg(long)]
        value: Option<String>,
    },
    /// Poll an attribute and emit NDJSON records
    Watch {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        attr: String,
        #[arg(long, default_value_t = 10u32)]
        count: u32,
        #[arg(long, default_value_t = 100u64)]
        interval_ms: u64,
        /// Append records to this file instead of stdout
        #[arg(long)]
        to: Option<String>,
    },
    /// Print the loaded descriptor as JSON
    DumpConfig,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    let desc = load_descriptor_file(&cli.config)?;

    if let Commands::DumpConfig = cli.command {
        println!("{}", serde_json::to_string_pretty(&desc)?);
        return Ok(());
    }

    let metrics = if cli.metrics {
        Some(MetricsHub::new().map_err(anyhow::Error::msg)?)
    } else {
        None
    };
    let mut dev = desc.build(metrics)?;

    match cli.command {
        Commands::List => list(&desc, &dev)?,
        Commands::Read {
            channel,
            output,
            attr,
            json,
        } => read(&mut dev, &channel, output, &attr, json)?,
        Commands::Write {
            channel,
            output,
            attr,
            value,
        } => {
            let n = dev
                .write(&channel, output, &attr, value.as_bytes())
                .with_context(|| format!("writing {channel}/{attr}"))?;
            info!(channel = %channel, attr = %attr, bytes = n, "attribute written");
            println!("ok\t{n}");
        }
        Commands::Reg { addr, value } => reg(&mut dev, &addr, value.as_deref())?,
        Commands::Watch {
            channel,
            attr,
            count,
            interval_ms,
            to,
        } => watch(&mut dev, &channel, &attr, count, interval_ms, to.as_deref())?,
        Commands::DumpConfig => {}
    }

    if let Some(m) = dev.metrics() {
        print!("{}", m.encode_text());
    }
    Ok(())
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn list(desc: &DeviceDescriptor, dev: &Device) -> Result<()> {
    for bus in MockBus::list()? {
        println!("bus\t{}\t{}", bus.name, bus.driver);
    }
    println!("device\t{}\t{}", desc.id, desc.driver);
    for (name, table) in dev.registry().channels() {
        let attrs: Vec<&str> = table.names().collect();
        println!("{name}\t{}", attrs.join(","));
    }
    if let Ok(table) = dev.registry().debug_table() {
        let attrs: Vec<&str> = table.names().collect();
        println!("debug\t{}", attrs.join(","));
    }
    Ok(())
}

#[derive(Serialize)]
struct AttrValue<'a> {
    channel: &'a str,
    attr: &'a str,
    #[serde(flatten)]
    record: BulkRecord,
}

fn read(dev: &mut Device, channel: &str, output: bool, attr: &str, json: bool) -> Result<()> {
    let raw = dev
        .read(channel, output, attr)
        .with_context(|| format!("reading {channel}/{attr}"))?;

    let pairs: Vec<(&str, BulkRecord)> = if attr.is_empty() {
        let names: Vec<&'static str> = dev.registry().table(channel)?.names().collect();
        let records = unpack(&raw)?;
        if records.len() != names.len() {
            warn!(
                expected = names.len(),
                got = records.len(),
                "bulk record count mismatch"
            );
        }
        names.into_iter().zip(records).collect()
    } else {
        let text = String::from_utf8(raw).context("attribute text is not UTF-8")?;
        vec![(attr, BulkRecord::Value(text))]
    };

    for (name, record) in pairs {
        if json {
            let line = AttrValue {
                channel,
                attr: name,
                record,
            };
            println!("{}", serde_json::to_string(&line)?);
        } else {
            match record {
                BulkRecord::Value(v) => println!("{name}\t{v}"),
                BulkRecord::Failed(code) => println!("{name}\terror {code}"),
            }
        }
    }
    Ok(())
}

fn parse_byte(s: &str) -> Result<u8> {
    let t = s.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => t.parse(),
    };
    parsed.map_err(|e| anyhow!("invalid byte '{t}': {e}"))
}

fn reg(dev: &mut Device, addr: &str, value: Option<&str>) -> Result<()> {
    let addr = parse_byte(addr)?;
    if let Some(v) = value {
        let v = parse_byte(v)?;
        dev.write_debug(ATTR_DIRECT_REG, format!("0x{addr:02x} 0x{v:02x}").as_bytes())
            .with_context(|| format!("writing register 0x{addr:02X}"))?;
    }
    dev.write_debug(ATTR_DIRECT_REG, addr.to_string().as_bytes())
        .with_context(|| format!("selecting register 0x{addr:02X}"))?;
    let raw = dev.read_debug(ATTR_DIRECT_REG)?;
    let text = String::from_utf8(raw).context("register text is not UTF-8")?;
    let byte: u8 = text.trim().parse().context("register value")?;
    println!("0x{addr:02X}\t0x{byte:02X}\t{byte}");
    Ok(())
}

#[derive(Serialize)]
struct WatchRecord<'a> {
    ts: String,
    seq: u32,
    channel: &'a str,
    attr: &'a str,
    #[serde(flatten)]
    record: BulkRecord,
}

fn watch(
    dev: &mut Device,
    channel: &str,
    attr: &str,
    count: u32,
    interval_ms: u64,
    to: Option<&str>,
) -> Result<()> {
    let mut out: Box<dyn Write> = match to {
        Some(path) => {
            let f = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {path}"))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(std::io::stdout().lock()),
    };
    info!(channel, attr, count, interval_ms, "watch started");
    for seq in 0..count {
        if seq > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
        let record = match dev.read(channel, false, attr) {
            Ok(raw) => BulkRecord::Value(String::from_utf8_lossy(&raw).into_owned()),
            Err(e) => {
                warn!(channel, attr, error = %e, "watch read failed");
                BulkRecord::Failed(e.code())
            }
        };
        let rec = WatchRecord {
            ts: now_rfc3339(),
            seq,
            channel,
            attr,
            record,
        };
        writeln!(out, "{}", serde_json::to_string(&rec)?)?;
    }
    out.flush()?;
    Ok(())
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
