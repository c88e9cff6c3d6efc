//! grblstream command-line entry point
//!
//! Resolves configuration, opens the serial device, and runs the
//! single-threaded stream loop: transmit while the window allows, read
//! device lines under a short deadline, and feed each one back to the
//! dispatcher.

use anyhow::Context;
use clap::Parser;
use grblstream::{
    find_device, open_port, CommandSink, DeviceResponse, Line, LineDisplay, Overrides,
    SerialSession, Settings, StreamConfig, Streamer, TrafficLog,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slice of time each pass of the loop spends waiting for device output
const READ_SLICE: Duration = Duration::from_millis(100);

/// How long to wait for the GRBL greeting after opening the port
const GREETING_WAIT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "grblstream", version, about = "Stream G-code to a GRBL CNC controller")]
struct Args {
    /// G-code file to stream ("-" reads from stdin)
    gcode: String,

    /// Serial device: port path or USB serial number (auto-discovered when
    /// omitted)
    #[arg(short, long)]
    device: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Mirror serial traffic to this log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// GRBL receive buffer size in bytes
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Settings file path (default: ~/.grblstream.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Disable `?` status polling
    #[arg(long)]
    no_poll: bool,
}

/// Prints per-line progress as the dispatcher fires its notifications
struct ConsoleLine {
    number: usize,
    text: String,
}

impl LineDisplay for ConsoleLine {
    fn marked_sent(&self) {
        println!("> {:>5}  {}", self.number, self.text.trim_end());
    }

    fn status_attached(&self, status: &str) {
        println!("  {:>5}  {}", self.number, status);
    }
}

fn read_gcode(source: &str) -> anyhow::Result<Vec<String>> {
    if source == "-" {
        let stdin = std::io::stdin();
        let lines: Result<Vec<String>, _> = stdin.lock().lines().collect();
        return lines.context("reading G-code from stdin");
    }
    let content = std::fs::read_to_string(source)
        .with_context(|| format!("reading G-code file {}", source))?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}

fn main() -> anyhow::Result<()> {
    grblstream::init_logging()?;
    let args = Args::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(grblstream::default_settings_path);
    let settings = Settings::load_or_create(&settings_path)?;

    let overrides = Overrides {
        device: args.device.clone(),
        baud: args.baud,
        log_file: args.log_file.clone(),
        buffer_size: args.buffer_size,
        disable_polling: args.no_poll,
    };
    let config = StreamConfig::resolve(&settings, &overrides);

    let gcode = read_gcode(&args.gcode)?;
    tracing::info!("{} lines loaded from {}", gcode.len(), args.gcode);

    let port_name = find_device(config.device.as_deref())?;
    let port = open_port(&port_name, config.baud)?;
    tracing::info!("connected to {} at {} baud", port_name, config.baud);

    let mut session = SerialSession::new(port);
    if let Some(path) = &config.log_file {
        session = session.with_log(TrafficLog::create(path)?);
        tracing::info!("mirroring serial traffic to {}", path.display());
    }

    // GRBL resets when the port opens; report its greeting before streaming.
    let banner: Vec<_> = session
        .read_lines(Some(GREETING_WAIT))
        .collect::<std::io::Result<_>>()?;
    for line in &banner {
        if !line.is_empty() {
            tracing::info!("device: {}", line);
        }
    }

    let mut streamer = Streamer::with_capacity(session, config.buffer_size);
    for (number, text) in gcode.into_iter().enumerate() {
        let display = Arc::new(ConsoleLine {
            number: number + 1,
            text: text.clone(),
        });
        streamer.enqueue(Line::new(text).with_display(display))?;
    }

    let mut rejected = 0usize;
    let mut last_poll = Instant::now();

    while !streamer.finished() {
        if config.status_polling && last_poll.elapsed() >= config.poll_interval {
            // Realtime command; bypasses the receive buffer accounting.
            streamer.sink_mut().write(b"?")?;
            last_poll = Instant::now();
        }

        let received: Vec<_> = streamer
            .sink_mut()
            .read_lines(Some(READ_SLICE))
            .collect::<std::io::Result<_>>()?;

        for text in received {
            if text.is_empty() {
                continue;
            }
            match streamer.on_response(&text) {
                Ok(alarm @ DeviceResponse::Alarm { .. }) => {
                    tracing::warn!("{}", alarm);
                }
                Ok(DeviceResponse::Report { raw }) => {
                    tracing::debug!("status: {}", raw);
                }
                Ok(_) => {}
                Err(e) if e.is_command_rejected() => {
                    rejected += 1;
                    tracing::error!("{}", e);
                }
                Err(e) => return Err(e).context("stream aborted"),
            }
        }
    }

    if rejected > 0 {
        tracing::warn!("stream complete; {} line(s) rejected by the device", rejected);
    } else {
        tracing::info!("stream complete");
    }

    Ok(())
}
