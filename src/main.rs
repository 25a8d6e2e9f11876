// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use clap::Parser;
use tracing::{info, warn};

use stereomux::device::sim::SimulatedSdk;
use stereomux::{AlignTarget, FlowStatus, MuxSource, SourceConfig};

/// Run the mux source against the simulated camera backend and report the
/// buffers it produces. A real deployment links a vendor SDK binding behind
/// the same device seam instead.
#[derive(Parser)]
#[command(name = "stereomux")]
#[command(about = "Multiplexed color + depth frame source")]
#[command(version)]
struct Cli {
    /// Alignment between color and depth: 0=none, 1=color, 2=depth
    #[arg(long, default_value = "1")]
    align: i32,

    /// Width of the color stream
    #[arg(long, default_value = "1280")]
    color_width: u32,

    /// Height of the color stream
    #[arg(long, default_value = "720")]
    color_height: u32,

    /// Frame rate of the color stream
    #[arg(long, default_value = "30")]
    color_fps: u32,

    /// Width of the depth stream
    #[arg(long, default_value = "640")]
    depth_width: u32,

    /// Height of the depth stream
    #[arg(long, default_value = "480")]
    depth_height: u32,

    /// Frame rate of the depth stream
    #[arg(long, default_value = "30")]
    depth_fps: u32,

    /// Optional advanced-mode preset JSON applied at start
    #[arg(long)]
    preset_file: Option<PathBuf>,

    /// Number of buffers to produce (0 = run until Ctrl-C)
    #[arg(long, default_value = "0")]
    frames: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=stereomux=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = SourceConfig::default();
    match AlignTarget::from_index(cli.align) {
        Some(align) => config.set_align(align),
        None => warn!(align = cli.align, "Unknown alignment value, keeping default"),
    }
    config.set_color_width(cli.color_width);
    config.set_color_height(cli.color_height);
    config.set_color_fps(cli.color_fps);
    config.set_depth_width(cli.depth_width);
    config.set_depth_height(cli.depth_height);
    config.set_depth_fps(cli.depth_fps);
    config.set_preset_file(cli.preset_file);

    let sdk = Arc::new(SimulatedSdk::new());
    let mut source = MuxSource::new(sdk, config);

    // Ctrl-C raises the cooperative cancellation signal; the in-flight
    // cycle still delivers its buffer, flagged as flushing.
    let stop_signal = source.stop_signal();
    ctrlc::set_handler(move || {
        stop_signal.store(true, Ordering::SeqCst);
    })?;

    source.start()?;
    if let Some(geometry) = source.output_geometry() {
        info!(geometry = %geometry, bitrate_bps = geometry.bitrate_bps(), "Producing buffers");
    }

    loop {
        let (buffer, status) = source.create()?;
        info!(
            index = buffer.index,
            pts_ms = buffer.pts.as_millis() as u64,
            bytes = buffer.data.len(),
            "Buffer produced"
        );
        if status == FlowStatus::Flushing {
            info!("Flushing, stopping source");
            break;
        }
        if cli.frames > 0 && buffer.index + 1 >= cli.frames {
            break;
        }
    }

    source.stop();
    Ok(())
}
