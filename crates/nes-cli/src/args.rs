//! Command-line argument surface, parsed with `clap`'s derive API.

use std::path::PathBuf;

use clap::Parser;

/// Run an iNES ROM headlessly against the emulation core.
#[derive(Debug, Parser)]
#[command(name = "nes-cli", version, about)]
pub struct Args {
    /// Path to the iNES ROM image to run.
    #[arg(long)]
    pub rom: PathBuf,

    /// Run for this many complete PPU frames, then stop.
    #[arg(long, conflicts_with = "cycles")]
    pub frames: Option<u64>,

    /// Run for this many CPU cycles, then stop.
    #[arg(long, conflicts_with = "frames")]
    pub cycles: Option<u64>,

    /// Target emulation rate in frames per second (0 = uncapped). Only
    /// meaningful alongside `--frames`; ignored for `--cycles` runs.
    #[arg(long, default_value_t = 0.0)]
    pub rate: f64,

    /// Accepted for interface compatibility with a future windowed
    /// front-end; this binary is always headless.
    #[arg(long)]
    pub headless: bool,

    /// Stream a nestest-style instruction trace to stderr.
    #[arg(long)]
    pub cpu_trace: bool,

    /// Stream PPU scanline/dot state to stderr.
    #[arg(long)]
    pub ppu_trace: bool,

    /// Log level for `env_logger` (overridden by `RUST_LOG` if set).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
