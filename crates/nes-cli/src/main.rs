//! Headless command-line harness for the NES emulation core. Loads a
//! ROM, runs it for a bounded number of frames or cycles (or until the
//! CPU halts), and reports a final-state summary. Exists to give the
//! emulation crates a runnable host without pulling in a windowing
//! backend; see `nes-core` for the embeddable API.

mod args;
mod error;

use std::time::{Duration, Instant};

use clap::Parser;
use log::{info, warn};

use args::Args;
use error::CliError;
use nes_core::Console;
use nes_cpu::Trace;

fn main() {
    let args = Args::parse();

    let env = env_logger::Env::default().default_filter_or(args.log_level.clone());
    env_logger::Builder::from_env(env).init();

    if !args.headless {
        warn!("--headless is the only supported mode; ignoring request for windowed output");
    }

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<i32, CliError> {
    let rom_data = std::fs::read(&args.rom).map_err(|source| CliError::RomIo {
        path: args.rom.clone(),
        source,
    })?;

    info!("loaded {} ({} bytes)", args.rom.display(), rom_data.len());

    let mut console = Console::from_rom_bytes(&rom_data)?;

    let frame_budget = if args.rate > 0.0 {
        Some(Duration::from_secs_f64(1.0 / args.rate))
    } else {
        None
    };

    let halted = if let Some(cycles) = args.cycles {
        run_cycles(&mut console, cycles, args)
    } else {
        let frames = args.frames.unwrap_or(1);
        run_frames(&mut console, frames, frame_budget, args)
    };

    println!("cycles: {}", console.total_cycles());
    println!("frames: {}", console.frame_count());
    println!("halted: {halted}");
    println!("pc: {:#06x}", console.cpu().pc);

    Ok(0)
}

fn trace_step(console: &Console, args: &Args) {
    if args.cpu_trace {
        let trace = Trace::capture(console.cpu(), console.bus());
        eprintln!("{trace}");
    }
    if args.ppu_trace {
        let ppu = console.bus().ppu();
        eprintln!(
            "PPU scanline={} dot={} frame={}",
            ppu.scanline(),
            ppu.dot(),
            ppu.frame_count()
        );
    }
}

fn run_cycles(console: &mut Console, cycles: u64, args: &Args) -> bool {
    let target = console.total_cycles() + cycles;
    while console.total_cycles() < target {
        if console.halted() {
            break;
        }
        trace_step(console, args);
        console.step();
    }
    console.halted()
}

fn run_frames(console: &mut Console, frames: u64, budget: Option<Duration>, args: &Args) -> bool {
    for _ in 0..frames {
        if console.halted() {
            break;
        }
        let frame_start = Instant::now();
        let start_frame = console.frame_count();
        while console.frame_count() == start_frame {
            if console.halted() {
                break;
            }
            trace_step(console, args);
            console.step();
        }
        if let Some(budget) = budget {
            let elapsed = frame_start.elapsed();
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            }
        }
    }
    console.halted()
}
