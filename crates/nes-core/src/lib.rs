//! Integration layer for the NES emulation core: the bus, the cartridge
//! loader, and the `Console` type a host or test harness drives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Console                              │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                       NesBus                         │    │
//! │  │  ┌─────┐  ┌─────┐  ┌─────────┐  ┌────────┐  ┌──────┐│    │
//! │  │  │ RAM │  │ PPU │  │ ApuStub │  │ Mapper │  │ Pads ││    │
//! │  │  │ 2KB │  │2C02 │  │         │  │NROM/MMC1│ │      ││    │
//! │  │  └─────┘  └─────┘  └─────────┘  └────────┘  └──────┘│    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │                           ▲                                  │
//! │                           │                                  │
//! │                      ┌────┴────┐                             │
//! │                      │   CPU   │                             │
//! │                      │  6502   │                             │
//! │                      └─────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use nes_core::Console;
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut console = nes_core::Console::from_rom_bytes(&rom_data).expect("invalid ROM");
//!
//! let outcome = console.run_frames(1);
//! let _framebuffer = console.framebuffer_rgba();
//! assert!(!outcome.halted);
//! ```
//!
//! # Features
//!
//! - `serde`: enables [`save_state`] and `Serialize`/`Deserialize` on the
//!   underlying CPU/PPU state types.

#![warn(missing_docs)]

mod apu;
mod bus;
mod cartridge;
mod console;
mod controller;
mod error;
pub mod palette;
#[cfg(feature = "serde")]
mod save_state;

pub use apu::ApuStub;
pub use bus::NesBus;
pub use cartridge::{load as load_rom, Cartridge, LoadError};
pub use console::{Console, RunOutcome, CPU_CYCLES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use controller::{Button, Controller};
pub use error::ConsoleError;
#[cfg(feature = "serde")]
pub use save_state::SaveState;

// Re-exported so a host only needs to depend on `nes-core`.
pub use nes_cpu::{Cpu, Status};
pub use nes_mappers::{Mapper, Mirroring};
pub use nes_ppu::Ppu;

/// Crate version, for diagnostics/about screens.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
