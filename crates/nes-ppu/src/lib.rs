//! Scanline/dot-accurate 2C02 PPU interpreter.
//!
//! Like `nes-cpu`, this crate knows nothing about the rest of the
//! console: pattern-table and nametable access happens exclusively
//! through the [`PpuBus`] trait, and [`Ppu::tick`] advances the dot/
//! scanline state machine by exactly one dot per call. The caller (a
//! `nes-core` bus) owns CIRAM and the mapper, and decides how CPU reads
//! and writes to `$2000-$2007` dispatch onto the register methods below.

#![warn(missing_docs)]

mod background;
mod oam;
mod ppu;
mod registers;
mod scroll;
mod timing;
mod vram;

pub use ppu::{Ppu, PpuBus, HEIGHT, WIDTH};
