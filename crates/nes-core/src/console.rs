//! The `Console`: the thin integration type a host or test harness drives.
//! Owns the bus and CPU, paces the PPU against CPU cycles, and exposes
//! the bounded-run operations (`run`, `run_cycles`, `run_frames`,
//! `run_until_halt`) described as the core's host-facing surface.

use std::sync::atomic::{AtomicBool, Ordering};

use nes_cpu::{Bus as _, Cpu, Status};

use crate::bus::NesBus;
use crate::cartridge;
use crate::controller::Button;
use crate::error::ConsoleError;
use crate::palette;

/// NES screen width in pixels.
pub const SCREEN_WIDTH: usize = nes_ppu::WIDTH;
/// NES screen height in pixels.
pub const SCREEN_HEIGHT: usize = nes_ppu::HEIGHT;
/// Approximate CPU cycles in one NTSC frame (`341 * 262 / 3`, rounded).
pub const CPU_CYCLES_PER_FRAME: u64 = 29_780;

/// The outcome of a bounded run: how far it got and whether the CPU
/// halted on a JAM/KIL opcode along the way. Halting is a documented
/// terminal state, not a failure, so this is a plain result rather than
/// an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// CPU cycles actually executed.
    pub cycles: u64,
    /// Whether the CPU is halted (JAM/KIL) at the end of the run.
    pub halted: bool,
    /// Whether the run stopped early because the host's cancellation
    /// flag was observed set, rather than reaching its bound or halting.
    pub cancelled: bool,
}

/// The NES console: CPU, bus (which in turn owns the PPU, APU stub,
/// controllers, and mapper), and a small amount of run-state.
pub struct Console {
    cpu: Cpu,
    bus: NesBus,
    total_cycles: u64,
}

impl Console {
    /// Parse an iNES ROM image and build a console around it.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Load`] if the ROM is malformed or names an
    /// unsupported mapper.
    pub fn from_rom_bytes(rom_data: &[u8]) -> Result<Self, ConsoleError> {
        let mapper = cartridge::load(rom_data)?;
        Ok(Self::with_mapper(mapper))
    }

    /// Build a console directly from an already-constructed mapper,
    /// bypassing the iNES loader (used by tests that synthesize ROMs).
    #[must_use]
    pub fn with_mapper(mapper: Box<dyn nes_mappers::Mapper>) -> Self {
        let mut bus = NesBus::new(mapper);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        Self {
            cpu,
            bus,
            total_cycles: 0,
        }
    }

    /// Power-on reset: reinitializes the CPU and every bus subsystem.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.total_cycles = 0;
    }

    /// Execute exactly one CPU instruction (or one DMA/stall cycle, or
    /// one interrupt dispatch), paces the PPU alongside it, and returns
    /// the number of CPU cycles consumed.
    pub fn step(&mut self) -> u8 {
        if self.bus.oam_dma_pending() {
            let cycles = self.bus.execute_oam_dma();
            self.bus.advance(cycles as u8);
            self.total_cycles += u64::from(cycles);
            return cycles as u8;
        }

        if self.bus.nmi_pending() {
            self.bus.acknowledge_nmi();
            self.cpu.trigger_nmi();
        } else {
            self.cpu.set_irq(self.bus.irq_pending());
        }

        let cycles = self.cpu.step(&mut self.bus);
        self.bus.advance(cycles);
        self.total_cycles += u64::from(cycles);
        cycles
    }

    /// Run for exactly `cycles` CPU cycles (rounded up to the instruction
    /// boundary that crosses it), or until the CPU halts, whichever comes
    /// first.
    pub fn run_cycles(&mut self, cycles: u64) -> RunOutcome {
        self.run_cycles_cancellable(cycles, &Self::never_cancel())
    }

    /// Run for `frames` complete PPU frames, or until the CPU halts.
    pub fn run_frames(&mut self, frames: u64) -> RunOutcome {
        self.run_frames_cancellable(frames, &Self::never_cancel())
    }

    /// Run until the CPU halts on a JAM/KIL opcode. Never returns for a
    /// ROM that doesn't halt; callers that need a bound should use
    /// [`run_cycles`](Self::run_cycles) instead.
    pub fn run_until_halt(&mut self) -> RunOutcome {
        self.run_until_halt_cancellable(&Self::never_cancel())
    }

    /// As [`run_cycles`](Self::run_cycles), but also stops as soon as
    /// `cancel` is observed set. Checked between instructions, so a long
    /// run can be interrupted by a host without waiting for its bound.
    pub fn run_cycles_cancellable(&mut self, cycles: u64, cancel: &AtomicBool) -> RunOutcome {
        let target = self.total_cycles + cycles;
        let mut cancelled = false;
        while self.total_cycles < target {
            if self.cpu.halted() {
                break;
            }
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            self.step();
        }
        RunOutcome {
            cycles: self.total_cycles,
            halted: self.cpu.halted(),
            cancelled,
        }
    }

    /// As [`run_frames`](Self::run_frames), but also stops as soon as
    /// `cancel` is observed set. Checked between instructions and at
    /// frame boundaries.
    pub fn run_frames_cancellable(&mut self, frames: u64, cancel: &AtomicBool) -> RunOutcome {
        let start_frame = self.bus.ppu().frame_count();
        let target_frame = start_frame + frames;
        let mut cancelled = false;
        while self.bus.ppu().frame_count() < target_frame {
            if self.cpu.halted() {
                break;
            }
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            self.step();
        }
        RunOutcome {
            cycles: self.total_cycles,
            halted: self.cpu.halted(),
            cancelled,
        }
    }

    /// As [`run_until_halt`](Self::run_until_halt), but also stops as soon
    /// as `cancel` is observed set.
    pub fn run_until_halt_cancellable(&mut self, cancel: &AtomicBool) -> RunOutcome {
        let mut cancelled = false;
        while !self.cpu.halted() {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            self.step();
        }
        RunOutcome {
            cycles: self.total_cycles,
            halted: self.cpu.halted(),
            cancelled,
        }
    }

    /// A flag that's never set, for the non-cancellable run methods to
    /// share their cancellable counterparts' implementation.
    fn never_cancel() -> AtomicBool {
        AtomicBool::new(false)
    }

    /// The rendered picture, converted from the PPU's palette indices to
    /// interleaved RGBA bytes (`SCREEN_WIDTH * SCREEN_HEIGHT * 4` long).
    #[must_use]
    pub fn framebuffer_rgba(&self) -> Vec<u8> {
        palette::frame_to_rgba(self.bus.ppu().framebuffer())
    }

    /// The PPU's raw framebuffer of 6-bit palette indices.
    #[must_use]
    pub fn framebuffer_indices(&self) -> &[u8] {
        self.bus.ppu().framebuffer()
    }

    /// Set a single button's state on controller 1.
    pub fn set_button_1(&mut self, button: Button, pressed: bool) {
        self.bus.controller1_mut().set_button(button, pressed);
    }

    /// Set a single button's state on controller 2.
    pub fn set_button_2(&mut self, button: Button, pressed: bool) {
        self.bus.controller2_mut().set_button(button, pressed);
    }

    /// Replace controller 1's entire button bitmask at once.
    pub fn set_controller_1(&mut self, buttons: u8) {
        self.bus.controller1_mut().set_buttons(buttons);
    }

    /// Replace controller 2's entire button bitmask at once.
    pub fn set_controller_2(&mut self, buttons: u8) {
        self.bus.controller2_mut().set_buttons(buttons);
    }

    /// Total CPU cycles executed since the last reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Frames rendered since the last reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.bus.ppu().frame_count()
    }

    /// Whether the CPU has halted on a JAM/KIL opcode.
    #[must_use]
    pub fn halted(&self) -> bool {
        self.cpu.halted()
    }

    /// Current CPU status flags, for trace/diagnostic output.
    #[must_use]
    pub fn cpu_status(&self) -> Status {
        self.cpu.status()
    }

    /// Peek a bus address without triggering register side effects.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Write a byte to the bus as the CPU would, with the usual register
    /// side effects (mapper shift registers, PPU latches, OAM DMA trigger).
    /// Exists for test harnesses and debuggers that need to poke state
    /// without executing instructions.
    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.bus.write(addr, value);
    }

    /// Force the APU stub's IRQ line, for exercising the IRQ path without
    /// a real APU (see `nes_core::bus::NesBus::set_apu_irq`).
    pub fn set_apu_irq(&mut self, asserted: bool) {
        self.bus.set_apu_irq(asserted);
    }

    /// Reference to the CPU, for trace/debugging consumers.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Reference to the bus, for trace/debugging consumers.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// Battery-backed PRG-RAM, if the cartridge has any, for a host to
    /// persist between sessions.
    #[must_use]
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.bus.mapper().battery_ram()
    }

    /// Restore battery-backed PRG-RAM from a previous session.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        self.bus.mapper_mut().set_battery_ram(data);
    }

    /// Overwrite CPU/PPU/cycle-count state from a save-state snapshot.
    /// The mapper and battery-RAM are left untouched here; callers apply
    /// battery-RAM separately via [`load_battery_ram`](Self::load_battery_ram).
    #[cfg(feature = "serde")]
    pub(crate) fn restore_from_parts(&mut self, cpu: Cpu, ppu: nes_ppu::Ppu, total_cycles: u64) {
        self.cpu = cpu;
        self.bus.restore_ppu(ppu);
        self.total_cycles = total_cycles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_mappers::{Mirroring, Nrom};

    fn nop_loop_console() -> Console {
        let mut prg = vec![0xEA; 0x8000]; // NOP forest
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80; // reset vector -> $8000
        let mapper = Box::new(Nrom::new(prg, vec![0; 0x2000], Mirroring::Horizontal));
        Console::with_mapper(mapper)
    }

    #[test]
    fn stepping_advances_cycles() {
        let mut console = nop_loop_console();
        let cycles = console.step();
        assert!(cycles > 0);
        assert_eq!(console.total_cycles(), u64::from(cycles));
    }

    #[test]
    fn run_cycles_stops_at_target() {
        let mut console = nop_loop_console();
        let outcome = console.run_cycles(1000);
        assert!(outcome.cycles >= 1000);
        assert!(!outcome.halted);
    }

    #[test]
    fn reset_clears_cycle_count() {
        let mut console = nop_loop_console();
        console.run_cycles(500);
        console.reset();
        assert_eq!(console.total_cycles(), 0);
    }

    #[test]
    fn jam_opcode_halts_run_until_halt() {
        let mut prg = vec![0xEA; 0x8000];
        prg[0] = 0x02; // JAM
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        let mapper = Box::new(Nrom::new(prg, vec![0; 0x2000], Mirroring::Horizontal));
        let mut console = Console::with_mapper(mapper);
        let outcome = console.run_until_halt();
        assert!(outcome.halted);
        assert!(console.halted());
    }

    #[test]
    fn framebuffer_rgba_has_expected_length() {
        let console = nop_loop_console();
        let fb = console.framebuffer_rgba();
        assert_eq!(fb.len(), SCREEN_WIDTH * SCREEN_HEIGHT * 4);
    }

    #[test]
    fn cancellation_flag_stops_a_run_short_of_its_bound() {
        let mut console = nop_loop_console();
        let cancel = AtomicBool::new(true);
        let outcome = console.run_cycles_cancellable(1_000_000, &cancel);
        assert!(outcome.cancelled);
        assert!(outcome.cycles < 1_000_000);
    }

    #[test]
    fn an_unset_cancellation_flag_runs_to_the_bound() {
        let mut console = nop_loop_console();
        let cancel = AtomicBool::new(false);
        let outcome = console.run_cycles_cancellable(1000, &cancel);
        assert!(!outcome.cancelled);
        assert!(outcome.cycles >= 1000);
    }
}
