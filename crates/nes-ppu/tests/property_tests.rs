//! Property test for the dot/scanline state machine's universal bound:
//! `(scanline, dot)` must stay within `(262, 341)` no matter how many
//! ticks have elapsed, since other code indexes framebuffer rows/columns
//! and CIRAM offsets from these counters without re-checking them.

use nes_ppu::{Ppu, PpuBus};
use proptest::prelude::*;

struct NullBus;

impl PpuBus for NullBus {
    fn read_chr(&mut self, _addr: u16) -> u8 {
        0
    }
    fn write_chr(&mut self, _addr: u16, _value: u8) {}
    fn read_nametable(&mut self, _addr: u16) -> u8 {
        0
    }
    fn write_nametable(&mut self, _addr: u16, _value: u8) {}
}

proptest! {
    #[test]
    fn dot_and_scanline_always_stay_in_range(ticks in 0u32..3000) {
        let mut ppu = Ppu::new();
        let mut bus = NullBus;
        for _ in 0..ticks {
            ppu.tick(&mut bus);
            prop_assert!(ppu.dot() <= 340);
            prop_assert!(ppu.scanline() <= 261);
        }
    }
}
