//! Cartridge mapper implementations.
//!
//! A mapper translates CPU addresses in `$4020-$FFFF` and PPU pattern-table
//! addresses in `$0000-$1FFF` into bytes from the cartridge's PRG/CHR
//! storage, and owns whatever bank-select state makes that translation
//! non-trivial. It knows nothing about the rest of the console — not the
//! CPU, not the PPU's nametable RAM, not `nes-core`'s bus wiring — and is
//! driven purely through the [`Mapper`] trait.

#![warn(missing_docs)]

mod mirroring;
mod mmc1;
mod nrom;

pub use mirroring::Mirroring;
pub use mmc1::Mmc1;
pub use nrom::Nrom;

/// The cartridge-side half of the address bus: PRG access for the CPU,
/// CHR access for the PPU. Nametable RAM is not routed through here —
/// `nes-core`'s bus owns it directly and consults [`Mapper::mirroring`]
/// to resolve which physical kilobyte a nametable address lands on.
pub trait Mapper {
    /// Read a byte from the cartridge's CPU-visible window (`$4020-$FFFF`,
    /// in practice `$6000-$FFFF` for every mapper this crate implements).
    fn cpu_read(&self, addr: u16) -> u8;

    /// Write a byte into the cartridge's CPU-visible window. For ROM
    /// regions this either updates bank-select state (MMC1) or is
    /// ignored (NROM); for PRG-RAM it's a plain store.
    ///
    /// `cpu_cycle` is the CPU's monotone cycle counter at the time of the
    /// write, needed by mappers (MMC1) that must suppress a second write
    /// landing on the same or very next CPU cycle as the first.
    fn cpu_write(&mut self, addr: u16, value: u8, cpu_cycle: u64);

    /// Read a byte from the pattern tables (`$0000-$1FFF`).
    fn ppu_read(&self, addr: u16) -> u8;

    /// Write a byte to the pattern tables. A no-op unless the cartridge
    /// has CHR-RAM.
    fn ppu_write(&mut self, addr: u16, value: u8);

    /// Current nametable mirroring mode.
    fn mirroring(&self) -> Mirroring;

    /// Battery-backed PRG-RAM contents, if this cartridge has any.
    fn battery_ram(&self) -> Option<&[u8]> {
        None
    }

    /// Restore battery-backed PRG-RAM from a previous save.
    fn set_battery_ram(&mut self, _data: &[u8]) {}

    /// Restore power-on mapper state (bank selects, shift register)
    /// without discarding PRG-RAM contents.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nrom_and_mmc1_are_object_safe() {
        fn assert_mapper(_m: &dyn Mapper) {}
        let nrom = Nrom::new(vec![0; 0x8000], Vec::new(), Mirroring::Horizontal);
        assert_mapper(&nrom);
        let mmc1 = Mmc1::new(vec![0; 0x8000 * 2], Vec::new(), Mirroring::Horizontal, false);
        assert_mapper(&mmc1);
    }
}
