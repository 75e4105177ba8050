//! Mapper 1 (MMC1): a serial shift register accepts one bit per CPU write
//! across `$8000-$FFFF`; the fifth write commits the accumulated value into
//! one of four internal registers selected by the address. Used by *The
//! Legend of Zelda*, *Metroid*, *Final Fantasy*, and hundreds of others.

use crate::{Mapper, Mirroring};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PrgMode {
    /// Switch 32 KB at `$8000`, ignoring the low bit of the bank number.
    Switch32K,
    /// Fix the first bank at `$8000`, switch 16 KB at `$C000`.
    FixFirst,
    /// Fix the last bank at `$C000`, switch 16 KB at `$8000`.
    #[default]
    FixLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ChrMode {
    /// Switch 8 KB at a time via `chr_bank_0`.
    #[default]
    Switch8K,
    /// Switch two independent 4 KB banks.
    Switch4K,
}

/// MMC1 (SxROM) mapper.
pub struct Mmc1 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,
    prg_banks: usize,

    shift_reg: u8,
    shift_count: u8,
    /// CPU cycle of the most recent register write, so a second write
    /// landing on that same cycle (or the very next one) can be ignored.
    /// Real MMC1 silicon latches the shift register from an internal
    /// signal that a write occurring too soon after the previous one
    /// corrupts; test ROMs like Klaus Dormann's exercise this with
    /// back-to-back `INC`/`DEC` on a shift-register address.
    last_write_cycle: Option<u64>,

    mirroring: Mirroring,
    prg_mode: PrgMode,
    chr_mode: ChrMode,

    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,
    prg_ram_enabled: bool,

    has_battery: bool,
}

impl Mmc1 {
    /// Build an MMC1 mapper from raw PRG/CHR banks. `chr_rom` empty means
    /// CHR-RAM (8 KB). `mirroring` seeds the power-on mirroring mode; the
    /// control register overrides it on the first configuration write.
    #[must_use]
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: Mirroring, has_battery: bool) -> Self {
        let prg_banks = (prg_rom.len() / 0x4000).max(1);
        let chr_is_ram = chr_rom.is_empty();
        let chr = if chr_is_ram { vec![0; 0x2000] } else { chr_rom };
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram: vec![0; 0x2000],
            prg_banks,
            shift_reg: 0,
            shift_count: 0,
            last_write_cycle: None,
            mirroring,
            prg_mode: PrgMode::FixLast,
            chr_mode: ChrMode::Switch8K,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_ram_enabled: true,
            has_battery,
        }
    }

    fn write_register(&mut self, addr: u16, value: u8, cpu_cycle: u64) {
        if value & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.prg_mode = PrgMode::FixLast;
            self.last_write_cycle = Some(cpu_cycle);
            return;
        }

        // A write on the same cycle as the previous one (or the
        // immediately following cycle) is the RMW-instruction hazard:
        // the shift register sees two writes from a single `INC`/`DEC`
        // and must only accept the first.
        if let Some(last) = self.last_write_cycle {
            if cpu_cycle <= last + 1 {
                return;
            }
        }
        self.last_write_cycle = Some(cpu_cycle);

        self.shift_reg |= (value & 1) << self.shift_count;
        self.shift_count += 1;

        if self.shift_count == 5 {
            let register = (addr >> 13) & 0x03;
            match register {
                0 => self.write_control(self.shift_reg),
                1 => self.chr_bank_0 = self.shift_reg,
                2 => self.chr_bank_1 = self.shift_reg,
                3 => self.write_prg_bank(self.shift_reg),
                _ => unreachable!(),
            }
            self.shift_reg = 0;
            self.shift_count = 0;
        }
    }

    fn write_control(&mut self, value: u8) {
        self.mirroring = match value & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };
        self.prg_mode = match (value >> 2) & 0x03 {
            0 | 1 => PrgMode::Switch32K,
            2 => PrgMode::FixFirst,
            _ => PrgMode::FixLast,
        };
        self.chr_mode = if value & 0x10 != 0 {
            ChrMode::Switch4K
        } else {
            ChrMode::Switch8K
        };
    }

    fn write_prg_bank(&mut self, value: u8) {
        self.prg_bank = value & 0x0F;
        self.prg_ram_enabled = value & 0x10 == 0;
    }

    fn prg_addr(&self, addr: u16) -> usize {
        let bank = match self.prg_mode {
            PrgMode::Switch32K => {
                let base = usize::from(self.prg_bank & 0x0E);
                if addr < 0xC000 { base } else { base + 1 }
            }
            PrgMode::FixFirst => {
                if addr < 0xC000 {
                    0
                } else {
                    usize::from(self.prg_bank & 0x0F)
                }
            }
            PrgMode::FixLast => {
                if addr < 0xC000 {
                    usize::from(self.prg_bank & 0x0F)
                } else {
                    self.prg_banks - 1
                }
            }
        };
        let bank = bank % self.prg_banks;
        let offset = usize::from(addr & 0x3FFF);
        bank * 0x4000 + offset
    }

    fn chr_addr(&self, addr: u16) -> usize {
        let chr_banks_4k = (self.chr.len() / 0x1000).max(1);
        match self.chr_mode {
            ChrMode::Switch8K => {
                let bank = usize::from(self.chr_bank_0 & 0x1E);
                let offset = usize::from(addr & 0x1FFF);
                (bank * 0x1000 + offset) % self.chr.len().max(1)
            }
            ChrMode::Switch4K => {
                let (bank, offset) = if addr < 0x1000 {
                    (usize::from(self.chr_bank_0), usize::from(addr & 0x0FFF))
                } else {
                    (usize::from(self.chr_bank_1), usize::from(addr & 0x0FFF))
                };
                (bank % chr_banks_4k) * 0x1000 + offset
            }
        }
    }
}

impl Mapper for Mmc1 {
    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled {
                    self.prg_ram[usize::from(addr - 0x6000)]
                } else {
                    0
                }
            }
            0x8000..=0xFFFF => self.prg_rom[self.prg_addr(addr)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8, cpu_cycle: u64) {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled {
                    self.prg_ram[usize::from(addr - 0x6000)] = value;
                }
            }
            0x8000..=0xFFFF => self.write_register(addr, value, cpu_cycle),
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr[self.chr_addr(addr)]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let offset = self.chr_addr(addr);
            self.chr[offset] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn battery_ram(&self) -> Option<&[u8]> {
        self.has_battery.then_some(&self.prg_ram[..])
    }

    fn set_battery_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.prg_ram.len());
        self.prg_ram[..len].copy_from_slice(&data[..len]);
    }

    fn reset(&mut self) {
        self.shift_reg = 0;
        self.shift_count = 0;
        self.prg_mode = PrgMode::FixLast;
        self.last_write_cycle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(prg_banks: usize, chr_banks: usize) -> (Vec<u8>, Vec<u8>) {
        let prg: Vec<u8> = (0..prg_banks * 0x4000).map(|i| (i & 0xFF) as u8).collect();
        let chr: Vec<u8> = (0..chr_banks * 0x2000)
            .map(|i| ((i + 128) & 0xFF) as u8)
            .collect();
        (prg, chr)
    }

    fn write_serial(mapper: &mut Mmc1, addr: u16, value: u8, cycle: &mut u64) {
        for i in 0..5 {
            mapper.cpu_write(addr, (value >> i) & 1, *cycle);
            *cycle += 2;
        }
    }

    #[test]
    fn shift_reset_on_bit7() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg, chr, Mirroring::Horizontal, false);
        mapper.cpu_write(0x8000, 0x00, 0);
        mapper.cpu_write(0x8000, 0x01, 2);
        assert_eq!(mapper.shift_count, 2);
        mapper.cpu_write(0x8000, 0x80, 4);
        assert_eq!(mapper.shift_count, 0);
        assert_eq!(mapper.shift_reg, 0);
    }

    #[test]
    fn consecutive_cycle_write_is_suppressed() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg, chr, Mirroring::Horizontal, false);
        // Two writes on the same cycle: only the first counts.
        mapper.cpu_write(0x8000, 1, 10);
        mapper.cpu_write(0x8000, 1, 10);
        assert_eq!(mapper.shift_count, 1);
        // A write on the immediately following cycle is also suppressed.
        mapper.cpu_write(0x8000, 1, 11);
        assert_eq!(mapper.shift_count, 1);
        // A write two cycles later is accepted.
        mapper.cpu_write(0x8000, 1, 13);
        assert_eq!(mapper.shift_count, 2);
    }

    #[test]
    fn prg_banking_fix_last() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg, chr, Mirroring::Horizontal, false);
        let mut cycle = 0;
        write_serial(&mut mapper, 0x8000, 0x0C, &mut cycle);
        write_serial(&mut mapper, 0xE000, 0x02, &mut cycle);
        assert_eq!(mapper.cpu_read(0x8000), 0x00);
        assert_eq!(mapper.cpu_read(0xC000), 0x00);
    }

    #[test]
    fn mirroring_control_bits() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg, chr, Mirroring::Horizontal, false);
        let mut cycle = 0;
        write_serial(&mut mapper, 0x8000, 0x02, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
        write_serial(&mut mapper, 0x8000, 0x03, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
        write_serial(&mut mapper, 0x8000, 0x00, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
    }

    #[test]
    fn prg_ram_enable_bit() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg, chr, Mirroring::Horizontal, false);
        mapper.cpu_write(0x6000, 0x42, 0);
        assert_eq!(mapper.cpu_read(0x6000), 0x42);
        let mut cycle = 100;
        write_serial(&mut mapper, 0xE000, 0x10, &mut cycle);
        assert_eq!(mapper.cpu_read(0x6000), 0);
    }

    #[test]
    fn battery_ram_round_trips() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg.clone(), chr.clone(), Mirroring::Horizontal, true);
        mapper.cpu_write(0x6000, 0xAB, 0);
        mapper.cpu_write(0x6001, 0xCD, 1);
        let save = mapper.battery_ram().unwrap().to_vec();
        let mut mapper2 = Mmc1::new(prg, chr, Mirroring::Horizontal, true);
        mapper2.set_battery_ram(&save);
        assert_eq!(mapper2.cpu_read(0x6000), 0xAB);
        assert_eq!(mapper2.cpu_read(0x6001), 0xCD);
    }

    #[test]
    fn chr_4k_mode_switches_independent_banks() {
        let (prg, chr) = rom(8, 4);
        let mut mapper = Mmc1::new(prg, chr, Mirroring::Horizontal, false);
        let mut cycle = 0;
        write_serial(&mut mapper, 0x8000, 0x10, &mut cycle);
        write_serial(&mut mapper, 0xA000, 0x02, &mut cycle);
        write_serial(&mut mapper, 0xC000, 0x05, &mut cycle);
        assert_eq!(mapper.chr_mode, ChrMode::Switch4K);
    }
}
