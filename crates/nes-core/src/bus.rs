//! The system bus: routes CPU addresses across RAM, the PPU's register
//! file, the APU stub, the controller port, and the mapper, and routes
//! the PPU's own pattern-table/nametable accesses through the mapper and
//! 2 KB of internal VRAM (CIRAM). Everything the CPU or PPU needs from
//! the rest of the console passes through here; neither holds a direct
//! reference to the other.

use nes_mappers::{Mapper, Mirroring};
use nes_ppu::{Ppu, PpuBus};

use crate::apu::ApuStub;
use crate::controller::Controller;

/// Adapts [`NesBus`]'s mapper and CIRAM into the narrow view the PPU
/// needs. Constructed fresh for each PPU tick since it only borrows.
struct PpuMemory<'a> {
    mapper: &'a mut dyn Mapper,
    ciram: &'a mut [u8; 0x800],
    mirroring: Mirroring,
}

impl PpuBus for PpuMemory<'_> {
    fn read_chr(&mut self, addr: u16) -> u8 {
        self.mapper.ppu_read(addr)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        self.mapper.ppu_write(addr, value);
    }

    fn read_nametable(&mut self, addr: u16) -> u8 {
        self.ciram[self.mirroring.resolve(addr)]
    }

    fn write_nametable(&mut self, addr: u16, value: u8) {
        let offset = self.mirroring.resolve(addr);
        self.ciram[offset] = value;
    }
}

/// The full NES system bus: CPU-side memory map, PPU wiring, OAM DMA,
/// controller ports, and the cartridge mapper.
pub struct NesBus {
    ram: [u8; 0x800],
    ciram: [u8; 0x800],
    ppu: Ppu,
    apu: ApuStub,
    mapper: Box<dyn Mapper>,
    controller1: Controller,
    controller2: Controller,
    controller_strobe: bool,
    oam_dma_page: Option<u8>,
    cpu_cycles: u64,
    last_bus_value: u8,
    nmi_pending: bool,
}

impl NesBus {
    /// Build a bus around an already-loaded cartridge mapper.
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        Self {
            ram: [0; 0x800],
            ciram: [0; 0x800],
            ppu: Ppu::new(),
            apu: ApuStub::new(),
            mapper,
            controller1: Controller::new(),
            controller2: Controller::new(),
            controller_strobe: false,
            oam_dma_page: None,
            cpu_cycles: 0,
            last_bus_value: 0,
            nmi_pending: false,
        }
    }

    /// Power-on/reset: clears RAM, CIRAM, and every subsystem's state.
    /// The mapper keeps its PRG-RAM but restores shift-register/bank
    /// state to power-on values.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ciram.fill(0);
        self.ppu.reset();
        self.apu.reset();
        self.mapper.reset();
        self.controller1.reset();
        self.controller2.reset();
        self.controller_strobe = false;
        self.oam_dma_page = None;
        self.cpu_cycles = 0;
        self.last_bus_value = 0;
        self.nmi_pending = false;
    }

    /// Mutable access to controller 1, for a host to set button state.
    pub fn controller1_mut(&mut self) -> &mut Controller {
        &mut self.controller1
    }

    /// Mutable access to controller 2.
    pub fn controller2_mut(&mut self) -> &mut Controller {
        &mut self.controller2
    }

    /// Read-only access to the PPU, for framebuffer/trace inspection.
    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Read-only access to the mapper, for battery-RAM/mirroring queries.
    #[must_use]
    pub fn mapper(&self) -> &dyn Mapper {
        &*self.mapper
    }

    /// Mutable access to the mapper, for restoring battery-RAM.
    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        &mut *self.mapper
    }

    /// Force the APU stub's IRQ line, for tests exercising the IRQ path.
    pub fn set_apu_irq(&mut self, asserted: bool) {
        self.apu.set_irq(asserted);
    }

    /// Replace the PPU wholesale, used when restoring a save-state snapshot.
    #[cfg(feature = "serde")]
    pub(crate) fn restore_ppu(&mut self, ppu: Ppu) {
        self.ppu = ppu;
    }

    /// CPU cycles elapsed since the last reset, used by the mapper's
    /// consecutive-write-suppression logic and by trace output.
    #[must_use]
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    /// Credit CPU cycles elapsed this instruction (called by the Console
    /// after each `Cpu::step`), and drive the PPU/mapper clocks in step.
    pub fn advance(&mut self, cpu_cycles: u8) {
        for _ in 0..cpu_cycles {
            self.tick_ppu_three_dots();
        }
        self.cpu_cycles += u64::from(cpu_cycles);
    }

    fn tick_ppu_three_dots(&mut self) {
        let mirroring = self.mapper.mirroring();
        for _ in 0..3 {
            let mut mem = PpuMemory {
                mapper: &mut *self.mapper,
                ciram: &mut self.ciram,
                mirroring,
            };
            self.ppu.tick(&mut mem);
        }
        if self.ppu.take_nmi() {
            self.nmi_pending = true;
        }
    }

    /// Whether the PPU has raised a fresh NMI edge since the last
    /// acknowledgment.
    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Clear the latched NMI request after forwarding it to the CPU.
    pub fn acknowledge_nmi(&mut self) {
        self.nmi_pending = false;
    }

    /// The mapper's and APU stub's combined IRQ level.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.apu.irq_pending()
    }

    /// Whether an OAM DMA transfer was just requested via `$4014`.
    #[must_use]
    pub fn oam_dma_pending(&self) -> bool {
        self.oam_dma_page.is_some()
    }

    /// Execute a pending OAM DMA transfer: 256 bytes from `page*0x100`
    /// through the standard bus path into PPU OAM. Returns the CPU stall
    /// in cycles (513, or 514 if the transfer began on an odd cycle).
    pub fn execute_oam_dma(&mut self) -> u16 {
        let Some(page) = self.oam_dma_page.take() else {
            return 0;
        };
        let base = u16::from(page) << 8;
        for offset in 0..=u8::MAX {
            let addr = base.wrapping_add(u16::from(offset));
            let value = self.read(addr);
            self.ppu.oam_dma_write(offset, value);
        }
        if self.cpu_cycles % 2 == 1 { 514 } else { 513 }
    }

    fn read_controller(&mut self, port: u8) -> u8 {
        let bit = if port == 0 {
            self.controller1.read()
        } else {
            self.controller2.read()
        };
        bit | (self.last_bus_value & 0xE0)
    }

    fn write_controller_strobe(&mut self, value: u8) {
        self.controller1.write_strobe(value);
        self.controller2.write_strobe(value);
        self.controller_strobe = value & 1 != 0;
    }

    /// Side-effect-free read for debuggers/tracers: never mutates PPU
    /// latches, OAM address, or mapper state.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => self.last_bus_value,
            0x4000..=0x4014 | 0x4016..=0x401F => self.last_bus_value,
            0x4015 => self.apu.read_status(),
            0x4020..=0xFFFF => self.mapper.cpu_read(addr),
        }
    }
}

impl nes_cpu::Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => {
                let mirroring = self.mapper.mirroring();
                let mut mem = PpuMemory {
                    mapper: &mut *self.mapper,
                    ciram: &mut self.ciram,
                    mirroring,
                };
                match addr & 0x7 {
                    2 => self.ppu.read_status(),
                    4 => self.ppu.read_oam_data(),
                    7 => self.ppu.read_data(&mut mem),
                    other => {
                        log::warn!("read from write-only PPU register ${:04x} (reg {other})", addr);
                        self.last_bus_value
                    }
                }
            }
            0x4015 => self.apu.read_status(),
            0x4016 => self.read_controller(0),
            0x4017 => self.read_controller(1),
            0x4000..=0x4013 | 0x4018..=0x401F => self.last_bus_value,
            0x4020..=0xFFFF => self.mapper.cpu_read(addr),
        };
        self.last_bus_value = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_bus_value = value;
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)] = value,
            0x2000..=0x3FFF => {
                let mirroring = self.mapper.mirroring();
                let mut mem = PpuMemory {
                    mapper: &mut *self.mapper,
                    ciram: &mut self.ciram,
                    mirroring,
                };
                match addr & 0x7 {
                    0 => self.ppu.write_ctrl(value, &mut mem),
                    1 => self.ppu.write_mask(value),
                    3 => self.ppu.write_oam_addr(value),
                    4 => self.ppu.write_oam_data(value),
                    5 => self.ppu.write_scroll(value),
                    6 => self.ppu.write_addr(value),
                    7 => self.ppu.write_data(value, &mut mem),
                    other => log::warn!("write to read-only PPU register ${:04x} (reg {other})", addr),
                }
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),
            0x4014 => self.oam_dma_page = Some(value),
            0x4016 => self.write_controller_strobe(value),
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => self.mapper.cpu_write(addr, value, self.cpu_cycles),
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        NesBus::peek(self, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_cpu::Bus;
    use nes_mappers::Nrom;

    fn test_bus() -> NesBus {
        NesBus::new(Box::new(Nrom::new(vec![0; 0x8000], vec![0; 0x2000], Mirroring::Vertical)))
    }

    #[test]
    fn ram_mirrors_every_2kb() {
        let mut bus = test_bus();
        Bus::write(&mut bus, 0x0000, 0x42);
        assert_eq!(Bus::read(&mut bus, 0x0800), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1000), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1800), 0x42);
    }

    #[test]
    fn controller_strobe_latches_and_shifts() {
        let mut bus = test_bus();
        bus.controller1_mut().set_buttons(0b0000_1001); // A, Start
        Bus::write(&mut bus, 0x4016, 1);
        Bus::write(&mut bus, 0x4016, 0);
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 1); // A
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 0); // B
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 0); // Select
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 1); // Start
    }

    #[test]
    fn oam_dma_transfers_256_bytes_and_stalls() {
        let mut bus = test_bus();
        for i in 0..256u16 {
            Bus::write(&mut bus, 0x0200 + i, i as u8);
        }
        Bus::write(&mut bus, 0x4014, 0x02);
        assert!(bus.oam_dma_pending());
        let cycles = bus.execute_oam_dma();
        assert!(!bus.oam_dma_pending());
        assert!(cycles == 513 || cycles == 514);
    }

    #[test]
    fn peek_does_not_mutate_ppu_latch() {
        let mut bus = test_bus();
        Bus::write(&mut bus, 0x2006, 0x20);
        Bus::write(&mut bus, 0x2006, 0x00);
        let before = bus.peek(0x2002);
        let after = bus.peek(0x2002);
        assert_eq!(before, after);
    }

    #[test]
    fn apu_irq_hook_is_visible_on_the_bus() {
        let mut bus = test_bus();
        assert!(!bus.irq_pending());
        bus.set_apu_irq(true);
        assert!(bus.irq_pending());
    }
}
