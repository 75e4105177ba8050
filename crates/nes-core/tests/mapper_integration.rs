//! End-to-end mapper behavior, exercised through `Console` rather than
//! directly against `Mapper` impls, so bank switches are observed the
//! way a running program would see them: through CPU reads dispatched
//! by the bus.

use nes_core::Console;

fn ines_header(prg_16k_banks: u8, chr_8k_banks: u8, mapper: u8, vertical_mirroring: bool) -> Vec<u8> {
    let mut header = vec![0u8; 16];
    header[0..4].copy_from_slice(b"NES\x1A");
    header[4] = prg_16k_banks;
    header[5] = chr_8k_banks;
    header[6] = (mapper << 4) | u8::from(vertical_mirroring);
    header[7] = mapper & 0xF0;
    header
}

#[test]
fn nrom_reads_are_stable_across_the_32kb_window() {
    let mut prg = vec![0xEA; 0x8000];
    prg[0] = 0x11; // a tracer byte at the very start of PRG
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;

    let mut rom = ines_header(2, 1, 0, false);
    rom.extend_from_slice(&prg);
    rom.extend_from_slice(&[0; 0x2000]);

    let console = Console::from_rom_bytes(&rom).expect("NROM-256 should load");
    assert_eq!(console.peek_memory(0x8000), 0x11);
}

#[test]
fn mmc1_prg_bank_switch_is_visible_through_the_bus() {
    // Two 16KB PRG banks, each opening with a distinct tracer byte, so a
    // successful bank switch changes what $8000 reads back as.
    let mut prg = vec![0xEAu8; 0x8000];
    prg[0x0000] = 0xAA; // bank 0 tracer
    prg[0x4000] = 0xBB; // bank 1 tracer
    // Reset vector lives in the fixed last bank ($C000-$FFFF).
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;

    let mut rom = ines_header(4, 0, 1, false);
    rom.extend_from_slice(&prg);

    let mut console = Console::from_rom_bytes(&rom).expect("MMC1 ROM should load");

    // Power-on MMC1 defaults to 16KB-switchable-low / fixed-high mode
    // with bank 0 selected at $8000, so the tracer byte should read back
    // immediately.
    assert_eq!(console.peek_memory(0x8000), 0xAA);

    // Reset the shift register (bit 7 set on any write), then shift in
    // control value 0x0E (mode 3: 16KB switchable low, fixed high) one
    // bit per write to $8000-$9FFF, five writes total.
    write_mmc1(&mut console, 0x8000, 0x80); // reset
    for bit in [0, 1, 1, 1, 0] {
        write_mmc1(&mut console, 0x8000, bit);
    }
    // Select PRG bank 1 via $E000-$FFFF, five more shifted-in writes.
    for bit in [1, 0, 0, 0, 0] {
        write_mmc1(&mut console, 0xE000, bit);
    }

    assert_eq!(console.peek_memory(0x8000), 0xBB, "bank switch should now expose bank 1");
}

fn write_mmc1(console: &mut Console, addr: u16, bit: u8) {
    // Each MMC1 shift-register write must land on a distinct CPU cycle;
    // stepping between pokes keeps the consecutive-write suppression
    // from swallowing them.
    console.write_memory(addr, bit);
    console.step();
}
