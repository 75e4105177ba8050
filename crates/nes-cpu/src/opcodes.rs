//! Opcode decode table.
//!
//! [`decode`] maps every one of the 256 opcode bytes to its mnemonic,
//! addressing mode, base cycle count, and whether a crossed page adds
//! a cycle (true only for the handful of read instructions in indexed
//! or indirect-indexed modes; writes and read-modify-writes always pay
//! the worst case up front). [`crate::cpu::Cpu::execute`] re-decodes the
//! same byte through a plain `match` to perform the operation — keeping
//! decode (for tracing/cycle accounting) and execution (for semantics)
//! as two small, independently readable pieces rather than one handler
//! per opcode.

use crate::addressing::AddrMode;

/// Decoded opcode metadata.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    /// Assembler mnemonic, including the `*` convention is omitted —
    /// illegal opcodes share the mnemonic of their documented cousin
    /// where one exists (e.g. `LAX`, `SLO`) or a short invented name.
    pub mnemonic: &'static str,
    /// Addressing mode used to resolve the operand.
    pub mode: AddrMode,
    /// Base cycle count, excluding branch and page-cross penalties.
    pub cycles: u8,
    /// Whether crossing a page while resolving the address adds a cycle.
    pub page_cross: bool,
}

const fn op(mnemonic: &'static str, mode: AddrMode, cycles: u8, page_cross: bool) -> OpInfo {
    OpInfo {
        mnemonic,
        mode,
        cycles,
        page_cross,
    }
}

/// Decode a single opcode byte. Total and complete over `u8`.
#[rustfmt::skip]
#[must_use]
pub const fn decode(opcode: u8) -> OpInfo {
    use AddrMode::{
        Absolute as Abs, AbsoluteX as Abx, AbsoluteY as Aby, Accumulator as Acc,
        Immediate as Imm, Implicit as Imp, Indirect as Ind, IndirectX as Idx,
        IndirectY as Idy, Relative as Rel, ZeroPage as Zp0, ZeroPageX as Zpx,
        ZeroPageY as Zpy,
    };
    match opcode {
        0x00 => op("BRK", Imp, 7, false), 0x01 => op("ORA", Idx, 6, false),
        0x02 => op("JAM", Imp, 0, false), 0x03 => op("SLO", Idx, 8, false),
        0x04 => op("NOP", Zp0, 3, false), 0x05 => op("ORA", Zp0, 3, false),
        0x06 => op("ASL", Zp0, 5, false), 0x07 => op("SLO", Zp0, 5, false),
        0x08 => op("PHP", Imp, 3, false), 0x09 => op("ORA", Imm, 2, false),
        0x0A => op("ASL", Acc, 2, false), 0x0B => op("ANC", Imm, 2, false),
        0x0C => op("NOP", Abs, 4, false), 0x0D => op("ORA", Abs, 4, false),
        0x0E => op("ASL", Abs, 6, false), 0x0F => op("SLO", Abs, 6, false),

        0x10 => op("BPL", Rel, 2, false), 0x11 => op("ORA", Idy, 5, true),
        0x12 => op("JAM", Imp, 0, false), 0x13 => op("SLO", Idy, 8, false),
        0x14 => op("NOP", Zpx, 4, false), 0x15 => op("ORA", Zpx, 4, false),
        0x16 => op("ASL", Zpx, 6, false), 0x17 => op("SLO", Zpx, 6, false),
        0x18 => op("CLC", Imp, 2, false), 0x19 => op("ORA", Aby, 4, true),
        0x1A => op("NOP", Imp, 2, false), 0x1B => op("SLO", Aby, 7, false),
        0x1C => op("NOP", Abx, 4, true),  0x1D => op("ORA", Abx, 4, true),
        0x1E => op("ASL", Abx, 7, false), 0x1F => op("SLO", Abx, 7, false),

        0x20 => op("JSR", Abs, 6, false), 0x21 => op("AND", Idx, 6, false),
        0x22 => op("JAM", Imp, 0, false), 0x23 => op("RLA", Idx, 8, false),
        0x24 => op("BIT", Zp0, 3, false), 0x25 => op("AND", Zp0, 3, false),
        0x26 => op("ROL", Zp0, 5, false), 0x27 => op("RLA", Zp0, 5, false),
        0x28 => op("PLP", Imp, 4, false), 0x29 => op("AND", Imm, 2, false),
        0x2A => op("ROL", Acc, 2, false), 0x2B => op("ANC", Imm, 2, false),
        0x2C => op("BIT", Abs, 4, false), 0x2D => op("AND", Abs, 4, false),
        0x2E => op("ROL", Abs, 6, false), 0x2F => op("RLA", Abs, 6, false),

        0x30 => op("BMI", Rel, 2, false), 0x31 => op("AND", Idy, 5, true),
        0x32 => op("JAM", Imp, 0, false), 0x33 => op("RLA", Idy, 8, false),
        0x34 => op("NOP", Zpx, 4, false), 0x35 => op("AND", Zpx, 4, false),
        0x36 => op("ROL", Zpx, 6, false), 0x37 => op("RLA", Zpx, 6, false),
        0x38 => op("SEC", Imp, 2, false), 0x39 => op("AND", Aby, 4, true),
        0x3A => op("NOP", Imp, 2, false), 0x3B => op("RLA", Aby, 7, false),
        0x3C => op("NOP", Abx, 4, true),  0x3D => op("AND", Abx, 4, true),
        0x3E => op("ROL", Abx, 7, false), 0x3F => op("RLA", Abx, 7, false),

        0x40 => op("RTI", Imp, 6, false), 0x41 => op("EOR", Idx, 6, false),
        0x42 => op("JAM", Imp, 0, false), 0x43 => op("SRE", Idx, 8, false),
        0x44 => op("NOP", Zp0, 3, false), 0x45 => op("EOR", Zp0, 3, false),
        0x46 => op("LSR", Zp0, 5, false), 0x47 => op("SRE", Zp0, 5, false),
        0x48 => op("PHA", Imp, 3, false), 0x49 => op("EOR", Imm, 2, false),
        0x4A => op("LSR", Acc, 2, false), 0x4B => op("ALR", Imm, 2, false),
        0x4C => op("JMP", Abs, 3, false), 0x4D => op("EOR", Abs, 4, false),
        0x4E => op("LSR", Abs, 6, false), 0x4F => op("SRE", Abs, 6, false),

        0x50 => op("BVC", Rel, 2, false), 0x51 => op("EOR", Idy, 5, true),
        0x52 => op("JAM", Imp, 0, false), 0x53 => op("SRE", Idy, 8, false),
        0x54 => op("NOP", Zpx, 4, false), 0x55 => op("EOR", Zpx, 4, false),
        0x56 => op("LSR", Zpx, 6, false), 0x57 => op("SRE", Zpx, 6, false),
        0x58 => op("CLI", Imp, 2, false), 0x59 => op("EOR", Aby, 4, true),
        0x5A => op("NOP", Imp, 2, false), 0x5B => op("SRE", Aby, 7, false),
        0x5C => op("NOP", Abx, 4, true),  0x5D => op("EOR", Abx, 4, true),
        0x5E => op("LSR", Abx, 7, false), 0x5F => op("SRE", Abx, 7, false),

        0x60 => op("RTS", Imp, 6, false), 0x61 => op("ADC", Idx, 6, false),
        0x62 => op("JAM", Imp, 0, false), 0x63 => op("RRA", Idx, 8, false),
        0x64 => op("NOP", Zp0, 3, false), 0x65 => op("ADC", Zp0, 3, false),
        0x66 => op("ROR", Zp0, 5, false), 0x67 => op("RRA", Zp0, 5, false),
        0x68 => op("PLA", Imp, 4, false), 0x69 => op("ADC", Imm, 2, false),
        0x6A => op("ROR", Acc, 2, false), 0x6B => op("ARR", Imm, 2, false),
        0x6C => op("JMP", Ind, 5, false), 0x6D => op("ADC", Abs, 4, false),
        0x6E => op("ROR", Abs, 6, false), 0x6F => op("RRA", Abs, 6, false),

        0x70 => op("BVS", Rel, 2, false), 0x71 => op("ADC", Idy, 5, true),
        0x72 => op("JAM", Imp, 0, false), 0x73 => op("RRA", Idy, 8, false),
        0x74 => op("NOP", Zpx, 4, false), 0x75 => op("ADC", Zpx, 4, false),
        0x76 => op("ROR", Zpx, 6, false), 0x77 => op("RRA", Zpx, 6, false),
        0x78 => op("SEI", Imp, 2, false), 0x79 => op("ADC", Aby, 4, true),
        0x7A => op("NOP", Imp, 2, false), 0x7B => op("RRA", Aby, 7, false),
        0x7C => op("NOP", Abx, 4, true),  0x7D => op("ADC", Abx, 4, true),
        0x7E => op("ROR", Abx, 7, false), 0x7F => op("RRA", Abx, 7, false),

        0x80 => op("NOP", Imm, 2, false), 0x81 => op("STA", Idx, 6, false),
        0x82 => op("NOP", Imm, 2, false), 0x83 => op("SAX", Idx, 6, false),
        0x84 => op("STY", Zp0, 3, false), 0x85 => op("STA", Zp0, 3, false),
        0x86 => op("STX", Zp0, 3, false), 0x87 => op("SAX", Zp0, 3, false),
        0x88 => op("DEY", Imp, 2, false), 0x89 => op("NOP", Imm, 2, false),
        0x8A => op("TXA", Imp, 2, false), 0x8B => op("XAA", Imm, 2, false),
        0x8C => op("STY", Abs, 4, false), 0x8D => op("STA", Abs, 4, false),
        0x8E => op("STX", Abs, 4, false), 0x8F => op("SAX", Abs, 4, false),

        0x90 => op("BCC", Rel, 2, false), 0x91 => op("STA", Idy, 6, false),
        0x92 => op("JAM", Imp, 0, false), 0x93 => op("SHA", Idy, 6, false),
        0x94 => op("STY", Zpx, 4, false), 0x95 => op("STA", Zpx, 4, false),
        0x96 => op("STX", Zpy, 4, false), 0x97 => op("SAX", Zpy, 4, false),
        0x98 => op("TYA", Imp, 2, false), 0x99 => op("STA", Aby, 5, false),
        0x9A => op("TXS", Imp, 2, false), 0x9B => op("TAS", Aby, 5, false),
        0x9C => op("SHY", Abx, 5, false), 0x9D => op("STA", Abx, 5, false),
        0x9E => op("SHX", Aby, 5, false), 0x9F => op("SHA", Aby, 5, false),

        0xA0 => op("LDY", Imm, 2, false), 0xA1 => op("LDA", Idx, 6, false),
        0xA2 => op("LDX", Imm, 2, false), 0xA3 => op("LAX", Idx, 6, false),
        0xA4 => op("LDY", Zp0, 3, false), 0xA5 => op("LDA", Zp0, 3, false),
        0xA6 => op("LDX", Zp0, 3, false), 0xA7 => op("LAX", Zp0, 3, false),
        0xA8 => op("TAY", Imp, 2, false), 0xA9 => op("LDA", Imm, 2, false),
        0xAA => op("TAX", Imp, 2, false), 0xAB => op("LXA", Imm, 2, false),
        0xAC => op("LDY", Abs, 4, false), 0xAD => op("LDA", Abs, 4, false),
        0xAE => op("LDX", Abs, 4, false), 0xAF => op("LAX", Abs, 4, false),

        0xB0 => op("BCS", Rel, 2, false), 0xB1 => op("LDA", Idy, 5, true),
        0xB2 => op("JAM", Imp, 0, false), 0xB3 => op("LAX", Idy, 5, true),
        0xB4 => op("LDY", Zpx, 4, false), 0xB5 => op("LDA", Zpx, 4, false),
        0xB6 => op("LDX", Zpy, 4, false), 0xB7 => op("LAX", Zpy, 4, false),
        0xB8 => op("CLV", Imp, 2, false), 0xB9 => op("LDA", Aby, 4, true),
        0xBA => op("TSX", Imp, 2, false), 0xBB => op("LAS", Aby, 4, true),
        0xBC => op("LDY", Abx, 4, true),  0xBD => op("LDA", Abx, 4, true),
        0xBE => op("LDX", Aby, 4, true),  0xBF => op("LAX", Aby, 4, true),

        0xC0 => op("CPY", Imm, 2, false), 0xC1 => op("CMP", Idx, 6, false),
        0xC2 => op("NOP", Imm, 2, false), 0xC3 => op("DCP", Idx, 8, false),
        0xC4 => op("CPY", Zp0, 3, false), 0xC5 => op("CMP", Zp0, 3, false),
        0xC6 => op("DEC", Zp0, 5, false), 0xC7 => op("DCP", Zp0, 5, false),
        0xC8 => op("INY", Imp, 2, false), 0xC9 => op("CMP", Imm, 2, false),
        0xCA => op("DEX", Imp, 2, false), 0xCB => op("AXS", Imm, 2, false),
        0xCC => op("CPY", Abs, 4, false), 0xCD => op("CMP", Abs, 4, false),
        0xCE => op("DEC", Abs, 6, false), 0xCF => op("DCP", Abs, 6, false),

        0xD0 => op("BNE", Rel, 2, false), 0xD1 => op("CMP", Idy, 5, true),
        0xD2 => op("JAM", Imp, 0, false), 0xD3 => op("DCP", Idy, 8, false),
        0xD4 => op("NOP", Zpx, 4, false), 0xD5 => op("CMP", Zpx, 4, false),
        0xD6 => op("DEC", Zpx, 6, false), 0xD7 => op("DCP", Zpx, 6, false),
        0xD8 => op("CLD", Imp, 2, false), 0xD9 => op("CMP", Aby, 4, true),
        0xDA => op("NOP", Imp, 2, false), 0xDB => op("DCP", Aby, 7, false),
        0xDC => op("NOP", Abx, 4, true),  0xDD => op("CMP", Abx, 4, true),
        0xDE => op("DEC", Abx, 7, false), 0xDF => op("DCP", Abx, 7, false),

        0xE0 => op("CPX", Imm, 2, false), 0xE1 => op("SBC", Idx, 6, false),
        0xE2 => op("NOP", Imm, 2, false), 0xE3 => op("ISC", Idx, 8, false),
        0xE4 => op("CPX", Zp0, 3, false), 0xE5 => op("SBC", Zp0, 3, false),
        0xE6 => op("INC", Zp0, 5, false), 0xE7 => op("ISC", Zp0, 5, false),
        0xE8 => op("INX", Imp, 2, false), 0xE9 => op("SBC", Imm, 2, false),
        0xEA => op("NOP", Imp, 2, false), 0xEB => op("SBC", Imm, 2, false),
        0xEC => op("CPX", Abs, 4, false), 0xED => op("SBC", Abs, 4, false),
        0xEE => op("INC", Abs, 6, false), 0xEF => op("ISC", Abs, 6, false),

        0xF0 => op("BEQ", Rel, 2, false), 0xF1 => op("SBC", Idy, 5, true),
        0xF2 => op("JAM", Imp, 0, false), 0xF3 => op("ISC", Idy, 8, false),
        0xF4 => op("NOP", Zpx, 4, false), 0xF5 => op("SBC", Zpx, 4, false),
        0xF6 => op("INC", Zpx, 6, false), 0xF7 => op("ISC", Zpx, 6, false),
        0xF8 => op("SED", Imp, 2, false), 0xF9 => op("SBC", Aby, 4, true),
        0xFA => op("NOP", Imp, 2, false), 0xFB => op("ISC", Aby, 7, false),
        0xFC => op("NOP", Abx, 4, true),  0xFD => op("SBC", Abx, 4, true),
        0xFE => op("INC", Abx, 7, false), 0xFF => op("ISC", Abx, 7, false),
    }
}

/// Opcode bytes that halt the CPU (the documented JAM/KIL family).
#[must_use]
pub const fn is_jam(opcode: u8) -> bool {
    matches!(
        opcode,
        0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2
    )
}
