//! 6502 processor status register.

use bitflags::bitflags;

bitflags! {
    /// Processor status flags (the `P` register).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable.
        const I = 1 << 2;
        /// Decimal mode (tracked but inert; the 2A03 ignores it).
        const D = 1 << 3;
        /// Break (only meaningful on the stack image, never in the live register).
        const B = 1 << 4;
        /// Unused, always 1 on the stack image.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Power-on value: interrupts disabled, unused bit set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Mask of flags a `PLP`/RTI pull actually changes (B and U are never
    /// latched into the live register, only synthesized when pushed).
    pub const PLP_MASK: Self = Self::C
        .union(Self::Z)
        .union(Self::I)
        .union(Self::D)
        .union(Self::V)
        .union(Self::N);

    /// Create a fresh power-on status register.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Update Z and N from a result byte.
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Render the byte pushed to the stack for this status, with bit 5
    /// always set and bit 4 set iff this push originates from BRK/PHP.
    #[must_use]
    pub fn to_stack_byte(self, brk: bool) -> u8 {
        let mut bits = (self & Self::PLP_MASK).bits() | Self::U.bits();
        if brk {
            bits |= Self::B.bits();
        }
        bits
    }

    /// Reconstruct a live status register from a byte pulled off the stack.
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        (Self::from_bits_truncate(value) & Self::PLP_MASK) | Self::U
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_sets_i_and_u() {
        let s = Status::new();
        assert!(s.contains(Status::I));
        assert!(s.contains(Status::U));
        assert!(!s.contains(Status::C));
    }

    #[test]
    fn stack_byte_brk_vs_interrupt() {
        let s = Status::new();
        assert_eq!(s.to_stack_byte(true) & 0x30, 0x30);
        assert_eq!(s.to_stack_byte(false) & 0x30, 0x20);
    }

    #[test]
    fn from_stack_byte_ignores_b() {
        let s = Status::from_stack_byte(0xFF);
        assert!(!s.contains(Status::B));
        assert!(s.contains(Status::U));
    }

    #[test]
    fn set_zn_tracks_zero_and_negative() {
        let mut s = Status::new();
        s.set_zn(0);
        assert!(s.contains(Status::Z));
        assert!(!s.contains(Status::N));
        s.set_zn(0x80);
        assert!(!s.contains(Status::Z));
        assert!(s.contains(Status::N));
    }
}
