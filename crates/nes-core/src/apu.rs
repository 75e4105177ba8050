//! APU synthesis is out of scope for this core; this stub exists purely
//! so the bus can forward `$4000-$4017` reads/writes and the IRQ line
//! without a real APU behind it. Real hardware's frame counter can
//! assert IRQ; [`ApuStub::set_irq`] lets tests exercise that path without
//! building a sequencer.

/// A do-nothing APU that preserves bus semantics (writes are accepted and
/// discarded, status reads return a quiescent value) and exposes a single
/// test hook for the IRQ line.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApuStub {
    irq: bool,
}

impl ApuStub {
    /// A freshly power-on stub: no pending IRQ.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `$4015` read: bit 6 (frame IRQ) and bit 7 (DMC IRQ) would normally
    /// report here; with no channels implemented this always reads as
    /// all-quiet except for whatever [`set_irq`](Self::set_irq) forced.
    #[must_use]
    pub fn read_status(&self) -> u8 {
        if self.irq { 0x40 } else { 0x00 }
    }

    /// Any write into `$4000-$4013, $4015, $4017` is accepted and ignored;
    /// there is no channel state to update.
    pub fn write(&mut self, _addr: u16, _value: u8) {}

    /// Whether the APU is currently asserting its IRQ line.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq
    }

    /// Test hook: force the IRQ line level, standing in for the frame
    /// counter/DMC IRQ sources a real APU would drive.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq = asserted;
    }

    /// Power-on/reset: clear the forced IRQ line.
    pub fn reset(&mut self) {
        self.irq = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_hook_round_trips() {
        let mut apu = ApuStub::new();
        assert!(!apu.irq_pending());
        apu.set_irq(true);
        assert!(apu.irq_pending());
        assert_eq!(apu.read_status(), 0x40);
        apu.reset();
        assert!(!apu.irq_pending());
    }

    #[test]
    fn writes_are_accepted_and_ignored() {
        let mut apu = ApuStub::new();
        apu.write(0x4000, 0xFF);
        assert_eq!(apu.read_status(), 0x00);
    }
}
