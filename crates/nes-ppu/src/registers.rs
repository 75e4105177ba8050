//! The three CPU-visible control/status registers, `$2000`/`$2001`/`$2002`.

use bitflags::bitflags;

bitflags! {
    /// `PPUCTRL` ($2000, write-only).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Ctrl: u8 {
        /// Base nametable select, low bit (bits 0-1 together select 0-3).
        const NAMETABLE_X = 1 << 0;
        /// Base nametable select, high bit.
        const NAMETABLE_Y = 1 << 1;
        /// VRAM address increment per CPU read/write of `$2007` (0 = +1, 1 = +32).
        const VRAM_INCREMENT = 1 << 2;
        /// Sprite pattern table address for 8x8 sprites (0 = `$0000`, 1 = `$1000`).
        const SPRITE_PATTERN_TABLE = 1 << 3;
        /// Background pattern table address (0 = `$0000`, 1 = `$1000`).
        const BACKGROUND_PATTERN_TABLE = 1 << 4;
        /// Sprite size (0 = 8x8, 1 = 8x16).
        const SPRITE_SIZE = 1 << 5;
        /// PPU master/slave select. Unused on the NES; tracked but inert.
        const MASTER_SLAVE = 1 << 6;
        /// Generate an NMI at the start of VBlank.
        const NMI_ENABLE = 1 << 7;
    }
}

impl Ctrl {
    /// VRAM address increment selected by [`Ctrl::VRAM_INCREMENT`].
    #[must_use]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    /// Base pattern table address for 8x16 sprites is fixed by bit 0 of the
    /// tile index rather than this flag; this returns the 8x8 sprite table.
    #[must_use]
    pub fn sprite_pattern_table(self) -> u16 {
        if self.contains(Self::SPRITE_PATTERN_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Background pattern table base address.
    #[must_use]
    pub fn background_pattern_table(self) -> u16 {
        if self.contains(Self::BACKGROUND_PATTERN_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in pixels: 8 or 16.
    #[must_use]
    pub fn sprite_height(self) -> u8 {
        if self.contains(Self::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }
}

bitflags! {
    /// `PPUMASK` ($2001, write-only).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Mask: u8 {
        /// Render in grayscale.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 pixels of the screen.
        const SHOW_BACKGROUND_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 pixels of the screen.
        const SHOW_SPRITES_LEFT = 1 << 2;
        /// Enable background rendering.
        const SHOW_BACKGROUND = 1 << 3;
        /// Enable sprite rendering.
        const SHOW_SPRITES = 1 << 4;
        /// Emphasize red.
        const EMPHASIZE_RED = 1 << 5;
        /// Emphasize green.
        const EMPHASIZE_GREEN = 1 << 6;
        /// Emphasize blue.
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl Mask {
    /// Whether either background or sprite rendering is enabled. Drives
    /// the odd-frame dot skip and the rendering-enabled gating of OAM
    /// address/scroll register side effects.
    #[must_use]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND | Self::SHOW_SPRITES)
    }
}

bitflags! {
    /// `PPUSTATUS` ($2002, read-only; reading clears bit 7 and the write latch).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PpuStatus: u8 {
        /// Sprite overflow flag (set, per hardware's buggy evaluation, when
        /// a 9th in-range sprite is found on a scanline).
        const SPRITE_OVERFLOW = 1 << 5;
        /// Sprite 0 hit: an opaque background pixel and an opaque sprite 0
        /// pixel overlapped at the same dot.
        const SPRITE_0_HIT = 1 << 6;
        /// Set at dot 1 of scanline 241, cleared at dot 1 of the pre-render
        /// scanline and by a CPU read of this register.
        const VBLANK = 1 << 7;
    }
}
