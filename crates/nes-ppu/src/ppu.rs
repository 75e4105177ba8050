//! The 2C02 picture processing unit: register file, scroll/address
//! latch, background and sprite pipelines, and the dot/scanline state
//! machine tying them together.

use crate::background::Background;
use crate::oam::Oam;
use crate::registers::{Ctrl, Mask, PpuStatus};
use crate::scroll::Scroll;
use crate::timing::{DOTS_PER_SCANLINE, PRE_RENDER_SCANLINE, SCANLINES_PER_FRAME, VBLANK_SCANLINE};
use crate::vram::Palette;

/// The capability the PPU uses to reach CHR data and nametable RAM.
/// Nametable mirroring is resolved entirely on the implementor's side
/// (it depends on the cartridge's mapper), so the PPU only ever deals
/// in the flat `$2000-$2FFF` address space.
pub trait PpuBus {
    /// Read a byte from the pattern tables (`$0000-$1FFF`, mapper CHR).
    fn read_chr(&mut self, addr: u16) -> u8;
    /// Write a byte to the pattern tables (only meaningful with CHR RAM).
    fn write_chr(&mut self, addr: u16, value: u8);
    /// Read a nametable byte, with mirroring already resolved.
    fn read_nametable(&mut self, addr: u16) -> u8;
    /// Write a nametable byte, with mirroring already resolved.
    fn write_nametable(&mut self, addr: u16, value: u8);
}

/// Width of the visible picture, in pixels.
pub const WIDTH: usize = 256;
/// Height of the visible picture, in pixels.
pub const HEIGHT: usize = 240;

/// The PPU. Owns the picture's pixel buffer (NES palette indices, 0-63;
/// `nes-core` converts these to RGBA using its own palette table).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ppu {
    ctrl: Ctrl,
    mask: Mask,
    status: PpuStatus,
    scroll: Scroll,
    oam: Oam,
    palette: Palette,
    background: Background,
    scanline: u16,
    dot: u16,
    frame: u64,
    odd_frame: bool,
    read_buffer: u8,
    open_bus: u8,
    vbl_suppressed_this_frame: bool,
    pending_nmi: bool,
    sprite_patterns: Vec<(u8, u8)>,
    pixels: Vec<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self {
            ctrl: Ctrl::empty(),
            mask: Mask::empty(),
            status: PpuStatus::empty(),
            scroll: Scroll::default(),
            oam: Oam::default(),
            palette: Palette::default(),
            background: Background::default(),
            scanline: 0,
            dot: 0,
            frame: 0,
            odd_frame: false,
            read_buffer: 0,
            open_bus: 0,
            vbl_suppressed_this_frame: false,
            pending_nmi: false,
            sprite_patterns: Vec::with_capacity(8),
            pixels: vec![0; WIDTH * HEIGHT],
        }
    }
}

impl Ppu {
    /// Construct a freshly power-on PPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to power-on state, keeping no prior picture data.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The rendered picture as NES palette indices, row-major, `WIDTH * HEIGHT` long.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.pixels
    }

    /// Frames rendered since construction/reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Current scanline (0-261).
    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot within the scanline (0-340).
    #[must_use]
    pub fn dot(&self) -> u16 {
        self.dot
    }

    // --- CPU-facing register interface (`$2000-$2007`) ---

    /// `$2000` write.
    pub fn write_ctrl(&mut self, value: u8, bus: &mut impl PpuBus) {
        let _ = bus;
        let was_enabled = self.ctrl.contains(Ctrl::NMI_ENABLE);
        self.ctrl = Ctrl::from_bits_truncate(value);
        self.scroll.write_ctrl(value);
        self.open_bus = value;
        // Toggling NMI_ENABLE on while VBlank is still flagged fires a
        // second NMI for the same VBlank period.
        if !was_enabled
            && self.ctrl.contains(Ctrl::NMI_ENABLE)
            && self.status.contains(PpuStatus::VBLANK)
            && !self.vbl_suppressed_this_frame
        {
            self.pending_nmi = true;
        }
    }

    /// `$2001` write.
    pub fn write_mask(&mut self, value: u8) {
        self.mask = Mask::from_bits_truncate(value);
        self.open_bus = value;
    }

    /// `$2002` read: returns status, clears the VBlank flag and the
    /// scroll/address write latch. A read on the exact dot VBlank is set
    /// (scanline 241, dot 1) suppresses the NMI for the remainder of this
    /// VBlank period.
    pub fn read_status(&mut self) -> u8 {
        if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
            self.vbl_suppressed_this_frame = true;
        }

        let result = (self.status.bits() & 0xE0) | (self.open_bus & 0x1F);

        self.status.remove(PpuStatus::VBLANK);
        self.scroll.reset_latch();
        self.open_bus = result;
        result
    }

    /// `$2003` write.
    pub fn write_oam_addr(&mut self, value: u8) {
        self.oam.set_addr(value);
    }

    /// `$2004` read.
    #[must_use]
    pub fn read_oam_data(&self) -> u8 {
        self.oam.read_data()
    }

    /// `$2004` write.
    pub fn write_oam_data(&mut self, value: u8) {
        self.oam.write_data(value);
    }

    /// OAM DMA byte write, issued 256 times by the bus during `$4014` DMA.
    pub fn oam_dma_write(&mut self, offset: u8, value: u8) {
        self.oam.dma_write(offset, value);
    }

    /// `$2005` write.
    pub fn write_scroll(&mut self, value: u8) {
        self.scroll.write_scroll(value);
        self.open_bus = value;
    }

    /// `$2006` write.
    pub fn write_addr(&mut self, value: u8) {
        self.scroll.write_addr(value);
        self.open_bus = value;
    }

    /// `$2007` read: buffered for everything except palette RAM, which
    /// reads through immediately (but still refills the buffer from the
    /// nametable "behind" the palette mirror, per hardware).
    pub fn read_data(&mut self, bus: &mut impl PpuBus) -> u8 {
        let addr = self.scroll.vram_addr();
        let result = if addr >= 0x3F00 {
            let value = self.palette.read(addr);
            self.read_buffer = self.fetch(addr - 0x1000, bus);
            value
        } else {
            let value = self.read_buffer;
            self.read_buffer = self.fetch(addr, bus);
            value
        };
        self.scroll.increment_vram(self.ctrl.vram_increment());
        result
    }

    /// `$2007` write.
    pub fn write_data(&mut self, value: u8, bus: &mut impl PpuBus) {
        let addr = self.scroll.vram_addr();
        if addr >= 0x3F00 {
            self.palette.write(addr, value);
        } else if addr < 0x2000 {
            bus.write_chr(addr, value);
        } else {
            bus.write_nametable(addr, value);
        }
        self.scroll.increment_vram(self.ctrl.vram_increment());
    }

    fn fetch(&mut self, addr: u16, bus: &mut impl PpuBus) -> u8 {
        if addr < 0x2000 {
            bus.read_chr(addr)
        } else {
            bus.read_nametable(addr & 0x2FFF)
        }
    }

    /// Take the pending NMI edge, if one is outstanding. `nes-core`
    /// calls this once per tick and, if it returns `true`, forwards it
    /// to [`nes_cpu::Cpu::trigger_nmi`](../nes_cpu/struct.Cpu.html#method.trigger_nmi).
    pub fn take_nmi(&mut self) -> bool {
        core::mem::take(&mut self.pending_nmi)
    }

    /// Whether rendering (background or sprites) is currently enabled.
    #[must_use]
    pub fn rendering_enabled(&self) -> bool {
        self.mask.rendering_enabled()
    }

    // --- The dot/scanline state machine ---

    /// Advance the PPU by exactly one dot.
    pub fn tick(&mut self, bus: &mut impl PpuBus) {
        let visible_scanline = self.scanline < 240;
        let rendering = self.mask.rendering_enabled();

        if visible_scanline && rendering {
            self.render_dot(bus);
        }

        if self.scanline == PRE_RENDER_SCANLINE && self.dot == 1 {
            self.status.remove(PpuStatus::SPRITE_0_HIT);
            self.status.remove(PpuStatus::SPRITE_OVERFLOW);
            self.status.remove(PpuStatus::VBLANK);
            self.vbl_suppressed_this_frame = false;
        }

        if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
            if !self.vbl_suppressed_this_frame {
                self.status.insert(PpuStatus::VBLANK);
                if self.ctrl.contains(Ctrl::NMI_ENABLE) {
                    self.pending_nmi = true;
                }
            }
        }

        if rendering && (visible_scanline || self.scanline == PRE_RENDER_SCANLINE) {
            if self.dot == 256 {
                self.scroll.increment_y();
            }
            if self.dot == 257 {
                self.scroll.copy_horizontal();
                if visible_scanline {
                    let height = self.ctrl.sprite_height();
                    self.oam.evaluate_scanline(self.scanline + 1, height);
                    if self.oam.overflow() {
                        self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                    }
                    self.fetch_sprite_patterns(bus);
                }
            }
            if self.scanline == PRE_RENDER_SCANLINE && (280..=304).contains(&self.dot) {
                self.scroll.copy_vertical();
            }
        }

        self.advance_dot(rendering);
    }

    fn advance_dot(&mut self, rendering: bool) {
        self.dot += 1;
        // Odd-frame dot skip: the idle dot at (scanline 261, dot 339) is
        // skipped, but only while rendering is enabled.
        if self.scanline == PRE_RENDER_SCANLINE
            && self.dot == 339
            && self.odd_frame
            && rendering
        {
            self.dot += 1;
        }
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.frame += 1;
                self.odd_frame = !self.odd_frame;
            }
        }
    }

    fn render_dot(&mut self, bus: &mut impl PpuBus) {
        if (1..=256).contains(&self.dot) || (321..=336).contains(&self.dot) {
            self.run_background_fetch(bus);
        }
        if (1..=256).contains(&self.dot) {
            let x = self.dot - 1;
            self.composite_pixel(x);
            self.background.shift_registers();
        }
    }

    fn run_background_fetch(&mut self, bus: &mut impl PpuBus) {
        match (self.dot - 1) % 8 {
            1 => {
                let byte = bus.read_nametable(self.scroll.nametable_addr());
                self.background.set_nametable_byte(byte);
            }
            3 => {
                let byte = bus.read_nametable(self.scroll.attribute_addr());
                self.background
                    .set_attribute_byte(byte, self.scroll.coarse_x(), self.scroll.coarse_y());
            }
            5 => {
                let base = self.ctrl.background_pattern_table();
                let addr = self.scroll.pattern_addr(self.background.nametable_byte(), base);
                self.background.set_pattern_low(bus.read_chr(addr));
            }
            7 => {
                let base = self.ctrl.background_pattern_table();
                let addr = self.scroll.pattern_addr(self.background.nametable_byte(), base) + 8;
                self.background.set_pattern_high(bus.read_chr(addr));
                self.background.load_shift_registers();
                self.scroll.increment_x();
            }
            _ => {}
        }
    }

    /// Fetch the low/high pattern bytes for every sprite latched into
    /// secondary OAM for the upcoming scanline. Run once, right after
    /// evaluation, rather than per-pixel: real hardware spends dots
    /// 257-320 doing exactly this, and caching it here keeps
    /// `composite_pixel` from needing mutable bus access per pixel.
    fn fetch_sprite_patterns(&mut self, bus: &mut impl PpuBus) {
        let height = self.ctrl.sprite_height();
        self.sprite_patterns.clear();
        for i in 0..self.oam.scanline_sprites().len() {
            let sprite = self.oam.scanline_sprites()[i];
            let row = (self.scanline + 1).wrapping_sub(u16::from(sprite.y)) as u8;
            let row8 = if sprite.flip_y() { height - 1 - row } else { row };
            let (table, tile) = if height == 16 {
                let table = if sprite.tile & 0x01 != 0 { 0x1000 } else { 0x0000 };
                let tile = (sprite.tile & 0xFE) + u8::from(row8 >= 8);
                (table, tile)
            } else {
                (self.ctrl.sprite_pattern_table(), sprite.tile)
            };
            let fine_row = row8 % 8;
            let addr = table + u16::from(tile) * 16 + u16::from(fine_row);
            let low = bus.read_chr(addr);
            let high = bus.read_chr(addr + 8);
            self.sprite_patterns.push((low, high));
        }
    }

    fn composite_pixel(&mut self, x: u16) {
        let show_bg_here = self.mask.contains(Mask::SHOW_BACKGROUND)
            && (x >= 8 || self.mask.contains(Mask::SHOW_BACKGROUND_LEFT));
        let show_sprites_here = self.mask.contains(Mask::SHOW_SPRITES)
            && (x >= 8 || self.mask.contains(Mask::SHOW_SPRITES_LEFT));

        let (bg_pixel, bg_palette) = if show_bg_here {
            self.background.get_pixel(self.scroll.fine_x())
        } else {
            (0, 0)
        };
        let bg_opaque = bg_pixel != 0;
        let bg_color = if bg_opaque {
            self.palette
                .read(0x3F00 | (u16::from(bg_palette) << 2) | u16::from(bg_pixel))
        } else {
            self.palette.read(0x3F00)
        };

        let mut final_color = bg_color;
        if show_sprites_here {
            let sprites = self.oam.scanline_sprites();
            for (i, sprite) in sprites.iter().enumerate() {
                if u16::from(sprite.x) > x || x - u16::from(sprite.x) >= 8 {
                    continue;
                }
                let mut col = (x - u16::from(sprite.x)) as u8;
                if sprite.flip_x() {
                    col = 7 - col;
                }
                let Some((low, high)) = self.sprite_patterns.get(i).copied() else {
                    continue;
                };
                let bit = 7 - col;
                let pixel = ((low >> bit) & 1) | (((high >> bit) & 1) << 1);
                if pixel == 0 {
                    continue;
                }
                if sprite.oam_index == 0 && bg_opaque && x != 255 {
                    self.status.insert(PpuStatus::SPRITE_0_HIT);
                }
                if bg_opaque && sprite.behind_background() {
                    break;
                }
                final_color = self
                    .palette
                    .read(0x3F10 | (u16::from(sprite.palette()) << 2) | u16::from(pixel));
                break;
            }
        }

        self.pixels[usize::from(self.scanline) * WIDTH + usize::from(x)] = final_color;
    }
}
