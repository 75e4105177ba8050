//! Scanline/dot constants for the NTSC 2C02.

/// Dots per scanline (0-340).
pub const DOTS_PER_SCANLINE: u16 = 341;
/// Scanlines per frame (0-261), including the post-render and pre-render lines.
pub const SCANLINES_PER_FRAME: u16 = 262;
/// First scanline of the visible picture.
pub const VISIBLE_SCANLINES: u16 = 240;
/// The post-render scanline, one idle line after the last visible one.
pub const POST_RENDER_SCANLINE: u16 = 240;
/// The scanline at whose dot 1 the VBlank flag is set and NMI may fire.
pub const VBLANK_SCANLINE: u16 = 241;
/// The pre-render scanline, which clears VBlank/sprite-0/overflow at dot 1
/// and re-primes the vertical scroll bits at dots 280-304.
pub const PRE_RENDER_SCANLINE: u16 = 261;
