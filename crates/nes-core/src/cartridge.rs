//! iNES 1.0 ROM container parsing. Deliberately plain: the interesting
//! engineering in this crate is the execution core, not the file format,
//! so this loader does only what's needed to produce a [`Mapper`] and
//! stops there (no NES 2.0, no trainer-region preservation beyond skipping
//! it, no ROM hashing).

use nes_mappers::{Mapper, Mirroring, Mmc1, Nrom};

const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_BANK_LEN: usize = 0x4000;
const CHR_BANK_LEN: usize = 0x2000;

/// Everything that can go wrong turning raw bytes into a running cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// File is shorter than the 16-byte iNES header.
    #[error("ROM file too small: need at least {HEADER_LEN} bytes, got {0}")]
    FileTooSmall(usize),
    /// First four bytes aren't `NES<EOF>`.
    #[error("invalid iNES magic number: expected {MAGIC:02X?}, got {0:02X?}")]
    InvalidMagic([u8; 4]),
    /// The header's declared PRG/CHR sizes don't fit in the actual file.
    #[error("ROM size mismatch: header declares {expected} bytes, file has {actual}")]
    SizeMismatch {
        /// Bytes the header says should be present.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },
    /// The header names a mapper this crate doesn't implement.
    #[error("unsupported mapper number: {0}")]
    UnsupportedMapper(u8),
}

/// A parsed iNES ROM image, decoded enough to construct a [`Mapper`] but
/// no further (this is a loader, not a cartridge-database frontend).
pub struct Cartridge {
    /// iNES mapper number (0-255; NES 2.0 is not supported).
    pub mapper_number: u8,
    /// Nametable mirroring declared in the header.
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM present.
    pub has_battery: bool,
    /// Raw PRG-ROM bytes.
    pub prg_rom: Vec<u8>,
    /// Raw CHR-ROM bytes, empty if the cartridge uses CHR-RAM.
    pub chr_rom: Vec<u8>,
}

impl Cartridge {
    /// Parse an iNES 1.0 file: 16-byte header, optional 512-byte trainer
    /// (skipped), PRG bytes, then CHR bytes.
    pub fn load(data: &[u8]) -> Result<Self, LoadError> {
        if data.len() < HEADER_LEN {
            return Err(LoadError::FileTooSmall(data.len()));
        }
        let magic = [data[0], data[1], data[2], data[3]];
        if magic != MAGIC {
            return Err(LoadError::InvalidMagic(magic));
        }

        let prg_banks = usize::from(data[4]);
        let chr_banks = usize::from(data[5]);
        let flags6 = data[6];
        let flags7 = data[7];

        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_battery = flags6 & 0x02 != 0;
        let has_trainer = flags6 & 0x04 != 0;
        let mapper_number = (flags6 >> 4) | (flags7 & 0xF0);

        let mut offset = HEADER_LEN;
        if has_trainer {
            offset += TRAINER_LEN;
        }

        let prg_len = prg_banks * PRG_BANK_LEN;
        let chr_len = chr_banks * CHR_BANK_LEN;
        let needed = offset + prg_len + chr_len;
        if data.len() < needed {
            return Err(LoadError::SizeMismatch {
                expected: needed,
                actual: data.len(),
            });
        }

        let prg_rom = data[offset..offset + prg_len].to_vec();
        offset += prg_len;
        let chr_rom = data[offset..offset + chr_len].to_vec();

        Ok(Self {
            mapper_number,
            mirroring,
            has_battery,
            prg_rom,
            chr_rom,
        })
    }

    /// Build the `Mapper` implementation named by this cartridge's header.
    pub fn into_mapper(self) -> Result<Box<dyn Mapper>, LoadError> {
        match self.mapper_number {
            0 => Ok(Box::new(Nrom::new(self.prg_rom, self.chr_rom, self.mirroring))),
            1 => Ok(Box::new(Mmc1::new(
                self.prg_rom,
                self.chr_rom,
                self.mirroring,
                self.has_battery,
            ))),
            other => Err(LoadError::UnsupportedMapper(other)),
        }
    }
}

/// Parse an iNES image and hand back a ready-to-use [`Mapper`].
pub fn load(data: &[u8]) -> Result<Box<dyn Mapper>, LoadError> {
    let cart = Cartridge::load(data)?;
    log::info!(
        "loaded ROM: mapper {}, PRG {} KiB, CHR {} KiB, {:?} mirroring",
        cart.mapper_number,
        cart.prg_rom.len() / 1024,
        cart.chr_rom.len() / 1024,
        cart.mirroring,
    );
    cart.into_mapper().inspect_err(|e| log::error!("ROM load failed: {e}"))
}
