//! Top-level error type for the CLI binary.

/// Errors that can terminate the CLI before or during a run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The ROM file couldn't be read from disk.
    #[error("failed to read ROM file {path}: {source}")]
    RomIo {
        /// Path that failed to read.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The ROM bytes were rejected by the cartridge loader.
    #[error(transparent)]
    Console(#[from] nes_core::ConsoleError),
}
