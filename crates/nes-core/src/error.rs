//! Top-level error type for the integration layer.

use crate::cartridge::LoadError;

/// Errors surfaced by [`crate::Console`] construction and operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// The ROM could not be parsed or named an unsupported mapper.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The caller invoked an operation the console's current state
    /// doesn't support (e.g. resuming a console that failed to load).
    #[error("invalid console state: {0}")]
    InvalidState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_converts_via_from() {
        let err: ConsoleError = LoadError::FileTooSmall(4).into();
        assert!(matches!(err, ConsoleError::Load(LoadError::FileTooSmall(4))));
    }
}
