//! Error types for Promptcut.

use thiserror::Error;

/// Main error type for Promptcut operations.
///
/// The layout, drag, and zoom engines are total functions and never return
/// errors; these variants cover serialization, missing media references, and
/// animation failures.
#[derive(Error, Debug)]
pub enum PromptcutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clip '{0}' has no resolvable media source")]
    MissingSource(String),

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Promptcut operations.
pub type Result<T> = std::result::Result<T, PromptcutError>;
