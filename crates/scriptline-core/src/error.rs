//! Error types for scriptline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Main error type for scriptline
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Shaping failed: {0}")]
    Shaping(#[from] ShapingError),

    #[error("Layout failed: glyph storage exceeded its size limit")]
    LayoutFailed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Font loading errors
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data")]
    InvalidData,
}

/// Shaping errors
#[derive(Debug, Error)]
pub enum ShapingError {
    /// The glyph storage handed to the engine is too small; `needed` is the
    /// glyph count the engine requires.
    #[error("Glyph buffer too small: {needed} glyphs needed")]
    BufferTooSmall { needed: usize },

    #[error("Engine error: {0}")]
    EngineFailure(String),
}

impl LayoutError {
    /// The glyph count a retry needs, when this is a buffer exhaustion.
    pub fn needed_glyphs(&self) -> Option<usize> {
        match self {
            LayoutError::Shaping(ShapingError::BufferTooSmall { needed }) => Some(*needed),
            _ => None,
        }
    }
}
