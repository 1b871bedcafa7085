//! Error types for the edit pipeline

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Edit stage in which a compositor call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stitch,
    Load,
    Trim,
    Speed,
    Overlay,
    Audio,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stitch => "stitch",
            Self::Load => "load",
            Self::Trim => "trim",
            Self::Speed => "speed change",
            Self::Overlay => "overlay",
            Self::Audio => "audio merge",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}

/// Edit pipeline errors
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid input {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("{stage} failed: {message}")]
    Composition { stage: Stage, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditError {
    pub(crate) fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn composition(stage: Stage, message: impl Into<String>) -> Self {
        Self::Composition {
            stage,
            message: message.into(),
        }
    }

    /// Stage that failed, for composition errors
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Composition { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
