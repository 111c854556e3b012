//! Render error types.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    RenderIo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl RenderError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::RenderIo {
            path: path.into(),
            source: image::ImageError::IoError(source),
        }
    }

    pub(crate) fn encode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::RenderIo {
            path: path.into(),
            source,
        }
    }
}
