//! Scoped output file.
//!
//! A [`Canvas`] is a temp file next to its destination. Encoders write into
//! it, and [`Canvas::persist`] renames it over the destination in one step.
//! A canvas dropped without being persisted, on an error path or a panic,
//! deletes its temp file, so a failed render never leaves partial output.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::RenderError;

pub struct Canvas {
    destination: PathBuf,
    file: NamedTempFile,
}

impl Canvas {
    /// Directories are not created; a missing parent is a [`RenderError::RenderIo`].
    pub fn create(destination: impl AsRef<Path>) -> Result<Self, RenderError> {
        let destination = destination.as_ref().to_path_buf();
        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".julia-").suffix(".partial");
        // Same mode as a plain `File::create`: 0o666 less the umask, not tempfile's 0o600.
        #[cfg(unix)]
        {
            use std::{fs::Permissions, os::unix::fs::PermissionsExt};
            builder.permissions(Permissions::from_mode(0o666));
        }
        let file = builder
            .tempfile_in(parent)
            .map_err(|source| RenderError::io(&destination, source))?;

        debug!(
            "canvas for {} at {}",
            destination.display(),
            file.path().display()
        );

        Ok(Self { destination, file })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Where the bytes go until the canvas is persisted.
    #[cfg(test)]
    fn staging_path(&self) -> &Path {
        self.file.path()
    }

    /// A fresh buffered handle on the staging file, positioned at the start.
    pub fn writer(&self) -> Result<BufWriter<File>, RenderError> {
        Ok(BufWriter::new(self.file()?))
    }

    /// An unbuffered handle on the staging file, for encoders that do their own chunking.
    pub fn file(&self) -> Result<File, RenderError> {
        self.file
            .reopen()
            .map_err(|source| RenderError::io(&self.destination, source))
    }

    /// Move the finished file onto the destination, replacing whatever was there.
    pub fn persist(self) -> Result<PathBuf, RenderError> {
        let Self { destination, file } = self;
        file.persist(&destination)
            .map_err(|err| RenderError::io(&destination, err.error))?;
        debug!("persisted {}", destination.display());
        Ok(destination)
    }
}
