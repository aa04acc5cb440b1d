//! Where task CSV payloads come from.
//!
//! A [`Source`] is either the remote dataset URL or a file handed in by the
//! user. Files go through the same check the upload form applies: anything
//! that is not a `.csv` is refused before it is read.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::VortexError;

/// Dataset fetched when nothing else is configured.
pub const DEFAULT_SOURCE_URL: &str = "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/week%202%20-%20Problem_5_-_Follow-Up_Vortex_Tracker-hUbtapEAWgegomXWj7eru5p8njHF9z.csv";

const USER_AGENT: &str = concat!("vortex/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Default for Source {
    fn default() -> Self {
        Self::Url(DEFAULT_SOURCE_URL.to_string())
    }
}

impl Source {
    /// Manual intake of a local file.
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::InvalidFileType`] for anything but a `.csv` path.
    pub fn file(path: impl Into<PathBuf>) -> Result<Self, VortexError> {
        let path = path.into();
        ensure_csv(&path)?;
        Ok(Self::File(path))
    }

    /// Human-readable location for logs and error messages.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Re-check intake rules for sources built without [`Source::file`].
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::InvalidFileType`] for non-CSV files.
    pub fn validate(&self) -> Result<(), VortexError> {
        match self {
            Self::Url(_) => Ok(()),
            Self::File(path) => ensure_csv(path),
        }
    }

    /// Read the raw payload. No retries, no timeout override.
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::SourceUnavailable`] on any network, HTTP or
    /// I/O failure.
    pub fn fetch(&self) -> Result<String, VortexError> {
        debug!(source = %self, "fetching task payload");
        match self {
            Self::Url(url) => fetch_url(url),
            Self::File(path) => std::fs::read_to_string(path).map_err(|err| unavailable(self, &err)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

fn fetch_url(url: &str) -> Result<String, VortexError> {
    let response = ureq::get(url)
        .set("Accept", "text/csv")
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|err| VortexError::SourceUnavailable {
            location: url.to_string(),
            reason: err.to_string(),
        })?;

    response
        .into_string()
        .map_err(|err| VortexError::SourceUnavailable {
            location: url.to_string(),
            reason: format!("failed to read response body: {err}"),
        })
}

fn unavailable(source: &Source, err: &dyn fmt::Display) -> VortexError {
    VortexError::SourceUnavailable {
        location: source.location(),
        reason: err.to_string(),
    }
}

/// Accept only paths ending in `.csv` (any case).
///
/// # Errors
///
/// Returns [`VortexError::InvalidFileType`] otherwise.
pub fn ensure_csv(path: &Path) -> Result<(), VortexError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(())
    } else {
        Err(VortexError::InvalidFileType {
            path: path.to_path_buf(),
        })
    }
}
