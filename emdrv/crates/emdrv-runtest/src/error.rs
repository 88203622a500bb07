//! Error types for emdrv-runtest

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for emdrv-runtest operations
#[derive(Debug)]
pub enum RuntestError {
    /// Filesystem error on a specific path
    Io { path: PathBuf, source: io::Error },
    /// A `_test.json` descriptor could not be decoded
    Descriptor {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A result document is not well-formed XML
    ResultParse { path: PathBuf, message: String },
    /// Writing an XML result document failed
    XmlWrite { path: PathBuf, message: String },
}

impl RuntestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RuntestError::Io {
            path: path.into(),
            source,
        }
    }

    /// Path of the file the error is about
    pub fn path(&self) -> &Path {
        match self {
            RuntestError::Io { path, .. }
            | RuntestError::Descriptor { path, .. }
            | RuntestError::ResultParse { path, .. }
            | RuntestError::XmlWrite { path, .. } => path.as_path(),
        }
    }
}

impl fmt::Display for RuntestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntestError::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            RuntestError::Descriptor { path, source } => {
                write!(f, "Invalid test descriptor {}: {source}", path.display())
            }
            RuntestError::ResultParse { path, message } => {
                write!(f, "Error parsing {}: {message}", path.display())
            }
            RuntestError::XmlWrite { path, message } => {
                write!(f, "Failed to write XML report {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for RuntestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntestError::Io { source, .. } => Some(source),
            RuntestError::Descriptor { source, .. } => Some(source),
            RuntestError::ResultParse { .. } | RuntestError::XmlWrite { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_file() {
        let err = RuntestError::ResultParse {
            path: PathBuf::from("out/EFM32GG_STK3700.xml"),
            message: "unexpected end of document".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error parsing out/EFM32GG_STK3700.xml: unexpected end of document"
        );
        assert_eq!(err.path(), Path::new("out/EFM32GG_STK3700.xml"));
    }

    #[test]
    fn test_io_error_exposes_source() {
        let err = RuntestError::io(
            "missing.html",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
