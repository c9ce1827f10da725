use std::fmt;
use std::path::PathBuf;

/// Failure of a whole translation job.
#[derive(Debug)]
pub enum Error {
    UnsupportedKind(String),
    Load { path: PathBuf, source: PackageError },
    Serialize { path: PathBuf, source: PackageError },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedKind(kind) => write!(f, "unsupported document kind: {kind}"),
            Error::Load { path, source } => {
                write!(f, "cannot load {}: {source}", path.display())
            }
            Error::Serialize { path, source } => {
                write!(f, "cannot write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UnsupportedKind(_) => None,
            Error::Load { source, .. } | Error::Serialize { source, .. } => Some(source),
        }
    }
}

/// Why an OOXML package could not be read or written.
#[derive(Debug)]
pub enum PackageError {
    MissingPart(String),
    Malformed(String),
    Zip(zip::result::ZipError),
    Xml(roxmltree::Error),
    Io(std::io::Error),
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::MissingPart(name) => write!(f, "missing part {name}"),
            PackageError::Malformed(reason) => write!(f, "malformed package: {reason}"),
            PackageError::Zip(e) => write!(f, "ZIP error: {e}"),
            PackageError::Xml(e) => write!(f, "XML error: {e}"),
            PackageError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for PackageError {}

impl From<zip::result::ZipError> for PackageError {
    fn from(e: zip::result::ZipError) -> Self {
        PackageError::Zip(e)
    }
}

impl From<roxmltree::Error> for PackageError {
    fn from(e: roxmltree::Error) -> Self {
        PackageError::Xml(e)
    }
}

impl From<std::io::Error> for PackageError {
    fn from(e: std::io::Error) -> Self {
        PackageError::Io(e)
    }
}

impl From<tempfile::PersistError> for PackageError {
    fn from(e: tempfile::PersistError) -> Self {
        PackageError::Io(e.error)
    }
}

/// A single string could not be translated. Never escapes the gateway.
#[derive(Debug)]
pub enum TranslateError {
    Http(Box<ureq::Error>),
    Io(std::io::Error),
    Response(String),
    Untranslatable(String),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Http(e) => write!(f, "HTTP error: {e}"),
            TranslateError::Io(e) => write!(f, "IO error: {e}"),
            TranslateError::Response(reason) => write!(f, "unusable response: {reason}"),
            TranslateError::Untranslatable(text) => write!(f, "no translation for {text:?}"),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<ureq::Error> for TranslateError {
    fn from(e: ureq::Error) -> Self {
        TranslateError::Http(Box::new(e))
    }
}

impl From<std::io::Error> for TranslateError {
    fn from(e: std::io::Error) -> Self {
        TranslateError::Io(e)
    }
}
