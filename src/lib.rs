mod docx;
mod error;
mod pptx;
mod xlsx;

pub mod backend;
pub mod gateway;
pub mod job;
pub mod model;
pub mod package;
pub mod progress;
pub mod walker;

pub use error::{Error, PackageError, TranslateError};
pub use gateway::{Gateway, Translate};
pub use job::Job;
pub use model::{Document, DocumentKind};
pub use pptx::MAX_GROUP_DEPTH;

use std::path::{Path, PathBuf};

use progress::ProgressSink;

/// Translates `input` next to itself, inferring the kind from its extension.
pub fn translate_file<T: Translate, S: ProgressSink>(
    input: &Path,
    gateway: &Gateway<T>,
    progress: S,
) -> Result<PathBuf, Error> {
    Job::new(gateway).run(input, progress)
}
