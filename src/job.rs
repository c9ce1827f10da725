//! Load, walk and save one document per job.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Error, PackageError};
use crate::gateway::{Gateway, Translate};
use crate::model::{Document, DocumentKind};
use crate::package::Package;
use crate::progress::{ProgressSink, Reporter};
use crate::walker::{VisitText, Walk};
use crate::{docx, pptx, xlsx};

/// Appended to the input's file stem to name the translated artifact.
pub const TRANSLATED_SUFFIX: &str = "_VN";

/// `dir/report.docx` + `_VN` → `dir/report_VN.docx`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{suffix}");
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}

pub fn load(path: &Path, kind: DocumentKind) -> Result<(Package, Document), Error> {
    let load_package = || -> Result<(Package, Document), PackageError> {
        let package = Package::open(path)?;
        let document = match kind {
            DocumentKind::Word => Document::Word(docx::load(&package)?),
            DocumentKind::Sheet => Document::Sheet(xlsx::load(&package)?),
            DocumentKind::Slides => Document::Slides(pptx::load(&package)?),
        };
        Ok((package, document))
    };
    load_package().map_err(|source| Error::Load { path: path.to_path_buf(), source })
}

pub fn save(package: &Package, document: &Document, path: &Path) -> Result<(), Error> {
    package
        .save(document.text_units(), path)
        .map_err(|source| Error::Serialize { path: path.to_path_buf(), source })
}

/// Drives translation jobs through a shared gateway.
pub struct Job<'g, T> {
    gateway: &'g Gateway<T>,
    suffix: String,
    kind: Option<DocumentKind>,
}

impl<'g, T: Translate> Job<'g, T> {
    pub fn new(gateway: &'g Gateway<T>) -> Self {
        Job { gateway, suffix: TRANSLATED_SUFFIX.to_string(), kind: None }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Declares the kind of every input instead of inferring it from the extension.
    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn run<S: ProgressSink>(&self, input: &Path, sink: S) -> Result<PathBuf, Error> {
        let kind = match self.kind {
            Some(kind) => kind,
            None => DocumentKind::from_path(input)?,
        };
        self.run_as(input, kind, sink)
    }

    /// Translates `input` as a document of `kind` and returns the output path.
    /// Either the whole output is written or none of it is.
    pub fn run_as<S: ProgressSink>(
        &self,
        input: &Path,
        kind: DocumentKind,
        sink: S,
    ) -> Result<PathBuf, Error> {
        let (package, mut document) = load(input, kind)?;
        log::debug!(
            "{}: loaded as {kind}, {} text units",
            input.display(),
            document.text_units().len()
        );

        let mut progress = Reporter::new(sink);
        document.walk(self.gateway, &mut progress);

        let output = output_path(input, &self.suffix);
        save(&package, &document, &output)?;

        let changed = document.text_units().iter().filter(|u| u.is_modified()).count();
        log::info!(
            "{} -> {} ({changed} text units translated)",
            input.display(),
            output.display()
        );
        Ok(output)
    }

    /// Runs independent jobs concurrently. Each job owns its tree and its
    /// reporter; results come back in input order.
    pub fn run_batch<F, S>(&self, inputs: &[PathBuf], make_sink: F) -> Vec<Result<PathBuf, Error>>
    where
        F: Fn(&Path) -> S + Sync,
        S: ProgressSink,
    {
        inputs
            .par_iter()
            .map(|input| self.run(input, make_sink(input)))
            .collect()
    }
}
