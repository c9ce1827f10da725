use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::TranslateError;

/// A string-to-string translation capability.
pub trait Translate: Send + Sync {
    fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

impl<T: Translate + ?Sized> Translate for Box<T> {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (**self).translate(text)
    }
}

impl<T: Translate + ?Sized> Translate for &T {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (**self).translate(text)
    }
}

/// Backend built from a closure, see [`from_fn`].
pub struct FromFn<F>(F);

pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Result<String, TranslateError> + Send + Sync,
{
    FromFn(f)
}

impl<F> Translate for FromFn<F>
where
    F: Fn(&str) -> Result<String, TranslateError> + Send + Sync,
{
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (self.0)(text)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub skipped: usize,
    pub translated: usize,
    pub failed: usize,
}

/// Fail-open front of a translation backend.
///
/// Strings that are too short or purely numeric never reach the backend, and
/// a failed call yields the input unchanged. A single attempt is made per
/// string.
pub struct Gateway<T> {
    backend: T,
    skipped: AtomicUsize,
    translated: AtomicUsize,
    failed: AtomicUsize,
}

impl<T: Translate> Gateway<T> {
    pub fn new(backend: T) -> Self {
        Gateway {
            backend,
            skipped: AtomicUsize::new(0),
            translated: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn translate(&self, text: &str) -> String {
        if !worth_translating(text) {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return text.to_string();
        }
        match self.backend.translate(text) {
            Ok(translated) if !translated.trim().is_empty() => {
                self.translated.fetch_add(1, Ordering::Relaxed);
                translated
            }
            Ok(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("backend returned an empty translation, keeping original");
                text.to_string()
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("translation failed, keeping original: {e}");
                text.to_string()
            }
        }
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            skipped: self.skipped.load(Ordering::Relaxed),
            translated: self.translated.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }
}

/// Empty, single-character and all-digit strings are not worth a call.
pub fn worth_translating(text: &str) -> bool {
    text.chars().nth(1).is_some() && !text.chars().all(char::is_numeric)
}
