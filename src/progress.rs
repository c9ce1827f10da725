/// Highest fraction reported before a traversal has finished.
pub const PARTIAL_CEILING: f32 = 0.99;

/// Receives progress fractions in `[0, 1]`.
pub trait ProgressSink {
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn report(&mut self, fraction: f32) {
        self(fraction)
    }
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&mut self, _fraction: f32) {}
}

/// Keeps a job's progress monotonic: partial values stay below
/// [`PARTIAL_CEILING`], values that do not advance are dropped, and
/// [`Reporter::finish`] emits exactly `1.0` once.
pub struct Reporter<S> {
    sink: S,
    last: Option<f32>,
    finished: bool,
}

impl<S: ProgressSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Reporter { sink, last: None, finished: false }
    }

    pub fn report(&mut self, fraction: f32) {
        if self.finished || fraction.is_nan() {
            return;
        }
        let fraction = fraction.clamp(0.0, PARTIAL_CEILING);
        if self.last.is_some_and(|last| fraction <= last) {
            return;
        }
        self.last = Some(fraction);
        self.sink.report(fraction);
    }

    /// Reports `done / total`; nothing when `total` is zero.
    pub fn report_ratio(&mut self, done: usize, total: usize) {
        if total > 0 {
            self.report(done as f32 / total as f32);
        }
    }

    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.last = Some(1.0);
            self.sink.report(1.0);
        }
    }

    pub fn last(&self) -> Option<f32> {
        self.last
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}
