// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::observability::{ProgressSink, TelemetrySink};

/// Optional hooks threaded through every segmentation driver.
///
/// The context never changes what a driver computes; it only observes it.
#[derive(Clone, Copy, Default)]
pub struct ExecutionContext<'a> {
    pub progress: Option<&'a dyn ProgressSink>,
    pub telemetry: Option<&'a dyn TelemetrySink>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with no hooks attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an optional progress sink.
    pub fn with_progress_sink(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets an optional telemetry sink.
    pub fn with_telemetry_sink(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Copy of this context that keeps telemetry but drops progress, for
    /// drivers nested inside a larger run that reports its own progress.
    pub fn without_progress(&self) -> Self {
        Self {
            progress: None,
            telemetry: self.telemetry,
        }
    }

    /// Emits clamped progress to the sink, if configured.
    pub fn report_progress(&self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }

        if let Some(sink) = self.progress {
            sink.on_progress(fraction.clamp(0.0, 1.0));
        }
    }

    /// Emits a scalar telemetry value to the sink, if configured.
    pub fn record_scalar(&self, key: &'static str, value: f64) {
        if let Some(sink) = self.telemetry {
            sink.record_scalar(key, value);
        }
    }
}

impl std::fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("progress", &self.progress.is_some())
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionContext;
    use crate::observability::{ProgressSink, TelemetrySink};
    use std::sync::Mutex;

    /// Records both progress and telemetry, the way a driver's caller would.
    #[derive(Default)]
    struct Recorder {
        progress: Mutex<Vec<f32>>,
        scalars: Mutex<Vec<(&'static str, f64)>>,
    }

    impl ProgressSink for Recorder {
        fn on_progress(&self, fraction: f32) {
            self.progress.lock().expect("progress lock").push(fraction);
        }
    }

    impl TelemetrySink for Recorder {
        fn record_scalar(&self, key: &'static str, value: f64) {
            self.scalars.lock().expect("telemetry lock").push((key, value));
        }
    }

    #[test]
    fn bare_context_is_silent() {
        let ctx = ExecutionContext::new();
        assert_eq!(
            format!("{ctx:?}"),
            "ExecutionContext { progress: false, telemetry: false }"
        );
        ctx.report_progress(0.5);
        ctx.report_progress(f32::NAN);
        ctx.record_scalar("segment.monotone.segments", 3.0);
    }

    #[test]
    fn progress_is_clamped_and_non_finite_values_are_dropped() {
        let recorder = Recorder::default();
        let ctx = ExecutionContext::new().with_progress_sink(&recorder);
        for fraction in [-0.2, 0.25, 1.2, f32::NAN, f32::INFINITY] {
            ctx.report_progress(fraction);
        }
        let got = recorder.progress.lock().expect("progress lock").clone();
        assert_eq!(got, vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn scalars_reach_the_telemetry_sink_in_order() {
        let recorder = Recorder::default();
        let ctx = ExecutionContext::new().with_telemetry_sink(&recorder);
        ctx.record_scalar("segment.monotone.predicate_evals", 12.0);
        ctx.record_scalar("bbmm.mle.iterations", 31.0);
        let got = recorder.scalars.lock().expect("telemetry lock").clone();
        assert_eq!(
            got,
            vec![
                ("segment.monotone.predicate_evals", 12.0),
                ("bbmm.mle.iterations", 31.0)
            ]
        );
    }

    #[test]
    fn without_progress_keeps_telemetry() {
        let recorder = Recorder::default();
        let outer = ExecutionContext::new()
            .with_progress_sink(&recorder)
            .with_telemetry_sink(&recorder);
        let inner = outer.without_progress();
        assert!(inner.progress.is_none());
        inner.report_progress(0.5);
        inner.record_scalar("segment.model_based.cells", 40.0);
        assert!(recorder.progress.lock().expect("progress lock").is_empty());
        assert_eq!(
            recorder.scalars.lock().expect("telemetry lock").as_slice(),
            &[("segment.model_based.cells", 40.0)]
        );
    }
}
