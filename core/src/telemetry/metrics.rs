use serde::Serialize;
use std::sync::Mutex;

/// Frame-loop counters surfaced to the driving layer.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Default)]
struct Metrics {
    frames: usize,
    triggers: usize,
    bursts_sealed: usize,
    shots_invalid: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    pub frames: usize,
    pub triggers: usize,
    pub bursts_sealed: usize,
    pub shots_invalid: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_frame(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames += 1;
        }
    }

    pub fn record_trigger(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.triggers += 1;
        }
    }

    pub fn record_seal(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.bursts_sealed += 1;
        }
    }

    pub fn record_invalid_shot(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.shots_invalid += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                frames: metrics.frames,
                triggers: metrics.triggers,
                bursts_sealed: metrics.bursts_sealed,
                shots_invalid: metrics.shots_invalid,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let recorder = MetricsRecorder::new();
        recorder.record_frame();
        recorder.record_frame();
        recorder.record_trigger();
        recorder.record_seal();
        recorder.record_invalid_shot();
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.frames, 2);
        assert_eq!(snapshot.triggers, 1);
        assert_eq!(snapshot.bursts_sealed, 1);
        assert_eq!(snapshot.shots_invalid, 1);
    }
}
