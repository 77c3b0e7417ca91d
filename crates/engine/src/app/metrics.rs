use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_poisoned_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics_lock_poisoned_recovered");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Simulated milliseconds per wall-clock millisecond. Falls below 1.0
    /// when frame deltas are being capped.
    pub sim_time_ratio: f32,
    pub clamped_frames: u32,
}

#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_poisoned_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_poisoned_once("write");
                *poisoned.into_inner() = snapshot;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    window_start: Instant,
    window: Duration,
    frames: u32,
    ticks: u32,
    clamped_frames: u32,
    wall_time: Duration,
    sim_time: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window_start: Instant::now(),
            window,
            frames: 0,
            ticks: 0,
            clamped_frames: 0,
            wall_time: Duration::ZERO,
            sim_time: Duration::ZERO,
        }
    }

    /// Records one presented frame: its raw wall delta and the capped delta
    /// the simulation actually advanced by.
    pub(crate) fn record_frame(&mut self, raw_dt: Duration, sim_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.wall_time = self.wall_time.saturating_add(raw_dt);
        self.sim_time = self.sim_time.saturating_add(sim_dt);
        if sim_dt < raw_dt {
            self.clamped_frames = self.clamped_frames.saturating_add(1);
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let (frame_time_ms, sim_time_ratio) = if self.frames == 0 {
            (0.0, 0.0)
        } else {
            let wall_ms = self.wall_time.as_secs_f32() * 1000.0;
            (
                wall_ms / self.frames as f32,
                self.sim_time.as_secs_f32() * 1000.0 / wall_ms.max(f32::EPSILON),
            )
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            sim_time_ratio,
            clamped_frames: self.clamped_frames,
        };
        *self = Self {
            window_start: now,
            ..Self::new(self.window)
        };
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 0.05, "{actual} vs {expected}");
    }

    fn poison(handle: &MetricsHandle) {
        let lock = handle.snapshot.as_ref();
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn snapshot_reports_rates_and_clamping() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let start = accumulator.window_start;

        accumulator.record_frame(Duration::from_millis(16), Duration::from_millis(16));
        accumulator.record_frame(Duration::from_millis(300), Duration::from_millis(100));
        accumulator.record_tick();
        accumulator.record_tick();

        let snapshot = accumulator
            .maybe_snapshot(start + Duration::from_secs(1))
            .expect("snapshot");

        assert_close(snapshot.fps, 2.0);
        assert_close(snapshot.tps, 2.0);
        assert_close(snapshot.frame_time_ms, 158.0);
        assert_close(snapshot.sim_time_ratio, 116.0 / 316.0);
        assert_eq!(snapshot.clamped_frames, 1);
    }

    #[test]
    fn snapshot_waits_for_full_window_and_then_resets() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let start = accumulator.window_start;
        accumulator.record_frame(Duration::from_millis(16), Duration::from_millis(16));

        assert!(accumulator
            .maybe_snapshot(start + Duration::from_millis(500))
            .is_none());
        assert!(accumulator
            .maybe_snapshot(start + Duration::from_secs(1))
            .is_some());
        assert_eq!(accumulator.frames, 0);
        assert_eq!(accumulator.clamped_frames, 0);
    }

    #[test]
    fn handle_recovers_after_poison() {
        let handle = MetricsHandle::default();
        poison(&handle);

        assert_eq!(handle.snapshot(), LoopMetricsSnapshot::default());
        let expected = LoopMetricsSnapshot {
            fps: 60.0,
            tps: 60.0,
            frame_time_ms: 16.6,
            sim_time_ratio: 1.0,
            clamped_frames: 0,
        };
        handle.publish(expected);
        assert_eq!(handle.snapshot(), expected);
    }
}
