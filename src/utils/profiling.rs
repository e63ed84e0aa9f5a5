use std::time::{Duration, Instant};

/// Timing and counters for the most recent collision tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollisionProfiler {
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub total_frame_time: Duration,

    pub object_count: usize,
    pub candidate_count: usize,
    pub pair_tests: usize,
    pub collision_count: usize,
    pub skipped_pairs: usize,
}

impl CollisionProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        let total_us = self.total_frame_time.as_micros() as f32;
        if total_us < 1.0 || !log::log_enabled!(log::Level::Debug) {
            return;
        }

        log::debug!(
            "collision tick: {:.2} ms, objects {}, candidates {}, pair tests {}, hits {}, skipped {}",
            self.total_frame_time.as_secs_f32() * 1000.0,
            self.object_count,
            self.candidate_count,
            self.pair_tests,
            self.collision_count,
            self.skipped_pairs
        );
        log::debug!(
            "  broad phase {:.2} ms ({:.1}%), narrow phase {:.2} ms ({:.1}%)",
            self.broad_phase_time.as_secs_f32() * 1000.0,
            (self.broad_phase_time.as_micros() as f32 / total_us) * 100.0,
            self.narrow_phase_time.as_secs_f32() * 1000.0,
            (self.narrow_phase_time.as_micros() as f32 / total_us) * 100.0
        );
    }
}

/// Adds the time between construction and drop to a phase counter.
pub struct PhaseTimer {
    start: Instant,
}

impl PhaseTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self, output: &mut Duration) {
        *output += self.start.elapsed();
    }
}
