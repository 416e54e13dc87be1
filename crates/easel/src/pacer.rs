//! Frame and step pacing.
//!
//! A program using easel advances in logical "steps" (one `refresh` call
//! per step) while frames are presented at an independent, usually lower,
//! rate. When the program cannot keep up, the frame rate is sacrificed
//! first and the step rate is held as long as possible, so animations keep
//! their speed and merely get choppier.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub(crate) const DEFAULT_FPS: f64 = 25.0;
pub(crate) const DEFAULT_STEPS_PER_SECOND: f64 = 50.0;

/// Window of recent presents used for the measured-FPS estimate.
const FPS_WINDOW: usize = 32;

pub(crate) struct Pacer {
    step_interval: Duration,
    frame_interval: Duration,
    next_step: Instant,
    last_frame: Instant,
    presents: VecDeque<Instant>,
}

impl Pacer {
    pub fn new(now: Instant) -> Self {
        Self {
            step_interval: per_second(DEFAULT_STEPS_PER_SECOND),
            frame_interval: per_second(DEFAULT_FPS),
            next_step: now,
            last_frame: now,
            presents: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Target frame rate. Values outside (0, 1000] are rejected.
    pub fn set_fps(&mut self, fps: f64) {
        match checked_rate(fps) {
            Some(interval) => self.frame_interval = interval,
            None => log::error!("ignoring invalid fps {fps}"),
        }
    }

    /// Target step rate for `refresh`. Values outside (0, 1000] are rejected.
    pub fn set_steps_per_second(&mut self, steps: f64) {
        match checked_rate(steps) {
            Some(interval) => self.step_interval = interval,
            None => log::error!("ignoring invalid step rate {steps}"),
        }
    }

    /// Whether this step should also present a frame.
    ///
    /// Skips the present when we are already late for the next step, unless
    /// the screen has been stale for two full frame intervals; then we
    /// render anyway so a badly overloaded program still shows progress.
    pub fn should_render(&self, now: Instant) -> bool {
        let frame_due = now >= self.last_frame + self.frame_interval;
        if !frame_due {
            return false;
        }
        let behind_on_steps = now > self.next_step + self.step_interval;
        if behind_on_steps {
            return now >= self.last_frame + 2 * self.frame_interval;
        }
        true
    }

    /// Records a presented frame.
    pub fn note_frame(&mut self, now: Instant) {
        self.last_frame = now;
        if self.presents.len() == FPS_WINDOW {
            self.presents.pop_front();
        }
        self.presents.push_back(now);
    }

    /// How long to sleep to hold the step rate, advancing the step deadline.
    ///
    /// When more than one full interval behind, the deadline snaps to `now`
    /// instead of accumulating debt, so a long stall does not cause a burst
    /// of catch-up steps.
    pub fn step_sleep(&mut self, now: Instant) -> Duration {
        if now > self.next_step + self.step_interval {
            self.next_step = now + self.step_interval;
            return Duration::ZERO;
        }
        let sleep = self.next_step.saturating_duration_since(now);
        self.next_step += self.step_interval;
        sleep
    }

    /// Frames per second actually achieved over the recent window.
    pub fn measured_fps(&self) -> f64 {
        if self.presents.len() < 2 {
            return 0.0;
        }
        let span = *self.presents.back().unwrap() - *self.presents.front().unwrap();
        if span.is_zero() {
            return 0.0;
        }
        (self.presents.len() - 1) as f64 / span.as_secs_f64()
    }
}

fn per_second(rate: f64) -> Duration {
    Duration::from_secs_f64(1.0 / rate)
}

fn checked_rate(rate: f64) -> Option<Duration> {
    if rate.is_finite() && rate > 0.0 && rate <= 1000.0 {
        Some(per_second(rate))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Instant {
        Instant::now()
    }

    #[test]
    fn renders_when_frame_due_and_on_schedule() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        pacer.note_frame(start);
        // Two on-time steps, then one 25fps frame interval elapsed.
        pacer.step_sleep(start);
        pacer.step_sleep(start + Duration::from_millis(20));
        assert!(pacer.should_render(start + Duration::from_millis(40)));
    }

    #[test]
    fn skips_frame_before_interval_elapses() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        pacer.note_frame(start);
        assert!(!pacer.should_render(start + Duration::from_millis(10)));
    }

    #[test]
    fn drops_frames_before_steps_when_behind() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        pacer.note_frame(start);
        // 60ms late on steps (deadline still at start), frame due but not
        // yet stale for two intervals: frame is sacrificed.
        assert!(!pacer.should_render(start + Duration::from_millis(60)));
        // After two full frame intervals the present happens regardless.
        assert!(pacer.should_render(start + Duration::from_millis(90)));
    }

    #[test]
    fn step_sleep_holds_rate() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        // First deadline is `start` itself.
        assert_eq!(pacer.step_sleep(start), Duration::ZERO);
        // 5ms into a 20ms interval: sleep the remaining 15ms.
        let sleep = pacer.step_sleep(start + Duration::from_millis(5));
        assert_eq!(sleep, Duration::from_millis(15));
    }

    #[test]
    fn step_debt_does_not_accumulate() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        pacer.step_sleep(start);
        // Stall far past the deadline: no sleep, and the next deadline is
        // rebased rather than burst-stepping to catch up.
        let late = start + Duration::from_millis(500);
        assert_eq!(pacer.step_sleep(late), Duration::ZERO);
        assert!(pacer.step_sleep(late + Duration::from_millis(1)) > Duration::ZERO);
    }

    #[test]
    fn measured_fps_reflects_present_spacing() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        for i in 0..5 {
            pacer.note_frame(start + Duration::from_millis(40 * i));
        }
        let fps = pacer.measured_fps();
        assert!((fps - 25.0).abs() < 0.5, "fps was {fps}");
    }

    #[test]
    fn rejects_invalid_rates() {
        let start = t0();
        let mut pacer = Pacer::new(start);
        pacer.set_fps(0.0);
        pacer.set_fps(f64::NAN);
        pacer.set_steps_per_second(-3.0);
        // Defaults still in effect: frame due after 40ms of on-time steps.
        pacer.note_frame(start);
        pacer.step_sleep(start);
        pacer.step_sleep(start + Duration::from_millis(20));
        assert!(pacer.should_render(start + Duration::from_millis(40)));
    }
}
