use std::time::Instant;

/// Whether the field animates or renders a single frozen frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RenderPolicy {
    /// Request a new frame after every drawn frame.
    #[default]
    Animate,
    /// Draw once at a fixed timestamp (seconds) and only redraw on resize.
    Still {
        time: f32,
    },
}

impl RenderPolicy {
    /// True when the loop should keep scheduling frames on its own.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Animate)
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed time in seconds since the loop started.
    pub seconds: f32,
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
///
/// `now` is the frame timestamp handed in by the scheduler; sources decide
/// whether to honour it.
pub trait TimeSource {
    fn reset(&mut self, now: Instant);
    fn sample(&mut self, now: Instant) -> TimeSample;
}

/// Measures elapsed time from the instant the loop was started.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Option<Instant>,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: None,
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self, now: Instant) {
        self.origin = Some(now);
        self.frame = 0;
    }

    fn sample(&mut self, now: Instant) -> TimeSample {
        let origin = *self.origin.get_or_insert(now);
        let seconds = now.saturating_duration_since(origin).as_secs_f32();
        let sample = TimeSample::new(seconds, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports the same timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self, _now: Instant) {
        self.frame = 0;
    }

    fn sample(&mut self, _now: Instant) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

pub type BoxedTimeSource = Box<dyn TimeSource>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } => Box::new(FixedTimeSource::new(*time)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn system_source_reports_seconds_since_reset() {
        let start = Instant::now();
        let mut source = SystemTimeSource::new();
        source.reset(start);

        let first = source.sample(start + Duration::from_millis(1500));
        assert!((first.seconds - 1.5).abs() < 1e-4);
        assert_eq!(first.frame_index, 0);

        let second = source.sample(start + Duration::from_millis(2000));
        assert!((second.seconds - 2.0).abs() < 1e-4);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn system_source_never_goes_negative() {
        let start = Instant::now();
        let mut source = SystemTimeSource::new();
        source.reset(start + Duration::from_secs(1));
        assert_eq!(source.sample(start).seconds, 0.0);
    }

    #[test]
    fn fixed_source_ignores_the_clock() {
        let mut source = FixedTimeSource::new(3.25);
        let now = Instant::now();
        assert_eq!(source.sample(now).seconds, 3.25);
        assert_eq!(source.sample(now + Duration::from_secs(60)).seconds, 3.25);
    }

    #[test]
    fn policy_selects_source() {
        let now = Instant::now();
        let mut still = time_source_for_policy(&RenderPolicy::Still { time: 7.0 });
        still.reset(now);
        assert_eq!(still.sample(now + Duration::from_secs(2)).seconds, 7.0);

        let mut animate = time_source_for_policy(&RenderPolicy::Animate);
        animate.reset(now);
        assert!((animate.sample(now + Duration::from_secs(2)).seconds - 2.0).abs() < 1e-4);
        assert!(RenderPolicy::Animate.is_continuous());
        assert!(!RenderPolicy::Still { time: 0.0 }.is_continuous());
    }
}
