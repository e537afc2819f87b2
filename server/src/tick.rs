/// Turns variable frame times into a whole number of fixed simulation steps.
///
/// Frame time is clamped to `max_frame_time` before it is accumulated, so a long stall
/// costs at most `max_frame_time / dt` ticks instead of a catch-up spiral. Leftover time
/// carries into the next frame.
#[derive(Clone, Copy, Debug)]
pub struct FixedStep {
    dt: f64,
    max_frame_time: f64,
    accumulated: f64,
}

/// Absorbs rounding so frame times that are whole multiples of `dt` yield exactly that
/// many ticks.
const STEP_EPSILON: f64 = 1.0e-6;

impl FixedStep {
    pub fn new(dt: f32, max_frame_time: f32) -> Self {
        Self {
            dt: f64::from(dt),
            max_frame_time: f64::from(max_frame_time),
            accumulated: 0.0,
        }
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt as f32
    }

    /// Time accumulated but not yet simulated.
    #[inline]
    pub fn remainder(&self) -> f32 {
        self.accumulated as f32
    }

    /// Feed one frame's elapsed time and return how many ticks to run.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        let mut frame_time = f64::from(frame_time);
        if !frame_time.is_finite() || frame_time < 0.0 {
            frame_time = 0.0;
        }
        if frame_time > self.max_frame_time {
            log::debug!(
                "frame took {frame_time:.3}s, clamping to {:.3}s",
                self.max_frame_time
            );
            frame_time = self.max_frame_time;
        }

        self.accumulated += frame_time;

        let mut ticks = 0;
        while self.accumulated + STEP_EPSILON >= self.dt {
            self.accumulated = (self.accumulated - self.dt).max(0.0);
            ticks += 1;
        }
        ticks
    }
}
