/// Rate limiter driven by simulation time: fires at most once per `duration`.
///
/// Starts ready, so the first qualifying call fires immediately. A call whose condition
/// is false never consumes the interval.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    duration: f32,
    time: f32,
    last_fired: f32,
}

impl Interval {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            time: duration,
            last_fired: 0.0,
        }
    }

    /// Advance by `dt` and report whether the interval fires now.
    pub fn ready(&mut self, dt: f32, condition: bool) -> bool {
        self.time += dt;

        if self.time - self.last_fired > self.duration {
            if condition {
                self.last_fired = self.time;
            }
            return condition;
        }
        false
    }
}
