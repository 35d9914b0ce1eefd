//! Frame timing.

/// Time elapsed per frame and since startup, advanced once per frame by the
/// frame driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct Time {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds since the first frame.
    pub elapsed: f64,
    pub frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame that took `dt` seconds. Negative or non-finite values
    /// are treated as zero.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.delta = dt;
        self.elapsed += f64::from(dt);
        self.frame_count += 1;
    }
}
