use instant::Instant;
use std::time::Duration;

/// Default flush window for continuous input
pub const STROKE_WINDOW: Duration = Duration::from_millis(50);

/// Accumulates continuous input points into one batch per time window.
///
/// Time is passed in by the caller; the batcher owns only its deadline, which
/// the caller sleeps on and clears with [`StrokeBatcher::cancel`].
#[derive(Debug, Clone)]
pub struct StrokeBatcher<P> {
    window: Duration,
    points: Vec<P>,
    deadline: Option<Instant>,
}

impl<P> StrokeBatcher<P> {
    pub fn new() -> Self {
        Self::with_window(STROKE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            points: Vec::new(),
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// When the pending batch must be flushed
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending(&self) -> usize {
        self.points.len()
    }

    /// Add a point; the first point of a batch arms the deadline
    pub fn push(&mut self, point: P, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.window);
        }
        self.points.push(point);
    }

    /// Flush if the window has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> Option<Vec<P>> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Input ended (pointer up): flush whatever is pending
    pub fn finish(&mut self) -> Option<Vec<P>> {
        self.flush()
    }

    /// Drop pending points and disarm the deadline
    pub fn cancel(&mut self) {
        self.points.clear();
        self.deadline = None;
    }

    fn flush(&mut self) -> Option<Vec<P>> {
        self.deadline = None;
        if self.points.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.points))
    }
}

impl<P> Default for StrokeBatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}
