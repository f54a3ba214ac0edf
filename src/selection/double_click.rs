// Double-click timing

/// Classifies a click as the second half of a double click when it follows the previous
/// qualifying click within `max_interval` seconds. Target matching is the caller's job.
#[derive(Clone, Debug)]
pub struct DoubleClickDetector {
    max_interval: f64,
    last_click: Option<f64>,
}

impl DoubleClickDetector {
    pub fn new(max_interval: f64) -> Self {
        Self {
            max_interval,
            last_click: None,
        }
    }

    /// Register a click at `now` (seconds). True if it completes a double click; the
    /// window is consumed so a third click starts over. A late click opens a new window.
    pub fn handle_click(&mut self, now: f64) -> bool {
        if let Some(previous) = self.last_click {
            if now - previous <= self.max_interval {
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some(now);
        false
    }

    /// Open a fresh window at `now` without checking the old one
    pub fn restart(&mut self, now: f64) {
        self.last_click = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }

    pub fn max_interval(&self) -> f64 {
        self.max_interval
    }
}
