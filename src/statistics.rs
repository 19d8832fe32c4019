use std::time::{Duration, Instant};

/// Per-search counters, reset by `init` and sealed by `finish`.
#[derive(Debug, Default)]
pub struct SearchStats {
    pub nodes_popped: usize,
    pub duration: Option<Duration>,
    start_time: Option<Instant>,
}

impl SearchStats {
    pub fn init(&mut self) {
        self.nodes_popped = 0;
        self.duration = None;
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        if let Some(start_time) = self.start_time {
            self.duration = Some(start_time.elapsed());
        }
    }
}
