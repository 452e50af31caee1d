/// Elapsed-seconds counter for a quiz attempt.
///
/// The clock does not read wall time. It is advanced by an external periodic
/// tick (once per real second) and only counts while running, which keeps it
/// deterministic in services and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionClock {
    elapsed: u64,
    running: bool,
}

impl SessionClock {
    /// Returns a stopped clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the counter to zero and starts counting.
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.running = true;
    }

    /// Freezes the counter. The elapsed value is retained.
    ///
    /// Stopping an already stopped clock is a no-op.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advances the counter by one second if the clock is running.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the elapsed time as `MM:SS`.
    #[must_use]
    pub fn display(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

/// Formats seconds as zero-padded `MM:SS`.
///
/// Minutes are not capped: one hour renders as `60:00`.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
