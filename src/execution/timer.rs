//! Scoped Timer
//!
//! Measures the wall-clock time of a labelled scope and logs it exactly
//! once, either when stopped explicitly or when dropped.

use std::time::{Duration, Instant};

use log::info;

/// Wall-clock timer for one labelled operation.
///
/// # Example
///
/// ```rust
/// use sqlbench::execution::ScopedTimer;
///
/// let timer = ScopedTimer::start("warmup");
/// // ... work ...
/// let elapsed = timer.stop();
/// assert!(elapsed.as_secs_f64() >= 0.0);
/// ```
#[derive(Debug)]
pub struct ScopedTimer {
    label: String,
    start: Instant,
    logged: bool,
}

impl ScopedTimer {
    /// Starts timing now.
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
            logged: false,
        }
    }

    /// Stops the timer, logs the elapsed time and returns it.
    pub fn stop(mut self) -> Duration {
        let elapsed = self.start.elapsed();
        self.log(elapsed);
        elapsed
    }

    fn log(&mut self, elapsed: Duration) {
        if self.logged {
            return;
        }
        self.logged = true;
        info!(
            "Execution time of {}: {:.6} seconds",
            self.label,
            elapsed.as_secs_f64()
        );
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.log(elapsed);
    }
}
