//! Resource Samples
//!
//! A single CPU/memory observation of the monitored server process and
//! the running summary folded from those observations.

use std::fmt;

use chrono::{DateTime, Local};

/// Bytes per megabyte used when converting resident memory.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A single resource usage sample.
#[derive(Debug, Clone)]
pub struct Sample {
    /// When this sample was taken
    pub taken_at: DateTime<Local>,
    /// CPU usage percentage over the sampling interval (0-100 per core)
    pub cpu_percent: f32,
    /// Resident memory in megabytes
    pub memory_mb: f64,
}

impl Sample {
    /// Builds a sample from a CPU reading and a raw resident byte count.
    pub fn new(cpu_percent: f32, resident_bytes: u64) -> Self {
        Self {
            taken_at: Local::now(),
            cpu_percent,
            memory_mb: resident_bytes as f64 / BYTES_PER_MB,
        }
    }
}

/// Why a sampling session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The controller set the cancellation signal
    #[default]
    Cancelled,
    /// No matching process was found within the lookup budget
    NotFound,
    /// The process exited while being sampled
    Terminated,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Cancelled => "cancelled",
            StopReason::NotFound => "process not found",
            StopReason::Terminated => "process terminated",
        };
        f.write_str(text)
    }
}

/// Aggregate of every sample taken during one monitoring session.
///
/// Samples themselves are not retained; each one is folded in with
/// [`record`](Self::record) as soon as it has been logged.
#[derive(Debug, Clone, Default)]
pub struct MonitorSummary {
    samples: usize,
    cpu_total: f64,
    peak_memory_mb: f64,
    min_memory_mb: Option<f64>,
    /// How the session ended
    pub stop_reason: StopReason,
}

impl MonitorSummary {
    /// Folds one sample into the summary.
    pub fn record(&mut self, sample: &Sample) {
        self.samples += 1;
        self.cpu_total += f64::from(sample.cpu_percent);
        self.peak_memory_mb = self.peak_memory_mb.max(sample.memory_mb);
        self.min_memory_mb = Some(match self.min_memory_mb {
            Some(min) => min.min(sample.memory_mb),
            None => sample.memory_mb,
        });
    }

    /// Returns the number of samples recorded.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Returns the average CPU usage.
    pub fn average_cpu(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.cpu_total / self.samples as f64
    }

    /// Returns the peak memory usage in MB.
    pub fn peak_memory_mb(&self) -> f64 {
        self.peak_memory_mb
    }

    /// Returns the lowest memory usage in MB.
    pub fn min_memory_mb(&self) -> f64 {
        self.min_memory_mb.unwrap_or(0.0)
    }
}

impl fmt::Display for MonitorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.samples == 0 {
            return write!(f, "No resource data collected ({})", self.stop_reason);
        }

        write!(
            f,
            "Resource Usage:\n  Average CPU: {:.1}%\n  Peak Memory: {:.2} MB\n  Min Memory: {:.2} MB\n  Samples: {} ({})",
            self.average_cpu(),
            self.peak_memory_mb,
            self.min_memory_mb(),
            self.samples,
            self.stop_reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_converts_bytes_to_megabytes() {
        let sample = Sample::new(12.5, 3 * 1024 * 1024 + 512 * 1024);
        assert_eq!(sample.cpu_percent, 12.5);
        assert!((sample.memory_mb - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_empty() {
        let summary = MonitorSummary::default();
        assert_eq!(summary.samples(), 0);
        assert_eq!(summary.average_cpu(), 0.0);
        assert_eq!(summary.peak_memory_mb(), 0.0);
        assert_eq!(summary.min_memory_mb(), 0.0);
        assert!(summary.to_string().contains("No resource data collected"));
    }

    #[test]
    fn test_summary_aggregates() {
        let mut summary = MonitorSummary::default();
        summary.record(&Sample::new(10.0, 100 * 1024 * 1024));
        summary.record(&Sample::new(30.0, 300 * 1024 * 1024));
        summary.record(&Sample::new(20.0, 200 * 1024 * 1024));

        assert_eq!(summary.samples(), 3);
        assert!((summary.average_cpu() - 20.0).abs() < 1e-9);
        assert!((summary.peak_memory_mb() - 300.0).abs() < 1e-9);
        assert!((summary.min_memory_mb() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_format() {
        let mut summary = MonitorSummary::default();
        summary.record(&Sample::new(5.0, 64 * 1024 * 1024));
        summary.stop_reason = StopReason::Terminated;

        let text = summary.to_string();
        assert!(text.contains("Resource Usage"));
        assert!(text.contains("Average CPU"));
        assert!(text.contains("Peak Memory"));
        assert!(text.contains("Samples: 1"));
        assert!(text.contains("process terminated"));
    }

    #[test]
    fn test_stop_reason_default_is_cancelled() {
        assert_eq!(StopReason::default(), StopReason::Cancelled);
        assert_eq!(StopReason::NotFound.to_string(), "process not found");
    }
}
