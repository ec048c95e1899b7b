use super::records::CpuTimes;

/// Converts two successive cumulative tick samples into a usage percentage.
///
/// Stateful by necessity: a rate needs two points. The store owns one
/// instance and steps it under its lock, once per successful vitals
/// collection, so there is never more than one computation in flight.
#[derive(Debug, Default)]
pub struct CpuEstimator {
    prev: Option<CpuTimes>,
}

impl CpuEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next sample and get the usage over the elapsed interval.
    ///
    /// The first call only records the sample and returns 0.0. The previous
    /// sample is replaced unconditionally, including on the zero-delta path,
    /// so the next call always measures the next interval.
    pub fn sample(&mut self, current: CpuTimes) -> f64 {
        let Some(prev) = self.prev.replace(current) else {
            return 0.0;
        };

        // Saturating: counters are monotonic in theory, but absorb jitter.
        let idle_delta = current.idle.saturating_sub(prev.idle);
        let kernel_delta = current.kernel.saturating_sub(prev.kernel);
        let user_delta = current.user.saturating_sub(prev.user);

        let total_delta = kernel_delta + user_delta;
        if total_delta == 0 {
            return 0.0;
        }

        let usage = (1.0 - idle_delta as f64 / total_delta as f64) * 100.0;
        usage.clamp(0.0, 100.0)
    }
}
