use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Fixed-interval gate: one permit per `period`, the first one a full period
/// after creation. Late ticks are delayed rather than bunched up.
pub struct RateGate {
    period: Duration,
    interval: Interval,
}

impl RateGate {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { period, interval }
    }

    /// Requests per second this gate allows at most.
    pub fn ceiling_per_second(&self) -> f64 {
        1.0 / self.period.as_secs_f64()
    }

    pub async fn wait(&mut self) {
        self.interval.tick().await;
    }
}
