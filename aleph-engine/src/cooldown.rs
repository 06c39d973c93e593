use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-user command cooldown: one use per `period`, measured from the
/// completion of the previous invocation.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    period: Duration,
    completed: HashMap<String, Instant>,
}

impl CooldownTracker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            completed: HashMap::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// `Err(retry_after)` while `user` is still cooling down.
    pub fn check(&self, user: &str, now: Instant) -> Result<(), Duration> {
        let Some(last) = self.completed.get(user) else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(*last);
        if elapsed < self.period {
            Err(self.period - elapsed)
        } else {
            Ok(())
        }
    }

    pub fn record_completion(&mut self, user: &str, now: Instant) {
        self.completed.insert(user.to_string(), now);
    }

    /// Forget users whose cooldown has expired.
    pub fn prune(&mut self, now: Instant) {
        let period = self.period;
        self.completed
            .retain(|_, last| now.saturating_duration_since(*last) < period);
    }

    pub fn tracked_users(&self) -> usize {
        self.completed.len()
    }
}
