use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

pub(crate) const MIN_DELAY: Duration = Duration::from_millis(400);
pub(crate) const MAX_DELAY: Duration = Duration::from_millis(2000);

/// Pause taken after every delete or leave call of a sweep.
#[async_trait]
pub(crate) trait Throttle: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for a duration drawn uniformly from `[min, max]`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub(crate) fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub(crate) fn next_delay(&self) -> Duration {
        let (min, max) = (self.min.as_millis() as u64, self.max.as_millis() as u64);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(MIN_DELAY, MAX_DELAY)
    }
}

#[async_trait]
impl Throttle for RandomDelay {
    async fn pause(&self) {
        sleep(self.next_delay()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_in_bounds() {
        let delay = RandomDelay::default();
        for _ in 0..1000 {
            let next = delay.next_delay();
            assert!(next >= MIN_DELAY && next <= MAX_DELAY, "{next:?}");
        }
    }

    #[test]
    fn swapped_bounds_are_normalized() {
        let delay = RandomDelay::new(Duration::from_millis(50), Duration::from_millis(10));
        for _ in 0..100 {
            let next = delay.next_delay();
            assert!(next >= Duration::from_millis(10) && next <= Duration::from_millis(50));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pause_sleeps_for_the_drawn_delay() {
        let start = tokio::time::Instant::now();
        RandomDelay::default().pause().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= MIN_DELAY && elapsed <= MAX_DELAY, "{elapsed:?}");
    }
}
