use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};


#[derive(Clone, Copy, Debug)]
struct Sample {
    value: u64,
    time: Instant,
}


/// Processing speed over a sliding window of time buckets.
///
/// Each bucket is `granularity` wide and keeps the latest value
/// observed in it, the window keeps `window_size` buckets plus the
/// one used as the baseline.
pub struct Progress {
    samples: VecDeque<Sample>,
    capacity: usize,
    granularity: Duration,
    has_news: bool,
}


impl Progress {
    pub fn new(window_size: NonZeroUsize, granularity: Duration) -> Self {
        assert!(!granularity.is_zero());
        Self {
            samples: VecDeque::with_capacity(window_size.get() + 1),
            capacity: window_size.get() + 1,
            granularity,
            has_news: false,
        }
    }

    pub fn set_current_value(&mut self, value: u64) {
        self.set_value_at(value, Instant::now())
    }

    fn set_value_at(&mut self, value: u64, time: Instant) {
        self.has_news = true;

        let len = self.samples.len();
        let granularity = self.granularity;

        let Some(last) = self.samples.back_mut() else {
            self.samples.push_back(Sample { value, time });
            return
        };

        let value = value.max(last.value);

        if len > 1 && time <= last.time + granularity {
            last.value = value;
            return
        }

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { value, time });
    }

    pub fn current_value(&self) -> Option<u64> {
        self.samples.back().map(|s| s.value)
    }

    pub fn has_news(&self) -> bool {
        self.has_news
    }

    /// Units per second between the oldest and the newest sample
    pub fn speed(&mut self) -> f64 {
        self.has_news = false;

        let (Some(beg), Some(end)) = (self.samples.front(), self.samples.back()) else {
            return 0.0
        };

        let duration = end.time.duration_since(beg.time).as_secs_f64();
        if duration == 0.0 {
            return 0.0
        }

        (end.value - beg.value) as f64 / duration
    }
}
