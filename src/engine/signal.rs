//! Small causal filters shared by the analyzers.
//!
//! Nothing here looks ahead: "smoothed" values near the end of a history
//! average over the samples that exist so far.

use std::collections::VecDeque;

/// FIFO that evicts its oldest entry once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Mean of the samples within `radius` of `index`, clipped to `0..len`.
pub fn moving_average(len: usize, index: usize, radius: usize, value: impl Fn(usize) -> f64) -> f64 {
    if len == 0 {
        return 0.0;
    }
    let index = index.min(len - 1);
    let lo = index.saturating_sub(radius);
    let hi = (index + radius).min(len - 1);
    let sum: f64 = (lo..=hi).map(&value).sum();
    sum / (hi - lo + 1) as f64
}

/// Lagged local-maximum test on the last four samples of a series.
///
/// True when the sample two back is at least the one before it and strictly
/// above the newest sample. `series[len - 3]` is the apex.
pub fn lagged_local_max(series: &[f64]) -> bool {
    let n = series.len();
    if n < 4 {
        return false;
    }
    let apex = series[n - 3];
    apex >= series[n - 4] && apex > series[n - 1]
}

/// Exponential moving average.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: None,
        }
    }

    /// Feed one sample; the first sample seeds the average.
    pub fn update(&mut self, sample: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
            None => sample,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Outcome of feeding one sample to a [`TroughTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TroughUpdate {
    /// The sample set a new running minimum; the ascent count restarted.
    NewMinimum,
    /// The sample sits above the minimum by more than the rise threshold.
    Rising(u32),
    /// Enough rising samples have been seen; the minimum is the trough.
    Confirmed,
    /// Within the noise band around the minimum.
    Flat,
}

/// Running-minimum trough detector with ascent confirmation.
///
/// Each sample is compared against the lowest value seen so far. A rise of
/// more than `rise_threshold` counts one ascending sample, a new minimum
/// resets the count, and `confirm_samples` ascending samples confirm the
/// minimum as the trough. The payload stored with the minimum is whatever
/// the caller wants back on confirmation.
#[derive(Debug, Clone)]
pub struct TroughTracker<T> {
    rise_threshold: f64,
    confirm_samples: u32,
    minimum: Option<(f64, T)>,
    ascending: u32,
}

impl<T> TroughTracker<T> {
    pub fn new(rise_threshold: f64, confirm_samples: u32) -> Self {
        Self {
            rise_threshold,
            confirm_samples: confirm_samples.max(1),
            minimum: None,
            ascending: 0,
        }
    }

    pub fn update(&mut self, value: f64, payload: T) -> TroughUpdate {
        let current_min = self.minimum.as_ref().map(|(v, _)| *v);
        match current_min {
            Some(min) if value >= min => {
                if value > min + self.rise_threshold {
                    self.ascending += 1;
                    if self.ascending >= self.confirm_samples {
                        TroughUpdate::Confirmed
                    } else {
                        TroughUpdate::Rising(self.ascending)
                    }
                } else {
                    TroughUpdate::Flat
                }
            }
            _ => {
                self.minimum = Some((value, payload));
                self.ascending = 0;
                TroughUpdate::NewMinimum
            }
        }
    }

    pub fn minimum(&self) -> Option<&(f64, T)> {
        self.minimum.as_ref()
    }

    pub fn take_minimum(&mut self) -> Option<(f64, T)> {
        self.ascending = 0;
        self.minimum.take()
    }

    pub fn ascending(&self) -> u32 {
        self.ascending
    }

    pub fn reset(&mut self) {
        self.minimum = None;
        self.ascending = 0;
    }
}
