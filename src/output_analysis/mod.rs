//! The output analysis module collects component statistics during a run.
//! Observations that arrive one at a time (waiting times, service times,
//! times in system) are tallied with a `Statistic`.  Quantities that hold a
//! value over an interval of simulated time (queue length, busy units) are
//! accumulated with a `TimeStatistic`, whose mean is weighted by duration.

use serde::{Deserialize, Serialize};

/// A sample statistic, accumulated one observation at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    name: String,
    count: usize,
    sum: f64,
    sum_squares: f64,
    min: f64,
    max: f64,
}

impl Statistic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            sum: 0.0,
            sum_squares: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clear all observations, keeping (or renaming) the statistic.
    pub fn reset(&mut self, name: &str) {
        *self = Self::new(name);
    }

    pub fn tally(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_squares += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Sample variance, with the n - 1 denominator.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        ((self.sum_squares - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    pub fn report(&self) -> StatReport {
        StatReport {
            name: self.name.clone(),
            kind: StatKind::Sample,
            count: self.count,
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            std_dev: self.std_dev(),
        }
    }
}

/// A time-persistent statistic.  Each `accumulate` call closes the interval
/// over which the previous value was held.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStatistic {
    name: String,
    start_time: f64,
    last_time: f64,
    last_value: f64,
    area: f64,
    area_squares: f64,
    changes: usize,
    min: f64,
    max: f64,
}

impl TimeStatistic {
    pub fn new(name: &str, start_time: f64) -> Self {
        Self {
            name: name.to_string(),
            start_time,
            last_time: start_time,
            last_value: 0.0,
            area: 0.0,
            area_squares: 0.0,
            changes: 0,
            min: 0.0,
            max: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record that the tracked quantity changed to `value` at `time`.
    pub fn accumulate(&mut self, value: f64, time: f64) {
        let span = (time - self.last_time).max(0.0);
        self.area += self.last_value * span;
        self.area_squares += self.last_value * self.last_value * span;
        self.last_time = time.max(self.last_time);
        self.last_value = value;
        self.changes += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn current(&self) -> f64 {
        self.last_value
    }

    /// Time-weighted mean over [start, now].
    pub fn mean(&self, now: f64) -> f64 {
        let duration = now - self.start_time;
        if duration <= 0.0 {
            return self.last_value;
        }
        let area = self.area + self.last_value * (now - self.last_time).max(0.0);
        area / duration
    }

    pub fn std_dev(&self, now: f64) -> f64 {
        let duration = now - self.start_time;
        if duration <= 0.0 {
            return 0.0;
        }
        let tail = (now - self.last_time).max(0.0);
        let area_squares = self.area_squares + self.last_value * self.last_value * tail;
        let mean = self.mean(now);
        (area_squares / duration - mean * mean).max(0.0).sqrt()
    }

    pub fn report(&self, now: f64) -> StatReport {
        StatReport {
            name: self.name.clone(),
            kind: StatKind::TimePersistent,
            count: self.changes,
            min: self.min,
            max: self.max,
            mean: self.mean(now),
            std_dev: self.std_dev(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKind {
    Sample,
    TimePersistent,
}

/// A summary row of a component statistic, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatReport {
    pub name: String,
    pub kind: StatKind,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}
