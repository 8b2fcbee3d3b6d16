//! Rolling observation window and trend classification

use std::collections::VecDeque;
use std::fmt;

/// Default number of observations kept
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// Average change (percentage points) that counts as a trend
pub const TREND_THRESHOLD: f64 = 5.0;

/// One scored frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub similarity: f64,
    pub score: u32,
    /// Seconds since session start
    pub timestamp: f64,
}

/// Direction of recent similarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    /// Fewer than 4 observations
    Starting,
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn name(&self) -> &'static str {
        match self {
            Trend::Starting => "starting",
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Classify a similarity history (oldest first)
///
/// With 10 or more values the last 5 are compared to the 5 before them.
/// With 4 to 9 the first half is compared to the rest.
pub fn classify_trend(similarities: &[f64]) -> Trend {
    let n = similarities.len();
    let (older, recent) = if n >= 10 {
        (&similarities[n - 10..n - 5], &similarities[n - 5..])
    } else if n >= 4 {
        similarities.split_at(n / 2)
    } else {
        return Trend::Starting;
    };

    let difference = mean(recent) - mean(older);
    if difference > TREND_THRESHOLD {
        Trend::Improving
    } else if difference < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Fixed-capacity FIFO of observations
#[derive(Debug, Clone)]
pub struct RollingWindow {
    observations: VecDeque<Observation>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            observations: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, observation: Observation) {
        while self.observations.len() >= self.capacity {
            self.observations.pop_front();
        }
        self.observations.push_back(observation);
    }

    pub fn clear(&mut self) {
        self.observations.clear();
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.back()
    }

    pub fn similarities(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.similarity).collect()
    }

    pub fn average_similarity(&self) -> f64 {
        mean(&self.similarities())
    }

    pub fn average_score(&self) -> f64 {
        let scores: Vec<f64> = self.observations.iter().map(|o| o.score as f64).collect();
        mean(&scores)
    }

    pub fn trend(&self) -> Trend {
        classify_trend(&self.similarities())
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}
