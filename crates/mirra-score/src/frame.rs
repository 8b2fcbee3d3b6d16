//! Frame similarity - one live frame against one reference frame
//!
//! Every degenerate input (missing data, too few landmarks, nothing visible)
//! scores a similarity of 0 instead of failing. The scorer runs inside a live
//! feedback loop where a bad frame must never interrupt the session.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use std::fmt;

use mirra_core::{LandmarkFrame, MirraError, SkeletonLayout};

/// Fewer shared landmarks than this and frames are not compared
pub const MIN_COMPARABLE_LANDMARKS: usize = 10;

/// Distance multiplier of the canonical policy
pub const DISTANCE_SCALE: f64 = 100.0;

/// Distance multiplier of the legacy tiered policy
pub const LEGACY_DISTANCE_SCALE: f64 = 20.0;

/// How a similarity percentage becomes a discrete score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// `floor(similarity)` plus +20 at >= 95 or +10 at >= 85.
    /// Scores go up to 120.
    GranularBonus,
    /// Fixed buckets: >=90 -> 100, >=80 -> 80, >=70 -> 60, >=60 -> 40, >=50 -> 20, else 0
    Tiered,
}

/// Scoring policy: distance scale plus score mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// `similarity = 100 - avg_distance * distance_scale`
    pub distance_scale: f64,
    pub mode: ScoreMode,
}

impl ScoringPolicy {
    /// Canonical policy: scale 100, granular score with excellence bonus
    pub fn granular() -> Self {
        ScoringPolicy {
            distance_scale: DISTANCE_SCALE,
            mode: ScoreMode::GranularBonus,
        }
    }

    /// Earlier lenient policy: scale 20, bucketed score
    pub fn legacy() -> Self {
        ScoringPolicy {
            distance_scale: LEGACY_DISTANCE_SCALE,
            mode: ScoreMode::Tiered,
        }
    }

    /// Map a similarity in [0, 100] to a discrete score
    pub fn score(&self, similarity: f64) -> u32 {
        match self.mode {
            ScoreMode::GranularBonus => {
                let base = similarity.floor().max(0.0) as u32;
                let bonus = if similarity >= 95.0 {
                    20
                } else if similarity >= 85.0 {
                    10
                } else {
                    0
                };
                base + bonus
            }
            ScoreMode::Tiered => {
                if similarity >= 90.0 {
                    100
                } else if similarity >= 80.0 {
                    80
                } else if similarity >= 70.0 {
                    60
                } else if similarity >= 60.0 {
                    40
                } else if similarity >= 50.0 {
                    20
                } else {
                    0
                }
            }
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::granular()
    }
}

/// Verbal rating attached to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    Perfect,
    Great,
    Good,
    Fair,
    Poor,
    Miss,
}

impl ScoreTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 100 => ScoreTier::Perfect,
            s if s >= 80 => ScoreTier::Great,
            s if s >= 60 => ScoreTier::Good,
            s if s >= 40 => ScoreTier::Fair,
            s if s >= 20 => ScoreTier::Poor,
            _ => ScoreTier::Miss,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreTier::Perfect => "PERFECT!",
            ScoreTier::Great => "GREAT!",
            ScoreTier::Good => "GOOD!",
            ScoreTier::Fair => "FAIR",
            ScoreTier::Poor => "POOR",
            ScoreTier::Miss => "MISS",
        }
    }
}

/// Why a comparison produced no usable points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    MissingData,
    TooFewLandmarks { reference: usize, live: usize },
    NoVisiblePoints,
}

impl fmt::Display for Degenerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degenerate::MissingData => f.write_str("missing pose data"),
            Degenerate::TooFewLandmarks { reference, live } => write!(
                f,
                "too few landmarks (reference {reference}, live {live}, need {MIN_COMPARABLE_LANDMARKS})"
            ),
            Degenerate::NoVisiblePoints => f.write_str("no key point visible in both frames"),
        }
    }
}

/// Result of scoring one frame pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameScore {
    /// Percentage in [0, 100]
    pub similarity: f64,
    pub score: u32,
    /// Key points that were visible in both frames
    pub valid_points: usize,
    pub average_distance: Option<f64>,
    /// Set when the frames could not be compared
    pub degenerate: Option<Degenerate>,
}

impl FrameScore {
    fn degenerate(reason: Degenerate, policy: &ScoringPolicy) -> Self {
        FrameScore {
            similarity: 0.0,
            score: policy.score(0.0),
            valid_points: 0,
            average_distance: None,
            degenerate: Some(reason),
        }
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }

    /// Why the frames were not compared
    pub fn reason(&self) -> Option<MirraError> {
        self.degenerate
            .map(|d| MirraError::InsufficientData(d.to_string()))
    }
}

/// Score a live frame against a reference frame
pub fn score_frame(
    reference: &LandmarkFrame,
    live: &LandmarkFrame,
    layout: &SkeletonLayout,
    policy: &ScoringPolicy,
) -> FrameScore {
    if reference.is_empty() || live.is_empty() {
        debug!("missing pose data");
        return FrameScore::degenerate(Degenerate::MissingData, policy);
    }

    let shared = reference.len().min(live.len());
    if shared < MIN_COMPARABLE_LANDMARKS {
        debug!(
            reference = reference.len(),
            live = live.len(),
            "too few landmarks"
        );
        return FrameScore::degenerate(
            Degenerate::TooFewLandmarks {
                reference: reference.len(),
                live: live.len(),
            },
            policy,
        );
    }
    if reference.len() != live.len() {
        debug!(
            reference = reference.len(),
            live = live.len(),
            using = shared,
            "landmark count mismatch"
        );
    }

    let mut total_distance = 0.0;
    let mut valid_points = 0usize;
    for &index in layout.key_points.iter().filter(|i| **i < shared) {
        let (r, l) = (&reference.landmarks()[index], &live.landmarks()[index]);
        if r.is_visible() && l.is_visible() {
            total_distance += r.planar_distance(l);
            valid_points += 1;
        }
    }

    if valid_points == 0 {
        debug!("no valid points for comparison");
        return FrameScore::degenerate(Degenerate::NoVisiblePoints, policy);
    }

    let average_distance = total_distance / valid_points as f64;
    let raw = 100.0 - average_distance * policy.distance_scale;
    // NaN coordinates score zero
    let similarity = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) };
    trace!(average_distance, valid_points, similarity, "frame scored");

    FrameScore {
        similarity,
        score: policy.score(similarity),
        valid_points,
        average_distance: Some(average_distance),
        degenerate: None,
    }
}

/// Frame scorer bound to a layout and policy
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameScorer {
    layout: SkeletonLayout,
    policy: ScoringPolicy,
}

impl FrameScorer {
    pub fn new(layout: SkeletonLayout, policy: ScoringPolicy) -> Self {
        Self { layout, policy }
    }

    pub fn layout(&self) -> &SkeletonLayout {
        &self.layout
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn score(&self, reference: &LandmarkFrame, live: &LandmarkFrame) -> FrameScore {
        score_frame(reference, live, &self.layout, &self.policy)
    }
}
