//! Rule-based coaching insights
//!
//! Insight generation is a pure function of the current similarity, the
//! joint-group accuracy of the live frame, the recent similarity history and
//! the performer's skill level. Same inputs, same insights.

use crate::{classify_trend, JointAccuracy, SkillLevel, Trend};

/// Joint-group score at or above which the group is a strength
pub const STRENGTH_THRESHOLD: f64 = 80.0;

/// Joint-group score below which the group is a weakness
pub const WEAKNESS_THRESHOLD: f64 = 60.0;

/// Feedback bundle returned for every recorded observation
#[derive(Debug, Clone, PartialEq)]
pub struct InsightBundle {
    pub motivational_message: &'static str,
    pub tips: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub trend: Trend,
    pub trend_remark: &'static str,
    pub technical_feedback: &'static str,
}

struct Tier {
    floor: f64,
    message: &'static str,
    tips: &'static [&'static str],
}

const TIERS: &[Tier] = &[
    Tier {
        floor: 90.0,
        message: "Outstanding! You're matching the reference almost perfectly!",
        tips: &[
            "Keep this energy and precision going",
            "Try adding your own style while staying in sync",
        ],
    },
    Tier {
        floor: 75.0,
        message: "Great job! You're following the moves closely.",
        tips: &[
            "Sharpen the end position of each movement",
            "Watch your arm extensions",
        ],
    },
    Tier {
        floor: 60.0,
        message: "Good work! You're getting the hang of it.",
        tips: &[
            "Pay attention to the timing of each move",
            "Mirror the reference posture more closely",
        ],
    },
    Tier {
        floor: 40.0,
        message: "Keep going! Every repetition brings you closer.",
        tips: &[
            "Slow down and focus on one body part at a time",
            "Make sure your whole body is visible to the camera",
        ],
    },
    Tier {
        floor: f64::NEG_INFINITY,
        message: "Don't give up! Let's break it down together.",
        tips: &[
            "Start by matching the basic stance",
            "Step back so the camera can see your full body",
            "Watch a few beats of the reference before joining in",
        ],
    },
];

fn tier_for(similarity: f64) -> &'static Tier {
    TIERS
        .iter()
        .find(|t| similarity >= t.floor)
        .unwrap_or(&TIERS[TIERS.len() - 1])
}

pub fn trend_remark(trend: Trend) -> &'static str {
    match trend {
        Trend::Starting => "Just getting started, keep moving!",
        Trend::Improving => "You're improving! Your recent moves beat your earlier ones.",
        Trend::Declining => "Your accuracy has dipped a little. Take a breath and refocus.",
        Trend::Stable => "You're holding steady. Push for the next level!",
    }
}

pub fn technical_feedback(skill: SkillLevel) -> &'static str {
    match skill {
        SkillLevel::Beginner => {
            "Focus on the overall shape of each pose before worrying about details."
        }
        SkillLevel::Intermediate => {
            "Work on smooth transitions between poses and consistent timing."
        }
        SkillLevel::Advanced => {
            "Refine your joint angles and timing to match the reference exactly."
        }
    }
}

/// Build the insight bundle for the latest observation
///
/// `history` holds the similarities of the rolling window, oldest first,
/// including the current one.
pub fn generate_insights(
    similarity: f64,
    accuracy: &JointAccuracy,
    history: &[f64],
    skill: SkillLevel,
) -> InsightBundle {
    let tier = tier_for(similarity);
    let mut tips: Vec<String> = tier.tips.iter().map(|t| t.to_string()).collect();
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    for (group, score) in accuracy {
        let label = group.label();
        if score.overall_score >= STRENGTH_THRESHOLD {
            strengths.push(format!("Excellent {label} positioning"));
        } else if score.overall_score >= WEAKNESS_THRESHOLD {
            tips.push(format!("Keep refining your {label} movement"));
        } else {
            weaknesses.push(format!("Your {label} needs more attention"));
        }
    }

    let trend = classify_trend(history);

    InsightBundle {
        motivational_message: tier.message,
        tips,
        strengths,
        weaknesses,
        trend,
        trend_remark: trend_remark(trend),
        technical_feedback: technical_feedback(skill),
    }
}
