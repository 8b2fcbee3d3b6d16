//! User profile

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mirra_core::MirraError;

/// Performer experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn name(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for SkillLevel {
    type Err = MirraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            other => Err(MirraError::InvalidArgument(format!(
                "unknown skill level: {other}"
            ))),
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Preferred tone of feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStyle {
    #[default]
    Encouraging,
    Technical,
    Balanced,
}

impl FeedbackStyle {
    pub fn name(&self) -> &'static str {
        match self {
            FeedbackStyle::Encouraging => "encouraging",
            FeedbackStyle::Technical => "technical",
            FeedbackStyle::Balanced => "balanced",
        }
    }
}

impl FromStr for FeedbackStyle {
    type Err = MirraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encouraging" => Ok(FeedbackStyle::Encouraging),
            "technical" => Ok(FeedbackStyle::Technical),
            "balanced" => Ok(FeedbackStyle::Balanced),
            other => Err(MirraError::InvalidArgument(format!(
                "unknown feedback style: {other}"
            ))),
        }
    }
}

impl fmt::Display for FeedbackStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub skill_level: SkillLevel,
    pub feedback_style: FeedbackStyle,
    /// Free-form areas the performer wants to work on
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

impl UserProfile {
    pub fn new(skill_level: SkillLevel, feedback_style: FeedbackStyle) -> Self {
        Self {
            skill_level,
            feedback_style,
            focus_areas: Vec::new(),
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(skill) = update.skill_level {
            self.skill_level = skill;
        }
        if let Some(style) = update.feedback_style {
            self.feedback_style = style;
        }
        if let Some(areas) = update.focus_areas {
            self.focus_areas = areas;
        }
    }
}

/// Partial profile change; `None` fields are left as they are
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub skill_level: Option<SkillLevel>,
    pub feedback_style: Option<FeedbackStyle>,
    pub focus_areas: Option<Vec<String>>,
}
