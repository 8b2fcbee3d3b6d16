//! Session analytics engine
//!
//! `Uninitialized -> Active`. `start_session` always begins a fresh session,
//! discarding the previous rolling window and frame counter.

use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use mirra_core::{LandmarkFrame, MirraError, MirraResult, SkeletonLayout};

use crate::{
    generate_insights, joint_group_accuracy, ChatContext, FeedbackStyle, InsightBundle,
    JointAccuracy, Observation, ProfileUpdate, RollingWindow, SkillLevel, Trend, UserProfile,
    DEFAULT_WINDOW_CAPACITY,
};

/// Session identifier, derived from the wall clock in milliseconds
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(pub u64);

impl SessionId {
    #[inline]
    pub fn new(id: u64) -> Self {
        SessionId(id)
    }

    /// Time-based id, strictly greater than `previous`
    pub fn generate(previous: Option<SessionId>) -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        match previous {
            Some(prev) if prev.0 >= now_ms => SessionId(prev.0.saturating_add(1)),
            _ => SessionId(now_ms),
        }
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

/// Analytics configuration
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Rolling window length
    pub window_capacity: usize,
    pub layout: SkeletonLayout,
}

impl Default for CoachConfig {
    fn default() -> Self {
        CoachConfig {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            layout: SkeletonLayout::BLAZEPOSE_33,
        }
    }
}

/// Summary over the rolling window
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub average_similarity: f64,
    pub average_score: f64,
    /// Cumulative frames recorded this session (not bounded by the window)
    pub total_poses_analyzed: u64,
    /// Rounded to one decimal
    pub session_duration_minutes: f64,
    pub trend: Trend,
}

/// Result of recording one observation
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub insights: InsightBundle,
    pub joint_accuracy: JointAccuracy,
}

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    started_at: Instant,
    window: RollingWindow,
    total_frames: u64,
}

/// Stateful aggregator for one performer
#[derive(Debug)]
pub struct SessionAnalytics {
    config: CoachConfig,
    profile: UserProfile,
    active: Option<ActiveSession>,
    last_id: Option<SessionId>,
}

impl SessionAnalytics {
    pub fn new() -> Self {
        Self::with_config(CoachConfig::default())
    }

    pub fn with_config(config: CoachConfig) -> Self {
        SessionAnalytics {
            config,
            profile: UserProfile::default(),
            active: None,
            last_id: None,
        }
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Start a fresh session
    pub fn start_session(
        &mut self,
        skill_level: SkillLevel,
        feedback_style: FeedbackStyle,
    ) -> SessionId {
        self.start_session_at(skill_level, feedback_style, Instant::now())
    }

    pub fn start_session_at(
        &mut self,
        skill_level: SkillLevel,
        feedback_style: FeedbackStyle,
        now: Instant,
    ) -> SessionId {
        let id = SessionId::generate(self.last_id);
        self.last_id = Some(id);
        self.profile.skill_level = skill_level;
        self.profile.feedback_style = feedback_style;
        self.active = Some(ActiveSession {
            id,
            started_at: now,
            window: RollingWindow::new(self.config.window_capacity),
            total_frames: 0,
        });

        info!(session = %id, skill = %skill_level, style = %feedback_style, "session started");
        id
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> &UserProfile {
        self.profile.apply(update);
        &self.profile
    }

    /// Score each joint group of a live frame
    pub fn joint_group_accuracy(&self, live: &LandmarkFrame) -> JointAccuracy {
        joint_group_accuracy(live, &self.config.layout)
    }

    /// Append an observation and generate feedback for it
    pub fn record_observation(
        &mut self,
        similarity: f64,
        score: u32,
        live: &LandmarkFrame,
    ) -> MirraResult<Feedback> {
        self.record_observation_at(similarity, score, live, Instant::now())
    }

    pub fn record_observation_at(
        &mut self,
        similarity: f64,
        score: u32,
        live: &LandmarkFrame,
        now: Instant,
    ) -> MirraResult<Feedback> {
        let joint_accuracy = joint_group_accuracy(live, &self.config.layout);
        let skill = self.profile.skill_level;
        let session = self.active.as_mut().ok_or(MirraError::SessionNotStarted)?;

        session.window.push(Observation {
            similarity,
            score,
            timestamp: now.saturating_duration_since(session.started_at).as_secs_f64(),
        });
        session.total_frames += 1;

        let history = session.window.similarities();
        let insights = generate_insights(similarity, &joint_accuracy, &history, skill);
        debug!(
            session = %session.id,
            similarity,
            score,
            trend = %insights.trend,
            "observation recorded"
        );

        Ok(Feedback {
            insights,
            joint_accuracy,
        })
    }

    /// Drop the rolling window, keeping the session and its counter
    pub fn reset_window(&mut self) {
        if let Some(session) = self.active.as_mut() {
            session.window.clear();
        }
    }

    pub fn window(&self) -> Option<&RollingWindow> {
        self.active.as_ref().map(|s| &s.window)
    }

    pub fn trend(&self) -> Trend {
        self.window().map(|w| w.trend()).unwrap_or(Trend::Starting)
    }

    pub fn summary(&self) -> MirraResult<SessionSummary> {
        self.summary_at(Instant::now())
    }

    pub fn summary_at(&self, now: Instant) -> MirraResult<SessionSummary> {
        let session = self.active.as_ref().ok_or(MirraError::SessionNotStarted)?;
        let elapsed = now.saturating_duration_since(session.started_at);

        Ok(SessionSummary {
            session_id: session.id,
            average_similarity: session.window.average_similarity(),
            average_score: session.window.average_score(),
            total_poses_analyzed: session.total_frames,
            session_duration_minutes: round_minutes(elapsed),
            trend: session.window.trend(),
        })
    }

    /// Context handed to the chat responder
    pub fn chat_context(&self) -> ChatContext {
        let window = self.window().filter(|w| !w.is_empty());
        ChatContext {
            skill_level: self.profile.skill_level,
            average_score: window.map(|w| w.average_score()),
            average_similarity: window.map(|w| w.average_similarity()),
        }
    }

    pub fn chat(&self, message: &str) -> String {
        crate::respond(message, &self.chat_context())
    }
}

impl Default for SessionAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

fn round_minutes(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() / 60.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirra_core::Landmark;

    fn visible_frame() -> LandmarkFrame {
        (0..33).map(|_| Landmark::new(0.5, 0.5, 0.0, 0.9)).collect()
    }

    #[test]
    fn test_uninitialized_rejects_record_and_summary() {
        let mut engine = SessionAnalytics::new();
        assert!(!engine.is_active());
        assert!(matches!(
            engine.record_observation(50.0, 50, &visible_frame()),
            Err(MirraError::SessionNotStarted)
        ));
        assert!(matches!(engine.summary(), Err(MirraError::SessionNotStarted)));
        // stateless
        assert_eq!(engine.joint_group_accuracy(&visible_frame()).len(), 6);
    }

    #[test]
    fn test_window_holds_last_twenty() {
        let mut engine = SessionAnalytics::new();
        engine.start_session(SkillLevel::Beginner, FeedbackStyle::Encouraging);

        for i in 0..25 {
            engine
                .record_observation(i as f64, i, &visible_frame())
                .unwrap();
        }

        let window = engine.window().unwrap();
        assert_eq!(window.len(), 20);
        assert_eq!(window.similarities()[0], 5.0);

        let summary = engine.summary().unwrap();
        assert_eq!(summary.total_poses_analyzed, 25);
        assert!((summary.average_similarity - 14.5).abs() < 1e-9);
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut engine = SessionAnalytics::new();
        let first = engine.start_session(SkillLevel::Beginner, FeedbackStyle::Balanced);
        engine.record_observation(80.0, 80, &visible_frame()).unwrap();
        assert_eq!(engine.summary().unwrap().total_poses_analyzed, 1);

        let second = engine.start_session(SkillLevel::Advanced, FeedbackStyle::Technical);
        assert!(second > first);
        let summary = engine.summary().unwrap();
        assert_eq!(summary.total_poses_analyzed, 0);
        assert_eq!(summary.average_similarity, 0.0);
        assert_eq!(summary.trend, Trend::Starting);
        assert_eq!(engine.profile().skill_level, SkillLevel::Advanced);
    }

    #[test]
    fn test_counter_monotonic() {
        let mut engine = SessionAnalytics::new();
        engine.start_session(SkillLevel::Beginner, FeedbackStyle::Encouraging);
        let mut last = 0;
        for i in 0..30 {
            engine.record_observation(60.0, 60, &visible_frame()).unwrap();
            let total = engine.summary().unwrap().total_poses_analyzed;
            assert!(total > last, "iteration {i}");
            last = total;
        }
    }

    #[test]
    fn test_feedback_reports_trend() {
        let mut engine = SessionAnalytics::new();
        engine.start_session(SkillLevel::Intermediate, FeedbackStyle::Balanced);

        let mut feedback = None;
        for s in [50.0, 50.0, 50.0, 50.0, 50.0, 90.0, 90.0, 90.0, 90.0, 90.0] {
            feedback = Some(engine.record_observation(s, s as u32, &visible_frame()).unwrap());
        }
        let feedback = feedback.unwrap();
        assert_eq!(feedback.insights.trend, Trend::Improving);
        assert_eq!(engine.trend(), Trend::Improving);
        assert_eq!(feedback.joint_accuracy.len(), 6);
    }

    #[test]
    fn test_duration_rounding() {
        let mut engine = SessionAnalytics::new();
        let start = Instant::now();
        engine.start_session_at(SkillLevel::Beginner, FeedbackStyle::Encouraging, start);
        let summary = engine.summary_at(start + Duration::from_secs(100)).unwrap();
        assert_eq!(summary.session_duration_minutes, 1.7);
    }

    #[test]
    fn test_reset_window_keeps_counter() {
        let mut engine = SessionAnalytics::new();
        engine.start_session(SkillLevel::Beginner, FeedbackStyle::Encouraging);
        engine.record_observation(70.0, 70, &visible_frame()).unwrap();
        engine.reset_window();
        assert!(engine.window().unwrap().is_empty());
        assert_eq!(engine.summary().unwrap().total_poses_analyzed, 1);
    }

    #[test]
    fn test_chat_uses_session_average() {
        let mut engine = SessionAnalytics::new();
        engine.start_session(SkillLevel::Beginner, FeedbackStyle::Encouraging);
        engine.record_observation(70.0, 70, &visible_frame()).unwrap();
        engine.record_observation(90.0, 110, &visible_frame()).unwrap();
        assert!(engine.chat("my score?").contains("90.0"));
    }

    #[test]
    fn test_session_id_strictly_increasing() {
        let a = SessionId::generate(None);
        let b = SessionId::generate(Some(a));
        let c = SessionId::generate(Some(SessionId(u64::MAX - 1)));
        assert!(b > a);
        assert_eq!(c, SessionId(u64::MAX));
        // saturates instead of overflowing
        assert_eq!(SessionId::generate(Some(c)), SessionId(u64::MAX));
        assert!(a.to_string().starts_with("session_"));
    }
}
