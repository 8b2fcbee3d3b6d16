//! Motion service
//!
//! One shared service per process. All session state (active reference,
//! playback cursor, analytics engine) lives behind a single mutex, so every
//! operation observes and leaves a consistent snapshot. Corpus reads happen
//! before the lock is taken.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use mirra_coach::{
    Feedback, FeedbackStyle, InsightBundle, JointAccuracy, ProfileUpdate, SessionAnalytics,
    SessionId, SessionSummary, SkillLevel, UserProfile,
};
use mirra_core::{AngleSample, LandmarkFrame, MirraError, MirraResult};
use mirra_score::{compare, FrameScore, FrameScorer, SeriesComparison};

use crate::{load_reference, CorpusSource, FsCorpus, ReferenceSequence, RuntimeConfig};

/// Result of scoring one live frame
#[derive(Debug, Clone, PartialEq)]
pub struct LiveComparison {
    /// Similarity percentage rounded to two decimals
    pub similarity: f64,
    pub score: u32,
    /// Tier message for the score
    pub message: &'static str,
    /// Reference frame the live frame was scored against
    pub reference_index: Option<usize>,
    pub frame: FrameScore,
    pub joint_accuracy: JointAccuracy,
    /// Present while a session is active
    pub insights: Option<InsightBundle>,
}

/// Snapshot of the service state
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub video: Option<String>,
    pub reference_frames: usize,
    pub cursor: usize,
    pub session_active: bool,
    pub session_id: Option<SessionId>,
    /// Observations currently in the rolling window
    pub window_len: usize,
}

struct SessionState {
    reference: Option<Arc<ReferenceSequence>>,
    cursor: usize,
    analytics: SessionAnalytics,
}

impl SessionState {
    fn score(
        &mut self,
        scorer: &FrameScorer,
        reference: &LandmarkFrame,
        live: &LandmarkFrame,
        reference_index: Option<usize>,
    ) -> MirraResult<LiveComparison> {
        let frame = scorer.score(reference, live);

        let (joint_accuracy, insights) = if self.analytics.is_active() {
            let Feedback {
                insights,
                joint_accuracy,
            } = self
                .analytics
                .record_observation(frame.similarity, frame.score, live)?;
            (joint_accuracy, Some(insights))
        } else {
            (self.analytics.joint_group_accuracy(live), None)
        };

        Ok(LiveComparison {
            similarity: round2(frame.similarity),
            score: frame.score,
            message: frame.tier().message(),
            reference_index,
            frame,
            joint_accuracy,
            insights,
        })
    }
}

/// Shared motion-comparison service
pub struct MotionService {
    config: RuntimeConfig,
    corpus: Box<dyn CorpusSource>,
    scorer: FrameScorer,
    state: Mutex<SessionState>,
}

impl MotionService {
    pub fn new(config: RuntimeConfig, corpus: impl CorpusSource + 'static) -> MirraResult<Self> {
        config.validate()?;
        let coach = config.coach_config();
        let scorer = FrameScorer::new(coach.layout, config.scoring);

        Ok(MotionService {
            scorer,
            corpus: Box::new(corpus),
            state: Mutex::new(SessionState {
                reference: None,
                cursor: 0,
                analytics: SessionAnalytics::with_config(coach),
            }),
            config,
        })
    }

    /// Service over the on-disk corpus at `config.corpus_root`
    pub fn from_config(config: RuntimeConfig) -> MirraResult<Self> {
        let corpus = FsCorpus::new(config.corpus_root.clone());
        Self::new(config, corpus)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn list_videos(&self) -> MirraResult<Vec<String>> {
        self.corpus.list_videos()
    }

    pub fn start_session(&self, skill_level: SkillLevel, feedback_style: FeedbackStyle) -> SessionId {
        self.state
            .lock()
            .analytics
            .start_session(skill_level, feedback_style)
    }

    /// Score a live frame against the next reference frame
    ///
    /// The cursor advances by one per call and wraps at the end of the
    /// reference. Loads the default video on first use.
    pub fn compare_live(&self, live: &LandmarkFrame) -> MirraResult<LiveComparison> {
        self.ensure_reference()?;

        let mut state = self.state.lock();
        let reference = state
            .reference
            .clone()
            .ok_or_else(|| MirraError::MissingSource("no reference video selected".into()))?;
        let index = state.cursor % reference.len();
        state.cursor = (index + 1) % reference.len();

        let comparison = state.score(&self.scorer, reference.frame(index), live, Some(index))?;
        debug!(
            video = reference.video(),
            index,
            similarity = comparison.similarity,
            score = comparison.score,
            "live frame compared"
        );
        Ok(comparison)
    }

    /// Score a live frame against an explicit reference frame
    pub fn compare_frames(
        &self,
        reference: &LandmarkFrame,
        live: &LandmarkFrame,
    ) -> MirraResult<LiveComparison> {
        self.state.lock().score(&self.scorer, reference, live, None)
    }

    /// Compare two angle tables with the configured grid size
    pub fn compare_offline(
        &self,
        reference: &[AngleSample],
        live: &[AngleSample],
    ) -> MirraResult<SeriesComparison> {
        compare(reference, live, self.config.offline_samples)
    }

    /// Compare a performance against a corpus video's angle table
    pub fn compare_offline_video(
        &self,
        video: &str,
        live: &[AngleSample],
    ) -> MirraResult<SeriesComparison> {
        let reference = self.corpus.load_angles(video)?;
        self.compare_offline(&reference, live)
    }

    /// Record an externally scored observation
    pub fn record(&self, similarity: f64, score: u32, live: &LandmarkFrame) -> MirraResult<Feedback> {
        self.state
            .lock()
            .analytics
            .record_observation(similarity, score, live)
    }

    pub fn summary(&self) -> MirraResult<SessionSummary> {
        self.state.lock().analytics.summary()
    }

    pub fn profile(&self) -> UserProfile {
        self.state.lock().analytics.profile().clone()
    }

    pub fn profile_update(&self, update: ProfileUpdate) -> UserProfile {
        self.state.lock().analytics.update_profile(update).clone()
    }

    pub fn chat(&self, message: &str) -> String {
        self.state.lock().analytics.chat(message)
    }

    /// Make `video` the active reference
    ///
    /// Restarts playback at frame 0 and clears the rolling window. Returns
    /// the number of reference frames.
    pub fn switch_video(&self, video: &str) -> MirraResult<usize> {
        let sequence = Arc::new(load_reference(self.corpus.as_ref(), video)?);
        let frames = sequence.len();

        {
            let mut state = self.state.lock();
            state.reference = Some(sequence);
            state.cursor = 0;
            state.analytics.reset_window();
        }

        info!(video, frames, "reference video switched");
        Ok(frames)
    }

    pub fn status(&self) -> ServiceStatus {
        let state = self.state.lock();
        ServiceStatus {
            video: state.reference.as_ref().map(|r| r.video().to_string()),
            reference_frames: state.reference.as_ref().map_or(0, |r| r.len()),
            cursor: state.cursor,
            session_active: state.analytics.is_active(),
            session_id: state.analytics.session_id(),
            window_len: state.analytics.window().map_or(0, |w| w.len()),
        }
    }

    fn ensure_reference(&self) -> MirraResult<()> {
        let loaded = self.state.lock().reference.is_some();
        if loaded {
            return Ok(());
        }

        let video = self
            .config
            .default_video
            .as_deref()
            .ok_or_else(|| MirraError::MissingSource("no reference video selected".into()))?;
        let sequence = Arc::new(load_reference(self.corpus.as_ref(), video)?);

        let mut state = self.state.lock();
        // another caller may have switched while we were loading
        if state.reference.is_none() {
            state.reference = Some(sequence);
            state.cursor = 0;
        }
        Ok(())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use proptest::prelude::*;

    use mirra_coach::Trend;
    use mirra_core::{Landmark, PoseRecord};

    use crate::corpus::tests::sample_extraction;
    use crate::{Extraction, MemoryCorpus};

    fn body(x: f64) -> LandmarkFrame {
        (0..33)
            .map(|i| Landmark::new(x + i as f64 * 0.01, 0.5, 0.0, 0.95))
            .collect()
    }

    fn extraction_of(frames: &[LandmarkFrame]) -> Extraction {
        Extraction {
            records: frames
                .iter()
                .enumerate()
                .map(|(i, f)| PoseRecord::detected(i as f64 / 15.0, f.clone()))
                .collect(),
            angles: (0..frames.len())
                .map(|i| AngleSample::new(i as f64 / 15.0, 1.0, 2.0, 3.0, 1.0 + i as f64))
                .collect(),
        }
    }

    fn service() -> MotionService {
        let corpus = MemoryCorpus::new()
            .with_video("steady", extraction_of(&[body(0.3), body(0.3), body(0.3)]))
            .with_video("shifted", extraction_of(&[body(0.31), body(0.32)]))
            .with_video("gappy", sample_extraction(10));
        let config = RuntimeConfig {
            default_video: Some("steady".into()),
            ..RuntimeConfig::default()
        };
        MotionService::new(config, corpus).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RuntimeConfig {
            alpha: 2.0,
            ..RuntimeConfig::default()
        };
        assert!(MotionService::new(config, MemoryCorpus::new()).is_err());
    }

    #[test]
    fn test_compare_without_reference() {
        let service = MotionService::new(RuntimeConfig::default(), MemoryCorpus::new()).unwrap();
        assert!(matches!(
            service.compare_live(&body(0.3)),
            Err(MirraError::MissingSource(_))
        ));
    }

    #[test]
    fn test_compare_live_perfect_match() {
        let service = service();
        let result = service.compare_live(&body(0.3)).unwrap();
        assert_eq!(result.similarity, 100.0);
        assert_eq!(result.score, 120);
        assert_eq!(result.message, "PERFECT!");
        assert_eq!(result.reference_index, Some(0));
        assert_eq!(result.joint_accuracy.len(), 6);
        // no session yet
        assert!(result.insights.is_none());
        assert_eq!(service.status().video.as_deref(), Some("steady"));
    }

    #[test]
    fn test_cursor_wraps() {
        let service = service();
        let indices: Vec<Option<usize>> = (0..5)
            .map(|_| service.compare_live(&body(0.3)).unwrap().reference_index)
            .collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2), Some(0), Some(1)]);
        assert_eq!(service.status().cursor, 2);
    }

    #[test]
    fn test_similarity_rounded() {
        let service = service();
        // every point 0.00123 away: 100 - 0.123 = 99.877
        let result = service
            .compare_frames(&body(0.3), &body(0.30123))
            .unwrap();
        assert!((result.frame.similarity - 99.877).abs() < 1e-6);
        assert_eq!(result.similarity, 99.88);
        assert_eq!(result.reference_index, None);
    }

    #[test]
    fn test_missing_reference_frame_scores_zero() {
        let service = service();
        service.switch_video("gappy").unwrap();
        let results: Vec<LiveComparison> = (0..5)
            .map(|_| service.compare_live(&body(0.3)).unwrap())
            .collect();
        // frame 4 had no detection
        assert_eq!(results[4].similarity, 0.0);
        assert_eq!(results[4].score, 0);
        assert_eq!(results[4].message, "MISS");
    }

    #[test]
    fn test_session_flow() {
        let service = service();
        assert!(matches!(service.summary(), Err(MirraError::SessionNotStarted)));
        assert!(matches!(
            service.record(50.0, 50, &body(0.3)),
            Err(MirraError::SessionNotStarted)
        ));

        let id = service.start_session(SkillLevel::Intermediate, FeedbackStyle::Technical);
        let result = service.compare_live(&body(0.3)).unwrap();
        let insights = result.insights.unwrap();
        assert_eq!(insights.trend, Trend::Starting);
        assert_eq!(insights.strengths.len(), 6);

        service.record(40.0, 40, &body(0.3)).unwrap();
        let summary = service.summary().unwrap();
        assert_eq!(summary.session_id, id);
        assert_eq!(summary.total_poses_analyzed, 2);
        assert!((summary.average_similarity - 70.0).abs() < 1e-9);
        assert!((summary.average_score - 80.0).abs() < 1e-9);
        assert!(service.chat("what's my score?").contains("80.0"));
    }

    #[test]
    fn test_switch_video_resets_cursor_and_window() {
        let service = service();
        service.start_session(SkillLevel::Beginner, FeedbackStyle::Encouraging);
        service.compare_live(&body(0.3)).unwrap();
        service.compare_live(&body(0.3)).unwrap();
        assert_eq!(service.status().window_len, 2);

        assert_eq!(service.switch_video("shifted").unwrap(), 2);
        let status = service.status();
        assert_eq!(status.video.as_deref(), Some("shifted"));
        assert_eq!(status.reference_frames, 2);
        assert_eq!(status.cursor, 0);
        assert_eq!(status.window_len, 0);
        // frame counter survives the switch
        assert_eq!(service.summary().unwrap().total_poses_analyzed, 2);

        assert!(matches!(
            service.switch_video("unknown"),
            Err(MirraError::MissingSource(_))
        ));
        assert_eq!(service.status().video.as_deref(), Some("shifted"));
    }

    #[test]
    fn test_profile_update() {
        let service = service();
        let profile = service.profile_update(ProfileUpdate {
            skill_level: Some(SkillLevel::Advanced),
            feedback_style: None,
            focus_areas: Some(vec!["arms".into()]),
        });
        assert_eq!(profile.skill_level, SkillLevel::Advanced);
        assert_eq!(profile.feedback_style, FeedbackStyle::Encouraging);
        assert_eq!(service.profile(), profile);
    }

    #[test]
    fn test_compare_offline() {
        let service = service();
        let live: Vec<AngleSample> = (0..3)
            .map(|i| AngleSample::new(i as f64 / 15.0, 1.0, 2.0, 3.0, 1.0 + i as f64))
            .collect();
        let result = service.compare_offline_video("steady", &live).unwrap();
        assert!((result.mean - 1.0).abs() < 1e-9);
        assert_eq!(result.n, 200);

        let late = vec![AngleSample::new(10.0, 1.0, 1.0, 1.0, 1.0), AngleSample::new(11.0, 1.0, 1.0, 1.0, 1.0)];
        assert!(matches!(
            service.compare_offline_video("steady", &late),
            Err(MirraError::EmptyOverlap { .. })
        ));
    }

    #[test]
    fn test_concurrent_compare_is_serialized() {
        let service = Arc::new(service());
        service.start_session(SkillLevel::Beginner, FeedbackStyle::Balanced);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for _ in 0..25 {
                        service.compare_live(&body(0.3)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = service.summary().unwrap();
        assert_eq!(summary.total_poses_analyzed, 100);
        assert_eq!(service.status().cursor, 100 % 3);
        assert_eq!(service.status().window_len, 20);
    }

    #[test]
    fn test_concurrent_switch_keeps_cursor_in_range() {
        let service = Arc::new(service());
        let switcher = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..50 {
                    let video = if i % 2 == 0 { "shifted" } else { "steady" };
                    service.switch_video(video).unwrap();
                }
            })
        };
        for _ in 0..200 {
            let result = service.compare_live(&body(0.3)).unwrap();
            let status = service.status();
            assert!(status.cursor < status.reference_frames);
            assert!(result.reference_index.unwrap() < 3);
        }
        switcher.join().unwrap();
    }

    #[derive(Debug, Clone)]
    enum Step {
        Compare,
        Switch(usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            3 => Just(Step::Compare),
            1 => (0usize..3).prop_map(Step::Switch),
        ]
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_in_range(steps in prop::collection::vec(step(), 1..60)) {
            let service = service();
            let videos = ["steady", "shifted", "gappy"];
            for action in steps {
                match action {
                    Step::Compare => {
                        let result = service.compare_live(&body(0.3)).unwrap();
                        let index = result.reference_index.unwrap();
                        prop_assert!(index < service.status().reference_frames);
                    }
                    Step::Switch(i) => {
                        service.switch_video(videos[i]).unwrap();
                        prop_assert_eq!(service.status().cursor, 0);
                    }
                }
                let status = service.status();
                prop_assert!(status.cursor < status.reference_frames);
            }
        }
    }
}
