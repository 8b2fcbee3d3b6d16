//! End-to-end scenarios
//!
//! Each scenario drives the public surface the way a host would:
//! - Record a reference video through the extraction pass
//! - Play a live performance against it through the motion service
//! - Compare angle timelines offline

use mirra_coach::{FeedbackStyle, SessionSummary, SkillLevel};
use mirra_core::{MirraResult, SkeletonLayout};
use mirra_runtime::{
    Extraction, ExtractionPass, LiveComparison, MemoryCorpus, MotionService, RuntimeConfig,
};
use mirra_score::{compare, SeriesComparison};

use crate::{PerformerConfig, PerformerSimulator};

/// Video frame rate of simulated recordings
pub const SIM_FPS: f64 = 30.0;

/// Record a reference video of `seconds` through the extraction pass
pub fn record_reference(
    performer: &mut PerformerSimulator,
    config: &RuntimeConfig,
    seconds: f64,
) -> MirraResult<Extraction> {
    let pass = ExtractionPass::new(config.alpha, SkeletonLayout::BLAZEPOSE_33)?;
    pass.run(SIM_FPS, config.sample_hz, performer.video(SIM_FPS, seconds))
}

/// Service holding one recorded reference video, selected as default
pub fn service_with_reference(
    video: &str,
    reference: Extraction,
    config: RuntimeConfig,
) -> MirraResult<MotionService> {
    let corpus = MemoryCorpus::new().with_video(video, reference);
    let config = RuntimeConfig {
        default_video: Some(video.to_string()),
        ..config
    };
    MotionService::new(config, corpus)
}

/// Outcome of a live session scenario
#[derive(Debug, Clone)]
pub struct LiveRun {
    pub comparisons: Vec<LiveComparison>,
    pub summary: SessionSummary,
}

impl LiveRun {
    pub fn mean_similarity(&self) -> f64 {
        if self.comparisons.is_empty() {
            return 0.0;
        }
        self.comparisons.iter().map(|c| c.frame.similarity).sum::<f64>()
            / self.comparisons.len() as f64
    }
}

/// Stream `frames` live frames at the service's sampling rate
///
/// Frames the performer fails to detect are still sent, as empty frames.
pub fn run_live_session(
    service: &MotionService,
    performer: &mut PerformerSimulator,
    frames: usize,
    skill: SkillLevel,
) -> MirraResult<LiveRun> {
    service.start_session(skill, FeedbackStyle::Balanced);
    let hz = service.config().sample_hz;

    let mut comparisons = Vec::with_capacity(frames);
    for i in 0..frames {
        let live = performer.observe(i as f64 / hz).unwrap_or_default();
        comparisons.push(service.compare_live(&live)?);
    }

    Ok(LiveRun {
        comparisons,
        summary: service.summary()?,
    })
}

/// Offline comparison of two performers over `seconds`, sampled at `hz`
pub fn run_offline(
    reference: &PerformerSimulator,
    performance: &PerformerSimulator,
    seconds: f64,
    hz: f64,
    samples: usize,
) -> MirraResult<SeriesComparison> {
    let reference = reference.angle_table(0.0, seconds, hz);
    let performance = performance.angle_table(0.0, seconds, hz);
    compare(&reference, &performance, samples)
}

/// Same routine, recorded and performed by separate clean simulators
pub fn mirror_scenario(seconds: f64, frames: usize) -> MirraResult<LiveRun> {
    let config = RuntimeConfig::default();
    let mut recorder = PerformerSimulator::new(PerformerConfig::clean());
    let reference = record_reference(&mut recorder, &config, seconds)?;
    let service = service_with_reference("routine", reference, config)?;

    let mut performer = PerformerSimulator::new(PerformerConfig::clean());
    run_live_session(&service, &mut performer, frames, SkillLevel::Beginner)
}
