//! Synthetic performer for Mirra testing
//!
//! Generates a 33-landmark body doing a simple periodic routine: both arms
//! swing and bend, both knees flex. Detector artefacts are layered on top:
//! - Gaussian position noise
//! - Occluded landmarks (low visibility)
//! - Whole-frame dropouts (no detection)

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mirra_core::{compute_angles, AngleSample, Landmark, LandmarkFrame, SkeletonLayout};
use mirra_runtime::Detection;

/// Number of landmarks the simulator emits
pub const SIM_LANDMARKS: usize = 33;

const UPPER_ARM: f64 = 0.12;
const FOREARM: f64 = 0.12;
const THIGH: f64 = 0.17;
const SHIN: f64 = 0.17;

/// Detector artefact configuration
#[derive(Clone, Debug)]
pub struct PerformerConfig {
    /// Routine frequency (Hz)
    pub tempo_hz: f64,
    /// Seconds added to every timestamp before posing
    pub phase_offset: f64,
    /// Standard deviation of position noise
    pub noise_stddev: f64,
    /// Probability a landmark is reported as occluded
    pub occlusion_rate: f64,
    /// Probability a frame has no detection
    pub dropout_rate: f64,
    /// Visibility of unoccluded landmarks
    pub visibility: f64,
}

impl Default for PerformerConfig {
    fn default() -> Self {
        Self::clean()
    }
}

impl PerformerConfig {
    /// Perfect detector
    pub fn clean() -> Self {
        PerformerConfig {
            tempo_hz: 0.5,
            phase_offset: 0.0,
            noise_stddev: 0.0,
            occlusion_rate: 0.0,
            dropout_rate: 0.0,
            visibility: 0.95,
        }
    }

    /// Typical webcam conditions
    pub fn noisy() -> Self {
        PerformerConfig {
            noise_stddev: 0.01,
            occlusion_rate: 0.05,
            dropout_rate: 0.02,
            ..Self::clean()
        }
    }

    /// Poor lighting, partial framing
    pub fn hostile() -> Self {
        PerformerConfig {
            noise_stddev: 0.04,
            occlusion_rate: 0.3,
            dropout_rate: 0.15,
            visibility: 0.7,
            ..Self::clean()
        }
    }

    /// Same routine, running `seconds` ahead
    pub fn shifted(mut self, seconds: f64) -> Self {
        self.phase_offset += seconds;
        self
    }
}

/// Seeded synthetic performer
pub struct PerformerSimulator {
    config: PerformerConfig,
    rng: StdRng,
}

impl PerformerSimulator {
    pub fn new(config: PerformerConfig) -> Self {
        Self::with_seed(config, 42)
    }

    pub fn with_seed(config: PerformerConfig, seed: u64) -> Self {
        PerformerSimulator {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &PerformerConfig {
        &self.config
    }

    /// Noise-free pose at time `t`
    pub fn pose_at(&self, t: f64) -> LandmarkFrame {
        let phase = 2.0 * PI * self.config.tempo_hz * (t + self.config.phase_offset);
        let swing = 0.6 * phase.sin();
        let bend = 0.5 + 0.4 * phase.sin();
        let flex = 0.3 * (1.0 - phase.cos());

        let mut points = [(0.5, 0.3); SIM_LANDMARKS];
        points[0] = (0.5, 0.15);
        for (i, point) in points.iter_mut().enumerate().take(11).skip(1) {
            // face points around the nose
            let a = i as f64 * 0.6;
            *point = (0.5 + 0.03 * a.cos(), 0.14 + 0.02 * a.sin());
        }

        // side: +1 for the performer's left (image right)
        for (side, shoulder, elbow, wrist, hip, knee, ankle) in
            [(1.0, 11, 13, 15, 23, 25, 27), (-1.0, 12, 14, 16, 24, 26, 28)]
        {
            let s = (0.5 + side * 0.1, 0.3);
            let e = (s.0 + side * UPPER_ARM * swing.sin(), s.1 + UPPER_ARM * swing.cos());
            let w = (
                e.0 + side * FOREARM * (swing + bend).sin(),
                e.1 + FOREARM * (swing + bend).cos(),
            );
            let h = (0.5 + side * 0.06, 0.55);
            let k = (h.0, h.1 + THIGH);
            let a = (k.0 - side * SHIN * flex.sin(), k.1 + SHIN * flex.cos());

            points[shoulder] = s;
            points[elbow] = e;
            points[wrist] = w;
            points[hip] = h;
            points[knee] = k;
            points[ankle] = a;
        }

        // hands and feet follow wrists and ankles
        for (target, source) in [
            (17, 15), (19, 15), (21, 15), (18, 16), (20, 16), (22, 16),
            (29, 27), (31, 27), (30, 28), (32, 28),
        ] {
            points[target] = points[source];
        }

        points
            .iter()
            .map(|&(x, y)| Landmark::new(x, y, 0.0, self.config.visibility))
            .collect()
    }

    fn gaussian(&mut self) -> f64 {
        // Box-Muller
        let u1: f64 = self.rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Pose at `t` as a detector would report it
    pub fn observe(&mut self, t: f64) -> Option<LandmarkFrame> {
        if self.config.dropout_rate > 0.0 && self.rng.gen_bool(self.config.dropout_rate) {
            return None;
        }

        let clean = self.pose_at(t);
        let noise = self.config.noise_stddev;
        let occlusion = self.config.occlusion_rate;

        let frame = clean
            .into_landmarks()
            .into_iter()
            .map(|lm| {
                let (dx, dy) = if noise > 0.0 {
                    (noise * self.gaussian(), noise * self.gaussian())
                } else {
                    (0.0, 0.0)
                };
                let visibility = if occlusion > 0.0 && self.rng.gen_bool(occlusion) {
                    0.2
                } else {
                    lm.visibility
                };
                Landmark::new(lm.x + dx, lm.y + dy, lm.z, visibility)
            })
            .collect();
        Some(frame)
    }

    pub fn detect(&mut self, t: f64) -> Detection {
        match self.observe(t) {
            Some(frame) => Detection::World(frame),
            None => Detection::NoDetection,
        }
    }

    /// Every frame of a recording: `(frame_index, detection)`
    pub fn video(&mut self, fps: f64, seconds: f64) -> Vec<(u64, Detection)> {
        let frames = (fps * seconds).round() as u64;
        (0..frames).map(|i| (i, self.detect(i as f64 / fps))).collect()
    }

    /// Exact joint angles of the clean routine, sampled at `hz`
    pub fn angle_table(&self, start: f64, seconds: f64, hz: f64) -> Vec<AngleSample> {
        let layout = SkeletonLayout::BLAZEPOSE_33;
        let n = (seconds * hz).round() as usize + 1;
        (0..n)
            .map(|i| {
                let t = start + i as f64 / hz;
                compute_angles(&self.pose_at(t), &layout, t)
            })
            .collect()
    }
}
