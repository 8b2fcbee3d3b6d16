//! Per-frame pipeline and offline extraction
//!
//! Live path: raw detector frame -> EMA smoothing -> joint angles.
//! Offline path: a sampled stream of detections -> `PoseRecord`s plus an
//! angle table, ready to be stored as a reference video.

use std::io::Write;

use tracing::{debug, trace};

use mirra_core::{
    compute_angles, smooth, write_angle_table, write_pose_records, AngleSample,
    Landmark, LandmarkFrame, LandmarkSmoother, MirraError, MirraResult, PoseRecord,
    SkeletonLayout, SmoothedFrame,
};

/// Smooth one raw frame against the previous smoothed frame, then angle it
pub fn process_frame(
    raw: &LandmarkFrame,
    previous: Option<&SmoothedFrame>,
    alpha: f64,
    t: f64,
    layout: &SkeletonLayout,
) -> MirraResult<(SmoothedFrame, AngleSample)> {
    let smoothed = smooth(previous, raw, alpha)?;
    let angles = compute_angles(smoothed.as_frame(), layout, t);
    Ok((smoothed, angles))
}

/// Output of a pose detector for one video frame
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Landmarks already in world/normalized units
    World(LandmarkFrame),
    /// Normalized image coordinates; x and y are scaled to pixels
    Normalized {
        frame: LandmarkFrame,
        width: u32,
        height: u32,
    },
    NoDetection,
}

impl Detection {
    /// Landmarks in the unit the pipeline works in, `None` when no body was found
    pub fn into_frame(self) -> Option<LandmarkFrame> {
        match self {
            Detection::World(frame) => Some(frame),
            Detection::Normalized {
                frame,
                width,
                height,
            } => {
                let (w, h) = (width as f64, height as f64);
                Some(
                    frame
                        .iter()
                        .map(|lm| Landmark::new(lm.x * w, lm.y * h, lm.z, lm.visibility))
                        .collect(),
                )
            }
            Detection::NoDetection => None,
        }
    }
}

/// Picks every n-th video frame to hit a target sampling rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    interval: u64,
}

impl FrameSampler {
    /// Interval is `max(1, round(fps / sample_hz))`
    pub fn new(fps: f64, sample_hz: f64) -> MirraResult<Self> {
        if !(fps > 0.0 && sample_hz > 0.0) {
            return Err(MirraError::InvalidArgument(format!(
                "fps and sample_hz must be positive, got {fps} and {sample_hz}"
            )));
        }
        let interval = (fps / sample_hz).round().max(1.0) as u64;
        Ok(FrameSampler { interval })
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    #[inline]
    pub fn should_sample(&self, frame_index: u64) -> bool {
        frame_index % self.interval == 0
    }
}

/// Records and angle rows produced by an extraction pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<PoseRecord>,
    pub angles: Vec<AngleSample>,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Frames where a body was detected
    pub fn detected(&self) -> usize {
        self.records.iter().filter(|r| r.ok).count()
    }

    pub fn write_records<W: Write>(&self, writer: W) -> MirraResult<()> {
        write_pose_records(writer, &self.records)
    }

    pub fn write_angles<W: Write>(&self, writer: W) -> MirraResult<()> {
        write_angle_table(writer, &self.angles)
    }
}

/// Turns a stream of detections into smoothed records and angles
///
/// The smoother state survives frames without a detection, so the first
/// detection after a gap is blended with the last one before it.
#[derive(Debug, Clone)]
pub struct ExtractionPass {
    smoother: LandmarkSmoother,
    layout: SkeletonLayout,
    output: Extraction,
}

impl ExtractionPass {
    pub fn new(alpha: f64, layout: SkeletonLayout) -> MirraResult<Self> {
        Ok(ExtractionPass {
            smoother: LandmarkSmoother::new(alpha)?,
            layout,
            output: Extraction::default(),
        })
    }

    pub fn push(&mut self, t: f64, detection: Detection) -> MirraResult<()> {
        match detection.into_frame() {
            Some(frame) => {
                let smoothed = self.smoother.push(&frame)?;
                let angles = compute_angles(smoothed.as_frame(), &self.layout, t);
                trace!(t, landmarks = smoothed.len(), "frame extracted");
                self.output
                    .records
                    .push(PoseRecord::detected(t, smoothed.into_frame()));
                self.output.angles.push(angles);
            }
            None => {
                trace!(t, "no detection");
                self.output.records.push(PoseRecord::missing(t));
                self.output.angles.push(AngleSample::zero(t));
            }
        }
        Ok(())
    }

    /// Run over a whole video: `(frame_index, detection)` pairs at `fps`
    ///
    /// Frames the sampler skips are dropped; timestamps are `index / fps`.
    pub fn run<I>(mut self, fps: f64, sample_hz: f64, frames: I) -> MirraResult<Extraction>
    where
        I: IntoIterator<Item = (u64, Detection)>,
    {
        let sampler = FrameSampler::new(fps, sample_hz)?;
        for (index, detection) in frames {
            if sampler.should_sample(index) {
                self.push(index as f64 / fps, detection)?;
            }
        }
        Ok(self.finish())
    }

    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn finish(self) -> Extraction {
        debug!(
            frames = self.output.len(),
            detected = self.output.detected(),
            "extraction finished"
        );
        self.output
    }
}
