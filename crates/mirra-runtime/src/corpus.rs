//! Reference corpus
//!
//! A corpus holds recorded reference videos. Each video has a frame file
//! (`poses.jsonl`) used for live scoring and an angle table (`angles.csv`)
//! used for offline comparison.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use mirra_core::{
    read_angle_table, read_pose_records, AngleSample, LandmarkFrame, MirraError, MirraResult,
    PoseRecord,
};

use crate::Extraction;

/// File name of the per-video frame records
pub const POSES_FILE: &str = "poses.jsonl";

/// File name of the per-video angle table
pub const ANGLES_FILE: &str = "angles.csv";

/// Where reference videos come from
pub trait CorpusSource: Send + Sync {
    /// Names of the available videos, sorted
    fn list_videos(&self) -> MirraResult<Vec<String>>;

    fn load_frames(&self, video: &str) -> MirraResult<Vec<PoseRecord>>;

    fn load_angles(&self, video: &str) -> MirraResult<Vec<AngleSample>>;
}

/// Immutable frame sequence of one reference video
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSequence {
    video: String,
    records: Vec<PoseRecord>,
}

impl ReferenceSequence {
    /// An empty sequence cannot be compared against
    pub fn new(video: impl Into<String>, records: Vec<PoseRecord>) -> MirraResult<Self> {
        let video = video.into();
        if records.is_empty() {
            return Err(MirraError::MissingSource(format!(
                "reference video {video:?} has no frames"
            )));
        }
        Ok(ReferenceSequence { video, records })
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<&PoseRecord> {
        self.records.get(index)
    }

    /// Landmarks at `index`, empty when the detector found nothing there
    pub fn frame(&self, index: usize) -> &LandmarkFrame {
        static EMPTY: LandmarkFrame = LandmarkFrame::empty();
        self.records
            .get(index)
            .and_then(PoseRecord::landmarks)
            .unwrap_or(&EMPTY)
    }

    /// Frames with a detection
    pub fn detected(&self) -> usize {
        self.records.iter().filter(|r| r.landmarks().is_some()).count()
    }
}

/// Corpus stored as `<root>/<video>/poses.jsonl` and `<root>/<video>/angles.csv`
#[derive(Debug, Clone)]
pub struct FsCorpus {
    root: PathBuf,
}

impl FsCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsCorpus { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn video_dir(&self, video: &str) -> MirraResult<PathBuf> {
        let valid = !video.is_empty()
            && video != "."
            && video != ".."
            && !video.contains(|c: char| c == '/' || c == '\\');
        if !valid {
            return Err(MirraError::InvalidArgument(format!(
                "invalid video name {video:?}"
            )));
        }
        Ok(self.root.join(video))
    }

    fn open(&self, video: &str, file: &str) -> MirraResult<BufReader<File>> {
        let path = self.video_dir(video)?.join(file);
        match File::open(&path) {
            Ok(f) => Ok(BufReader::new(f)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reference file unavailable");
                Err(MirraError::MissingSource(format!("{}: {e}", path.display())))
            }
        }
    }

    /// Write an extraction as a new (or replacement) reference video
    pub fn store(&self, video: &str, extraction: &Extraction) -> MirraResult<()> {
        let dir = self.video_dir(video)?;
        fs::create_dir_all(&dir)?;
        extraction.write_records(BufWriter::new(File::create(dir.join(POSES_FILE))?))?;
        extraction.write_angles(BufWriter::new(File::create(dir.join(ANGLES_FILE))?))?;
        info!(video, frames = extraction.len(), "reference stored");
        Ok(())
    }
}

impl CorpusSource for FsCorpus {
    fn list_videos(&self) -> MirraResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            MirraError::MissingSource(format!("{}: {e}", self.root.display()))
        })?;

        let mut videos = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.path().join(POSES_FILE).is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    videos.push(name.to_string());
                }
            }
        }
        videos.sort();
        Ok(videos)
    }

    fn load_frames(&self, video: &str) -> MirraResult<Vec<PoseRecord>> {
        read_pose_records(self.open(video, POSES_FILE)?)
    }

    fn load_angles(&self, video: &str) -> MirraResult<Vec<AngleSample>> {
        read_angle_table(self.open(video, ANGLES_FILE)?)
    }
}

/// In-process corpus, filled from extraction passes
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    videos: BTreeMap<String, Extraction>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, video: impl Into<String>, extraction: Extraction) {
        self.videos.insert(video.into(), extraction);
    }

    pub fn with_video(mut self, video: impl Into<String>, extraction: Extraction) -> Self {
        self.insert(video, extraction);
        self
    }

    fn get(&self, video: &str) -> MirraResult<&Extraction> {
        self.videos
            .get(video)
            .ok_or_else(|| MirraError::MissingSource(format!("unknown video {video:?}")))
    }
}

impl CorpusSource for MemoryCorpus {
    fn list_videos(&self) -> MirraResult<Vec<String>> {
        Ok(self.videos.keys().cloned().collect())
    }

    fn load_frames(&self, video: &str) -> MirraResult<Vec<PoseRecord>> {
        Ok(self.get(video)?.records.clone())
    }

    fn load_angles(&self, video: &str) -> MirraResult<Vec<AngleSample>> {
        Ok(self.get(video)?.angles.clone())
    }
}

/// Load a reference sequence by name
pub fn load_reference(source: &dyn CorpusSource, video: &str) -> MirraResult<ReferenceSequence> {
    let sequence = ReferenceSequence::new(video, source.load_frames(video)?)?;
    info!(
        video,
        frames = sequence.len(),
        detected = sequence.detected(),
        "reference loaded"
    );
    Ok(sequence)
}

/// Read an angle table from a file
pub fn load_angle_file(path: impl AsRef<Path>) -> MirraResult<Vec<AngleSample>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| MirraError::MissingSource(format!("{}: {e}", path.display())))?;
    read_angle_table(BufReader::new(file))
}
