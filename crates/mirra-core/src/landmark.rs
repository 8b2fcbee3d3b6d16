//! Landmarks - skeletal keypoints as produced by an external pose detector
//!
//! A frame is captured once per sampled video instant and never mutated.
//! Smoothing produces a new frame instead of editing the raw one.

use serde::{Deserialize, Serialize};

/// Visibility above which a landmark counts as seen
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// 3D position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn scale(&self, k: f64) -> Vec3 {
        Vec3 {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }
}

/// A single skeletal keypoint: position plus detector visibility in [0, 1]
///
/// Serialized as the 4-element array `[x, y, z, visibility]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Position without visibility
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Planar (x, y) distance, ignoring depth
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility > VISIBILITY_THRESHOLD
    }
}

impl From<[f64; 4]> for Landmark {
    fn from(v: [f64; 4]) -> Self {
        Landmark::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Landmark> for [f64; 4] {
    fn from(lm: Landmark) -> Self {
        [lm.x, lm.y, lm.z, lm.visibility]
    }
}

/// Ordered landmarks for one sampled instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Frame with no landmark data (no detection)
    pub const fn empty() -> Self {
        Self {
            landmarks: Vec::new(),
        }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    pub fn into_landmarks(self) -> Vec<Landmark> {
        self.landmarks
    }
}

impl From<Vec<Landmark>> for LandmarkFrame {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self::new(landmarks)
    }
}

impl FromIterator<Landmark> for LandmarkFrame {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A frame after EMA smoothing
///
/// Same shape as [`LandmarkFrame`]. Visibility always equals the raw
/// visibility of the frame it was smoothed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothedFrame(LandmarkFrame);

impl SmoothedFrame {
    pub(crate) fn from_frame(frame: LandmarkFrame) -> Self {
        SmoothedFrame(frame)
    }

    pub fn as_frame(&self) -> &LandmarkFrame {
        &self.0
    }

    pub fn into_frame(self) -> LandmarkFrame {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<LandmarkFrame> for SmoothedFrame {
    fn as_ref(&self) -> &LandmarkFrame {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_array_roundtrip() {
        let lm = Landmark::new(0.25, -1.5, 0.0, 0.9);
        let json = serde_json::to_string(&lm).unwrap();
        assert_eq!(json, "[0.25,-1.5,0.0,0.9]");

        let back: Landmark = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lm);
    }

    #[test]
    fn test_planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 5.0, 1.0);
        let b = Landmark::new(3.0, 4.0, -5.0, 1.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_visibility_threshold_is_strict() {
        assert!(!Landmark::new(0.0, 0.0, 0.0, 0.5).is_visible());
        assert!(Landmark::new(0.0, 0.0, 0.0, 0.51).is_visible());
    }

    #[test]
    fn test_frame_basics() {
        let frame: LandmarkFrame = (0..3)
            .map(|i| Landmark::new(i as f64, 0.0, 0.0, 1.0))
            .collect();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.get(2).map(|l| l.x), Some(2.0));
        assert!(frame.get(3).is_none());
        assert!(LandmarkFrame::empty().is_empty());
    }
}
