//! Joint angle calculation

use crate::{AngleChannel, LandmarkFrame, SkeletonLayout, Vec3};

/// Vector norms below this are treated as coincident points
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Angle at `p2` between `p1 - p2` and `p3 - p2`, in radians within [0, π]
///
/// Near-coincident points give an undefined angle, reported as 0.0 (no bend).
pub fn angle_at(p1: &Vec3, p2: &Vec3, p3: &Vec3) -> f64 {
    let v1 = p1.sub(p2);
    let v2 = p3.sub(p2);

    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < DEGENERATE_EPSILON || n2 < DEGENERATE_EPSILON {
        return 0.0;
    }

    let cos = v1.scale(1.0 / n1).dot(&v2.scale(1.0 / n2));
    cos.clamp(-1.0, 1.0).acos()
}

/// Four flexion angles for one sampled instant
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleSample {
    /// Seconds from the start of the recording
    pub t: f64,
    pub elbow_l: f64,
    pub elbow_r: f64,
    pub knee_l: f64,
    pub knee_r: f64,
}

impl AngleSample {
    pub fn new(t: f64, elbow_l: f64, elbow_r: f64, knee_l: f64, knee_r: f64) -> Self {
        Self {
            t,
            elbow_l,
            elbow_r,
            knee_l,
            knee_r,
        }
    }

    /// All angles zero
    pub fn zero(t: f64) -> Self {
        Self {
            t,
            ..Self::default()
        }
    }

    pub fn channel(&self, channel: AngleChannel) -> f64 {
        match channel {
            AngleChannel::ElbowLeft => self.elbow_l,
            AngleChannel::ElbowRight => self.elbow_r,
            AngleChannel::KneeLeft => self.knee_l,
            AngleChannel::KneeRight => self.knee_r,
        }
    }

    pub fn set_channel(&mut self, channel: AngleChannel, value: f64) {
        match channel {
            AngleChannel::ElbowLeft => self.elbow_l = value,
            AngleChannel::ElbowRight => self.elbow_r = value,
            AngleChannel::KneeLeft => self.knee_l = value,
            AngleChannel::KneeRight => self.knee_r = value,
        }
    }

    /// Angles in channel order `[elbow_L, elbow_R, knee_L, knee_R]`
    pub fn to_vector(&self) -> [f64; 4] {
        [self.elbow_l, self.elbow_r, self.knee_l, self.knee_r]
    }
}

/// Compute the layout's four angles for a frame
///
/// Frames too short to hold every triplet yield all-zero angles.
pub fn compute_angles(frame: &LandmarkFrame, layout: &SkeletonLayout, t: f64) -> AngleSample {
    let mut sample = AngleSample::zero(t);
    if frame.len() < layout.min_landmarks_for_angles() {
        return sample;
    }

    let lm = frame.landmarks();
    for triplet in layout.angle_triplets.iter() {
        let angle = angle_at(
            &lm[triplet.a].position(),
            &lm[triplet.vertex].position(),
            &lm[triplet.b].position(),
        );
        sample.set_channel(triplet.channel, angle);
    }

    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Landmark;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_right_angle() {
        let a = angle_at(
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        );
        assert!((a - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_straight_limb_is_pi() {
        let a = angle_at(
            &Vec3::new(-1.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(2.0, 0.0, 0.0),
        );
        assert!((a - PI).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_points_zero() {
        let p = Vec3::new(0.3, 0.3, 0.3);
        assert_eq!(angle_at(&p, &p, &Vec3::new(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(angle_at(&Vec3::new(1.0, 0.0, 0.0), &p, &p), 0.0);
    }

    #[test]
    fn test_short_frame_gives_zero_angles() {
        let frame: LandmarkFrame = (0..28).map(|_| Landmark::new(1.0, 2.0, 3.0, 1.0)).collect();
        let sample = compute_angles(&frame, &SkeletonLayout::BLAZEPOSE_33, 1.5);
        assert_eq!(sample, AngleSample::zero(1.5));
    }

    #[test]
    fn test_compute_angles_channels() {
        let layout = SkeletonLayout::BLAZEPOSE_33;
        let mut points = vec![Landmark::new(0.0, 0.0, 0.0, 1.0); 33];
        // left arm bent at 90 degrees
        points[11] = Landmark::new(0.0, 1.0, 0.0, 1.0);
        points[13] = Landmark::new(0.0, 0.0, 0.0, 1.0);
        points[15] = Landmark::new(1.0, 0.0, 0.0, 1.0);
        // right leg straight
        points[24] = Landmark::new(0.0, 2.0, 0.0, 1.0);
        points[26] = Landmark::new(0.0, 1.0, 0.0, 1.0);
        points[28] = Landmark::new(0.0, 0.0, 0.0, 1.0);

        let sample = compute_angles(&LandmarkFrame::new(points), &layout, 0.0);
        assert!((sample.elbow_l - FRAC_PI_2).abs() < 1e-9);
        assert!((sample.knee_r - PI).abs() < 1e-9);
        // untouched limbs collapse onto the origin
        assert_eq!(sample.elbow_r, 0.0);
    }

    proptest! {
        #[test]
        fn prop_angle_in_range(
            a in prop::array::uniform3(-100.0f64..100.0),
            b in prop::array::uniform3(-100.0f64..100.0),
            c in prop::array::uniform3(-100.0f64..100.0),
        ) {
            let angle = angle_at(
                &Vec3::new(a[0], a[1], a[2]),
                &Vec3::new(b[0], b[1], b[2]),
                &Vec3::new(c[0], c[1], c[2]),
            );
            prop_assert!((0.0..=PI).contains(&angle));
        }
    }
}
