//! Skeleton layouts - named, versioned landmark index tables
//!
//! Scoring, angle and accuracy code never hardcodes landmark indices. They
//! read them from a [`SkeletonLayout`], so an alternate detector layout can
//! be swapped in by defining another table.

use std::fmt;

/// Named joint group used for per-region accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointGroup {
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    Torso,
    Core,
}

impl JointGroup {
    pub fn name(&self) -> &'static str {
        match self {
            JointGroup::LeftArm => "left_arm",
            JointGroup::RightArm => "right_arm",
            JointGroup::LeftLeg => "left_leg",
            JointGroup::RightLeg => "right_leg",
            JointGroup::Torso => "torso",
            JointGroup::Core => "core",
        }
    }

    /// Human readable label for feedback text
    pub fn label(&self) -> &'static str {
        match self {
            JointGroup::LeftArm => "left arm",
            JointGroup::RightArm => "right arm",
            JointGroup::LeftLeg => "left leg",
            JointGroup::RightLeg => "right leg",
            JointGroup::Torso => "torso",
            JointGroup::Core => "core",
        }
    }

    pub fn all() -> &'static [JointGroup] {
        &[
            JointGroup::LeftArm,
            JointGroup::RightArm,
            JointGroup::LeftLeg,
            JointGroup::RightLeg,
            JointGroup::Torso,
            JointGroup::Core,
        ]
    }
}

impl fmt::Display for JointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the four flexion angles tracked per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleChannel {
    ElbowLeft,
    ElbowRight,
    KneeLeft,
    KneeRight,
}

impl AngleChannel {
    /// Column name in angle tables
    pub fn column(&self) -> &'static str {
        match self {
            AngleChannel::ElbowLeft => "elbow_L",
            AngleChannel::ElbowRight => "elbow_R",
            AngleChannel::KneeLeft => "knee_L",
            AngleChannel::KneeRight => "knee_R",
        }
    }

    pub fn all() -> &'static [AngleChannel; 4] {
        &[
            AngleChannel::ElbowLeft,
            AngleChannel::ElbowRight,
            AngleChannel::KneeLeft,
            AngleChannel::KneeRight,
        ]
    }
}

/// Landmark indices `(a, vertex, b)` whose angle at `vertex` defines a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleTriplet {
    pub channel: AngleChannel,
    pub a: usize,
    pub vertex: usize,
    pub b: usize,
}

impl AngleTriplet {
    const fn new(channel: AngleChannel, a: usize, vertex: usize, b: usize) -> Self {
        Self {
            channel,
            a,
            vertex,
            b,
        }
    }

    pub fn max_index(&self) -> usize {
        self.a.max(self.vertex).max(self.b)
    }
}

/// Landmark index table for a specific detector output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonLayout {
    pub name: &'static str,
    pub version: u32,
    /// Landmarks per frame emitted by the detector
    pub landmark_count: usize,
    /// Points compared by the frame scorer
    pub key_points: &'static [usize],
    pub joint_groups: &'static [(JointGroup, &'static [usize])],
    pub angle_triplets: &'static [AngleTriplet; 4],
}

impl SkeletonLayout {
    /// 33-point BlazePose topology
    pub const BLAZEPOSE_33: SkeletonLayout = SkeletonLayout {
        name: "blazepose-33",
        version: 1,
        landmark_count: 33,
        // shoulders, elbows, wrists, hips, knees, ankles
        key_points: &[11, 12, 13, 14, 15, 16, 23, 24, 25, 26, 27, 28],
        joint_groups: &[
            (JointGroup::LeftArm, &[11, 13, 15]),
            (JointGroup::RightArm, &[12, 14, 16]),
            (JointGroup::LeftLeg, &[23, 25, 27]),
            (JointGroup::RightLeg, &[24, 26, 28]),
            (JointGroup::Torso, &[11, 12, 23, 24]),
            (JointGroup::Core, &[0, 23, 24]),
        ],
        angle_triplets: &[
            AngleTriplet::new(AngleChannel::ElbowLeft, 11, 13, 15),
            AngleTriplet::new(AngleChannel::ElbowRight, 12, 14, 16),
            AngleTriplet::new(AngleChannel::KneeLeft, 23, 25, 27),
            AngleTriplet::new(AngleChannel::KneeRight, 24, 26, 28),
        ],
    };

    /// Minimum landmark count needed to compute all angles
    pub fn min_landmarks_for_angles(&self) -> usize {
        self.angle_triplets
            .iter()
            .map(|t| t.max_index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Indices for a joint group (empty if the layout doesn't define it)
    pub fn group_indices(&self, group: JointGroup) -> &'static [usize] {
        self.joint_groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, idx)| *idx)
            .unwrap_or(&[])
    }
}

impl Default for SkeletonLayout {
    fn default() -> Self {
        SkeletonLayout::BLAZEPOSE_33
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blazepose_angle_requirement() {
        let layout = SkeletonLayout::BLAZEPOSE_33;
        assert_eq!(layout.min_landmarks_for_angles(), 29);
    }

    #[test]
    fn test_blazepose_indices_in_range() {
        let layout = SkeletonLayout::BLAZEPOSE_33;
        assert_eq!(layout.key_points.len(), 12);
        for idx in layout.key_points {
            assert!(*idx < layout.landmark_count);
        }
        for (_, indices) in layout.joint_groups {
            assert!(indices.iter().all(|i| *i < layout.landmark_count));
        }
    }

    #[test]
    fn test_every_group_defined() {
        let layout = SkeletonLayout::default();
        for group in JointGroup::all() {
            assert!(!layout.group_indices(*group).is_empty(), "{group}");
        }
    }

    #[test]
    fn test_channel_columns() {
        let cols: Vec<_> = AngleChannel::all().iter().map(|c| c.column()).collect();
        assert_eq!(cols, ["elbow_L", "elbow_R", "knee_L", "knee_R"]);
    }
}
