//! Joint-group accuracy of a live frame

use std::collections::BTreeMap;

use mirra_core::{JointGroup, LandmarkFrame, SkeletonLayout};

/// Accuracy of one joint group, each value in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointGroupScore {
    /// Share of the group's joints that are visible
    pub visibility_score: f64,
    /// Mean visibility of the visible joints
    pub confidence_score: f64,
    /// `visible / total * mean_visibility * 100`
    pub overall_score: f64,
}

/// Scores per joint group; groups with nothing visible are absent
pub type JointAccuracy = BTreeMap<JointGroup, JointGroupScore>;

/// Score every joint group of the layout against a live frame
pub fn joint_group_accuracy(frame: &LandmarkFrame, layout: &SkeletonLayout) -> JointAccuracy {
    let mut result = JointAccuracy::new();

    for (group, indices) in layout.joint_groups.iter() {
        if indices.is_empty() {
            continue;
        }

        let visible: Vec<f64> = indices
            .iter()
            .filter_map(|i| frame.get(*i))
            .filter(|lm| lm.is_visible())
            .map(|lm| lm.visibility)
            .collect();
        if visible.is_empty() {
            continue;
        }

        let ratio = visible.len() as f64 / indices.len() as f64;
        let mean_visibility = visible.iter().sum::<f64>() / visible.len() as f64;

        result.insert(
            *group,
            JointGroupScore {
                visibility_score: ratio * 100.0,
                confidence_score: mean_visibility * 100.0,
                overall_score: ratio * mean_visibility * 100.0,
            },
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirra_core::Landmark;

    fn frame_with(visibility: impl Fn(usize) -> f64) -> LandmarkFrame {
        (0..33)
            .map(|i| Landmark::new(0.0, 0.0, 0.0, visibility(i)))
            .collect()
    }

    #[test]
    fn test_fully_visible_frame() {
        let accuracy = joint_group_accuracy(&frame_with(|_| 1.0), &SkeletonLayout::BLAZEPOSE_33);
        assert_eq!(accuracy.len(), 6);
        for score in accuracy.values() {
            assert!((score.overall_score - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_partial_group() {
        // left wrist hidden, the rest of the left arm at 0.8
        let frame = frame_with(|i| match i {
            15 => 0.1,
            11 | 13 => 0.8,
            _ => 0.0,
        });
        let accuracy = joint_group_accuracy(&frame, &SkeletonLayout::BLAZEPOSE_33);
        let arm = accuracy[&JointGroup::LeftArm];

        assert!((arm.visibility_score - 200.0 / 3.0).abs() < 1e-9);
        assert!((arm.confidence_score - 80.0).abs() < 1e-9);
        assert!((arm.overall_score - 2.0 / 3.0 * 0.8 * 100.0).abs() < 1e-9);

        // torso shares landmark 11 with the left arm
        assert!(accuracy.contains_key(&JointGroup::Torso));
        assert!(!accuracy.contains_key(&JointGroup::RightLeg));
    }

    #[test]
    fn test_short_frame_omits_missing_groups() {
        let frame: LandmarkFrame = (0..17).map(|_| Landmark::new(0.0, 0.0, 0.0, 0.9)).collect();
        let accuracy = joint_group_accuracy(&frame, &SkeletonLayout::BLAZEPOSE_33);
        assert!(accuracy.contains_key(&JointGroup::LeftArm));
        assert!(!accuracy.contains_key(&JointGroup::LeftLeg));
        // core: nose visible, hips missing
        let core = accuracy[&JointGroup::Core];
        assert!((core.visibility_score - 100.0 / 3.0).abs() < 1e-9);
    }
}
