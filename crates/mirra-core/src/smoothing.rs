//! EMA landmark smoothing
//!
//! `out = alpha * current + (1 - alpha) * previous` on x, y and z.
//! Visibility is never smoothed; it is copied from the current raw frame.

use crate::{Landmark, LandmarkFrame, MirraError, MirraResult, SmoothedFrame};

/// Check that an EMA factor lies in [0, 1]
pub fn validate_alpha(alpha: f64) -> MirraResult<f64> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(MirraError::InvalidArgument(format!(
            "alpha must be between 0 and 1, got {alpha}"
        )))
    }
}

/// Smooth `current` against the previous smoothed frame
///
/// With no previous frame the output equals `current`. If the two frames
/// differ in length (a detector hiccup), the previous frame cannot be blended
/// point for point and the current frame is taken as the new baseline.
pub fn smooth(
    previous: Option<&SmoothedFrame>,
    current: &LandmarkFrame,
    alpha: f64,
) -> MirraResult<SmoothedFrame> {
    let alpha = validate_alpha(alpha)?;

    let prev = match previous {
        Some(prev) if prev.len() == current.len() => prev,
        _ => return Ok(SmoothedFrame::from_frame(current.clone())),
    };

    let frame = current
        .iter()
        .zip(prev.as_frame().iter())
        .map(|(cur, old)| {
            Landmark::new(
                alpha * cur.x + (1.0 - alpha) * old.x,
                alpha * cur.y + (1.0 - alpha) * old.y,
                alpha * cur.z + (1.0 - alpha) * old.z,
                cur.visibility,
            )
        })
        .collect();

    Ok(SmoothedFrame::from_frame(frame))
}

/// Stateful smoother that remembers the last output
#[derive(Debug, Clone)]
pub struct LandmarkSmoother {
    alpha: f64,
    last: Option<SmoothedFrame>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f64) -> MirraResult<Self> {
        Ok(Self {
            alpha: validate_alpha(alpha)?,
            last: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Smooth the next frame and remember it for the following call
    pub fn push(&mut self, current: &LandmarkFrame) -> MirraResult<SmoothedFrame> {
        let smoothed = smooth(self.last.as_ref(), current, self.alpha)?;
        self.last = Some(smoothed.clone());
        Ok(smoothed)
    }

    pub fn last(&self) -> Option<&SmoothedFrame> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
