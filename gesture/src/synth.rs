//! Synthetic hand poses.
//!
//! Produces 21-point landmark sets with chosen finger states at a chosen
//! position. Used by tests and by the CLI demo sequence when no recorded
//! frames are available.

use crate::landmark::*;
use crate::Landmark;

const FINGER_UP: f32 = -0.08;
const FINGER_DOWN: f32 = 0.05;
const WRIST_DROP: f32 = 0.1;
const THUMB_MCP_OFFSET: f32 = -0.03;
const THUMB_OUT: f32 = -0.08;
const THUMB_IN: f32 = 0.02;

/// Finger extension pattern for a synthetic hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pose {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl Pose {
    /// All fingers folded, thumb tucked.
    pub fn fist() -> Self {
        Self::default()
    }

    /// Four fingers extended, thumb out.
    pub fn open() -> Self {
        Self {
            thumb: true,
            index: true,
            middle: true,
            ring: true,
            pinky: true,
        }
    }

    /// Four fingers as given, thumb tucked.
    pub fn fingers(index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            thumb: false,
            index,
            middle,
            ring,
            pinky,
        }
    }

    pub fn with_thumb(mut self, thumb: bool) -> Self {
        self.thumb = thumb;
        self
    }
}

/// Builds a hand whose knuckle row is centred at `(x, y)`.
pub fn hand_with(pose: Pose, x: f32, y: f32) -> Vec<Landmark> {
    let mut lms = vec![Landmark::new(x, y, 0.0); HAND_LANDMARKS];
    lms[WRIST] = Landmark::new(x, y + WRIST_DROP, 0.0);

    lms[THUMB_MCP] = Landmark::new(x + THUMB_MCP_OFFSET, y + WRIST_DROP / 2.0, 0.0);
    let thumb_dx = if pose.thumb { THUMB_OUT } else { THUMB_IN };
    lms[THUMB_TIP] = Landmark::new(x + thumb_dx, y, 0.0);

    let fingers = [
        (INDEX_MCP, INDEX_TIP, pose.index, -0.03),
        (MIDDLE_MCP, MIDDLE_TIP, pose.middle, -0.01),
        (RING_MCP, RING_TIP, pose.ring, 0.01),
        (PINKY_MCP, PINKY_TIP, pose.pinky, 0.03),
    ];
    for (mcp, tip, extended, dx) in fingers {
        lms[mcp] = Landmark::new(x + dx, y, 0.0);
        let dy = if extended { FINGER_UP } else { FINGER_DOWN };
        lms[tip] = Landmark::new(x + dx, y + dy, 0.0);
    }
    lms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Hand, ThumbReference};

    #[test]
    fn pose_round_trips_through_finger_flags() {
        let poses = [
            Pose::fist(),
            Pose::open(),
            Pose::fingers(true, false, true, false),
            Pose::fingers(false, false, false, true).with_thumb(true),
        ];
        for pose in poses {
            let hand = Hand::new(&hand_with(pose, 0.4, 0.5)).unwrap();
            for thumb in [ThumbReference::Wrist, ThumbReference::Knuckle] {
                let f = hand.fingers(thumb);
                assert_eq!(
                    [f.thumb, f.index, f.middle, f.ring, f.pinky],
                    [pose.thumb, pose.index, pose.middle, pose.ring, pose.pinky],
                );
            }
        }
    }
}
