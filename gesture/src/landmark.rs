//! Hand landmark types.

use serde::{Deserialize, Serialize};

use crate::GestureError;

/// Number of landmarks in one tracked hand.
pub const HAND_LANDMARKS: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// Fingertip indices: thumb, index, middle, ring, pinky.
pub const FINGER_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Knuckle indices paired with [`FINGER_TIPS`].
pub const FINGER_MCPS: [usize; 5] = [THUMB_MCP, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// A single 3D landmark point in normalized image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in 3D.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Euclidean distance in the image plane, ignoring depth.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One hand pose: exactly 21 landmarks at fixed anatomical indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; HAND_LANDMARKS],
}

impl Hand {
    /// Validates a landmark slice and copies it into a hand.
    pub fn new(landmarks: &[Landmark]) -> Result<Self, GestureError> {
        let landmarks: [Landmark; HAND_LANDMARKS] =
            landmarks
                .try_into()
                .map_err(|_| GestureError::InvalidLandmarkCount {
                    expected: HAND_LANDMARKS,
                    got: landmarks.len(),
                })?;
        Ok(Self { landmarks })
    }

    pub fn landmarks(&self) -> &[Landmark; HAND_LANDMARKS] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Landmark {
        self.landmarks[WRIST]
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.landmarks[THUMB_TIP]
    }

    pub fn index_mcp(&self) -> Landmark {
        self.landmarks[INDEX_MCP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.landmarks[INDEX_TIP]
    }

    pub fn middle_mcp(&self) -> Landmark {
        self.landmarks[MIDDLE_MCP]
    }

    pub fn middle_tip(&self) -> Landmark {
        self.landmarks[MIDDLE_TIP]
    }

    /// Finger extension flags.
    ///
    /// Fingers are extended when the tip sits above (smaller y) its knuckle.
    /// The thumb is judged on the horizontal axis against `thumb`.
    pub fn fingers(&self, thumb: ThumbReference) -> FingerStates {
        let lm = &self.landmarks;
        let thumb_anchor = match thumb {
            ThumbReference::Wrist => lm[WRIST],
            ThumbReference::Knuckle => lm[THUMB_MCP],
        };
        FingerStates {
            thumb: lm[THUMB_TIP].x < thumb_anchor.x,
            index: lm[INDEX_TIP].y < lm[INDEX_MCP].y,
            middle: lm[MIDDLE_TIP].y < lm[MIDDLE_MCP].y,
            ring: lm[RING_TIP].y < lm[RING_MCP].y,
            pinky: lm[PINKY_TIP].y < lm[PINKY_MCP].y,
        }
    }

    /// Index direction vector (tip minus knuckle) in the image plane.
    pub fn index_direction(&self) -> (f32, f32) {
        let tip = self.index_tip();
        let mcp = self.index_mcp();
        (tip.x - mcp.x, tip.y - mcp.y)
    }

    /// True when index and middle tips hang below their knuckles.
    pub fn pointing_down(&self) -> bool {
        self.index_tip().y > self.index_mcp().y && self.middle_tip().y > self.middle_mcp().y
    }

    /// Flattens to `[x0, y0, z0, x1, ...]` relative to the wrist.
    pub fn wrist_relative(&self) -> Vec<f32> {
        let wrist = self.wrist();
        self.landmarks
            .iter()
            .flat_map(|lm| [lm.x - wrist.x, lm.y - wrist.y, lm.z - wrist.z])
            .collect()
    }
}

/// What the thumb tip is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbReference {
    /// Thumb tip left of the wrist (single-hand rules).
    Wrist,
    /// Thumb tip left of the thumb knuckle (two-hand rules).
    Knuckle,
}

/// Which fingers are extended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn as_array(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    /// Number of extended non-thumb fingers.
    pub fn extended_count(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|f| **f)
            .count()
    }

    /// All four non-thumb fingers extended.
    pub fn is_open(&self) -> bool {
        self.extended_count() == 4
    }

    /// All four non-thumb fingers folded.
    pub fn is_fist(&self) -> bool {
        self.extended_count() == 0
    }

    /// Number of positions (thumb included) where both hands agree.
    pub fn agreement(&self, other: &FingerStates) -> usize {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .filter(|(a, b)| a == b)
            .count()
    }
}
