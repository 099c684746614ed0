//! Two-handed compound sign detection.
//!
//! Two-handed signs carry meaning in the relationship between the hands
//! (distance, height offset, orientation), so they cannot be recovered by
//! classifying each hand on its own.

use parking_lot::Mutex;
use tracing::debug;

use crate::landmark::{FingerStates, Hand, ThumbReference};
use crate::{Classification, Jitter, Landmark};

/// Wrist distance below which the hands count as close.
pub const CLOSE_DISTANCE: f32 = 0.15;

/// Index fingertip distance below which the tips count as touching.
pub const FINGERTIP_TOUCH_DISTANCE: f32 = 0.08;

/// Vocabulary of two-handed signs.
pub const TWO_HANDED_SIGNS: [&str; 10] = [
    "THANK YOU", "SORRY", "HELP", "PLEASE", "MORE", "FINISHED", "WORK", "SCHOOL", "HOME",
    "FAMILY",
];

/// Relational measurements between two hands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPair {
    pub left: FingerStates,
    pub right: FingerStates,
    /// Wrist-to-wrist distance in 3D.
    pub distance: f32,
    /// Angle in radians between the index finger directions.
    pub angle: f32,
    /// `left.wrist.y - right.wrist.y`.
    pub height_diff: f32,
    /// Left thumb tip is left of the right thumb tip.
    pub facing: bool,
    pub close: bool,
    /// At least four of five finger flags agree.
    pub parallel: bool,
    pub fingertips_touching: bool,
    pub pointing_down: bool,
}

impl HandPair {
    pub fn measure(left: &Hand, right: &Hand) -> Self {
        let left_fingers = left.fingers(ThumbReference::Knuckle);
        let right_fingers = right.fingers(ThumbReference::Knuckle);
        let distance = left.wrist().distance(&right.wrist());

        let (lx, ly) = left.index_direction();
        let (rx, ry) = right.index_direction();
        let dot = lx * rx + ly * ry;
        let mags = (lx * lx + ly * ly).sqrt() * (rx * rx + ry * ry).sqrt();
        let angle = (dot / (mags + 0.0001)).clamp(-1.0, 1.0).acos();

        Self {
            left: left_fingers,
            right: right_fingers,
            distance,
            angle,
            height_diff: left.wrist().y - right.wrist().y,
            facing: left.thumb_tip().x < right.thumb_tip().x,
            close: distance < CLOSE_DISTANCE,
            parallel: left_fingers.agreement(&right_fingers) >= 4,
            fingertips_touching: left.index_tip().distance_2d(&right.index_tip())
                < FINGERTIP_TOUCH_DISTANCE,
            pointing_down: left.pointing_down() && right.pointing_down(),
        }
    }

    fn both_open(&self) -> bool {
        self.left.is_open() && self.right.is_open()
    }

    fn both_fists(&self) -> bool {
        self.left.is_fist() && self.right.is_fist()
    }

    fn fist_and_open(&self) -> bool {
        (self.left.is_fist() && self.right.is_open()) || (self.right.is_fist() && self.left.is_open())
    }
}

struct PairRule {
    sign: &'static str,
    base: f32,
    spread: f32,
    matches: fn(&HandPair) -> bool,
}

/// Compound-sign heuristics in priority order.
const PAIR_RULES: [PairRule; 9] = [
    PairRule {
        sign: "THANK YOU",
        base: 82.0,
        spread: 12.0,
        matches: |p| p.both_open() && p.close && p.facing,
    },
    PairRule {
        sign: "SORRY",
        base: 78.0,
        spread: 15.0,
        matches: |p| p.both_fists() && p.close,
    },
    PairRule {
        sign: "HELP",
        base: 75.0,
        spread: 15.0,
        matches: |p| p.fist_and_open() && p.height_diff.abs() > 0.1,
    },
    PairRule {
        sign: "MORE",
        base: 76.0,
        spread: 14.0,
        matches: |p| p.fingertips_touching && !p.close,
    },
    PairRule {
        sign: "FINISHED",
        base: 74.0,
        spread: 16.0,
        matches: |p| p.both_open() && !p.close && p.distance > 0.2,
    },
    PairRule {
        sign: "WORK",
        base: 72.0,
        spread: 15.0,
        matches: |p| p.both_fists() && !p.close && p.parallel,
    },
    PairRule {
        sign: "SCHOOL",
        base: 70.0,
        spread: 15.0,
        matches: |p| p.both_open() && p.parallel && p.distance > 0.1 && p.distance < 0.25,
    },
    PairRule {
        sign: "HOME",
        base: 73.0,
        spread: 14.0,
        matches: |p| p.pointing_down && p.close,
    },
    PairRule {
        sign: "FAMILY",
        base: 71.0,
        spread: 15.0,
        matches: |p| p.both_open() && !p.facing && p.distance > 0.3,
    },
];

const FALLBACK_SIGN: &str = "PLEASE";
const FALLBACK_BASE: f32 = 65.0;
const FALLBACK_SPREAD: f32 = 15.0;

/// Classifies a pair of hands into a compound sign.
pub struct TwoHandClassifier {
    jitter: Mutex<Jitter>,
}

impl TwoHandClassifier {
    pub fn new(jitter: Jitter) -> Self {
        Self {
            jitter: Mutex::new(jitter),
        }
    }

    /// Classifies two landmark sets. Index 0 of a frame is `left` by
    /// convention only; the tracker does not guarantee handedness.
    ///
    /// Returns `None` if either hand is malformed.
    pub fn classify(&self, left: &[Landmark], right: &[Landmark]) -> Option<Classification> {
        let (left, right) = match (Hand::new(left), Hand::new(right)) {
            (Ok(l), Ok(r)) => (l, r),
            (Err(err), _) | (_, Err(err)) => {
                debug!(error = %err, "gesture: skipping two-hand frame");
                return None;
            }
        };
        Some(self.classify_pair(&HandPair::measure(&left, &right)))
    }

    /// Applies the rule table to precomputed measurements.
    pub fn classify_pair(&self, pair: &HandPair) -> Classification {
        let (sign, base, spread) = PAIR_RULES
            .iter()
            .find(|rule| (rule.matches)(pair))
            .map(|rule| (rule.sign, rule.base, rule.spread))
            .unwrap_or((FALLBACK_SIGN, FALLBACK_BASE, FALLBACK_SPREAD));
        let confidence = self.jitter.lock().sample(base, spread);
        Classification::two_handed(sign, confidence)
    }

    pub fn supported_signs(&self) -> Vec<String> {
        TWO_HANDED_SIGNS.iter().map(|s| s.to_string()).collect()
    }
}

impl Default for TwoHandClassifier {
    fn default() -> Self {
        Self::new(Jitter::default())
    }
}
