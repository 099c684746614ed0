//! Rule-based single-hand classifier.

use parking_lot::Mutex;
use tracing::debug;

use crate::landmark::{FingerStates, Hand, ThumbReference};
use crate::{Classification, Jitter, Landmark, SignModel};

/// A hand shape and the sign it maps to.
struct ShapeRule {
    sign: &'static str,
    base: f32,
    spread: f32,
    matches: fn(&FingerStates) -> bool,
}

/// Hand shapes in priority order. The first match wins.
const SHAPE_RULES: [ShapeRule; 8] = [
    ShapeRule {
        sign: "A",
        base: 75.0,
        spread: 15.0,
        matches: |f| !f.index && !f.middle && !f.ring && !f.pinky,
    },
    ShapeRule {
        sign: "ONE / POINT",
        base: 80.0,
        spread: 15.0,
        matches: |f| f.index && !f.middle && !f.ring && !f.pinky,
    },
    ShapeRule {
        sign: "TWO / PEACE",
        base: 85.0,
        spread: 10.0,
        matches: |f| f.index && f.middle && !f.ring && !f.pinky,
    },
    ShapeRule {
        sign: "FIVE / STOP",
        base: 88.0,
        spread: 10.0,
        matches: |f| f.index && f.middle && f.ring && f.pinky,
    },
    ShapeRule {
        sign: "GOOD / YES",
        base: 78.0,
        spread: 15.0,
        matches: |f| f.thumb && !f.index && !f.middle,
    },
    ShapeRule {
        sign: "THREE",
        base: 82.0,
        spread: 12.0,
        matches: |f| f.index && f.middle && f.ring && !f.pinky,
    },
    ShapeRule {
        sign: "FOUR",
        base: 80.0,
        spread: 12.0,
        matches: |f| f.extended_count() == 4,
    },
    ShapeRule {
        sign: "I / SMALL",
        base: 70.0,
        spread: 15.0,
        matches: |f| !f.index && !f.middle && !f.ring && f.pinky,
    },
];

/// Returned when a hand is visible but matches no known shape.
const FALLBACK_SIGN: &str = "HELLO";
const FALLBACK_BASE: f32 = 60.0;
const FALLBACK_SPREAD: f32 = 15.0;

/// Classifies a hand from finger-extension flags.
///
/// This is a stand-in for a trained model: it satisfies the same
/// [`SignModel`] contract so a real network can replace it without touching
/// callers.
pub struct RuleClassifier {
    jitter: Mutex<Jitter>,
}

impl RuleClassifier {
    pub fn new(jitter: Jitter) -> Self {
        Self {
            jitter: Mutex::new(jitter),
        }
    }

    /// Classifies a validated hand.
    pub fn classify_hand(&self, hand: &Hand) -> Classification {
        let fingers = hand.fingers(ThumbReference::Wrist);
        let (sign, base, spread) = SHAPE_RULES
            .iter()
            .find(|rule| (rule.matches)(&fingers))
            .map(|rule| (rule.sign, rule.base, rule.spread))
            .unwrap_or((FALLBACK_SIGN, FALLBACK_BASE, FALLBACK_SPREAD));
        let confidence = self.jitter.lock().sample(base, spread);
        Classification::new(sign, confidence)
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(Jitter::default())
    }
}

impl SignModel for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    fn classify(&self, landmarks: &[Landmark]) -> Option<Classification> {
        match Hand::new(landmarks) {
            Ok(hand) => Some(self.classify_hand(&hand)),
            Err(err) => {
                debug!(error = %err, "gesture: skipping frame");
                None
            }
        }
    }

    fn supported_signs(&self) -> Vec<String> {
        SHAPE_RULES
            .iter()
            .map(|rule| rule.sign)
            .chain(std::iter::once(FALLBACK_SIGN))
            .map(String::from)
            .collect()
    }
}
