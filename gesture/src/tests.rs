//! Integration tests for the classification stages.

use super::*;
use crate::synth::{hand_with, Pose};

#[test]
fn test_gesture_types_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RuleClassifier>();
    assert_send_sync::<TensorModel>();
    assert_send_sync::<TwoHandClassifier>();
    assert_send_sync::<GestureBuffer>();
}

#[test]
fn test_error_display() {
    let err = GestureError::InvalidLandmarkCount {
        expected: 21,
        got: 3,
    };
    assert_eq!(err.to_string(), "gesture: invalid landmark count: expected 21, got 3");
    assert!(GestureError::Model("boom".into()).to_string().contains("boom"));
}

#[test]
fn test_classify_then_smooth_flicker() {
    let model = RuleClassifier::new(Jitter::fixed());
    let mut buffer = GestureBuffer::new();

    let point = hand_with(Pose::fingers(true, false, false, false), 0.5, 0.5);
    let peace = hand_with(Pose::fingers(true, true, false, false), 0.5, 0.5);

    // point, point, peace (flicker), point, point
    let frames = [&point, &point, &peace, &point, &point];
    let mut outputs = Vec::new();
    for frame in frames {
        let c = model.classify(frame).unwrap();
        outputs.push(buffer.add(c));
    }

    assert!(outputs[0].is_none());
    assert!(outputs[1].is_none());
    for out in &outputs[2..] {
        assert_eq!(out.as_ref().unwrap().sign, "ONE / POINT");
    }
    assert_eq!(outputs[4].as_ref().unwrap().confidence, 80.0);
}

#[test]
fn test_separate_buffers_do_not_share_votes() {
    let single = RuleClassifier::new(Jitter::fixed());
    let pair = TwoHandClassifier::new(Jitter::fixed());
    let mut single_buf = GestureBuffer::new();
    let mut pair_buf = GestureBuffer::new();

    let left = hand_with(Pose::open(), 0.45, 0.5);
    let right = hand_with(Pose::open(), 0.55, 0.5);

    for _ in 0..2 {
        single_buf.add(single.classify(&left).unwrap());
    }
    for _ in 0..2 {
        pair_buf.add(pair.classify(&left, &right).unwrap());
    }
    let s = single_buf.add(single.classify(&left).unwrap()).unwrap();
    let p = pair_buf.add(pair.classify(&left, &right).unwrap()).unwrap();

    assert_eq!(s.sign, "FIVE / STOP");
    assert!(!s.two_handed);
    assert_eq!(p.sign, "THANK YOU");
    assert!(p.two_handed);
}

#[test]
fn test_recorded_frame_json() {
    let hand = hand_with(Pose::fist(), 0.5, 0.5);
    let json = serde_json::to_string(&hand).unwrap();
    let restored: Vec<Landmark> = serde_json::from_str(&json).unwrap();
    let c = RuleClassifier::new(Jitter::fixed()).classify(&restored).unwrap();
    assert_eq!(c.sign, "A");
}

#[test]
fn test_model_kind_selects_strategy() {
    struct Always(usize);
    impl Inference for Always {
        fn predict(&self, _input: &[f32]) -> Result<Vec<f32>, GestureError> {
            let mut probs = vec![0.0; SIGN_CLASSES.len()];
            probs[self.0] = 0.95;
            Ok(probs)
        }
    }

    let backend: std::sync::Arc<dyn Inference> = std::sync::Arc::new(Always(1));
    let model = ModelKind::Tensor.build(RuleClassifier::new(Jitter::fixed()), Some(backend));
    assert_eq!(model.name(), "tensor");
    assert_eq!(model.supported_signs().len(), 46);

    let c = model.classify(&hand_with(Pose::fist(), 0.5, 0.5)).unwrap();
    assert_eq!(c.sign, "B");

    let rules = ModelKind::Rules.build(RuleClassifier::new(Jitter::fixed()), None);
    assert_eq!(rules.name(), "rules");
}
