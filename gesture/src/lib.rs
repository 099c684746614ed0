//! Hand landmark classification for sign recognition.
//!
//! # Architecture
//!
//! Each video frame passes through three stages:
//!
//! 1. An external hand tracker produces 21 [`Landmark`]s per visible hand.
//! 2. A [`SignModel`] (single hand) or the [`TwoHandClassifier`] (pair of
//!    hands) maps landmarks to a [`Classification`].
//! 3. A [`GestureBuffer`] votes over a trailing window and reports a sign
//!    only once it is stable.
//!
//! # Strategies
//!
//! [`SignModel`] is the seam between the pipeline and the recognizer:
//!
//! - [`RuleClassifier`]: finger-extension rules, no model file needed
//! - [`TensorModel`]: a trained network behind an [`Inference`] backend
//!
//! [`ModelKind`] picks one at startup.
//!
//! # Example
//!
//! ```
//! use ksl_gesture::{GestureBuffer, Jitter, RuleClassifier, SignModel};
//! use ksl_gesture::synth::{hand_with, Pose};
//!
//! let model = RuleClassifier::new(Jitter::fixed());
//! let mut buffer = GestureBuffer::new();
//!
//! let hand = hand_with(Pose::fist(), 0.5, 0.5);
//! let mut stable = None;
//! for _ in 0..3 {
//!     if let Some(c) = model.classify(&hand) {
//!         stable = buffer.add(c);
//!     }
//! }
//! assert_eq!(stable.unwrap().sign, "A");
//! ```

mod error;
mod jitter;
pub mod landmark;
mod model;
mod rules;
mod smoothing;
pub mod synth;
mod tensor;
mod two_hand;

pub use error::GestureError;
pub use jitter::Jitter;
pub use landmark::{FingerStates, Hand, Landmark, ThumbReference, HAND_LANDMARKS};
pub use model::{Classification, ModelKind, SignModel};
pub use rules::RuleClassifier;
pub use smoothing::{GestureBuffer, SmoothingConfig};
pub use tensor::{preprocess, Inference, Prediction, TensorModel, SIGN_CLASSES};
pub use two_hand::{HandPair, TwoHandClassifier, TWO_HANDED_SIGNS};

#[cfg(test)]
mod tests;
