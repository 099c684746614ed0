use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Landmark, RuleClassifier, TensorModel};

/// A candidate sign for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Sign label, e.g. `"HELLO"` or `"TWO / PEACE"`.
    pub sign: String,
    /// Confidence in percent (0-100).
    pub confidence: f32,
    /// True when produced from the relationship between two hands.
    #[serde(default, skip_serializing_if = "is_false")]
    pub two_handed: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Classification {
    pub fn new(sign: impl Into<String>, confidence: f32) -> Self {
        Self {
            sign: sign.into(),
            confidence,
            two_handed: false,
        }
    }

    pub fn two_handed(sign: impl Into<String>, confidence: f32) -> Self {
        Self {
            sign: sign.into(),
            confidence,
            two_handed: true,
        }
    }
}

/// Maps a single hand pose to a sign.
///
/// Input is the raw landmark slice from the hand tracker. Implementations
/// must return `None` for malformed input (anything other than 21 points)
/// instead of failing, so callers can simply skip the frame.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait SignModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Classifies one hand.
    fn classify(&self, landmarks: &[Landmark]) -> Option<Classification>;

    /// Labels this model can produce.
    fn supported_signs(&self) -> Vec<String>;
}

/// Which single-hand strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Geometric finger-extension rules.
    #[default]
    Rules,
    /// A trained network behind an [`crate::Inference`] backend.
    Tensor,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Rules => "rules",
            ModelKind::Tensor => "tensor",
        }
    }

    /// Builds the selected model.
    ///
    /// `Tensor` without a backend falls back to the rule classifier.
    pub fn build(
        &self,
        rules: RuleClassifier,
        backend: Option<Arc<dyn crate::Inference>>,
    ) -> Arc<dyn SignModel> {
        match (self, backend) {
            (ModelKind::Tensor, Some(backend)) => Arc::new(TensorModel::new(backend)),
            (ModelKind::Tensor, None) => {
                tracing::warn!("gesture: no inference backend, using rule classifier");
                Arc::new(rules)
            }
            (ModelKind::Rules, _) => Arc::new(rules),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
