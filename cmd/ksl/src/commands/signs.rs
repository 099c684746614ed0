//! Vocabulary listing.

use clap::Args;
use ksl_gesture::{Jitter, RuleClassifier, SignModel, TwoHandClassifier, SIGN_CLASSES};
use ksl_sentence::phrases::PHRASES;
use serde::Serialize;

use super::emit;
use crate::Cli;

/// List supported signs and phrases.
#[derive(Args)]
pub struct SignsCommand {
    /// Include the phrase table with translations
    #[arg(long)]
    phrases: bool,
}

#[derive(Debug, Serialize)]
struct PhraseEntry {
    key: &'static str,
    english: &'static str,
    swahili: &'static str,
}

#[derive(Debug, Serialize)]
struct Vocabulary {
    rules: Vec<String>,
    two_handed: Vec<String>,
    tensor: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    phrases: Vec<PhraseEntry>,
}

impl SignsCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let phrases = if self.phrases {
            PHRASES
                .iter()
                .map(|p| PhraseEntry {
                    key: p.key,
                    english: p.english,
                    swahili: p.swahili,
                })
                .collect()
        } else {
            Vec::new()
        };

        let vocab = Vocabulary {
            rules: RuleClassifier::new(Jitter::fixed()).supported_signs(),
            two_handed: TwoHandClassifier::new(Jitter::fixed()).supported_signs(),
            tensor: SIGN_CLASSES.to_vec(),
            phrases,
        };
        emit(cli, &vocab)
    }
}
