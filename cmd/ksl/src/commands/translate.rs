//! Sentence composition from sign tokens.

use std::sync::Arc;

use clap::Args;
use ksl_sentence::{
    find_phrase, normalize_sign, BuilderConfig, Language, ManualClock, SentenceBuilder,
};
use serde::Serialize;

use super::{emit, get_config, verbose};
use crate::Cli;

/// Compose a sentence from sign tokens.
///
/// Tokens may be given as separate arguments or comma-separated, e.g.
///   ksl translate I HAPPY
///   ksl translate "THANK YOU,GOOD"
#[derive(Args)]
pub struct TranslateCommand {
    /// Sign tokens in order
    #[arg(required = true)]
    tokens: Vec<String>,

    /// Output language (english, swahili); default from config
    #[arg(short = 'l', long)]
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResult {
    pub gestures: Vec<String>,
    pub english: String,
    pub swahili: String,
    /// Text in the selected output language.
    pub text: String,
    pub language: Language,
    /// `phrase` when a whole-phrase translation matched, `words` otherwise.
    pub source: &'static str,
}

impl TranslateCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let language = match &self.lang {
            Some(lang) => Language::parse(lang)
                .ok_or_else(|| anyhow::anyhow!("unknown language '{}'", lang))?,
            None => cfg.preferences.output_language,
        };

        let tokens = split_tokens(&self.tokens);
        verbose(cli, &format!("Tokens: {:?}", tokens));

        let result = translate(&tokens, cfg.pipeline.sentence, language)?;
        emit(cli, &result)
    }
}

/// Splits comma-separated arguments, drops empty pieces and upper-cases
/// the rest.
pub fn split_tokens(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(normalize_sign)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Feeds the tokens through a builder as if signed back to back.
pub fn translate(
    tokens: &[String],
    config: BuilderConfig,
    language: Language,
) -> anyhow::Result<TranslateResult> {
    let clock = Arc::new(ManualClock::new(0));
    let mut builder = SentenceBuilder::with_clock(config, clock.clone());
    for token in tokens {
        builder.add(token, 100.0);
        clock.advance(1);
    }

    let sentence = builder
        .build()
        .ok_or_else(|| anyhow::anyhow!("no sign tokens given"))?;
    let source = if find_phrase(&sentence.gestures).is_some() {
        "phrase"
    } else {
        "words"
    };

    Ok(TranslateResult {
        text: sentence.text(language).to_string(),
        gestures: sentence.gestures,
        english: sentence.english,
        swahili: sentence.swahili,
        language,
        source,
    })
}
