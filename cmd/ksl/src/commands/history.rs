//! Saved translation history.

use clap::{Args, Subcommand};
use ksl_translator::{JsonlStore, TranslationRecord, TranslationStore};

use super::{done, emit, get_config};
use crate::Cli;

/// Show or add to the translation history.
///
/// History is an append-only JSON lines file, by default next to the
/// config file.
#[derive(Args)]
pub struct HistoryCommand {
    #[command(subcommand)]
    command: HistorySubcommand,
}

#[derive(Subcommand)]
enum HistorySubcommand {
    /// List saved translations
    List {
        /// Show only the most recent N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Show only auto-saved entries
        #[arg(long)]
        auto: bool,
    },
    /// Save a translation manually
    Add {
        /// Translated text
        text: String,
        /// Confidence in percent
        #[arg(long, default_value_t = 100.0)]
        confidence: f32,
    },
}

impl HistoryCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let store = JsonlStore::open(cfg.history_path()).await?;

        match &self.command {
            HistorySubcommand::List { limit, auto } => {
                let mut records = store.load().await?;
                if *auto {
                    records.retain(|r| r.record.auto_saved);
                }
                if let Some(n) = limit {
                    let skip = records.len().saturating_sub(*n);
                    records.drain(..skip);
                }
                emit(cli, &records)
            }

            HistorySubcommand::Add { text, confidence } => {
                let id = store
                    .insert(TranslationRecord::manual(text.clone(), *confidence))
                    .await?;
                done(&format!("Saved \"{}\" as #{}", text, id));
                Ok(())
            }
        }
    }
}
