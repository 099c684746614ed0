//! Configuration management commands.

use clap::{Args, Subcommand};

use super::{done, emit, get_config, note};
use crate::config::SETTABLE_KEYS;
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.ksl/translator/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Create the config file with defaults
    Init {
        /// Overwrite an existing file with defaults
        #[arg(long)]
        force: bool,
    },
    /// View the current configuration
    View,
    /// Set a configuration value, e.g. `sentence.pause_ms 3000`
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// List the keys accepted by `set`
    Keys,
    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::Init { force } => {
                // Loading creates a missing file.
                let mut cfg = get_config(cli)?;
                if *force {
                    cfg.reset();
                    cfg.save()?;
                }
                done(&format!("Config file: {}", cfg.path().display()));
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                note(&format!("Config file: {}", cfg.path().display()));
                emit(cli, &cfg)
            }

            ConfigSubcommand::Set { key, value } => {
                let mut cfg = get_config(cli)?;
                cfg.set(key, value)?;
                cfg.save()?;
                done(&format!("Set {} = {}", key, value));
                Ok(())
            }

            ConfigSubcommand::Keys => {
                for key in SETTABLE_KEYS {
                    println!("{}", key);
                }
                Ok(())
            }

            ConfigSubcommand::Path => {
                let cfg = get_config(cli)?;
                println!("{}", cfg.path().display());
                Ok(())
            }
        }
    }
}
