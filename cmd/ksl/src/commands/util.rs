//! Shared plumbing for ksl subcommands.

use std::path::Path;

use crate::config::{load_config, Config};
use crate::Cli;

const APP_NAME: &str = "translator";

/// Loads the translator config selected by `--config`.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Document format for recordings and command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Picks JSON for `.json` files and YAML for anything else.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }

    pub fn for_cli(cli: &Cli) -> Self {
        if cli.json { Format::Json } else { Format::Yaml }
    }

    pub fn render<T: serde::Serialize>(self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            Format::Json => serde_json::to_string_pretty(value)? + "\n",
            Format::Yaml => serde_yaml::to_string(value)?,
        })
    }

    pub fn parse<T: serde::de::DeserializeOwned>(self, content: &str) -> anyhow::Result<T> {
        Ok(match self {
            Format::Json => serde_json::from_str(content)?,
            Format::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

/// Reads a YAML or JSON document, chosen by extension.
pub fn read_document<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path, e))?;
    Format::for_path(Path::new(path))
        .parse(&content)
        .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path, e))
}

/// Writes a command's result to `-o` or stdout, in the format `--json` picks.
pub fn emit<T: serde::Serialize>(cli: &Cli, value: &T) -> anyhow::Result<()> {
    let text = Format::for_cli(cli).render(value)?;
    match cli.output.as_deref() {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{}", text),
    }
    Ok(())
}

/// Logs to stderr when `-v` is set.
pub fn verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        eprintln!("ksl: {}", msg);
    }
}

/// Reports a completed change on stderr.
pub fn done(msg: &str) {
    eprintln!("\x1b[32mdone\x1b[0m {}", msg);
}

/// Reports a status line on stderr, keeping stdout for results.
pub fn note(msg: &str) {
    eprintln!("\x1b[34mnote\x1b[0m {}", msg);
}
