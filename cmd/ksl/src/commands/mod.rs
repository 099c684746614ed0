//! CLI commands module.

mod config;
mod history;
mod replay;
mod signs;
mod translate;
mod util;

pub use config::ConfigCommand;
pub use history::HistoryCommand;
pub use replay::ReplayCommand;
pub use signs::SignsCommand;
pub use translate::TranslateCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
