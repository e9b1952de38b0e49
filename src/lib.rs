pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::cat_api::CatApiSource;
pub use app::terminal::TerminalSession;
pub use config::toml_config::TomlConfig;
pub use crate::core::{acquisition::Acquirer, AcquisitionOutcome, ExclusionSet};
pub use utils::error::{FinderError, Result};
