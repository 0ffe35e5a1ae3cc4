//! Spell card CLI library.
//!
//! Subcommand handlers live in [`commands`]; `main.rs` only parses
//! arguments and dispatches.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use spellcard_lib::FormatterRegistry;

pub mod commands;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Directory containing `<generator>.png` or `<generator>.jpg` card backgrounds.
    #[arg(long, global = true, env = "SPELLCARD_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Log filter (overrides RUST_LOG), e.g. "debug".
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl GlobalOptions {
    /// Build the formatter registry, loading templates if configured.
    pub fn registry(&self) -> Result<FormatterRegistry> {
        FormatterRegistry::builtin(self.templates_dir.as_deref()).with_context(|| match &self
            .templates_dir
        {
            Some(dir) => format!("failed to load card templates from {}", dir.display()),
            None => "failed to initialise formatters".to_string(),
        })
    }
}
