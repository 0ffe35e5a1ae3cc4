//! Where rendered cards are written and how they are named.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::spell::SpellRecord;

/// URL prefix under which the card directory is served.
pub const DEFAULT_URL_PREFIX: &str = "/cards";

/// File extension of stored cards.
pub const CARD_EXTENSION: &str = "jpg";

/// Turn a spell title into a filesystem- and URL-safe slug.
///
/// ASCII letters and digits are kept with their case; runs of whitespace,
/// `-` and `_` collapse into one `-`; everything else is dropped. A title
/// with nothing left becomes `"card"`.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("card");
    }
    slug
}

/// `L<level>.<slug>.jpg`, e.g. `L0.Acid-Splash.jpg`.
pub fn card_filename(spell: &SpellRecord) -> String {
    format!(
        "L{}.{}.{}",
        spell.level(),
        slugify_title(spell.title()),
        CARD_EXTENSION
    )
}

/// A card that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardOutput {
    pub filename: String,
    pub path: PathBuf,
    /// Public URL, `<prefix>/<generator>/<filename>`.
    pub url: String,
}

/// Directory tree of rendered cards, one sub-directory per generator.
#[derive(Debug, Clone)]
pub struct CardStore {
    root: PathBuf,
    url_prefix: String,
}

impl CardStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }

    /// Serve cards under a different URL prefix.
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Path a card for `spell` rendered by `generator` is stored at.
    pub fn path_for(&self, generator: &str, spell: &SpellRecord) -> PathBuf {
        self.root.join(generator).join(card_filename(spell))
    }

    /// Write `bytes` for `spell`, replacing any earlier card with the same
    /// name.
    ///
    /// The card is staged in a temporary file beside its final path and
    /// renamed into place, so readers only ever see a complete card.
    pub fn write(&self, generator: &str, spell: &SpellRecord, bytes: &[u8]) -> Result<CardOutput> {
        let path = self.path_for(generator, spell);
        let dir = self.root.join(generator);
        fs::create_dir_all(&dir)?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        staged.write_all(bytes)?;
        staged.persist(&path).map_err(|e| e.error)?;

        let filename = card_filename(spell);
        debug!(path = %path.display(), bytes = bytes.len(), "card written");

        Ok(CardOutput {
            url: format!("{}/{}/{}", self.url_prefix, generator, filename),
            filename,
            path,
        })
    }
}
