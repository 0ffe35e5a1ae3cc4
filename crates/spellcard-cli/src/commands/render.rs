//! `render`: draw one card and write it to disk.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;

use spellcard_lib::{card_filename, Formatter, SpellData, SpellRecord, DEFAULT_GENERATOR};

use crate::GlobalOptions;

/// Spell fields and output options. Every spell field can also be supplied
/// through the environment.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Spell title (at most 23 characters).
    #[arg(long, env = "SPELL_NAME")]
    pub title: Option<String>,

    #[arg(long, env = "CASTING_TIME")]
    pub casting_time: Option<String>,

    #[arg(long, env = "RANGE")]
    pub range: Option<String>,

    /// Components, e.g. "V, S, M" or free text.
    #[arg(long, env = "COMPONENTS")]
    pub components: Option<String>,

    #[arg(long, env = "DURATION")]
    pub duration: Option<String>,

    #[arg(long, env = "DESCRIPTION")]
    pub description: Option<String>,

    /// School of magic, e.g. "Evocation".
    #[arg(long, env = "SCHOOL")]
    pub school: Option<String>,

    /// Spell level, 0 (cantrip) to 9.
    #[arg(long, env = "LEVEL", allow_negative_numbers = true)]
    pub level: Option<i64>,

    /// Generator used to draw the card.
    #[arg(long, env = "GENERATOR", default_value = DEFAULT_GENERATOR)]
    pub generator: String,

    /// Directory the card is written to.
    #[arg(long, default_value = "cards")]
    pub output_dir: PathBuf,

    /// Report render checkpoints on stderr.
    #[arg(long)]
    pub progress: bool,
}

impl RenderArgs {
    fn spell_data(&self) -> SpellData {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        SpellData {
            title: text(&self.title),
            casting_time: text(&self.casting_time),
            range: text(&self.range),
            components: text(&self.components),
            duration: text(&self.duration),
            description: text(&self.description),
            school: text(&self.school),
            level: self.level,
        }
    }
}

/// Validate the spell, render it and write `L<level>.<slug>.jpg` into the
/// output directory. Returns the written path.
pub fn run(global: &GlobalOptions, args: &RenderArgs) -> Result<PathBuf> {
    let spell = SpellRecord::new(args.spell_data()).context("invalid spell data")?;
    let registry = global.registry()?;
    let formatter = registry.get(&args.generator)?;

    tracing::info!(generator = %args.generator, title = %spell.title(), "rendering card");
    let image = if args.progress {
        render_with_progress(formatter.as_ref(), &spell)?
    } else {
        formatter
            .render(&spell)
            .with_context(|| format!("failed to render '{}'", spell.title()))?
    };

    let path = write_card(&args.output_dir, &spell, &image)?;
    println!("{}", path.display());
    Ok(path)
}

fn render_with_progress(formatter: &dyn Formatter, spell: &SpellRecord) -> Result<Vec<u8>> {
    for event in formatter.render_stream(spell) {
        let event = event.with_context(|| format!("failed to render '{}'", spell.title()))?;
        eprintln!("[{:>3}%] {}", event.percent, event.message);
        if let Some(image) = event.image {
            return Ok(image);
        }
    }
    Err(anyhow!("render of '{}' ended without an image", spell.title()))
}

fn write_card(dir: &Path, spell: &SpellRecord, image: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(card_filename(spell));
    std::fs::write(&path, image)
        .with_context(|| format!("failed to write card to {}", path.display()))?;
    Ok(path)
}
