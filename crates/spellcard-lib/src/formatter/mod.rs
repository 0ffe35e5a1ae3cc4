//! The formatter contract and the built-in formatters.
//!
//! A [`Formatter`] turns a [`SpellRecord`] into encoded image bytes. Every
//! formatter is also streamable: [`Formatter::render_stream`] has a default
//! implementation that wraps [`Formatter::render`] in the four fixed
//! checkpoints, so plugin authors only need to write `render`. Formatters
//! that can report real progress override it.

pub mod canvas;
pub mod font;
pub mod plain;
pub mod template;
pub mod tornioduva;

use crate::error::Result;
use crate::spell::SpellRecord;

pub use plain::PlainFormatter;
pub use tornioduva::TornioDuvaFormatter;

/// Progress percentages reported by every stream, in order.
pub const CHECKPOINTS: [u8; 4] = [10, 30, 80, 100];

/// MIME type of the images produced by the built-in formatters.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// One step of a streamed render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: u8,
    pub message: String,
    /// Encoded image; present exactly on the 100% event.
    pub image: Option<Vec<u8>>,
}

impl ProgressEvent {
    /// An intermediate checkpoint without payload.
    pub fn checkpoint(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
            image: None,
        }
    }

    /// The terminal 100% event carrying the final image.
    pub fn finished(image: Vec<u8>) -> Self {
        Self {
            percent: 100,
            message: "Card generation complete".to_string(),
            image: Some(image),
        }
    }

    pub fn is_final(&self) -> bool {
        self.percent == 100
    }
}

/// Lazily produced progress events. An `Err` item ends the stream.
pub type ProgressStream<'a> = Box<dyn Iterator<Item = Result<ProgressEvent>> + Send + 'a>;

/// A pluggable spell card renderer.
pub trait Formatter: Send + Sync {
    /// Registry key, e.g. `"plain"`.
    fn name(&self) -> &'static str;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// Render `spell` into encoded image bytes.
    ///
    /// Must be deterministic: the same spell always yields the same bytes.
    fn render(&self, spell: &SpellRecord) -> Result<Vec<u8>>;

    /// Render `spell` while reporting progress.
    fn render_stream<'a>(&'a self, spell: &'a SpellRecord) -> ProgressStream<'a> {
        synthesize_progress(move || self.render(spell))
    }
}

/// Wrap a one-shot render in the standard checkpoints.
///
/// The 10/30/80 events carry no payload; `render` runs only when the 100%
/// event is requested.
pub fn synthesize_progress<'a, F>(render: F) -> ProgressStream<'a>
where
    F: FnOnce() -> Result<Vec<u8>> + Send + 'a,
{
    Box::new(SynthesizedProgress {
        step: 0,
        render: Some(Box::new(render)),
    })
}

type RenderFn<'a> = Box<dyn FnOnce() -> Result<Vec<u8>> + Send + 'a>;

struct SynthesizedProgress<'a> {
    step: usize,
    render: Option<RenderFn<'a>>,
}

impl Iterator for SynthesizedProgress<'_> {
    type Item = Result<ProgressEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.step;
        self.step += 1;
        match step {
            0 => Some(Ok(ProgressEvent::checkpoint(10, "Initializing card generation"))),
            1 => Some(Ok(ProgressEvent::checkpoint(30, "Loading template and fonts"))),
            2 => Some(Ok(ProgressEvent::checkpoint(80, "Rendering card"))),
            3 => {
                let render = self.render.take()?;
                Some(render().map(ProgressEvent::finished))
            }
            _ => None,
        }
    }
}
