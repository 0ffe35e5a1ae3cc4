//! The "plain" card: a parchment card with a centred title, a two-by-two
//! grid of casting details, the description and a school/level footer.
//!
//! This formatter reports real progress: the stream prepares the canvas,
//! draws the text and encodes the image as separate steps.

use std::path::Path;

use image::Rgb;

use super::canvas::{clamp_lines, wrap_text, Canvas, TextStyle};
use super::template::{Band, CardTemplate, Palette};
use super::{Formatter, ProgressEvent, ProgressStream};
use crate::error::Result;
use crate::spell::SpellRecord;

pub const NAME: &str = "plain";

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 560;

const INK: Rgb<u8> = Rgb([20, 16, 12]);

const PALETTE: Palette = Palette {
    paper_top: Rgb([246, 238, 214]),
    paper_bottom: Rgb([228, 212, 178]),
    frame: Rgb([96, 66, 38]),
    band: Rgb([234, 220, 188]),
};

const BANDS: [Band; 3] = [
    Band { y: 14, height: 40 },
    Band { y: 74, height: 82 },
    Band { y: 474, height: 34 },
];

const TITLE: TextStyle = TextStyle::new(2, INK).bold();
const LABEL: TextStyle = TextStyle::new(1, INK);
const BODY: TextStyle = TextStyle::new(1, INK);
const FOOTER: TextStyle = TextStyle::new(1, INK).bold();

const TITLE_Y: u32 = 27;
const FIRST_ROW_Y: u32 = 95;
const SECOND_ROW_Y: u32 = 130;
const FOOTER_Y: u32 = 488;

const COLUMN_MARGIN: u32 = 16;
const BODY_X: u32 = 40;
const BODY_Y: u32 = 172;
const BODY_BOTTOM: u32 = 466;
const BODY_WRAP: usize = 53;
const BODY_LINE_HEIGHT: u32 = 10;

/// Parchment card, 400x560.
#[derive(Debug, Clone)]
pub struct PlainFormatter {
    template: CardTemplate,
}

impl PlainFormatter {
    /// Build the formatter, loading `plain.png`/`plain.jpg` from
    /// `template_dir` when present.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let template = CardTemplate::resolve(template_dir, NAME, WIDTH, HEIGHT, || {
            CardTemplate::procedural(WIDTH, HEIGHT, PALETTE, &BANDS)
        })?;
        Ok(Self { template })
    }

    fn prepare(&self) -> Canvas {
        Canvas::new(self.template.background())
    }

    fn draw(&self, canvas: &mut Canvas, spell: &SpellRecord) {
        let width = canvas.width();
        let half = width / 2;
        let column_width = half - COLUMN_MARGIN;

        canvas.draw_centered(
            spell.title(),
            TITLE,
            TITLE_Y,
            COLUMN_MARGIN,
            width - 2 * COLUMN_MARGIN,
        );

        canvas.draw_centered(spell.casting_time(), LABEL, FIRST_ROW_Y, COLUMN_MARGIN, column_width);
        canvas.draw_centered(spell.range(), LABEL, FIRST_ROW_Y, half, column_width);
        canvas.draw_centered(spell.components(), LABEL, SECOND_ROW_Y, COLUMN_MARGIN, column_width);
        canvas.draw_centered(spell.duration(), LABEL, SECOND_ROW_Y, half, column_width);

        let max_lines = ((BODY_BOTTOM - BODY_Y) / BODY_LINE_HEIGHT) as usize;
        let lines = clamp_lines(wrap_text(spell.description(), BODY_WRAP), max_lines, BODY_WRAP);
        for (index, line) in lines.iter().enumerate() {
            canvas.draw_text(BODY_X, BODY_Y + index as u32 * BODY_LINE_HEIGHT, line, BODY);
        }

        canvas.draw_centered(
            spell.school().as_str(),
            FOOTER,
            FOOTER_Y,
            COLUMN_MARGIN,
            column_width,
        );
        canvas.draw_centered(&spell.level_label(), FOOTER, FOOTER_Y, half, column_width);
    }
}

impl Formatter for PlainFormatter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Parchment card with a two-column details grid"
    }

    fn render(&self, spell: &SpellRecord) -> Result<Vec<u8>> {
        let mut canvas = self.prepare();
        self.draw(&mut canvas, spell);
        canvas.encode_jpeg(NAME)
    }

    fn render_stream<'a>(&'a self, spell: &'a SpellRecord) -> ProgressStream<'a> {
        Box::new(PlainProgress {
            formatter: self,
            spell,
            stage: Stage::Start,
        })
    }
}

enum Stage {
    Start,
    Started,
    Prepared(Canvas),
    Drawn(Canvas),
    Done,
}

struct PlainProgress<'a> {
    formatter: &'a PlainFormatter,
    spell: &'a SpellRecord,
    stage: Stage,
}

impl Iterator for PlainProgress<'_> {
    type Item = Result<ProgressEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Start => {
                self.stage = Stage::Started;
                Some(Ok(ProgressEvent::checkpoint(10, "Initializing card generation")))
            }
            Stage::Started => {
                self.stage = Stage::Prepared(self.formatter.prepare());
                Some(Ok(ProgressEvent::checkpoint(30, "Template loaded")))
            }
            Stage::Prepared(mut canvas) => {
                self.formatter.draw(&mut canvas, self.spell);
                self.stage = Stage::Drawn(canvas);
                Some(Ok(ProgressEvent::checkpoint(80, "Spell text drawn")))
            }
            Stage::Drawn(canvas) => Some(canvas.encode_jpeg(NAME).map(ProgressEvent::finished)),
            Stage::Done => None,
        }
    }
}
