//! The "tornioduva" card, styled after TornioDuva's item card layout: a
//! large title, a labelled details table and a wide description panel.
//!
//! Streams through the default checkpoint wrapper.

use std::path::Path;

use image::Rgb;

use super::canvas::{clamp_lines, fit_to_width, wrap_text, Canvas, TextStyle};
use super::template::{Band, CardTemplate, Palette};
use super::Formatter;
use crate::error::Result;
use crate::spell::SpellRecord;

pub const NAME: &str = "tornioduva";

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 1120;

const INK: Rgb<u8> = Rgb([34, 22, 14]);
const MUTED: Rgb<u8> = Rgb([92, 70, 52]);

const PALETTE: Palette = Palette {
    paper_top: Rgb([232, 214, 178]),
    paper_bottom: Rgb([204, 176, 132]),
    frame: Rgb([58, 38, 22]),
    band: Rgb([216, 192, 150]),
};

const BANDS: [Band; 3] = [
    Band { y: 100, height: 110 },
    Band { y: 270, height: 150 },
    Band { y: 1050, height: 60 },
];

const TITLE: TextStyle = TextStyle::new(4, INK).bold();
const LABEL: TextStyle = TextStyle::new(2, INK).bold();
const VALUE: TextStyle = TextStyle::new(2, MUTED);
const BODY: TextStyle = TextStyle::new(2, INK);
const FOOTER: TextStyle = TextStyle::new(2, INK).bold();

const TITLE_Y: u32 = 140;
const TABLE_Y: u32 = 290;
const TABLE_ROW_HEIGHT: u32 = 30;
const LABEL_X: u32 = 120;
const VALUE_X: u32 = 384;

const BODY_X: u32 = 100;
const BODY_Y: u32 = 450;
const BODY_BOTTOM: u32 = 1030;
const BODY_WRAP: usize = 50;
const BODY_LINE_HEIGHT: u32 = 22;

const FOOTER_Y: u32 = 1073;
const COLUMN_MARGIN: u32 = 24;

const ROW_LABELS: [&str; 4] = ["Casting Time", "Range", "Components", "Duration"];

/// Item-card style layout, 800x1120.
#[derive(Debug, Clone)]
pub struct TornioDuvaFormatter {
    template: CardTemplate,
}

impl TornioDuvaFormatter {
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let template = CardTemplate::resolve(template_dir, NAME, WIDTH, HEIGHT, || {
            CardTemplate::procedural(WIDTH, HEIGHT, PALETTE, &BANDS)
        })?;
        Ok(Self { template })
    }

    fn draw(&self, canvas: &mut Canvas, spell: &SpellRecord) {
        let width = canvas.width();
        canvas.draw_centered(
            spell.title(),
            TITLE,
            TITLE_Y,
            COLUMN_MARGIN,
            width - 2 * COLUMN_MARGIN,
        );

        let values = [
            spell.casting_time(),
            spell.range(),
            spell.components(),
            spell.duration(),
        ];
        let value_width = width - VALUE_X - COLUMN_MARGIN * 2;
        for (row, (label, value)) in ROW_LABELS.iter().zip(values).enumerate() {
            let y = TABLE_Y + row as u32 * TABLE_ROW_HEIGHT;
            canvas.draw_text(LABEL_X, y, label, LABEL);
            canvas.draw_text(VALUE_X, y, &fit_to_width(value, value_width, VALUE), VALUE);
        }

        let max_lines = ((BODY_BOTTOM - BODY_Y) / BODY_LINE_HEIGHT) as usize;
        let lines = clamp_lines(wrap_text(spell.description(), BODY_WRAP), max_lines, BODY_WRAP);
        for (index, line) in lines.iter().enumerate() {
            canvas.draw_text(BODY_X, BODY_Y + index as u32 * BODY_LINE_HEIGHT, line, BODY);
        }

        let half = width / 2;
        let column_width = half - COLUMN_MARGIN;
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

impl Formatter for TornioDuvaFormatter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "TornioDuva item-card layout with a labelled details table"
    }

    fn render(&self, spell: &SpellRecord) -> Result<Vec<u8>> {
        let mut canvas = Canvas::new(self.template.background());
        self.draw(&mut canvas, spell);
        canvas.encode_jpeg(NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{ProgressEvent, CHECKPOINTS};
    use crate::spell::SpellData;

    fn long_spell() -> SpellRecord {
        SpellRecord::new(SpellData {
            title: "Tasha's Hideous Laughter".chars().take(23).collect(),
            casting_time: "1 action".to_string(),
            range: "30 feet".to_string(),
            components: "V, S, M (tiny tarts and a feather that is waved in the air)"
                .to_string(),
            duration: "Concentration, up to 1 minute".to_string(),
            description: "word ".repeat(130),
            school: "enchantment".to_string(),
            level: Some(1),
        })
        .unwrap()
    }

    #[test]
    fn renders_long_fields_without_error() {
        let formatter = TornioDuvaFormatter::new(None).unwrap();
        let bytes = formatter.render(&long_spell()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (WIDTH, HEIGHT));
    }

    #[test]
    fn default_stream_wraps_render() {
        let formatter = TornioDuvaFormatter::new(None).unwrap();
        let spell = long_spell();
        let events: Vec<ProgressEvent> = formatter
            .render_stream(&spell)
            .collect::<Result<_>>()
            .unwrap();
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, CHECKPOINTS);
        assert_eq!(events[3].image, Some(formatter.render(&spell).unwrap()));
    }
}
