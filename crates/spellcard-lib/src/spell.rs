//! Spell records and their validation rules.
//!
//! [`SpellData`] is the lenient wire shape accepted by every transport: all
//! fields default to empty so that missing fields surface as validation
//! errors naming the field rather than as opaque deserialisation failures.
//! [`SpellRecord`] is the validated, immutable form consumed by formatters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest title that fits on the single-line title band.
pub const MAX_TITLE_CHARS: usize = 23;

/// Longest description accepted for a card.
pub const MAX_DESCRIPTION_CHARS: usize = 650;

/// Highest spell level (cantrips are level 0).
pub const MAX_LEVEL: u8 = 9;

/// The eight schools of magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub enum School {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

impl School {
    /// Every school, in alphabetical order.
    pub const ALL: [School; 8] = [
        School::Abjuration,
        School::Conjuration,
        School::Divination,
        School::Enchantment,
        School::Evocation,
        School::Illusion,
        School::Necromancy,
        School::Transmutation,
    ];

    /// Canonical capitalised name.
    pub fn as_str(&self) -> &'static str {
        match self {
            School::Abjuration => "Abjuration",
            School::Conjuration => "Conjuration",
            School::Divination => "Divination",
            School::Enchantment => "Enchantment",
            School::Evocation => "Evocation",
            School::Illusion => "Illusion",
            School::Necromancy => "Necromancy",
            School::Transmutation => "Transmutation",
        }
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for School {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        School::ALL
            .iter()
            .copied()
            .find(|school| school.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::validation(
                    "school",
                    format!(
                        "'{}' is not a school of magic; expected one of: {}",
                        wanted,
                        School::ALL
                            .iter()
                            .map(School::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
            })
    }
}

/// Spell fields as received from a request, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub casting_time: String,
    #[serde(default, alias = "spell_range")]
    pub range: String,
    #[serde(default)]
    pub components: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub level: Option<i64>,
}

/// A validated spell, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellRecord {
    title: String,
    casting_time: String,
    range: String,
    components: String,
    duration: String,
    description: String,
    school: School,
    level: u8,
}

impl SpellRecord {
    /// Validate raw spell data.
    ///
    /// Text fields are trimmed and must be non-empty. The title and
    /// description have length limits, the level must lie in `0..=9`, and a
    /// components list made of single letters is normalised (see
    /// [`normalize_components`]).
    pub fn new(data: SpellData) -> Result<Self> {
        let title = required("title", &data.title)?;
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::validation(
                "title",
                format!(
                    "'{}' is too long; max allowed is {} characters",
                    title, MAX_TITLE_CHARS
                ),
            ));
        }

        let casting_time = required("casting_time", &data.casting_time)?;
        let range = required("range", &data.range)?;
        let components = normalize_components(required("components", &data.components)?)?;
        let duration = required("duration", &data.duration)?;

        let description = required("description", &data.description)?;
        let description_len = description.chars().count();
        if description_len > MAX_DESCRIPTION_CHARS {
            return Err(Error::validation(
                "description",
                format!(
                    "too long; max allowed is {} characters, got {}",
                    MAX_DESCRIPTION_CHARS, description_len
                ),
            ));
        }

        let school: School = required("school", &data.school)?.parse()?;
        let level = validate_level(data.level)?;

        Ok(Self {
            title: title.to_string(),
            casting_time: casting_time.to_string(),
            range: range.to_string(),
            components,
            duration: duration.to_string(),
            description: description.to_string(),
            school,
            level,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn casting_time(&self) -> &str {
        &self.casting_time
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn components(&self) -> &str {
        &self.components
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn school(&self) -> School {
        self.school
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Footer label for the level: "Cantrip" for level 0, "Level N" otherwise.
    pub fn level_label(&self) -> String {
        if self.level == 0 {
            "Cantrip".to_string()
        } else {
            format!("Level {}", self.level)
        }
    }
}

impl TryFrom<SpellData> for SpellRecord {
    type Error = Error;

    fn try_from(data: SpellData) -> Result<Self> {
        SpellRecord::new(data)
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(
            field,
            "the field is required and cannot be empty",
        ));
    }
    Ok(trimmed)
}

fn validate_level(level: Option<i64>) -> Result<u8> {
    let level = level.ok_or_else(|| Error::validation("level", "the field is required"))?;
    if !(0..=i64::from(MAX_LEVEL)).contains(&level) {
        return Err(Error::validation(
            "level",
            format!("{} is out of range; allowed spell levels are 0 to {}", level, MAX_LEVEL),
        ));
    }
    Ok(level as u8)
}

/// Normalise a components string.
///
/// A list of single-letter tokens such as `"v,s"` must only contain `V`, `S`
/// and `M` without repeats and comes back as `"V, S"`. Anything else (for
/// example `"V, S, M (a pinch of sulfur)"`) is free text and is kept as-is.
pub fn normalize_components(raw: &str) -> Result<String> {
    let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
    if !tokens.iter().all(|token| token.chars().count() <= 1) {
        return Ok(raw.trim().to_string());
    }

    let mut seen: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.is_empty() {
            return Err(Error::validation(
                "components",
                "empty entry in components list",
            ));
        }
        let upper = token.to_ascii_uppercase();
        if !matches!(upper.as_str(), "V" | "S" | "M") {
            return Err(Error::validation(
                "components",
                format!("unknown component '{}'; expected V, S or M", token),
            ));
        }
        if seen.contains(&upper) {
            return Err(Error::validation(
                "components",
                format!("component '{}' is repeated", upper),
            ));
        }
        seen.push(upper);
    }
    Ok(seen.join(", "))
}
