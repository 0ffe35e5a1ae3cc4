//! Generator name → formatter lookup.
//!
//! The registry is populated once at startup and shared read-only behind an
//! `Arc` afterwards; request handlers never mutate it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::formatter::{Formatter, PlainFormatter, TornioDuvaFormatter};

/// Generator used when a request does not name one.
pub const DEFAULT_GENERATOR: &str = "plain";

/// Maps generator names to formatters.
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: BTreeMap<String, Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in formatter.
    ///
    /// `template_dir` may hold `<generator>.png`/`.jpg` backgrounds that
    /// replace the procedural ones.
    pub fn builtin(template_dir: Option<&Path>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register_formatter(PlainFormatter::new(template_dir)?);
        registry.register_formatter(TornioDuvaFormatter::new(template_dir)?);
        info!(generators = ?registry.names(), "formatter registry initialised");
        Ok(registry)
    }

    /// Register `formatter` under `name`, replacing any previous entry.
    ///
    /// Returns the formatter that was replaced, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        formatter: Arc<dyn Formatter>,
    ) -> Option<Arc<dyn Formatter>> {
        let name = name.into();
        let previous = self.formatters.insert(name.clone(), formatter);
        if previous.is_some() {
            warn!(generator = %name, "generator registered twice; last registration wins");
        }
        previous
    }

    /// Register `formatter` under its own [`Formatter::name`].
    pub fn register_formatter<F: Formatter + 'static>(&mut self, formatter: F) {
        let name = formatter.name();
        self.register(name, Arc::new(formatter));
    }

    /// Look up a formatter by generator name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Formatter>> {
        self.formatters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::GeneratorNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Registered generator names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.formatters.keys().cloned().collect()
    }

    /// `(name, formatter)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Formatter>)> {
        self.formatters.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("generators", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::SpellRecord;

    struct Fixed(&'static str, u8);

    impl Formatter for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "fixed bytes"
        }

        fn render(&self, _spell: &SpellRecord) -> Result<Vec<u8>> {
            Ok(vec![self.1])
        }
    }

    #[test]
    fn builtin_registers_plain_and_tornioduva() {
        let registry = FormatterRegistry::builtin(None).unwrap();
        assert_eq!(registry.names(), vec!["plain", "tornioduva"]);
        assert!(registry.contains(DEFAULT_GENERATOR));
        assert_eq!(registry.get("plain").unwrap().name(), "plain");
    }

    #[test]
    fn unknown_generator_is_reported_with_alternatives() {
        let registry = FormatterRegistry::builtin(None).unwrap();
        match registry.get("nonexistent") {
            Err(Error::GeneratorNotFound { name, available }) => {
                assert_eq!(name, "nonexistent");
                assert_eq!(available, vec!["plain", "tornioduva"]);
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("lookup of unknown generator succeeded"),
        }
    }

    #[test]
    fn duplicate_registration_keeps_the_last() {
        let mut registry = FormatterRegistry::new();
        assert!(registry.register("fixed", Arc::new(Fixed("fixed", 1))).is_none());
        assert!(registry.register("fixed", Arc::new(Fixed("fixed", 2))).is_some());
        assert_eq!(registry.len(), 1);

        let spell = crate::spell::SpellRecord::new(crate::spell::SpellData {
            title: "Light".into(),
            casting_time: "1 action".into(),
            range: "Touch".into(),
            components: "V, M".into(),
            duration: "1 hour".into(),
            description: "You touch one object.".into(),
            school: "Evocation".into(),
            level: Some(0),
        })
        .unwrap();
        assert_eq!(registry.get("fixed").unwrap().render(&spell).unwrap(), vec![2]);
    }

    #[test]
    fn debug_lists_generator_names() {
        let registry = FormatterRegistry::builtin(None).unwrap();
        let debug = format!("{:?}", registry);
        assert!(debug.contains("plain"));
        assert!(debug.contains("tornioduva"));
    }
}
