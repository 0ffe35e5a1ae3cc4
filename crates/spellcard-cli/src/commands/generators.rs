//! `generators`: list registered generators.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::GlobalOptions;

pub fn run(global: &GlobalOptions, json: bool) -> Result<()> {
    let registry = global.registry()?;

    if json {
        let listing: BTreeMap<&str, &str> = registry
            .iter()
            .map(|(name, _)| (name, "available"))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let width = registry.names().iter().map(String::len).max().unwrap_or(0);
    for (name, formatter) in registry.iter() {
        println!("{:<width$}  {}", name, formatter.description(), width = width);
    }
    Ok(())
}
