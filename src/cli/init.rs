//! Init command: write an example config file

use crate::config::EvalConfig;
use anyhow::{bail, Result};
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!(
            "{} already exists; remove it first or pass --config with a new path",
            config_path.display()
        );
    }

    std::fs::write(config_path, EvalConfig::example_toml())?;
    println!("Wrote example config to {}", config_path.display());
    println!("Edit the [[repositories]] entries, then run: gitgauge evaluate");
    Ok(())
}
