//! List commands: show configured repositories and employees

use crate::config::EvalConfig;
use anyhow::Result;
use std::path::Path;

pub fn repos(config_path: &Path) -> Result<()> {
    let config = EvalConfig::load(config_path)?;

    println!("Configured repositories:");
    for repo in &config.repositories {
        println!(
            "  - {}: {} (weight: {})",
            repo.name,
            repo.path.display(),
            repo.weight
        );
        if !repo.description.is_empty() {
            println!("      {}", repo.description);
        }
    }
    Ok(())
}

pub fn employees(config_path: &Path) -> Result<()> {
    let config = EvalConfig::load(config_path)?;

    if config.employees.is_empty() {
        println!("No employee mapping configured; authors will be shown by email.");
        return Ok(());
    }

    println!("Configured employees:");
    for (name, emails) in &config.employees {
        println!("  - {}: {}", name, emails.join(", "));
    }
    Ok(())
}
