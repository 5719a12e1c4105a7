//! Init command - write an example configuration

use anyhow::{bail, Context, Result};
use console::style;
use harmony_heal::config::EXAMPLE_CONFIG;
use std::path::Path;

/// Run the init command
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join("harmony.toml");
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        run(dir.path(), false).expect("first init");
        assert!(run(dir.path(), false).is_err());
        run(dir.path(), true).expect("forced init");
        let written = std::fs::read_to_string(dir.path().join("harmony.toml")).expect("read");
        assert_eq!(written, EXAMPLE_CONFIG);
    }
}
