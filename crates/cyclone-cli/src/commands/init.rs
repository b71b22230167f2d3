//! Init command - writes a starter `cyclone.toml`

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cyclone_core::config::CONFIG_FILENAME;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# Cyclone configuration file

[rules]
# Disable rules by id or name
# disabled = ["S001"]

# Toggle the whole security category
# security = true

# Override rule severity
# [rules.severity]
# no-deserialization-reference-cycle = "error"

[analysis]
# Build the member graph on all cores
parallel = true

# Treat get-only computed properties as serialized data
computed_properties = false
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let config_path = self.write_config(&cwd)?;

        println!(
            "{} Created {} configuration file",
            "✓".green().bold(),
            config_path.display().to_string().cyan()
        );
        Ok(())
    }

    fn write_config(&self, dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILENAME);

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Config file '{}' already exists. Use --force to overwrite.",
                CONFIG_FILENAME
            );
        }

        fs::write(&config_path, DEFAULT_CONFIG)?;
        Ok(config_path)
    }
}
