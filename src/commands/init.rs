use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::logging;

pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    logging::info("=== i18n init ===\n");

    let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let config_str = config.to_pretty_json()?;
    std::fs::write(config_path, format!("{}\n", config_str))
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    logging::info(&format!("Created configuration file: {}\n", config_path.display()));
    logging::info("Configuration:");
    logging::info(&format!("  Directory: {}", config.dir));
    logging::info(&format!("  Go file: {} (package {})", config.go_file, config.pkg));
    logging::info(&format!("  Extensions: {:?}", config.ext));
    logging::info(&format!("  Functions: {:?}", config.functions));

    logging::info("\nNext steps:");
    logging::info("  1. Set \"out\" to write a JSON catalog");
    logging::info("  2. Run 'i18n extract' to generate the Go stub");
    logging::info("  3. Run 'gotext extract' / 'gotext update' on the generated file");

    Ok(())
}
