use anyhow::{Context, Result};

use crate::config::Config;
use crate::extractor::{Extractor, ExtractorOptions};
use crate::logging;
use crate::watcher::FileWatcher;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub dir: Option<String>,
    pub out: Option<String>,
    pub go_file: Option<String>,
    pub pkg: Option<String>,
    pub ext: Option<Vec<String>>,
}

impl Overrides {
    pub fn apply(self, config: &Config) -> Config {
        let mut merged = config.clone();
        if let Some(dir) = self.dir {
            merged.dir = dir;
        }
        if let Some(out) = self.out {
            merged.out = out;
        }
        if let Some(go_file) = self.go_file {
            merged.go_file = go_file;
        }
        if let Some(pkg) = self.pkg {
            merged.pkg = pkg;
        }
        if let Some(ext) = self.ext {
            // `--ext ".html .tmpl"` and `--ext .html,.tmpl` are both accepted
            merged.ext = ext
                .iter()
                .flat_map(|value| value.split_whitespace())
                .map(str::to_string)
                .collect();
        }
        merged
    }
}

pub fn run(config: &Config, overrides: Overrides, watch: bool) -> Result<()> {
    logging::info("=== i18n extract ===\n");

    let config = overrides.apply(config);

    logging::info("Configuration:");
    logging::info(&format!("  Directory: {}", config.dir));
    if config.out.trim().is_empty() {
        logging::info("  Catalog: (disabled)");
    } else {
        logging::info(&format!("  Catalog: {}", config.out));
    }
    logging::info(&format!("  Go file: {} (package {})", config.go_file, config.pkg));
    logging::info(&format!("  Extensions: {:?}", config.ext));
    logging::info(&format!("  Functions: {:?}", config.functions));
    if !config.ignore.is_empty() {
        logging::info(&format!("  Ignore: {:?}", config.ignore));
    }
    logging::info("");

    let extractor = Extractor::new(ExtractorOptions::from(&config))
        .context("Invalid extraction settings")?;

    if watch {
        let mut watcher = FileWatcher::new(extractor);
        return watcher.run();
    }

    let report = extractor
        .extract()
        .with_context(|| format!("Extraction failed for {}", config.dir))?;

    let collected = &report.collected;
    logging::info("Extraction Summary:");
    logging::info(&format!("  Files scanned: {}", collected.files_scanned));
    logging::info(&format!("  Call-sites: {}", collected.call_sites));
    logging::info(&format!("  Unique messages: {}", collected.messages.len()));
    logging::info("");

    match &report.catalog {
        Some(path) => logging::info(&format!(
            "Wrote {} messages to {}",
            collected.messages.len(),
            path.display()
        )),
        None => logging::info("Catalog output disabled; skipped JSON"),
    }
    logging::info(&format!("Wrote {}", report.stub.display()));

    logging::info("\nDone!");
    Ok(())
}
