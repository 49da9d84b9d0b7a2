use anyhow::{Context, Result};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::extractor::{ExtractionReport, Extractor};
use crate::logging;

/// Re-runs extraction whenever templates under the scan root change
pub struct FileWatcher {
    extractor: Extractor,
    debounce_duration: Duration,
    /// Absolute scan root, used to apply ignore patterns to event paths
    root: PathBuf,
    /// Generated files, never treated as template changes
    outputs: Vec<PathBuf>,
}

impl FileWatcher {
    pub fn new(extractor: Extractor) -> Self {
        let options = extractor.options();
        let outputs = std::iter::once(options.go_file.clone())
            .chain(options.out.clone())
            .map(|p| absolute(&p))
            .collect();
        let root = absolute(&options.dir);
        Self {
            extractor,
            debounce_duration: Duration::from_millis(300),
            root,
            outputs,
        }
    }

    /// Run the file watcher, blocking until interrupted
    pub fn run(&mut self) -> Result<()> {
        let (tx, rx) = channel();

        let mut debouncer = new_debouncer(self.debounce_duration, tx)
            .context("Failed to create file watcher")?;

        let root = self.extractor.options().dir.clone();
        if !root.is_dir() {
            anyhow::bail!("Not a directory, cannot watch: {}", root.display());
        }

        logging::info(&format!("Watching: {}", root.display()));
        debouncer
            .watcher()
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch directory: {}", root.display()))?;

        logging::info("\nWatching for changes... (Ctrl+C to stop)\n");

        // Initial full extraction
        logging::info("--- Initial extraction ---");
        let report = self.extractor.extract()?;
        log_report(&report);
        logging::info("--- Ready ---\n");

        // Channel closes when the debouncer is dropped
        while let Ok(result) = rx.recv() {
            self.handle_events(result);
        }

        Ok(())
    }

    /// Whether a changed path should trigger a new extraction
    pub fn is_relevant(&self, path: &Path) -> bool {
        if !self.extractor.is_template(path) {
            return false;
        }
        let path = absolute(path);
        if self.outputs.contains(&path) {
            return false;
        }
        match path.strip_prefix(&self.root) {
            Ok(rel) => !self.extractor.is_ignored(rel),
            Err(_) => true,
        }
    }

    fn handle_events(&mut self, result: DebounceEventResult) {
        let events = match result {
            Ok(events) => events,
            Err(error) => {
                logging::warn(&format!("Watch error: {:?}", error));
                return;
            }
        };

        let mut changed: Vec<PathBuf> = events
            .into_iter()
            .map(|event| event.path)
            .filter(|path| self.is_relevant(path))
            .collect();
        changed.sort();
        changed.dedup();

        if changed.is_empty() {
            return;
        }

        logging::info("--- Change detected ---");
        for path in &changed {
            let verb = if path.exists() { "Modified" } else { "Removed" };
            logging::info(&format!("  {}: {}", verb, path.display()));
        }

        // Positions depend on traversal order, so every change triggers a full run
        match self.extractor.extract() {
            Ok(report) => log_report(&report),
            Err(err) => logging::error(&format!("Extraction failed: {}", err)),
        }
        logging::info("--- Sync complete ---\n");
    }
}

fn log_report(report: &ExtractionReport) {
    let collected = &report.collected;
    logging::info(&format!("  Files: {}", collected.files_scanned));
    logging::info(&format!("  Messages: {}", collected.messages.len()));
    logging::info(&format!("  Call-sites: {}", collected.call_sites));
}

fn absolute(path: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
