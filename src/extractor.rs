use std::path::{Path, PathBuf};

use crate::catalog;
use crate::config::Config;
use crate::error::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging;
use crate::messages::{Message, MessageSet};
use crate::scanner::{Scanner, DEFAULT_FUNCTIONS};
use crate::stubgen;
use crate::walker::{ExtensionFilter, TreeWalker, DEFAULT_EXTENSIONS};

/// Parameters of one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Root directory to scan
    pub dir: PathBuf,
    /// JSON catalog path; `None` skips the catalog
    pub out: Option<PathBuf>,
    /// Package name for the generated Go file
    pub pkg: String,
    /// Path of the generated Go file
    pub go_file: PathBuf,
    pub extensions: Vec<String>,
    pub functions: Vec<String>,
    pub ignore: Vec<String>,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExtractorOptions {
    fn from(config: &Config) -> Self {
        let out = config.out.trim();
        Self {
            dir: PathBuf::from(&config.dir),
            out: (!out.is_empty()).then(|| PathBuf::from(out)),
            pkg: config.pkg.clone(),
            go_file: PathBuf::from(&config.go_file),
            extensions: config.ext.clone(),
            functions: config.functions.clone(),
            ignore: config.ignore.clone(),
        }
    }
}

impl ExtractorOptions {
    pub fn new(dir: impl Into<PathBuf>, go_file: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            out: None,
            pkg: "main".to_string(),
            go_file: go_file.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            functions: DEFAULT_FUNCTIONS.iter().map(|f| f.to_string()).collect(),
            ignore: Vec::new(),
        }
    }

    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        let out = out.into();
        self.out = (!out.as_os_str().is_empty()).then_some(out);
        self
    }

    pub fn with_pkg(mut self, pkg: impl Into<String>) -> Self {
        self.pkg = pkg.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = functions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = patterns.into_iter().map(Into::into).collect();
        self
    }
}

/// Messages collected from one traversal
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Collected {
    pub messages: Vec<Message>,
    pub files_scanned: usize,
    pub call_sites: usize,
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub collected: Collected,
    /// Catalog path when one was written
    pub catalog: Option<PathBuf>,
    pub stub: PathBuf,
}

/// Walks a template tree, scans it and writes both outputs
#[derive(Debug, Clone)]
pub struct Extractor {
    options: ExtractorOptions,
    scanner: Scanner,
    walker: TreeWalker,
}

impl Extractor {
    pub fn new(options: ExtractorOptions) -> Result<Self> {
        let scanner = Scanner::new(&options.functions)?;
        let walker = TreeWalker::new(&options.dir, ExtensionFilter::new(&options.extensions))
            .with_ignore(&options.ignore)?;
        Ok(Self {
            options,
            scanner,
            walker,
        })
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Whether `path` has one of the configured template extensions
    pub fn is_template(&self, path: &Path) -> bool {
        self.walker.filter().matches(path)
    }

    /// Whether a path relative to the scan root falls under an ignore pattern
    pub fn is_ignored(&self, rel_path: &Path) -> bool {
        self.walker.is_ignored_relative(rel_path)
    }

    /// Walk the tree and aggregate messages in first-seen order
    pub fn collect(&self) -> Result<Collected> {
        self.collect_with_fs(&RealFileSystem)
    }

    pub fn collect_with_fs<F: FileSystem>(&self, fs: &F) -> Result<Collected> {
        let mut set = MessageSet::new();
        let files_scanned = self.walker.walk_with_fs(fs, |template, content| {
            let found = self.scanner.scan(content, &template.rel_path, &mut set);
            if found > 0 {
                logging::debug(&format!("{}: {} call-site(s)", template.rel_path, found));
            }
        })?;

        let call_sites = set.call_sites();
        Ok(Collected {
            messages: set.into_messages(),
            files_scanned,
            call_sites,
        })
    }

    /// Write the JSON catalog if one is configured
    fn save_messages<F: FileSystem>(&self, messages: &[Message], fs: &F) -> Result<Option<PathBuf>> {
        let Some(out) = &self.options.out else {
            return Ok(None);
        };
        let written = catalog::write_catalog_with_fs(out, messages, fs)?;
        Ok(written.then(|| out.clone()))
    }

    /// Run the whole pipeline.
    ///
    /// Nothing is written when the walk fails. Both writers are attempted even
    /// if the first one fails; the first failure is returned.
    pub fn extract(&self) -> Result<ExtractionReport> {
        self.extract_with_fs(&RealFileSystem)
    }

    /// [`Extractor::extract`] with template reads and output writes going
    /// through `fs`
    pub fn extract_with_fs<F: FileSystem>(&self, fs: &F) -> Result<ExtractionReport> {
        let collected = self.collect_with_fs(fs)?;

        let catalog = self.save_messages(&collected.messages, fs);
        let stub = stubgen::write_stub_with_fs(
            &self.options.go_file,
            &self.options.pkg,
            &collected.messages,
            fs,
        );

        let catalog = match (catalog, stub) {
            (Ok(catalog), Ok(())) => catalog,
            (Err(err), stub) => {
                if let Err(stub_err) = stub {
                    logging::error(&stub_err.to_string());
                }
                return Err(err);
            }
            (Ok(_), Err(err)) => return Err(err),
        };

        Ok(ExtractionReport {
            collected,
            catalog,
            stub: self.options.go_file.clone(),
        })
    }
}
