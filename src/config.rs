use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scanner::DEFAULT_FUNCTIONS;
use crate::walker::DEFAULT_EXTENSIONS;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "i18n-extract.json";

/// Configuration for an extraction run
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory to scan for templates
    #[serde(default = "default_dir")]
    pub dir: String,

    /// JSON catalog output path (empty disables the catalog)
    #[serde(default)]
    pub out: String,

    /// Synthetic Go file generated for gotext extract/update
    #[serde(default = "default_go_file")]
    pub go_file: String,

    /// Package name used in the generated Go file
    #[serde(default = "default_pkg")]
    pub pkg: String,

    /// Template extensions to consider (e.g., [".html", ".tmpl"])
    #[serde(default = "default_ext")]
    pub ext: Vec<String>,

    /// Translation function names recognised in templates
    #[serde(default = "default_functions")]
    pub functions: Vec<String>,

    /// Glob patterns (relative to `dir`) excluded from the scan
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_go_file() -> String {
    "gotext_stub.go".to_string()
}

fn default_pkg() -> String {
    "main".to_string()
}

fn default_ext() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_functions() -> Vec<String> {
    DEFAULT_FUNCTIONS.iter().map(|f| f.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            out: String::new(),
            go_file: default_go_file(),
            pkg: default_pkg(),
            ext: default_ext(),
            functions: default_functions(),
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON (or JSON5) file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = json5::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: Config =
            json5::from_str(json_str).with_context(|| "Failed to parse config JSON string")?;
        Ok(config)
    }

    /// Try to load from the default config file, or return the default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
