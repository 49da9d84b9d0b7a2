//! Extract translatable messages from Go-style templates.
//!
//! Templates are scanned for `{{ T .Lang "text" }}` call-sites (and the
//! `t`/`i18n` aliases). The collected messages are written as a JSON catalog
//! and as a Go stub that `gotext extract` can pick up.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fs;
pub mod locale;
pub mod logging;
pub mod messages;
pub mod position;
pub mod scanner;
pub mod stubgen;
pub mod walker;
pub mod watcher;

pub use error::{ExtractError, Result};
pub use extractor::{ExtractionReport, Extractor, ExtractorOptions};
pub use messages::{Message, OutputJson};
