//! Runtime side of template translation: resolving the language argument
//! a template passes to `T`/`t`/`i18n`, and the process-wide printer cache.

use icu_locid::{langid, LanguageIdentifier};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("invalid language tag '{input}': {message}")]
    InvalidTag { input: String, message: String },
}

/// Every shape a template may pass as the language argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangArg {
    Tag(LanguageIdentifier),
    Str(String),
}

impl LangArg {
    pub fn resolve(self) -> Result<LanguageIdentifier, LocaleError> {
        match self {
            LangArg::Tag(tag) => Ok(tag),
            LangArg::Str(raw) => parse_tag(&raw),
        }
    }
}

impl From<LanguageIdentifier> for LangArg {
    fn from(tag: LanguageIdentifier) -> Self {
        LangArg::Tag(tag)
    }
}

impl From<&LanguageIdentifier> for LangArg {
    fn from(tag: &LanguageIdentifier) -> Self {
        LangArg::Tag(tag.clone())
    }
}

impl From<String> for LangArg {
    fn from(raw: String) -> Self {
        LangArg::Str(raw)
    }
}

impl From<&String> for LangArg {
    fn from(raw: &String) -> Self {
        LangArg::Str(raw.clone())
    }
}

impl From<&str> for LangArg {
    fn from(raw: &str) -> Self {
        LangArg::Str(raw.to_string())
    }
}

/// Parse a BCP-47 language tag such as `en` or `pt-BR`
pub fn parse_tag(raw: &str) -> Result<LanguageIdentifier, LocaleError> {
    let trimmed = raw.trim();
    LanguageIdentifier::try_from_bytes(trimmed.as_bytes()).map_err(|e| LocaleError::InvalidTag {
        input: raw.to_string(),
        message: e.to_string(),
    })
}

/// Formats messages for one locale.
///
/// The catalog maps a message id to its translation; unknown ids are
/// formatted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printer {
    locale: LanguageIdentifier,
    catalog: HashMap<String, String>,
}

impl Printer {
    pub fn new(locale: LanguageIdentifier) -> Self {
        Self {
            locale,
            catalog: HashMap::new(),
        }
    }

    pub fn with_catalog(locale: LanguageIdentifier, catalog: HashMap<String, String>) -> Self {
        Self { locale, catalog }
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Look up `key` and substitute `%s`, `%d` and `%v` with successive
    /// arguments. `%%` is a literal percent sign; verbs without a matching
    /// argument are left untouched.
    pub fn sprintf(&self, key: &str, args: &[&dyn Display]) -> String {
        let template = self.catalog.get(key).map(String::as_str).unwrap_or(key);
        let mut output = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                output.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some('%') => {
                    chars.next();
                    output.push('%');
                }
                Some(verb @ ('s' | 'd' | 'v')) => {
                    chars.next();
                    match args.next() {
                        Some(arg) => output.push_str(&arg.to_string()),
                        None => {
                            output.push('%');
                            output.push(verb);
                        }
                    }
                }
                _ => output.push('%'),
            }
        }

        output
    }
}

/// Concurrent cache of printers plus the fallback locale.
///
/// A printer requested for an unknown locale is created empty and cached.
/// Two racing callers may both build one; only the first insert is kept.
#[derive(Debug)]
pub struct PrinterRegistry {
    printers: RwLock<HashMap<LanguageIdentifier, Arc<Printer>>>,
    fallback: RwLock<LanguageIdentifier>,
}

impl Default for PrinterRegistry {
    fn default() -> Self {
        Self {
            printers: RwLock::new(HashMap::new()),
            fallback: RwLock::new(langid!("en")),
        }
    }
}

impl PrinterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback(&self) -> LanguageIdentifier {
        self.fallback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_fallback(&self, tag: LanguageIdentifier) {
        *self.fallback.write().unwrap_or_else(PoisonError::into_inner) = tag;
    }

    pub fn printer(&self, tag: &LanguageIdentifier) -> Arc<Printer> {
        if let Some(printer) = self
            .printers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
        {
            return Arc::clone(printer);
        }

        let created = Arc::new(Printer::new(tag.clone()));
        let mut printers = self.printers.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(printers.entry(tag.clone()).or_insert(created))
    }

    pub fn set_printer(&self, tag: LanguageIdentifier, printer: Printer) {
        self.printers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag, Arc::new(printer));
    }

    /// Format `key` for the language a template passed in.
    /// An empty language string selects the fallback locale.
    pub fn translate(
        &self,
        lang: impl Into<LangArg>,
        key: &str,
        args: &[&dyn Display],
    ) -> Result<String, LocaleError> {
        let tag = match lang.into() {
            LangArg::Str(raw) if raw.trim().is_empty() => self.fallback(),
            other => other.resolve()?,
        };
        Ok(self.printer(&tag).sprintf(key, args))
    }
}

/// The process-wide registry
pub fn global() -> &'static PrinterRegistry {
    static REGISTRY: OnceLock<PrinterRegistry> = OnceLock::new();
    REGISTRY.get_or_init(PrinterRegistry::new)
}

/// [`PrinterRegistry::translate`] on the global registry
pub fn translate(
    lang: impl Into<LangArg>,
    key: &str,
    args: &[&dyn Display],
) -> Result<String, LocaleError> {
    global().translate(lang, key, args)
}
