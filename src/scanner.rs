use regex::bytes::Regex;

use crate::error::{ExtractError, Result};
use crate::logging;
use crate::messages::MessageSet;
use crate::position::position_for;

/// Translation function names recognised when none are configured
pub const DEFAULT_FUNCTIONS: &[&str] = &["t", "T", "i18n"];

/// A translation call found in a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Message text with escapes resolved
    pub message: String,
    /// Byte offset of the opening quote of the message literal
    pub quote_offset: usize,
}

/// Recognises translation calls of the form
/// `<opener> <function> <lang> "<message>"` where the opener is `{{`, `{{-`,
/// `(`, `|`, `:=` or `=`, and `<lang>` is either a quoted literal or a bare token such as
/// `.Lang` or `$lang`. Arguments after the message literal are ignored.
#[derive(Debug, Clone)]
pub struct Scanner {
    /// Matches everything up to and including the opening quote of the message
    head: Regex,
}

impl Scanner {
    /// Build a scanner for the given function aliases
    pub fn new(functions: &[String]) -> Result<Self> {
        let names: Vec<String> = functions
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(regex::escape)
            .collect();
        if names.is_empty() {
            return Err(ExtractError::InvalidPattern {
                pattern: functions.join(","),
                message: "no translation function names configured".to_string(),
            });
        }

        // Non-Unicode mode so arbitrary bytes inside templates never stop a match
        let pattern = format!(
            r#"(?s-u)(?:\{{\{{-?|\(|\||:?=)\s*(?:{})\s+(?:"(?:[^"\\]|\\.)*"|[^\s"(){{}}|]+)\s+""#,
            names.join("|")
        );
        let head = Regex::new(&pattern).map_err(|e| ExtractError::InvalidPattern {
            pattern,
            message: e.to_string(),
        })?;

        Ok(Self { head })
    }

    /// Find every complete translation call in `content`, left to right
    pub fn call_sites(&self, content: &[u8]) -> Vec<CallSite> {
        self.find_sites(content).0
    }

    /// Scan one file's content and record its messages under `rel_path`
    pub fn scan(&self, content: &[u8], rel_path: &str, messages: &mut MessageSet) -> usize {
        let (sites, malformed) = self.find_sites(content);
        for quote_offset in malformed {
            logging::debug(&format!(
                "{}: skipping message with an invalid escape sequence",
                position_for(content, quote_offset as isize, rel_path)
            ));
        }

        let found = sites.len();
        for site in sites {
            let position = position_for(content, site.quote_offset as isize, rel_path);
            messages.record(site.message, position);
        }
        found
    }

    /// Complete call-sites plus the quote offsets of literals that were
    /// closed but could not be decoded
    fn find_sites(&self, content: &[u8]) -> (Vec<CallSite>, Vec<usize>) {
        let mut sites = Vec::new();
        let mut malformed = Vec::new();
        let mut cursor = 0;

        while let Some(head) = self.head.find_at(content, cursor) {
            let quote_offset = head.end() - 1;
            match read_literal(content, head.end()) {
                Some(Literal::Text { text, end }) => {
                    sites.push(CallSite {
                        message: text,
                        quote_offset,
                    });
                    cursor = end;
                }
                Some(Literal::Malformed { end, .. }) => {
                    malformed.push(quote_offset);
                    cursor = end;
                }
                // Unterminated literal runs to the end of the buffer
                None => break,
            }
        }

        (sites, malformed)
    }
}

/// A closed double-quoted literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Decoded text and the offset just past the closing quote
    Text { text: String, end: usize },
    /// The literal holds an escape Go would reject; `escape_offset` is the
    /// offset of its backslash
    Malformed { escape_offset: usize, end: usize },
}

enum Escape {
    /// Number of input bytes consumed, backslash included
    Decoded(usize),
    Invalid,
}

/// Read a double-quoted literal whose opening quote sits just before `start`.
///
/// Escapes follow Go interpreted string literals: `\a \b \f \n \r \t \v \\ \"`,
/// `\xHH`, three-digit octal `\ooo`, `\uHHHH` and `\UHHHHHHHH`. Returns `None`
/// when the input ends before the literal is closed.
pub fn read_literal(content: &[u8], start: usize) -> Option<Literal> {
    let mut decoded = Vec::new();
    let mut invalid = None;
    let mut index = start;

    while index < content.len() {
        match content[index] {
            b'"' => {
                let end = index + 1;
                return Some(match invalid {
                    Some(escape_offset) => Literal::Malformed { escape_offset, end },
                    None => Literal::Text {
                        text: String::from_utf8_lossy(&decoded).into_owned(),
                        end,
                    },
                });
            }
            b'\\' => {
                content.get(index + 1)?;
                match decode_escape(content, index, &mut decoded) {
                    Escape::Decoded(len) => index += len,
                    Escape::Invalid => {
                        invalid.get_or_insert(index);
                        // Skip the pair so an escaped quote cannot close the literal
                        index += 2;
                    }
                }
            }
            byte => {
                decoded.push(byte);
                index += 1;
            }
        }
    }

    None
}

/// Decode the escape whose backslash sits at `index`
fn decode_escape(content: &[u8], index: usize, out: &mut Vec<u8>) -> Escape {
    let kind = content[index + 1];
    let simple = match kind {
        b'a' => Some(0x07),
        b'b' => Some(0x08),
        b'f' => Some(0x0c),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        b'v' => Some(0x0b),
        b'\\' => Some(b'\\'),
        b'"' => Some(b'"'),
        _ => None,
    };
    if let Some(byte) = simple {
        out.push(byte);
        return Escape::Decoded(2);
    }

    match kind {
        b'x' => match parse_digits(content, index + 2, 2, 16) {
            Some(value) => {
                out.push(value as u8);
                Escape::Decoded(4)
            }
            None => Escape::Invalid,
        },
        b'0'..=b'7' => match parse_digits(content, index + 1, 3, 8) {
            Some(value) if value <= 0xff => {
                out.push(value as u8);
                Escape::Decoded(4)
            }
            _ => Escape::Invalid,
        },
        b'u' | b'U' => {
            let width = if kind == b'u' { 4 } else { 8 };
            match parse_digits(content, index + 2, width, 16).and_then(char::from_u32) {
                Some(c) => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    Escape::Decoded(2 + width)
                }
                None => Escape::Invalid,
            }
        }
        _ => Escape::Invalid,
    }
}

fn parse_digits(content: &[u8], start: usize, count: usize, radix: u32) -> Option<u32> {
    content
        .get(start..start + count)?
        .iter()
        .try_fold(0u32, |acc, &b| Some(acc * radix + (b as char).to_digit(radix)?))
}
