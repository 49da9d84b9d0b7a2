use std::fmt;

/// A 1-based location inside a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Known { line: usize, column: usize },
    Unknown,
}

impl Position {
    /// Locate a byte offset in `content`.
    ///
    /// Lines are counted by `\n` bytes preceding the offset; the column is the
    /// byte distance from the last newline (or from the start of the buffer).
    /// Offsets outside `0..content.len()` yield [`Position::Unknown`].
    pub fn locate(content: &[u8], offset: isize) -> Self {
        let Ok(offset) = usize::try_from(offset) else {
            return Position::Unknown;
        };
        if offset >= content.len() {
            return Position::Unknown;
        }

        let before = &content[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match before.iter().rposition(|&b| b == b'\n') {
            Some(newline) => offset - newline,
            None => offset + 1,
        };

        Position::Known { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Known { line, column } => write!(f, "{}:{}", line, column),
            Position::Unknown => f.write_str("?:?"),
        }
    }
}

/// Format `path:line:column` for a byte offset, or `path:?:?` when the offset
/// does not fall inside `content`.
pub fn position_for(content: &[u8], offset: isize, path: &str) -> String {
    format!("{}:{}", path, Position::locate(content, offset))
}
