use std::io::{self, Write};
use std::path::Path;

use crate::error::{ExtractError, Result};
use crate::fs::FileSystem;
use crate::messages::Message;

/// First line of every generated stub
pub const GENERATED_MARKER: &str = "// Code generated by i18n-extract. DO NOT EDIT.";

/// Package used when the requested name sanitizes to nothing
pub const DEFAULT_PACKAGE: &str = "main";

/// Keep only ASCII letters, digits and `_`; drop one leading digit; fall back to
/// [`DEFAULT_PACKAGE`] when nothing is left.
pub fn sanitize_package_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned.remove(0);
    }

    if cleaned.is_empty() {
        DEFAULT_PACKAGE.to_string()
    } else {
        cleaned
    }
}

/// Quote `text` as a Go interpreted string literal
pub fn go_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Stream the stub source to a writer
pub fn write_go_content<W: Write>(writer: &mut W, package: &str, messages: &[Message]) -> io::Result<()> {
    writeln!(writer, "{}", GENERATED_MARKER)?;
    writeln!(writer)?;
    writeln!(writer, "package {}", sanitize_package_name(package))?;
    writeln!(writer)?;
    writeln!(writer, "import (")?;
    writeln!(writer, "\t\"golang.org/x/text/language\"")?;
    writeln!(writer, "\t\"golang.org/x/text/message\"")?;
    writeln!(writer, ")")?;
    writeln!(writer)?;
    writeln!(writer, "func _i18n_extract() {{")?;
    writeln!(writer, "\tp := message.NewPrinter(language.English)")?;
    if messages.is_empty() {
        writeln!(writer, "\t_ = p")?;
    }
    for message in messages {
        writeln!(writer, "\t_ = p.Sprintf({})", go_quote(&message.id))?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

pub fn render_stub(package: &str, messages: &[Message]) -> String {
    let mut output = Vec::new();
    write_go_content(&mut output, package, messages).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&output).into_owned()
}

/// Write the stub to `path`; unlike the catalog this output is never skipped
pub fn write_stub_with_fs<F: FileSystem>(
    path: &Path,
    package: &str,
    messages: &[Message],
    fs: &F,
) -> Result<()> {
    let content = render_stub(package, messages);
    fs.write_atomic(path, content.as_bytes())
        .map_err(|source| ExtractError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::InMemoryFileSystem;

    fn msg(id: &str) -> Message {
        Message {
            id: id.to_string(),
            positions: vec!["file.html:1:1".to_string()],
        }
    }

    #[test]
    fn test_sanitize_package_name() {
        let cases = [
            ("mypackage", "mypackage"),
            ("pkg123", "pkg123"),
            ("my_package", "my_package"),
            ("MyPackage", "MyPackage"),
            ("123package", "23package"),
            ("123!@#", "23"),
            ("my-package.name", "mypackagename"),
            ("", "main"),
            (" mypackage", "mypackage"),
            ("my123package", "my123package"),
            ("!@#", "main"),
            ("7", "main"),
            ("pkg\u{b2}", "pkg"),
            ("caf\u{e9}", "caf"),
            ("\u{0663}web", "web"),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize_package_name(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_go_quote() {
        let cases = [
            ("hello", r#""hello""#),
            (r#"say "hello""#, r#""say \"hello\"""#),
            (r"path\to\file", r#""path\\to\\file""#),
            ("line1\nline2", r#""line1\nline2""#),
            ("col1\tcol2", r#""col1\tcol2""#),
            ("", r#""""#),
            ("Hello\n\tWorld", r#""Hello\n\tWorld""#),
            ("bell\u{7}", r#""bell\x07""#),
            ("naïve ☃", "\"naïve ☃\""),
        ];
        for (input, expected) in cases {
            assert_eq!(go_quote(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_render_stub_layout() {
        let stub = render_stub("testpkg", &[msg("Hello"), msg(r#"Say "Hello""#)]);
        let expected = "// Code generated by i18n-extract. DO NOT EDIT.\n\
\n\
package testpkg\n\
\n\
import (\n\
\t\"golang.org/x/text/language\"\n\
\t\"golang.org/x/text/message\"\n\
)\n\
\n\
func _i18n_extract() {\n\
\tp := message.NewPrinter(language.English)\n\
\t_ = p.Sprintf(\"Hello\")\n\
\t_ = p.Sprintf(\"Say \\\"Hello\\\"\")\n\
}\n";
        assert_eq!(stub, expected);
    }

    #[test]
    fn test_render_stub_without_messages_still_uses_printer() {
        let stub = render_stub("empty", &[]);
        assert!(stub.contains("package empty"));
        assert!(stub.contains("\t_ = p\n"));
        assert!(!stub.contains("Sprintf"));
    }

    #[test]
    fn test_render_stub_sanitizes_package() {
        let stub = render_stub("my-app", &[msg("x")]);
        assert!(stub.contains("package myapp\n"));
    }

    #[test]
    fn test_write_stub_with_fs() {
        let fs = InMemoryFileSystem::new();
        write_stub_with_fs(Path::new("gotext_stub.go"), "main", &[msg("World")], &fs).unwrap();
        let content = fs.contents("gotext_stub.go").unwrap();
        assert!(content.starts_with(GENERATED_MARKER));
        assert!(content.contains("_ = p.Sprintf(\"World\")"));
    }

    #[test]
    fn test_write_stub_missing_directory() {
        let fs = InMemoryFileSystem::new();
        let err = write_stub_with_fs(Path::new("nonexistent/path/gotext.go"), "main", &[], &fs)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Write { .. }));
    }
}
