use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ExtractError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging;

/// Template extensions scanned when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[".html", ".htm", ".tmpl", ".gohtml", ".txt", ".tpl"];

/// Case-insensitive file extension filter.
///
/// Extensions are stored lower-cased with a leading dot; an empty filter
/// matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext != ".")
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        Self { extensions }
    }

    /// Match on the file name's last `.` suffix, so a bare `.html` counts
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        match name.rfind('.') {
            Some(dot) => self.extensions.contains(&name[dot..].to_lowercase()),
            None => false,
        }
    }
}

/// A template selected for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated
    pub rel_path: String,
}

/// Deterministic recursive walk over a template tree.
///
/// Directory entries are visited sorted by file name so the same tree always
/// produces the same file order.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    filter: ExtensionFilter,
    ignore: Vec<Pattern>,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>, filter: ExtensionFilter) -> Self {
        Self {
            root: root.into(),
            filter,
            ignore: Vec::new(),
        }
    }

    /// Skip entries whose relative path matches any of the glob patterns.
    /// A matching directory is not descended into.
    pub fn with_ignore(mut self, patterns: &[String]) -> Result<Self> {
        self.ignore = compile_ignore_patterns(patterns)?;
        Ok(self)
    }

    pub fn filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    /// List matching templates in traversal order
    pub fn templates(&self) -> Result<Vec<TemplateFile>> {
        let mut files = Vec::new();

        let walk = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry));

        for entry in walk {
            let entry = entry.map_err(|source| ExtractError::Traversal {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone()),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            if !self.filter.matches(entry.path()) {
                logging::debug(&format!("Skipping {}", entry.path().display()));
                continue;
            }

            files.push(TemplateFile {
                path: entry.path().to_path_buf(),
                rel_path: self.relative(entry.path()),
            });
        }

        Ok(files)
    }

    /// Read every matching template in traversal order and hand its content
    /// to `visit`. Any unreadable template aborts the walk.
    pub fn walk<F>(&self, visit: F) -> Result<usize>
    where
        F: FnMut(&TemplateFile, &[u8]),
    {
        self.walk_with_fs(&RealFileSystem, visit)
    }

    pub fn walk_with_fs<S, F>(&self, fs: &S, mut visit: F) -> Result<usize>
    where
        S: FileSystem,
        F: FnMut(&TemplateFile, &[u8]),
    {
        let templates = self.templates()?;
        for template in &templates {
            let content = fs.read(&template.path).map_err(|source| ExtractError::Read {
                path: template.path.clone(),
                source,
            })?;
            visit(template, &content);
        }
        Ok(templates.len())
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || self.ignore.is_empty() {
            return false;
        }
        let rel = self.relative(entry.path());
        let ignored = self.matches_ignore(&rel);
        if ignored {
            logging::debug(&format!("Ignoring {}", rel));
        }
        ignored
    }

    /// Whether a path relative to the root, or any directory above it, is
    /// excluded by an ignore pattern
    pub fn is_ignored_relative(&self, rel_path: &Path) -> bool {
        let mut prefix = String::new();
        for component in rel_path.components() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(&component.as_os_str().to_string_lossy());
            if self.matches_ignore(&prefix) {
                return true;
            }
        }
        false
    }

    fn matches_ignore(&self, rel: &str) -> bool {
        self.ignore.iter().any(|pattern| pattern.matches(rel))
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let rel = if rel.as_os_str().is_empty() {
            // The root itself is a file
            path.file_name().map(Path::new).unwrap_or(path)
        } else {
            rel
        };
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn compile_ignore_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    let mut compiled = Vec::new();
    for pattern in patterns {
        let matcher = Pattern::new(pattern).map_err(|e| ExtractError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        compiled.push(matcher);
    }
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::InMemoryFileSystem;
    use std::fs;
    use tempfile::tempdir;

    fn html_filter() -> ExtensionFilter {
        ExtensionFilter::new([".html", ".tmpl", ".gohtml"])
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let filter = html_filter();
        let cases = [
            ("/path/to/template.html", true),
            ("/path/to/template.tmpl", true),
            ("/path/to/template.gohtml", true),
            ("/path/to/template.htm", false),
            ("/path/to/template.txt", false),
            ("/path/to/template.HTML", true),
            ("/path/to/template.TMPL", true),
            ("template.html", true),
            ("template", false),
            ("", false),
            (".html", true),
            ("/path/to/.HTML", true),
            ("page.html.bak", false),
            ("template.", false),
        ];
        for (path, expected) in cases {
            assert_eq!(filter.matches(Path::new(path)), expected, "{}", path);
        }
    }

    #[test]
    fn test_configured_extensions_are_normalized() {
        let filter = ExtensionFilter::new(["HTML", " .Tpl "]);
        assert!(filter.matches(Path::new("a.html")));
        assert!(filter.matches(Path::new("a.tpl")));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = ExtensionFilter::new(Vec::<String>::new());
        assert!(!filter.matches(Path::new("index.html")));
        assert!(!filter.matches(Path::new(".html")));
    }

    #[test]
    fn test_templates_are_sorted_and_relative() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("b/nested")).unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("z.html"), "").unwrap();
        fs::write(tmp.path().join("b/nested/deep.tmpl"), "").unwrap();
        fs::write(tmp.path().join("b/first.html"), "").unwrap();
        fs::write(tmp.path().join("a/page.html"), "").unwrap();
        fs::write(tmp.path().join("a/notes.md"), "").unwrap();

        let walker = TreeWalker::new(tmp.path(), html_filter());
        let rel: Vec<_> = walker
            .templates()
            .unwrap()
            .into_iter()
            .map(|t| t.rel_path)
            .collect();

        assert_eq!(
            rel,
            vec!["a/page.html", "b/first.html", "b/nested/deep.tmpl", "z.html"]
        );
    }

    #[test]
    fn test_ignore_patterns_prune_directories() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("vendor/lib")).unwrap();
        fs::write(tmp.path().join("vendor/lib/x.html"), "").unwrap();
        fs::write(tmp.path().join("index.html"), "").unwrap();
        fs::write(tmp.path().join("draft.html"), "").unwrap();

        let walker = TreeWalker::new(tmp.path(), html_filter())
            .with_ignore(&["vendor".to_string(), "draft.*".to_string()])
            .unwrap();
        let rel: Vec<_> = walker
            .templates()
            .unwrap()
            .into_iter()
            .map(|t| t.rel_path)
            .collect();

        assert_eq!(rel, vec!["index.html"]);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let result = TreeWalker::new(".", html_filter()).with_ignore(&["[".to_string()]);
        assert!(matches!(result, Err(ExtractError::InvalidPattern { .. })));
    }

    #[test]
    fn test_missing_root_is_traversal_error() {
        let tmp = tempdir().unwrap();
        let walker = TreeWalker::new(tmp.path().join("does-not-exist"), html_filter());
        assert!(matches!(
            walker.templates(),
            Err(ExtractError::Traversal { .. })
        ));
    }

    #[test]
    fn test_walk_reads_contents_in_order() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("b.html"), "second").unwrap();
        fs::write(tmp.path().join("a.html"), "first").unwrap();

        let mut seen = Vec::new();
        let count = TreeWalker::new(tmp.path(), html_filter())
            .walk(|template, content| {
                seen.push((template.rel_path.clone(), content.to_vec()));
            })
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen[0], ("a.html".to_string(), b"first".to_vec()));
        assert_eq!(seen[1], ("b.html".to_string(), b"second".to_vec()));
    }

    #[test]
    fn test_dot_named_template_is_scanned() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join(".html"), "").unwrap();

        let templates = TreeWalker::new(tmp.path(), html_filter()).templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].rel_path, ".html");
    }

    #[test]
    fn test_unreadable_template_aborts_walk() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.html"), "").unwrap();
        fs::write(tmp.path().join("b.html"), "").unwrap();
        fs::write(tmp.path().join("c.html"), "").unwrap();

        // b.html is listed by the traversal but cannot be read back
        let files = InMemoryFileSystem::new();
        files.add_file(tmp.path().join("a.html"), "first");
        files.add_file(tmp.path().join("c.html"), "third");

        let mut visited = Vec::new();
        let result = TreeWalker::new(tmp.path(), html_filter())
            .walk_with_fs(&files, |template, _| visited.push(template.rel_path.clone()));

        match result {
            Err(ExtractError::Read { path, .. }) => assert_eq!(path, tmp.path().join("b.html")),
            other => panic!("expected a read error, got {:?}", other),
        }
        assert_eq!(visited, vec!["a.html"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_traversal_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let locked = tmp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inner.html"), "").unwrap();
        fs::write(tmp.path().join("a.html"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop a privileged user
        let readable = fs::read_dir(&locked).is_ok();
        let result = TreeWalker::new(tmp.path(), html_filter()).templates();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        match result {
            Err(ExtractError::Traversal { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected a traversal error, got {:?}", other),
        }
    }

    #[test]
    fn test_is_ignored_relative_checks_parent_directories() {
        let walker = TreeWalker::new(".", html_filter())
            .with_ignore(&["vendor".to_string(), "*.draft.html".to_string()])
            .unwrap();
        assert!(walker.is_ignored_relative(Path::new("vendor")));
        assert!(walker.is_ignored_relative(Path::new("vendor/lib/x.html")));
        assert!(walker.is_ignored_relative(Path::new("page.draft.html")));
        assert!(!walker.is_ignored_relative(Path::new("pages/index.html")));
        assert!(!walker.is_ignored_relative(Path::new("")));
    }

    #[test]
    fn test_root_may_be_a_single_file() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("only.html");
        fs::write(&file, "").unwrap();

        let templates = TreeWalker::new(&file, html_filter()).templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].rel_path, "only.html");
    }
}
