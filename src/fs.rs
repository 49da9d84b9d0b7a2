use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the file operations the output writers need
pub trait FileSystem: Send + Sync {
    /// Replace `path` with `contents` in one step.
    ///
    /// Parent directories are not created: writing below a missing directory
    /// is an error.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Real file system implementation using std::fs
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let temp_path = temp_sibling(path);
        if let Err(err) = std::fs::write(&temp_path, contents) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(err);
        }
        std::fs::rename(&temp_path, path).inspect_err(|_| {
            let _ = std::fs::remove_file(&temp_path);
        })
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// `dir/name.ext` -> `dir/.name.ext.tmp`, kept in the same directory so the
/// final rename never crosses a mount point
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
