use serde::Serialize;
use std::path::Path;

use crate::error::{ExtractError, Result};
use crate::fs::FileSystem;
use crate::messages::Message;

/// Borrowed twin of [`crate::messages::OutputJson`] so writing never clones
#[derive(Serialize)]
struct CatalogRef<'a> {
    messages: &'a [Message],
}

/// Render the JSON catalog: two-space indented with a trailing newline
pub fn render_catalog(messages: &[Message]) -> Result<Vec<u8>> {
    let mut buffer = serde_json::to_vec_pretty(&CatalogRef { messages })?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Write the JSON catalog to `path`.
///
/// An empty path disables the catalog; `Ok(false)` is returned and nothing is
/// written.
pub fn write_catalog_with_fs<F: FileSystem>(
    path: &Path,
    messages: &[Message],
    fs: &F,
) -> Result<bool> {
    if path.as_os_str().is_empty() {
        return Ok(false);
    }

    let buffer = render_catalog(messages)?;
    fs.write_atomic(path, &buffer)
        .map_err(|source| ExtractError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(true)
}
