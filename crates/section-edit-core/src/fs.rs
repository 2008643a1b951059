use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::EditResult;

/// Replaces `path` with `content` by renaming a temporary file from the same
/// directory over it. The document keeps its permissions. With `backup`, the
/// previous contents are copied to `<path>.bak` first.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> EditResult<()> {
    let permissions = fs::metadata(path)?.permissions();

    // Dropping `staged` on an early return removes the temporary file.
    let mut staged = NamedTempFile::new_in(parent_dir(path))?;
    staged.write_all(content.as_bytes())?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), permissions)?;

    if backup {
        let backup = backup_path(path);
        debug!("backing up {} to {}", path.display(), backup.display());
        fs::copy(path, &backup)?;
    }

    staged.persist(path).map_err(|err| err.error)?;
    debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// `README.md` -> `README.md.bak`
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
