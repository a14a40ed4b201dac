//! File access within the selected repository
//!
//! Listing hides any entry whose name starts with `.` (and prunes hidden
//! directories). Reads and writes take paths relative to the repository root.

use ignore::WalkBuilder;
use shadow_foundation::{Error, Result, HIDDEN_MARKER};
use std::path::{Component, Path, PathBuf};

/// Relative paths of every non-hidden file under `root`, depth first,
/// lexical within each directory, `/`-separated.
pub fn list_files(root: &Path) -> Result<Vec<String>> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::File(format!("Failed to list files: {}", e)))?;
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::File(format!("{}: {}", entry.path().display(), e)))?;
        files.push(to_slash(relative));
    }

    Ok(files)
}

/// Whole file as text; invalid UTF-8 is replaced rather than rejected
pub fn read_file(root: &Path, relative: &str) -> Result<String> {
    let path = resolve(root, relative)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| Error::File(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Create parent directories as needed, then create or truncate the file
pub fn write_file(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = resolve(root, relative)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::File(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    std::fs::write(&path, content)
        .map_err(|e| Error::File(format!("Failed to write {}: {}", path.display(), e)))
}

/// Join `relative` onto `root`, refusing anything that could leave it
fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let candidate = Path::new(relative);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.is_empty() || escapes {
        return Err(Error::InvalidPath(relative.to_string()));
    }
    Ok(root.join(candidate))
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with(HIDDEN_MARKER)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
