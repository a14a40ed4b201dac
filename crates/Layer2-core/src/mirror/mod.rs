//! File Mirror
//!
//! Copies a repository tree into the snapshot store. Reserved control
//! directories (the repository's own `.git` and the snapshot store itself)
//! are pruned from the walk. Symbolic links are recreated as links, never
//! followed. Nothing is ever deleted from the destination, so files removed
//! from the source linger in the mirror.

use ignore::WalkBuilder;
use shadow_foundation::{MirrorMode, RESERVED_DIRS};
use std::fs::{self, File, Metadata};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl MirrorError {
    fn io(path: &Path, source: io::Error) -> Self {
        MirrorError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Counters for one mirror cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub dirs: usize,
    pub files_copied: usize,
    pub files_skipped: usize,
    pub links: usize,
    pub bytes_copied: u64,
}

// ============================================================================
// Mirror
// ============================================================================

#[derive(Debug, Clone)]
pub struct Mirror {
    /// Base names pruned from the walk
    excluded: Vec<String>,

    mode: MirrorMode,
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new(MirrorMode::Full)
    }
}

impl Mirror {
    pub fn new(mode: MirrorMode) -> Self {
        Self {
            excluded: RESERVED_DIRS.iter().map(|d| d.to_string()).collect(),
            mode,
        }
    }

    /// Copy `source` into `dest`, aborting on the first I/O failure.
    ///
    /// Partial copies are left in place.
    pub fn mirror(&self, source: &Path, dest: &Path) -> Result<MirrorStats, MirrorError> {
        let excluded = self.excluded.clone();
        let walker = WalkBuilder::new(source)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded.iter().any(|e| e == name))
            })
            .build();

        let mut stats = MirrorStats::default();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            let relative = path
                .strip_prefix(source)
                .map_err(|e| MirrorError::io(path, io::Error::new(io::ErrorKind::Other, e)))?;
            let target = dest.join(relative);

            let metadata = if entry.depth() == 0 {
                fs::metadata(path)
            } else {
                fs::symlink_metadata(path)
            }
            .map_err(|e| MirrorError::io(path, e))?;

            if metadata.file_type().is_symlink() {
                copy_link(path, &target).map_err(|e| MirrorError::io(path, e))?;
                stats.links += 1;
                continue;
            }

            if metadata.is_dir() {
                ensure_dir(&metadata, &target).map_err(|e| MirrorError::io(&target, e))?;
                stats.dirs += 1;
                continue;
            }

            if self.mode == MirrorMode::Incremental && is_current(&metadata, &target) {
                trace!(path = %relative.display(), "Unchanged, skipping");
                stats.files_skipped += 1;
                continue;
            }

            let bytes = copy_file(path, &target).map_err(|e| MirrorError::io(path, e))?;
            stats.files_copied += 1;
            stats.bytes_copied += bytes;
        }

        debug!(
            source = %source.display(),
            dest = %dest.display(),
            dirs = stats.dirs,
            copied = stats.files_copied,
            links = stats.links,
            skipped = stats.files_skipped,
            "Mirror cycle complete"
        );

        Ok(stats)
    }
}

/// Create `dest` (and parents) and give it the source directory's permissions
fn ensure_dir(source: &Metadata, dest: &Path) -> io::Result<()> {
    remove_link(dest)?;
    fs::create_dir_all(dest)?;
    fs::set_permissions(dest, source.permissions())
}

fn copy_file(source: &Path, dest: &Path) -> io::Result<u64> {
    // Writing through a stale link would land outside the store
    remove_link(dest)?;
    let mut reader = File::open(source)?;
    let mut writer = File::create(dest)?;
    reader.seek(SeekFrom::Start(0))?;
    io::copy(&mut reader, &mut writer)
}

/// Recreate the link at `source` as `dest`, replacing whatever is there
#[cfg(unix)]
fn copy_link(source: &Path, dest: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    match fs::symlink_metadata(dest) {
        Ok(existing) if existing.is_dir() => fs::remove_dir_all(dest)?,
        Ok(_) => fs::remove_file(dest)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::os::unix::fs::symlink(link, dest)
}

#[cfg(not(unix))]
fn copy_link(_source: &Path, _dest: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not mirrored on this platform",
    ))
}

fn remove_link(dest: &Path) -> io::Result<()> {
    match fs::symlink_metadata(dest) {
        Ok(existing) if existing.file_type().is_symlink() => fs::remove_file(dest),
        _ => Ok(()),
    }
}

/// Same length and not older than the source
fn is_current(source: &Metadata, dest: &Path) -> bool {
    let Ok(existing) = fs::symlink_metadata(dest) else {
        return false;
    };
    if !existing.is_file() || existing.len() != source.len() {
        return false;
    }
    match (existing.modified(), source.modified()) {
        (Ok(dest_time), Ok(src_time)) => dest_time >= src_time,
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
