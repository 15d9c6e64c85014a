//! Flushing a generated file set to the target directory.
//!
//! Flush is all-or-nothing: the set is written to a staging directory inside
//! the target first and checked against unmanaged files; destination parent
//! directories are validated before anything moves, replaced files are held
//! as backups until the flush completes, and a failure during the move phase
//! rolls back every file already moved. An advisory lock file in the target
//! directory stops two concurrent runs from interleaving their writes; a
//! lock older than the stale threshold is presumed abandoned and broken.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fileset::GeneratedFileSet;

/// Advisory lock file name, created inside the target directory.
pub const LOCK_FILE: &str = ".stackforge.lock";

/// Locks older than this are treated as leftovers from a crashed run.
const STALE_LOCK_AFTER: Duration = Duration::from_secs(10 * 60);

/// Knobs for one flush.
#[derive(Debug, Clone, Default)]
pub struct FlushOptions {
    /// Allow replacing files that exist in the target but were not staged
    /// by this run's modules.
    pub overwrite: bool,
}

/// What a flush did, for reporting.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub written: Vec<PathBuf>,
    pub replaced: Vec<PathBuf>,
}

/// Write the staged set into `target_dir`.
///
/// Steps: take the advisory lock, refuse on unmanaged collisions (unless
/// `overwrite`), write everything to a staging directory, then move the
/// staged files into place. The lock is released on every exit path.
pub fn flush(
    files: &GeneratedFileSet,
    target_dir: &Path,
    options: &FlushOptions,
) -> Result<FlushReport> {
    fs::create_dir_all(target_dir)?;
    let _lock = Lock::acquire(target_dir)?;

    let collisions = unmanaged_collisions(files, target_dir);
    if !collisions.is_empty() && !options.overwrite {
        return Err(Error::UnmanagedFiles { paths: collisions });
    }

    let staging = staging_dir(target_dir);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;
    debug!("staging {} files under {}", files.len(), staging.display());

    let result = write_staged(files, target_dir, &staging, &collisions);
    // Staging directory must not outlive the flush, success or not.
    if staging.exists() {
        let _ = fs::remove_dir_all(&staging);
    }
    let report = result?;
    info!(
        "flushed {} files to {}",
        report.written.len(),
        target_dir.display()
    );
    Ok(report)
}

fn write_staged(
    files: &GeneratedFileSet,
    target_dir: &Path,
    staging: &Path,
    collisions: &[PathBuf],
) -> Result<FlushReport> {
    // Everything lands in staging first so a write failure leaves the
    // target untouched.
    for (path, entry) in files.iter() {
        let staged = staging.join(path);
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&staged, &entry.content)?;
    }

    // Destination parents are created up front, so a directory collision
    // (a plain file where a parent directory must go) fails before any
    // staged file has moved.
    for (path, _) in files.iter() {
        let destination = target_dir.join(path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("cannot create directory {}: {}", parent.display(), e),
            })?;
        }
    }

    let backups = staging.join(".replaced");
    let mut moved: Vec<(PathBuf, Option<PathBuf>)> = Vec::new();
    let mut report = FlushReport::default();
    for (path, _) in files.iter() {
        let staged = staging.join(path);
        let destination = target_dir.join(path);
        if let Err(error) = move_into_place(&staged, &destination, &backups, path, &mut moved) {
            roll_back(&moved);
            return Err(error);
        }
        if collisions.contains(&path.to_path_buf()) {
            report.replaced.push(path.to_path_buf());
        }
        report.written.push(path.to_path_buf());
    }
    Ok(report)
}

/// Move one staged file to its destination, saving any file it replaces.
///
/// On success the move is appended to `moved` so a later failure can undo
/// it; on failure this entry's own backup is restored before returning.
fn move_into_place(
    staged: &Path,
    destination: &Path,
    backups: &Path,
    relative: &Path,
    moved: &mut Vec<(PathBuf, Option<PathBuf>)>,
) -> Result<()> {
    let backup = if destination.is_file() {
        let saved = backups.join(relative);
        if let Some(parent) = saved.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(destination, &saved)?;
        Some(saved)
    } else {
        None
    };

    // Rename within one filesystem; fall back to copy for the odd
    // cross-device staging setup.
    let result = match fs::rename(staged, destination) {
        Ok(()) => Ok(()),
        Err(_) => fs::copy(staged, destination).map(|_| ()),
    };
    match result {
        Ok(()) => {
            moved.push((destination.to_path_buf(), backup));
            Ok(())
        }
        Err(error) => {
            if let Some(saved) = &backup {
                let _ = fs::rename(saved, destination);
            }
            Err(error.into())
        }
    }
}

/// Undo completed moves in reverse order, restoring replaced files.
fn roll_back(moved: &[(PathBuf, Option<PathBuf>)]) {
    for (destination, backup) in moved.iter().rev() {
        let _ = fs::remove_file(destination);
        if let Some(saved) = backup {
            let _ = fs::rename(saved, destination);
        }
    }
}

/// Staged paths that already exist on disk in the target directory.
fn unmanaged_collisions(files: &GeneratedFileSet, target_dir: &Path) -> Vec<PathBuf> {
    files
        .paths()
        .filter(|path| target_dir.join(path).exists())
        .map(Path::to_path_buf)
        .collect()
}

fn staging_dir(target_dir: &Path) -> PathBuf {
    target_dir.join(".stackforge-staging")
}

/// RAII guard for the advisory lock file.
struct Lock {
    path: PathBuf,
}

impl Lock {
    fn acquire(target_dir: &Path) -> Result<Lock> {
        let path = target_dir.join(LOCK_FILE);
        loop {
            // create_new makes the creation itself the claim; losing a race
            // with another run surfaces as AlreadyExists.
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    use std::io::Write as _;
                    writeln!(file, "pid {}", std::process::id())?;
                    return Ok(Lock { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if lock_is_stale(&path) {
                        warn!("breaking stale lock at {}", path.display());
                        match fs::remove_file(&path) {
                            // The holder may have released it in the
                            // meantime; either way, try the claim again.
                            Ok(()) => continue,
                            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                            Err(e) => return Err(e.into()),
                        }
                    }
                    let holder = fs::read_to_string(&path)
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    return Err(Error::GenerationInProgress {
                        target: target_dir.to_path_buf(),
                        holder: if holder.is_empty() {
                            "unknown process".to_string()
                        } else {
                            holder
                        },
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_is_stale(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return true;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age > STALE_LOCK_AFTER)
        .unwrap_or(false)
}
