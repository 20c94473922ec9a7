use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tempfile::{NamedTempFile, TempDir};

/// A previous target moved aside until every output is in place.
struct Backup {
    // Removed with its content on drop.
    _dir: TempDir,
    path: PathBuf,
}

/// An output moved into place, with what it replaced.
struct Committed<'a> {
    target: &'a Path,
    backup: Option<Backup>,
}

/// Writes every `(path, content)` pair, either all of them or none.
///
/// Contents go to temporary files next to their targets first. Existing targets are moved
/// aside before being replaced and restored if any output can't be moved into place.
pub fn write_all(outputs: &[(&Path, &str)]) -> anyhow::Result<()> {
    let mut staged = Vec::with_capacity(outputs.len());

    for (target, content) in outputs {
        let mut file = NamedTempFile::new_in(parent_dir(target))
            .with_context(|| format!("Unable to create a temporary file for {}", target.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Unable to write {}", target.display()))?;
        staged.push((file, *target));
    }

    let mut committed = Vec::with_capacity(staged.len());
    for (file, target) in staged {
        let backup = match backup(target) {
            Ok(backup) => backup,
            Err(err) => {
                rollback(committed);
                return Err(err);
            }
        };

        match file.persist(target) {
            Ok(_) => {
                debug!("Wrote {}", target.display());
                committed.push(Committed { target, backup });
            }
            Err(err) => {
                committed.push(Committed { target, backup });
                rollback(committed);
                return Err(err.error)
                    .with_context(|| format!("Unable to write {}", target.display()));
            }
        }
    }

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

// Only regular files are moved aside, anything else is left for `persist` to fail on.
fn backup(target: &Path) -> anyhow::Result<Option<Backup>> {
    if !target.is_file() {
        return Ok(None);
    }

    let dir = tempfile::Builder::new()
        .prefix(".matmul-testgen")
        .tempdir_in(parent_dir(target))
        .with_context(|| format!("Unable to back up {}", target.display()))?;
    let path = dir.path().join("backup");
    fs::rename(target, &path)
        .with_context(|| format!("Unable to back up {}", target.display()))?;

    Ok(Some(Backup { _dir: dir, path }))
}

fn rollback(committed: Vec<Committed<'_>>) {
    for Committed { target, backup } in committed.into_iter().rev() {
        let result = match &backup {
            Some(backup) => fs::rename(&backup.path, target),
            None => match target.is_file() {
                true => fs::remove_file(target),
                false => Ok(()),
            },
        };

        if let Err(err) = result {
            warn!("Unable to restore {}: {err}", target.display());
        }
    }
}
