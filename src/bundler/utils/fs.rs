//! File system utilities for bundling.
//!
//! Thin async wrappers over `tokio::fs` that attach the offending path to
//! every error.

use crate::bundler::error::{ErrorExt, Result};
use std::path::Path;
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    if fs::try_exists(path).await.unwrap_or(false) {
        fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path)?;
    }
    Ok(())
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .await
        .fs_context("reading metadata of", from)?;
    if !metadata.is_file() {
        crate::bail!("{} is not a file", from.display());
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file to", to)?;
    Ok(())
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    fs::write(path, contents).await.fs_context("writing", path)
}

/// Writes `contents` to `path` and marks it executable.
pub async fn write_executable(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    write_file(path, contents).await?;
    set_executable(path).await
}

/// Sets mode `0755` on unix. No-op elsewhere.
pub async fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting executable permission on", path)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Creates (or replaces) a relative symlink `link` pointing at `target`.
#[cfg(unix)]
pub async fn symlink_file(target: &Path, link: &Path) -> Result<()> {
    remove_file(link).await?;
    fs::symlink(target, link)
        .await
        .fs_context("creating symlink", link)
}

/// Returns whether `path` exists, treating permission errors as absence.
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Counts the regular files below `dir`.
pub fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        if entry?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_dir_all_erases() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("AppDir");
        write_file(&dir.join("stale"), "old").await.unwrap();

        create_dir_all(&dir, true).await.unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("stale").exists());
    }

    #[tokio::test]
    async fn test_copy_file_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_file(&tmp.path().join("missing.py"), &tmp.path().join("out"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.py"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bin/AppRun");
        write_executable(&path, "#!/bin/sh\n").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
