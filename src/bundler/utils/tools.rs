//! External tool cache and invocation.
//!
//! Tools are cached by file name in the build directory. A cached file is
//! trusted as long as it exists; nothing checks its contents.

use crate::bundler::{
    error::{Error, Result},
    settings::Arch,
    utils::{fs, http},
};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Whether [`fetch_tool`] found the tool cached or had to download it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cache file already existed and was reused as-is.
    Cached,
    /// The tool was downloaded into the cache.
    Downloaded,
}

/// Makes the tool at `url` available at `cache_path`.
///
/// Returns immediately when `cache_path` exists, whatever it contains.
/// Otherwise downloads the file and marks it executable.
pub async fn fetch_tool(url: &str, cache_path: &Path) -> Result<FetchOutcome> {
    if fs::exists(cache_path).await {
        log::debug!("Using cached tool at {}", cache_path.display());
        return Ok(FetchOutcome::Cached);
    }

    if let Some(parent) = cache_path.parent() {
        fs::create_dir_all(parent, false).await?;
    }

    http::download_to_file(url, cache_path).await?;
    fs::set_executable(cache_path).await?;

    Ok(FetchOutcome::Downloaded)
}

/// Runs `tool` with `args` to completion.
///
/// `ARCH` is always set to the AppImageKit name of `arch`. With
/// `extract_and_run`, `APPIMAGE_EXTRACT_AND_RUN=1` lets an AppImage tool run
/// on hosts without FUSE.
pub async fn run_tool<I, S>(tool: &Path, args: I, arch: Arch, extract_and_run: bool) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let display = tool_display_name(tool);
    let mut command = tokio::process::Command::new(tool);
    command.args(args).env("ARCH", arch.appimage_name());
    if extract_and_run {
        command.env("APPIMAGE_EXTRACT_AND_RUN", "1");
    }

    log::debug!("Running {:?}", command.as_std());

    let status = command.status().await.map_err(|error| Error::CommandFailed {
        command: display.clone(),
        error,
    })?;

    if !status.success() {
        return Err(Error::ToolFailed {
            tool: display,
            code: status.code(),
        });
    }
    Ok(())
}

/// Resolves `mksquashfs`: an explicit path wins, otherwise `PATH` is searched.
pub fn resolve_mksquashfs(configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.components().count() > 1 => Ok(path.to_path_buf()),
        Some(name) => which::which(name).map_err(|e| {
            log::debug!("{} lookup failed: {}", name.display(), e);
            Error::ToolNotFound(name.display().to_string())
        }),
        None => which::which("mksquashfs").map_err(|e| {
            log::debug!("mksquashfs lookup failed: {}", e);
            Error::ToolNotFound("mksquashfs".into())
        }),
    }
}

fn tool_display_name(tool: &Path) -> String {
    tool.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_cache_is_never_refetched() {
        let tmp = tempfile::tempdir().unwrap();
        let cached = tmp.path().join("appimagetool-x86_64.AppImage");
        std::fs::write(&cached, b"truncated garbage").unwrap();

        // Unroutable URL: any download attempt would fail the test.
        let outcome = fetch_tool("http://127.0.0.1:9/appimagetool", &cached)
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::Cached);
        assert_eq!(std::fs::read(&cached).unwrap(), b"truncated garbage");
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_cache_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cached = tmp.path().join("runtime-x86_64");

        let result = fetch_tool("http://127.0.0.1:9/runtime-x86_64", &cached).await;

        assert!(result.is_err());
        assert!(!cached.exists());
    }

    #[test]
    fn test_explicit_mksquashfs_path_is_used_verbatim() {
        let path = resolve_mksquashfs(Some(Path::new("/opt/squashfs/bin/mksquashfs"))).unwrap();
        assert_eq!(path, PathBuf::from("/opt/squashfs/bin/mksquashfs"));
    }

    #[test]
    fn test_unknown_tool_name_is_not_found() {
        let err = resolve_mksquashfs(Some(Path::new("definitely-not-a-real-mksquashfs")))
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_sets_arch_and_reports_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = tmp.path().join("fake-tool");
        let out = tmp.path().join("arch.txt");
        fs::write_executable(&tool, "#!/bin/sh\nprintf '%s' \"$ARCH\" > \"$1\"\nexit \"$2\"\n")
            .await
            .unwrap();

        run_tool(&tool, [out.as_os_str(), OsStr::new("0")], Arch::X86_64, false)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "x86_64");

        let err = run_tool(&tool, [out.as_os_str(), OsStr::new("3")], Arch::X86_64, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { code: Some(3), .. }));
    }
}
