//! Portable single-file executable.
//!
//! The output is a shell launcher, the sentinel line and the application
//! source, concatenated:
//!
//! ```text
//! #!/bin/sh
//! ...launcher...
//! # PYTHON_SCRIPT_BELOW
//! <application source, verbatim>
//! ```
//!
//! Next to it the bundler writes `make-appimage.sh`, a standalone script that
//! turns the portable executable into an AppImage without this tool.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    platform::linux::freedesktop::DesktopEntry,
    resources::{
        icons,
        templates::{AppRunContext, LauncherContext, PORTABLE_SENTINEL, Templates, WrapperContext},
    },
    settings::Settings,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// File name of the generated wrapper script.
pub const WRAPPER_SCRIPT_NAME: &str = "make-appimage.sh";

/// Directory below the build directory holding the portable outputs.
pub fn portable_dir(settings: &Settings) -> PathBuf {
    settings.build_directory().join("portable")
}

/// Path of the portable executable for these settings.
pub fn portable_path(settings: &Settings) -> PathBuf {
    portable_dir(settings).join(settings.exec_name())
}

/// Bundle project as a portable executable plus its AppImage wrapper script.
///
/// The output directory is recreated on every run, so repeated builds from
/// the same source are byte-identical.
pub async fn bundle_project(settings: &Settings) -> Result<Vec<PathBuf>> {
    let out_dir = portable_dir(settings);
    let exec = settings.exec_name();

    let source = tokio::fs::read(settings.source())
        .await
        .fs_context("reading application source", settings.source())?;

    fs::create_dir_all(&out_dir, true).await?;

    let templates = Templates::new()?;
    let launcher = templates.launcher(&LauncherContext {
        display_name: settings.display_name(),
        version: settings.version_string(),
        exec: &exec,
        script_name: &format!("{exec}.py"),
    })?;

    let executable = portable_path(settings);
    fs::write_executable(&executable, compose(&launcher, &source)).await?;
    log::info!("✓ Created portable executable: {}", executable.display());

    let app_run = templates.app_run(&AppRunContext { exec: &exec })?;
    let desktop = DesktopEntry::from_settings(settings).to_string();
    let icon_svg = icons::placeholder_svg();
    let wrapper = templates.wrapper(&WrapperContext {
        name: &settings.display_file_name(),
        exec: &exec,
        arch: settings.binary_arch().appimage_name(),
        runtime_url: &settings.tools().runtime_url,
        app_run: &app_run,
        desktop: &desktop,
        icon_svg: &icon_svg,
    })?;

    let wrapper_path = out_dir.join(WRAPPER_SCRIPT_NAME);
    fs::write_executable(&wrapper_path, wrapper).await?;
    log::info!("✓ Created AppImage wrapper script: {}", wrapper_path.display());

    Ok(vec![executable, wrapper_path])
}

/// Joins launcher, sentinel line and payload.
pub fn compose(launcher: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(launcher.len() + PORTABLE_SENTINEL.len() + payload.len() + 2);
    out.extend_from_slice(launcher.as_bytes());
    if !launcher.ends_with('\n') {
        out.push(b'\n');
    }
    out.extend_from_slice(PORTABLE_SENTINEL.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(payload);
    out
}

/// Splits a portable executable at the first line equal to the sentinel.
///
/// Returns `(launcher, payload)`; the sentinel line itself belongs to neither.
pub fn split(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let sentinel = PORTABLE_SENTINEL.as_bytes();
    let mut line_start = 0;

    while line_start <= bytes.len() {
        let line_end = bytes[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| line_start + i);

        let line = &bytes[line_start..line_end.unwrap_or(bytes.len())];
        if line == sentinel {
            let payload_start = line_end.map_or(bytes.len(), |end| end + 1);
            return Some((&bytes[..line_start], &bytes[payload_start..]));
        }

        match line_end {
            Some(end) => line_start = end + 1,
            None => break,
        }
    }
    None
}

/// Reads the embedded application source out of a portable executable.
pub async fn extract_payload(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path)
        .await
        .fs_context("reading portable executable", path)?;

    split(&bytes)
        .map(|(_, payload)| payload.to_vec())
        .ok_or_else(|| Error::SentinelNotFound {
            sentinel: PORTABLE_SENTINEL,
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_recovers_payload_exactly() {
        let payload = b"#!/usr/bin/env python3\nprint(\"ok\")";
        let composed = compose("#!/bin/sh\nexit 1\n", payload);

        let (launcher, extracted) = split(&composed).unwrap();
        assert_eq!(launcher, b"#!/bin/sh\nexit 1\n");
        assert_eq!(extracted, payload);
    }

    #[test]
    fn test_split_uses_first_exact_sentinel_line() {
        let payload = b"x = 1\n# PYTHON_SCRIPT_BELOW\ny = 2\n";
        let composed = compose("#!/bin/sh\necho '# PYTHON_SCRIPT_BELOW'\n", payload);

        let (_, extracted) = split(&composed).unwrap();
        assert_eq!(extracted, payload);
    }

    #[test]
    fn test_split_ignores_indented_or_prefixed_sentinel() {
        assert!(split(b"  # PYTHON_SCRIPT_BELOW\nbody").is_none());
        assert!(split(b"# PYTHON_SCRIPT_BELOW_X\nbody").is_none());
    }

    #[test]
    fn test_split_sentinel_as_last_line() {
        let (launcher, payload) = split(b"a\n# PYTHON_SCRIPT_BELOW").unwrap();
        assert_eq!(launcher, b"a\n");
        assert!(payload.is_empty());
    }

    #[test]
    fn test_compose_adds_missing_newline() {
        let composed = compose("exit 1", b"body");
        assert_eq!(composed, b"exit 1\n# PYTHON_SCRIPT_BELOW\nbody");
    }
}
