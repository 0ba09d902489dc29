//! Helpers shared by the pipeline tests.

#![allow(dead_code)]

use dockpanel_bundler::bundler::{
    BundleSettings, PackageSettings, Settings, SettingsBuilder, ToolSettings,
};
use std::path::{Path, PathBuf};

/// Any request to this URL fails, so a test passes only if nothing is downloaded.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/never-downloaded";

/// Application source used by the end-to-end tests.
pub const STUB_SOURCE: &str = "#!/usr/bin/env python3\nprint(\"ok\")\n";

/// Tool settings that never hit the network.
pub fn offline_tools(mksquashfs: Option<PathBuf>) -> ToolSettings {
    ToolSettings {
        appimagetool_url: UNREACHABLE_URL.into(),
        runtime_url: UNREACHABLE_URL.into(),
        mksquashfs,
        extract_and_run: false,
    }
}

/// Settings for `source` with defaults and an offline tool configuration.
pub fn settings(source: &Path, build_dir: &Path) -> Settings {
    SettingsBuilder::new()
        .source(source)
        .build_directory(build_dir)
        .tools(offline_tools(None))
        .build()
        .unwrap()
}

/// Settings matching the `wrap` command defaults: name `Dockpanel`, exec `dockpanel`.
pub fn wrap_settings(portable: &Path, build_dir: &Path, mksquashfs: &Path) -> Settings {
    SettingsBuilder::new()
        .source(portable)
        .build_directory(build_dir)
        .package_settings(PackageSettings {
            product_name: "Dockpanel".into(),
            ..Default::default()
        })
        .bundle_settings(BundleSettings {
            exec_name: Some("dockpanel".into()),
            icon: None,
        })
        .tools(offline_tools(Some(mksquashfs.to_path_buf())))
        .build()
        .unwrap()
}

/// Writes an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
