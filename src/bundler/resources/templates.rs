//! Shell templates written into bundles.
//!
//! Rendered with handlebars, HTML escaping disabled. Values that may contain
//! shell metacharacters are passed through [`shell_quote`] before rendering.

use crate::bundler::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Line separating the launcher from the embedded application source.
pub const PORTABLE_SENTINEL: &str = "# PYTHON_SCRIPT_BELOW";

const APP_RUN: &str = r#"#!/bin/sh
HERE="$(dirname "$(readlink -f "$0")")"
export PATH="$HERE/usr/bin:$PATH"
exec "$HERE/usr/bin/{{exec}}" "$@"
"#;

const PORTABLE_LAUNCHER: &str = r#"#!/bin/sh
# {{display_name}} {{version}} portable launcher
HERE="$(dirname "$(readlink -f "$0")")"
SCRIPT="$HERE/{{script_name}}"
TEMP_SCRIPT=

if [ ! -f "$SCRIPT" ]; then
    if ! ( : > "$SCRIPT" ) 2>/dev/null; then
        SCRIPT="$(mktemp "${TMPDIR:-/tmp}/{{exec}}.XXXXXX")" || exit 1
        TEMP_SCRIPT=1
        trap 'rm -f "$SCRIPT"' EXIT
    fi
    sed -n '/^{{sentinel}}$/,$p' "$0" | tail -n +2 > "$SCRIPT"
fi

export PATH="$HERE/bin:$PATH"
export LD_LIBRARY_PATH="$HERE/lib${LD_LIBRARY_PATH:+:$LD_LIBRARY_PATH}"
export XDG_DATA_DIRS="$HERE/share:${XDG_DATA_DIRS:-/usr/local/share:/usr/share}"
export GI_TYPELIB_PATH="$HERE/lib/girepository-1.0${GI_TYPELIB_PATH:+:$GI_TYPELIB_PATH}"

if command -v python3 >/dev/null 2>&1; then
    PYTHON=python3
elif command -v python >/dev/null 2>&1; then
    PYTHON=python
else
    echo {{quoted_display_name}}' needs Python 3, but neither python3 nor python was found in PATH.' >&2
    echo 'Install Python 3 with PyGObject (GTK 3) from your package manager and try again.' >&2
    exit 1
fi

if [ -n "$TEMP_SCRIPT" ]; then
    "$PYTHON" "$SCRIPT" "$@"
    exit $?
fi
exec "$PYTHON" "$SCRIPT" "$@"
exit 1
"#;

const WRAPPER_SCRIPT: &str = r#"#!/bin/bash
# Converts the portable {{exec}} executable into {{name}}-{{arch}}.AppImage.
# Needs mksquashfs (squashfs-tools) and curl or wget.
set -e

HERE="$(dirname "$(readlink -f "$0")")"
EXEC_NAME="{{exec}}"
PORTABLE="${1:-$HERE/$EXEC_NAME}"
APP_NAME="{{name}}"
ARCH="{{arch}}"
BUILD_DIR="${BUILD_DIR:-$HERE/appimage-build}"
APPDIR="$BUILD_DIR/$APP_NAME.AppDir"
RUNTIME="$BUILD_DIR/runtime-$ARCH"
SQUASHFS="$BUILD_DIR/$APP_NAME.squashfs"
OUTPUT="$BUILD_DIR/$APP_NAME-$ARCH.AppImage"

rm -rf "$APPDIR"
mkdir -p "$APPDIR/usr/bin" "$APPDIR/usr/share/applications" "$APPDIR/usr/share/icons/hicolor/scalable/apps"

cp "$PORTABLE" "$APPDIR/usr/bin/{{exec}}"
chmod +x "$APPDIR/usr/bin/{{exec}}"

cat > "$APPDIR/AppRun" << 'APPRUN_EOF'
{{app_run}}APPRUN_EOF
chmod +x "$APPDIR/AppRun"

cat > "$APPDIR/{{exec}}.desktop" << 'DESKTOP_EOF'
{{desktop}}DESKTOP_EOF
cp "$APPDIR/{{exec}}.desktop" "$APPDIR/usr/share/applications/"

cat > "$APPDIR/{{exec}}.svg" << 'ICON_EOF'
{{icon_svg}}ICON_EOF
cp "$APPDIR/{{exec}}.svg" "$APPDIR/usr/share/icons/hicolor/scalable/apps/"
ln -sf "{{exec}}.svg" "$APPDIR/.DirIcon"

if [ ! -f "$RUNTIME" ]; then
    echo "Downloading AppImage runtime..."
    if command -v curl >/dev/null 2>&1; then
        curl -fL -o "$RUNTIME.part" {{quoted_runtime_url}}
    else
        wget -O "$RUNTIME.part" {{quoted_runtime_url}}
    fi
    mv "$RUNTIME.part" "$RUNTIME"
fi

mksquashfs "$APPDIR" "$SQUASHFS" -root-owned -noappend
cat "$RUNTIME" "$SQUASHFS" > "$OUTPUT"
rm -f "$SQUASHFS"
chmod +x "$OUTPUT"

if [ -f "$OUTPUT" ]; then
    echo "✓ AppImage created: $OUTPUT"
else
    echo "✗ AppImage creation failed"
    exit 1
fi
"#;

/// Values for the `AppRun` template.
#[derive(Debug, Serialize)]
pub struct AppRunContext<'a> {
    /// Basename of the binary in `usr/bin`.
    pub exec: &'a str,
}

/// Values for the portable launcher template.
#[derive(Debug, Serialize)]
pub struct LauncherContext<'a> {
    /// Name shown in the launcher header and error messages.
    pub display_name: &'a str,
    /// Version shown in the launcher header.
    pub version: &'a str,
    /// Basename of the portable executable.
    pub exec: &'a str,
    /// File the embedded source is extracted to, next to the launcher.
    pub script_name: &'a str,
}

/// Values for the wrapper generator script.
#[derive(Debug, Serialize)]
pub struct WrapperContext<'a> {
    /// AppImage base name (`Dockpanel`).
    pub name: &'a str,
    /// Basename of the portable executable.
    pub exec: &'a str,
    /// AppImage architecture suffix (`x86_64`).
    pub arch: &'a str,
    /// Download URL of the type 2 runtime.
    pub runtime_url: &'a str,
    /// Rendered `AppRun`, newline terminated.
    pub app_run: &'a str,
    /// Rendered desktop entry, newline terminated.
    pub desktop: &'a str,
    /// Placeholder SVG icon, newline terminated.
    pub icon_svg: &'a str,
}

/// Registry of all bundle templates.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Compiles all templates.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string("app_run", APP_RUN)?;
        registry.register_template_string("launcher", PORTABLE_LAUNCHER)?;
        registry.register_template_string("wrapper", WRAPPER_SCRIPT)?;
        Ok(Self { registry })
    }

    /// Renders the AppDir entry point.
    pub fn app_run(&self, ctx: &AppRunContext<'_>) -> Result<String> {
        Ok(self.registry.render("app_run", ctx)?)
    }

    /// Renders the portable launcher. The result does not include the sentinel line.
    pub fn launcher(&self, ctx: &LauncherContext<'_>) -> Result<String> {
        #[derive(Serialize)]
        struct Full<'a> {
            #[serde(flatten)]
            ctx: &'a LauncherContext<'a>,
            sentinel: &'static str,
            quoted_display_name: String,
        }

        let rendered = self.registry.render(
            "launcher",
            &Full {
                ctx,
                sentinel: PORTABLE_SENTINEL,
                quoted_display_name: shell_quote(ctx.display_name),
            },
        )?;

        if rendered.lines().any(|line| line == PORTABLE_SENTINEL) {
            crate::bail!("launcher template must not contain the sentinel line");
        }
        Ok(rendered)
    }

    /// Renders the standalone wrapper generator script.
    pub fn wrapper(&self, ctx: &WrapperContext<'_>) -> Result<String> {
        #[derive(Serialize)]
        struct Full<'a> {
            #[serde(flatten)]
            ctx: &'a WrapperContext<'a>,
            quoted_runtime_url: String,
        }

        Ok(self.registry.render(
            "wrapper",
            &Full {
                ctx,
                quoted_runtime_url: shell_quote(ctx.runtime_url),
            },
        )?)
    }
}

/// Quotes `value` as a single POSIX shell word.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_run_forwards_arguments() {
        let templates = Templates::new().unwrap();
        let app_run = templates.app_run(&AppRunContext { exec: "dockpanel" }).unwrap();

        assert!(app_run.starts_with("#!/bin/sh\n"));
        assert!(app_run.contains(r#"exec "$HERE/usr/bin/dockpanel" "$@""#));
    }

    #[test]
    fn test_launcher_has_no_sentinel_line() {
        let templates = Templates::new().unwrap();
        let launcher = templates
            .launcher(&LauncherContext {
                display_name: "Dockpanel",
                version: "2.0.0",
                exec: "dockpanel",
                script_name: "dockpanel.py",
            })
            .unwrap();

        assert!(launcher.contains("sed -n '/^# PYTHON_SCRIPT_BELOW$/,$p'"));
        assert!(launcher.contains("GI_TYPELIB_PATH"));
        assert!(launcher.contains("'Dockpanel' needs Python 3"));
        assert!(!launcher.lines().any(|l| l == PORTABLE_SENTINEL));
    }

    #[test]
    fn test_launcher_removes_temporary_script() {
        let templates = Templates::new().unwrap();
        let launcher = templates
            .launcher(&LauncherContext {
                display_name: "Dockpanel",
                version: "2.0.0",
                exec: "dockpanel",
                script_name: "dockpanel.py",
            })
            .unwrap();

        let mktemp = launcher.find("mktemp").unwrap();
        let trap = launcher.find(r#"trap 'rm -f "$SCRIPT"' EXIT"#).unwrap();
        assert!(mktemp < trap);
        // The temporary branch must not exec, or the trap never runs.
        assert!(launcher.contains("    \"$PYTHON\" \"$SCRIPT\" \"$@\"\n    exit $?\n"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("Dock panel"), "'Dock panel'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_wrapper_embeds_heredocs() {
        let templates = Templates::new().unwrap();
        let script = templates
            .wrapper(&WrapperContext {
                name: "Dockpanel",
                exec: "dockpanel",
                arch: "x86_64",
                runtime_url: "https://example.invalid/runtime-x86_64",
                app_run: "#!/bin/sh\n",
                desktop: "[Desktop Entry]\n",
                icon_svg: "<svg/>\n",
            })
            .unwrap();

        assert!(script.contains("#!/bin/sh\nAPPRUN_EOF"));
        assert!(script.contains("[Desktop Entry]\nDESKTOP_EOF"));
        assert!(script.contains("'https://example.invalid/runtime-x86_64'"));
        assert!(script.contains("-root-owned -noappend"));
    }
}
