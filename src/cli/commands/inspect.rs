//! `extract` and `inspect` commands: read back what the pipelines wrote.

use crate::bundler::{extract_payload, inspect};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use tokio::io::AsyncWriteExt;

/// Execute extract command
pub(super) async fn execute_extract(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Extract { portable, output } = &args.command else {
        unreachable!("execute_extract called with non-Extract command");
    };

    let payload = extract_payload(portable).await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &payload).await?;
            config.success_println(&format!(
                "Extracted {} bytes to {}",
                payload.len(),
                path.display()
            ));
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&payload).await?;
            stdout.flush().await?;
        }
    }
    Ok(0)
}

/// Execute inspect command
///
/// Exits with 1 when no squashfs image starts at the payload offset.
pub(super) async fn execute_inspect(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Inspect { appimage } = &args.command else {
        unreachable!("execute_inspect called with non-Inspect command");
    };

    let report = inspect(appimage).await?;

    config.println(&format!("{}", appimage.display()));
    config.indent(&format!("Size: {} bytes", report.size));
    config.indent(&format!(
        "ELF: {}, machine {}",
        if report.is_64 { "64-bit" } else { "32-bit" },
        report.machine
    ));
    config.indent(&format!(
        "AppImage type 2 marker: {}",
        if report.type2_magic { "present" } else { "absent" }
    ));
    match report.payload_offset {
        Some(offset) => config.indent(&format!("Payload offset: {offset}")),
        None => config.indent("Payload offset: out of range (corrupt section header fields)"),
    }

    if report.is_valid() {
        config.success_println("squashfs payload found at offset");
        Ok(0)
    } else {
        config.error_println("no squashfs payload at the runtime's payload offset");
        Ok(1)
    }
}
