//! AppImage finalizer - wraps a portable executable into an AppImage.
//!
//! Unlike [`super::appimage`] this path does not run `appimagetool`. The
//! AppImage is assembled directly:
//!
//! ```text
//! <Name>-<arch>.AppImage = runtime-<arch> ‖ mksquashfs(<Name>.AppDir)
//! ```
//!
//! The runtime is an ELF executable that locates its payload right after the
//! ELF section header table, so the squashfs image must follow the runtime
//! bytes with no gap.

use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    platform::linux::appdir::AppDir,
    settings::Settings,
    utils::{fs, tools},
};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Magic at the start of a squashfs superblock.
pub const SQUASHFS_MAGIC: &[u8; 4] = b"hsqs";

/// AppImage type 2 marker stored in `e_ident[8..11]` of the runtime.
pub const APPIMAGE_TYPE2_MAGIC: &[u8; 3] = b"AI\x02";

/// Bundle the portable executable at `settings.source()` as an AppImage.
///
/// # Process
///
/// 1. Assembles `<Name>.AppDir` with the portable executable as `usr/bin/<exec>`
/// 2. Fetches `runtime-<arch>` into the build directory unless cached
/// 3. Runs `mksquashfs <AppDir> <Name>.squashfs -root-owned -noappend`
/// 4. Writes `<Name>-<arch>.AppImage` as runtime followed by the squashfs image
/// 5. Verifies the output starts with the runtime, then drops the squashfs
pub async fn bundle_project(settings: &Settings) -> Result<Vec<PathBuf>> {
    let arch = settings.binary_arch();
    let build_dir = settings.build_directory();

    log::info!(
        "Wrapping {} into an AppImage ({})",
        settings.source().display(),
        arch.appimage_name()
    );

    if !fs::exists(settings.source()).await {
        return Err(Error::Fs {
            context: "reading portable executable",
            path: settings.source().to_path_buf(),
            error: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    fs::create_dir_all(build_dir, false).await?;
    let app_dir = AppDir::assemble(settings, settings.source()).await?;
    log::debug!("Entry point installed as {}", app_dir.binary_path().display());

    let runtime = build_dir.join(format!("runtime-{}", arch.appimage_name()));
    tools::fetch_tool(&settings.tools().runtime_url, &runtime)
        .await
        .context("failed to fetch AppImage runtime")?;

    let mksquashfs = tools::resolve_mksquashfs(settings.tools().mksquashfs.as_deref())?;
    let squashfs = build_dir.join(format!("{}.squashfs", settings.product_name()));
    fs::remove_file(&squashfs).await?;

    tools::run_tool(
        &mksquashfs,
        [
            app_dir.root().as_os_str(),
            squashfs.as_os_str(),
            OsStr::new("-root-owned"),
            OsStr::new("-noappend"),
        ],
        arch,
        false,
    )
    .await?;

    if !fs::exists(&squashfs).await {
        return Err(Error::MissingOutput { path: squashfs });
    }

    let output = settings.appimage_path();
    assemble_appimage(&runtime, &squashfs, &output).await?;
    fs::remove_file(&squashfs).await?;

    log::info!("✓ Created AppImage: {}", output.display());
    Ok(vec![output])
}

/// Writes `runtime ‖ squashfs` to `output` with mode `0755`.
///
/// Fails with [`Error::MissingOutput`] or [`Error::RuntimePrefixMismatch`]
/// when the written file does not hold the runtime as its prefix.
pub async fn assemble_appimage(runtime: &Path, squashfs: &Path, output: &Path) -> Result<u64> {
    let runtime_bytes = tokio::fs::read(runtime)
        .await
        .fs_context("reading AppImage runtime", runtime)?;

    let mut payload = tokio::fs::File::open(squashfs)
        .await
        .fs_context("opening squashfs image", squashfs)?;
    let mut out = tokio::fs::File::create(output)
        .await
        .fs_context("creating AppImage", output)?;

    out.write_all(&runtime_bytes)
        .await
        .fs_context("writing AppImage runtime", output)?;
    let copied = tokio::io::copy(&mut payload, &mut out)
        .await
        .fs_context("appending squashfs image", output)?;
    out.flush().await.fs_context("flushing AppImage", output)?;
    drop(out);

    fs::set_executable(output).await?;
    verify_runtime_prefix(&runtime_bytes, output).await?;

    let total = runtime_bytes.len() as u64 + copied;
    log::debug!(
        "AppImage {}: {} byte runtime + {} byte payload",
        output.display(),
        runtime_bytes.len(),
        copied
    );
    Ok(total)
}

async fn verify_runtime_prefix(runtime: &[u8], output: &Path) -> Result<()> {
    let mut file = match tokio::fs::File::open(output).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MissingOutput {
                path: output.to_path_buf(),
            });
        }
        Err(e) => return Err(e).fs_context("opening AppImage", output),
    };

    let mut prefix = vec![0u8; runtime.len()];
    match file.read_exact(&mut prefix).await {
        Ok(_) if prefix == runtime => Ok(()),
        Ok(_) => Err(Error::RuntimePrefixMismatch {
            path: output.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(Error::RuntimePrefixMismatch {
                path: output.to_path_buf(),
            })
        }
        Err(e) => Err(e).fs_context("reading AppImage", output),
    }
}

/// What [`inspect`] found in an AppImage file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppImageReport {
    /// Total file size in bytes.
    pub size: u64,
    /// ELF class is 64-bit.
    pub is_64: bool,
    /// Raw `e_machine` value of the runtime.
    pub machine: u16,
    /// `e_ident` carries the `AI\x02` type 2 marker.
    pub type2_magic: bool,
    /// Offset where the runtime expects its payload. `None` when the header
    /// fields overflow a 64-bit offset.
    pub payload_offset: Option<u64>,
    /// A squashfs superblock starts at `payload_offset`.
    pub squashfs_at_offset: bool,
}

impl AppImageReport {
    /// The file is a well-formed type 2 AppImage.
    pub fn is_valid(&self) -> bool {
        self.squashfs_at_offset
    }
}

/// Reads the runtime ELF header of `path` and checks the payload position.
///
/// The payload offset is the end of the section header table,
/// `e_shoff + e_shentsize * e_shnum`.
pub async fn inspect(path: &Path) -> Result<AppImageReport> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening AppImage", path)?;
    let size = file
        .metadata()
        .await
        .fs_context("reading AppImage metadata", path)?
        .len();

    let mut header_bytes = [0u8; goblin::elf::header::header64::SIZEOF_EHDR];
    let read = read_up_to(&mut file, &mut header_bytes)
        .await
        .fs_context("reading ELF header", path)?;
    let header = goblin::elf::Elf::parse_header(&header_bytes[..read])?;

    // u16 * u16 always fits; only the sum can overflow on a corrupt header.
    let payload_offset = header
        .e_shoff
        .checked_add(u64::from(header.e_shentsize) * u64::from(header.e_shnum));

    let mut magic = [0u8; 4];
    let magic_end = payload_offset.and_then(|offset| offset.checked_add(magic.len() as u64));
    let squashfs_at_offset = match (payload_offset, magic_end) {
        (Some(offset), Some(end)) if end <= size => {
            file.seek(std::io::SeekFrom::Start(offset))
                .await
                .fs_context("seeking to payload", path)?;
            file.read_exact(&mut magic)
                .await
                .fs_context("reading payload magic", path)?;
            &magic == SQUASHFS_MAGIC
        }
        _ => false,
    };

    Ok(AppImageReport {
        size,
        is_64: header.e_ident[goblin::elf::header::EI_CLASS] == goblin::elf::header::ELFCLASS64,
        machine: header.e_machine,
        type2_magic: &header.e_ident[8..11] == APPIMAGE_TYPE2_MAGIC,
        payload_offset,
        squashfs_at_offset,
    })
}

async fn read_up_to(file: &mut tokio::fs::File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
