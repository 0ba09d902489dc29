//! Bundle orchestration and coordination.
//!
//! The [`Bundler`] runs the requested pipelines in priority order and
//! describes each result as a [`BundledArtifact`]:
//! 1. Reads configuration from [`Settings`]
//! 2. Delegates to the pipeline for each [`PackageType`]
//! 3. Calculates sizes and SHA-256 checksums
//!
//! Pipelines run one after another; the first failure aborts the run.

use crate::bail;
use crate::bundler::{
    BundledArtifact, PackageType, Result, Settings, error::ErrorExt, platform::linux,
};
use std::path::Path;

/// Main bundler orchestrator.
///
/// # Examples
///
/// ```no_run
/// use dockpanel_bundler::bundler::{Bundler, PackageType, Settings};
///
/// # async fn example(settings: Settings) -> dockpanel_bundler::bundler::Result<()> {
/// let bundler = Bundler::new(settings);
/// let artifacts = bundler
///     .bundle_types(&[PackageType::Portable, PackageType::AppImage])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a new bundler with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Executes bundling operations for specific package types.
    ///
    /// Types are built in [`PackageType::priority()`] order, each at most once.
    /// When [`PackageType::Portable`] is requested too, the wrapped AppImage is
    /// made from the portable executable built in the same run; otherwise
    /// [`Settings::source`] must already be a portable executable.
    ///
    /// # Returns
    ///
    /// Vector of [`BundledArtifact`] results, one per created package.
    pub async fn bundle_types(&self, types: &[PackageType]) -> Result<Vec<BundledArtifact>> {
        let ordered = build_order(types);
        let chained_portable = ordered.contains(&PackageType::Portable);

        let mut artifacts = Vec::with_capacity(ordered.len());

        for package_type in ordered {
            log::debug!("Bundling {}", package_type);

            let paths = match package_type {
                PackageType::AppImage => linux::appimage::bundle_project(&self.settings).await?,
                PackageType::Portable => linux::portable::bundle_project(&self.settings).await?,
                PackageType::WrappedAppImage if chained_portable => {
                    let portable = linux::portable::portable_path(&self.settings);
                    linux::finalize::bundle_project(&self.settings.wrapping(portable)).await?
                }
                PackageType::WrappedAppImage => {
                    linux::finalize::bundle_project(&self.settings).await?
                }
            };

            let mut size = 0u64;
            for p in &paths {
                let metadata = tokio::fs::metadata(p)
                    .await
                    .fs_context("reading artifact metadata", p)?;
                size += metadata.len();
            }

            let checksum = match paths.first() {
                Some(first_path) => calculate_sha256(first_path).await?,
                None => bail!("Pipeline for {} produced no files", package_type),
            };

            artifacts.push(BundledArtifact {
                package_type,
                paths,
                size,
                checksum,
            });
        }

        Ok(artifacts)
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Requested types without duplicates, in [`PackageType::priority()`] order.
fn build_order(types: &[PackageType]) -> Vec<PackageType> {
    let mut ordered: Vec<PackageType> = Vec::with_capacity(types.len());
    for package_type in types {
        if !ordered.contains(package_type) {
            ordered.push(*package_type);
        }
    }
    ordered.sort_by_key(PackageType::priority);
    ordered
}

/// Calculates the SHA-256 checksum of a file.
///
/// Reads in 8KB chunks and returns the hex-encoded hash (64 characters).
pub(crate) async fn calculate_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sha256_of_known_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("abc");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            calculate_sha256(&path).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_build_order_drops_non_adjacent_duplicates() {
        use PackageType::*;

        assert_eq!(
            build_order(&[WrappedAppImage, Portable, AppImage, Portable]),
            vec![Portable, AppImage, WrappedAppImage]
        );
        assert_eq!(build_order(&[AppImage, AppImage]), vec![AppImage]);
    }

    #[tokio::test]
    async fn test_sha256_missing_file_reports_path() {
        let err = calculate_sha256(Path::new("/nonexistent/file")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/file"));
    }
}
