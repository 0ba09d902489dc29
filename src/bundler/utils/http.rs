//! HTTP utilities for downloading bundler tools.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Parses `url` and rejects anything that is not http(s).
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::UnsupportedScheme {
            scheme: other.to_string(),
            url: url.to_string(),
        }),
    }
}

/// Downloads `url` into `dest`.
///
/// The body is streamed into `<dest>.part` and renamed onto `dest` only after
/// the last chunk was written, so `dest` never holds a truncated download.
/// Non-2xx responses are errors. There is no retry.
pub async fn download_to_file(url: &str, dest: &Path) -> Result<u64> {
    let url = validate_url(url)?;
    log::info!("Downloading {}", url);

    let mut response = reqwest::get(url.clone()).await?.error_for_status()?;

    let partial = partial_path(dest);
    let written = match stream_to_file(&mut response, &partial).await {
        Ok(written) => written,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, dest)
        .await
        .fs_context("moving download into place at", dest)?;

    log::debug!("Downloaded {} bytes from {}", written, url);
    Ok(written)
}

async fn stream_to_file(response: &mut reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating download file", path)?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .fs_context("writing download file", path)?;
        written += chunk.len() as u64;
    }
    file.flush().await.fs_context("flushing download file", path)?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://github.com/AppImage/AppImageKit").is_ok());
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(Error::UnsupportedScheme { .. })
        ));
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("build/runtime-x86_64")),
            PathBuf::from("build/runtime-x86_64.part")
        );
    }
}
