//! HTTP(S) artifact download

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;

use crate::common::paths::ensure_parent_dir;
use crate::common::{Error, Result};

/// Download a file with progress reporting
///
/// The body is streamed into a temporary file next to `dest` and renamed
/// into place once complete, so an interrupted download never leaves a
/// truncated artifact where the next run would take it as present.
pub async fn download_file(url: &str, dest: &Path) -> Result<()> {
    ensure_parent_dir(dest)?;
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .header("User-Agent", "hibernate-harness")
        .send()
        .await
        .map_err(|e| Error::download(url, e))?;

    if !response.status().is_success() {
        return Err(Error::download(
            url,
            format!("server returned status {}", response.status()),
        ));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = if total_size > 0 {
        let pb = ProgressBar::new(total_size);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        Some(pb)
    } else {
        eprintln!("  Downloading...");
        None
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::download(url, e))?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        if let Some(ref pb) = pb {
            pb.set_position(downloaded);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    file.flush()?;
    file.persist(dest).map_err(|e| Error::Io(e.error))?;
    tracing::debug!("Downloaded {} bytes to {}", downloaded, dest.display());

    Ok(())
}
