//! Cache-aware HTTP download for interpreter archives.
//!
//! Archives are kept in a per-user cache keyed by the URL's file name. A cached
//! file is reused as-is; otherwise it is fetched once and then copied to the
//! caller's working location.
//!
//! ## Features
//!
//! - Streaming downloads with terminal progress display
//! - Downloads to a `.part` file, then renames on success, so an interrupted
//!   transfer is never mistaken for a cached archive
//! - A [`Transport`] seam so the network layer can be replaced in tests
//!
//! There is no retry and no freshness check: a cache hit skips the network
//! entirely.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::paths::ensure_dir;
use crate::errors::AnypyError;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("anypy/", env!("CARGO_PKG_VERSION"));

/// Connection timeout in seconds. The transfer itself is not bounded.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Minimum interval between progress updates in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 250;

/// Suffix of in-flight downloads inside the cache directory.
const PARTIAL_SUFFIX: &str = ".part";

/// Retrieves a URL into a local file.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Downloads `url` into `dest`, overwriting it.
    ///
    /// # Errors
    ///
    /// Returns [`AnypyError::DownloadFailed`] if the transfer fails.
    async fn retrieve(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP(S) transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the default client settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn retrieve(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.client.get(url).send().await.map_err(|e| {
            AnypyError::download_failed_with_source(url, "failed to connect", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnypyError::download_failed(url, format!("HTTP {status}")).into());
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            AnypyError::download_failed_with_source(
                url,
                format!("failed to create {}", dest.display()),
                e,
            )
        })?;

        let mut progress = Progress::new(total_size);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AnypyError::download_failed_with_source(url, "failed to read body", e))?;
            file.write_all(&chunk).await.map_err(|e| {
                AnypyError::download_failed_with_source(
                    url,
                    format!("failed to write {}", dest.display()),
                    e,
                )
            })?;
            progress.advance(chunk.len() as u64);
        }

        file.flush().await.map_err(|e| {
            AnypyError::download_failed_with_source(
                url,
                format!("failed to flush {}", dest.display()),
                e,
            )
        })?;
        progress.finish();

        Ok(())
    }
}

/// Downloads archives through a persistent cache directory.
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    cache_dir: PathBuf,
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    /// Creates a fetcher that caches into `cache_dir`.
    pub fn new(cache_dir: PathBuf, transport: T) -> Self {
        Self {
            cache_dir,
            transport,
        }
    }

    /// Returns the cache entry path for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AnypyError::DownloadFailed`] if the URL has no file name.
    pub fn cached_path(&self, url: &str) -> Result<PathBuf> {
        let name = url_file_name(url)
            .ok_or_else(|| AnypyError::download_failed(url, "URL has no file name"))?;
        Ok(self.cache_dir.join(name))
    }

    /// Fetches `url` into `dest`, downloading only when not already cached.
    ///
    /// Returns the path of the cache entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cache directory cannot be created
    /// - The transfer fails ([`AnypyError::DownloadFailed`])
    /// - The cached file cannot be copied to `dest`
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        ensure_dir(&self.cache_dir)?;
        let cached = self.cached_path(url)?;

        if cached.is_file() {
            info!(path = %cached.display(), "using cached archive");
        } else {
            info!(%url, path = %cached.display(), "downloading archive");
            let partial = partial_path(&cached);

            if let Err(e) = self.transport.retrieve(url, &partial).await {
                let _ = std::fs::remove_file(&partial);
                return Err(e);
            }

            std::fs::rename(&partial, &cached).map_err(|e| {
                AnypyError::io(
                    format!(
                        "failed to move {} to {}",
                        partial.display(),
                        cached.display()
                    ),
                    e,
                )
            })?;
        }

        copy_with_metadata(&cached, dest)?;
        debug!(from = %cached.display(), to = %dest.display(), "copied archive");

        Ok(cached)
    }
}

/// Extracts the last path segment of a URL, ignoring any query or fragment.
fn url_file_name(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

fn partial_path(cached: &Path) -> PathBuf {
    let mut name = cached.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Copies `src` to `dest`, keeping permissions and the modification time.
fn copy_with_metadata(src: &Path, dest: &Path) -> Result<()> {
    let copy_err = |e| {
        AnypyError::io(
            format!("failed to copy {} to {}", src.display(), dest.display()),
            e,
        )
    };

    std::fs::copy(src, dest).map_err(copy_err)?;
    let modified = std::fs::metadata(src)
        .and_then(|m| m.modified())
        .map_err(copy_err)?;
    std::fs::File::options()
        .write(true)
        .open(dest)
        .and_then(|f| f.set_modified(modified))
        .map_err(copy_err)?;

    Ok(())
}

/// Simple text-based progress line, drawn only on an interactive stderr.
struct Progress {
    total: u64,
    downloaded: u64,
    start: Instant,
    last_update: Instant,
    enabled: bool,
}

impl Progress {
    fn new(total: u64) -> Self {
        let now = Instant::now();
        Self {
            total,
            downloaded: 0,
            start: now,
            last_update: now,
            enabled: std::io::stderr().is_terminal(),
        }
    }

    fn advance(&mut self, bytes: u64) {
        self.downloaded += bytes;
        let now = Instant::now();
        if now.duration_since(self.last_update).as_millis() >= PROGRESS_INTERVAL_MS {
            self.draw();
            self.last_update = now;
        }
    }

    fn finish(&self) {
        if self.enabled {
            self.draw();
            eprintln!();
        }
    }

    fn draw(&self) {
        if !self.enabled {
            return;
        }
        let line = format_progress(
            self.downloaded,
            self.total,
            self.start.elapsed().as_secs_f64(),
        );
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{line}     ");
        let _ = stderr.flush();
    }
}

/// Formats a progress line such as `1.00 MB/2.00 MB (50%) 512.00 KB/s`.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn format_progress(downloaded: u64, total: u64, elapsed_secs: f64) -> String {
    let speed = if elapsed_secs > 0.0 {
        downloaded as f64 / elapsed_secs
    } else {
        0.0
    };
    if total > 0 {
        let percent = (downloaded as f64 / total as f64 * 100.0) as u8;
        format!(
            "{}/{} ({percent}%) {}",
            format_bytes(downloaded),
            format_bytes(total),
            format_speed(speed)
        )
    } else {
        format!("{} {}", format_bytes(downloaded), format_speed(speed))
    }
}

/// Formats bytes into a human-readable string (KB, MB, GB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats speed (bytes/sec) into a human-readable string.
fn format_speed(speed: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    if speed >= MB {
        format!("{:.2} MB/s", speed / MB)
    } else if speed >= KB {
        format!("{:.2} KB/s", speed / KB)
    } else {
        format!("{speed:.0} B/s")
    }
}
