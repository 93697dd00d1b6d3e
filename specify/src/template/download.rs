//! Streaming download of template archives.
//!
//! The asset is written in fixed-size chunks so memory use stays bounded
//! regardless of archive size. Progress is reported after every chunk as
//! determinate bytes when the response carries a content length, or as an
//! indeterminate running counter otherwise. A failed download never leaves a
//! partial file behind.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, warn};

use super::config::TemplateConfig;
use super::error::{TemplateError, TemplateResult};
use super::interrupt::InterruptFlag;
use super::release::{ReleaseMetadata, CLIENT_USER_AGENT};
use super::traits::{DownloadProgress, TemplateDownloader};

/// Buffer size for reading/writing during downloads (64KB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// HTTP-based template downloader.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    interrupt: InterruptFlag,
}

impl HttpDownloader {
    /// Create a downloader using the timeout from `config`.
    pub fn new(config: &TemplateConfig) -> TemplateResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TemplateError::network(config.latest_release_url(), e))?;

        Ok(Self {
            client,
            interrupt: InterruptFlag::new(),
        })
    }

    /// Abort the stream when `interrupt` is raised.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }
}

impl TemplateDownloader for HttpDownloader {
    fn download(
        &self,
        metadata: &ReleaseMetadata,
        dest_dir: &Path,
        on_progress: &mut dyn FnMut(DownloadProgress),
    ) -> TemplateResult<PathBuf> {
        let url = metadata.asset_download_url.as_str();
        let dest = archive_destination(dest_dir, &metadata.filename)?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .map_err(|e| TemplateError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TemplateError::network(
                url,
                format!("GET request failed with status {}", status),
            ));
        }

        let total = response.content_length().filter(|&len| len > 0);
        debug!(url, dest = %dest.display(), total, "Starting download");

        save_stream(response, &dest, url, total, &self.interrupt, on_progress)?;
        Ok(dest)
    }
}

/// Path of the archive inside `dest_dir`.
///
/// Only the final component of the remote filename is used.
pub fn archive_destination(dest_dir: &Path, filename: &str) -> TemplateResult<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| TemplateError::WriteFailed {
            path: dest_dir.join(filename),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "asset has no usable file name",
            ),
        })?;

    Ok(dest_dir.join(name))
}

/// Stream `reader` into a new file at `dest`, deleting it on any failure.
///
/// Returns the number of bytes written.
pub fn save_stream<R: Read>(
    reader: R,
    dest: &Path,
    url: &str,
    total: Option<u64>,
    interrupt: &InterruptFlag,
    on_progress: &mut dyn FnMut(DownloadProgress),
) -> TemplateResult<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| TemplateError::WriteFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file = File::create(dest).map_err(|e| TemplateError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    match stream_chunks(reader, file, dest, url, total, interrupt, on_progress) {
        Ok(written) => {
            debug!(dest = %dest.display(), written, "Download complete");
            Ok(written)
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(dest) {
                warn!(
                    dest = %dest.display(),
                    error = %remove_err,
                    "Failed to remove partial download"
                );
            }
            Err(e)
        }
    }
}

fn stream_chunks<R: Read>(
    mut reader: R,
    file: File,
    dest: &Path,
    url: &str,
    total: Option<u64>,
    interrupt: &InterruptFlag,
    on_progress: &mut dyn FnMut(DownloadProgress),
) -> TemplateResult<u64> {
    let report = |written: u64| match total {
        Some(total) => DownloadProgress::Determinate { written, total },
        None => DownloadProgress::Indeterminate { written },
    };

    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut downloaded = 0u64;

    on_progress(report(0));

    loop {
        interrupt.check()?;

        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| TemplateError::network(url, format!("read error: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| TemplateError::WriteFailed {
                path: dest.to_path_buf(),
                source: e,
            })?;

        downloaded += bytes_read as u64;
        on_progress(report(downloaded));
    }

    writer.flush().map_err(|e| TemplateError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(downloaded)
}
