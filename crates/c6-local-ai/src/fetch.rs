//! Artifact download and replacement.
//!
//! Artifacts are streamed into `<destination>.tmp` and renamed over the
//! destination only once the whole body has been written, so a reader never
//! sees a partially downloaded database or model.

use flate2::write::GzDecoder;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::LocalAIError;
use crate::paths::{ensure_parent_dir, temp_path};

/// How the response body is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Written as received.
    None,
    /// A single-member gzip stream, decompressed while downloading.
    Gzip,
}

/// A file that is downloaded and replaced wholesale.
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    /// Display name used in messages and errors.
    pub name: String,
    /// Download URL.
    pub url: String,
    /// Final location on disk.
    pub destination: PathBuf,
    /// Encoding of the response body.
    pub compression: Compression,
    /// Expected SHA256 checksum of the downloaded bytes (optional).
    pub sha256: Option<String>,
}

impl ArtifactInfo {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            destination: destination.into(),
            compression: Compression::None,
            sha256: None,
        }
    }

    /// The c6 database, served gzip-compressed.
    pub fn database(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self::new("database", url, destination).with_compression(Compression::Gzip)
    }

    /// The model weights, served as-is.
    pub fn model(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self::new("model", url, destination)
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }
}

/// Downloads artifacts over HTTP.
pub struct ArtifactFetcher {
    client: reqwest::Client,
    show_progress: bool,
}

impl ArtifactFetcher {
    /// Create a new fetcher.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a fetcher that uses the given HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar on stderr.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download an artifact and move it into place.
    ///
    /// On error the destination is left as it was and the temporary file is
    /// removed.
    pub async fn fetch(&self, artifact: &ArtifactInfo) -> Result<PathBuf, LocalAIError> {
        ensure_parent_dir(&artifact.destination)?;

        info!(
            "Downloading {} from {} to {:?}",
            artifact.name, artifact.url, artifact.destination
        );

        let response = self
            .client
            .get(&artifact.url)
            .send()
            .await
            .map_err(|source| LocalAIError::DownloadFailed {
                name: artifact.name.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(LocalAIError::HttpStatus {
                name: artifact.name.clone(),
                status: response.status(),
            });
        }

        let pb = self.progress_bar(response.content_length());

        let (tmp, file) = TempFile::create(temp_path(&artifact.destination))?;
        let mut writer = ArtifactWriter::new(file, artifact.compression);
        let mut hasher = Sha256::new();
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| LocalAIError::DownloadFailed {
                name: artifact.name.clone(),
                source,
            })?;
            hasher.update(&chunk);
            writer
                .write_chunk(&chunk)
                .map_err(|e| stage_error(artifact, tmp.path(), e))?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        writer
            .finish()
            .map_err(|e| stage_error(artifact, tmp.path(), e))?;

        pb.finish_and_clear();
        debug!("Downloaded {} bytes for {}", downloaded, artifact.name);

        if let Some(expected) = &artifact.sha256 {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LocalAIError::ChecksumMismatch {
                    name: artifact.name.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
            debug!("Checksum verified: {}", actual);
        }

        fs::rename(tmp.path(), &artifact.destination).map_err(|source| {
            LocalAIError::RenameFailed {
                name: artifact.name.clone(),
                path: artifact.destination.clone(),
                source,
            }
        })?;
        tmp.persist();

        info!("{} downloaded to {:?}", artifact.name, artifact.destination);
        Ok(artifact.destination.clone())
    }

    fn progress_bar(&self, total_size: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        if let Some(size) = total_size {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {bytes} downloaded")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    }
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Attribute a write-side I/O error to decompression or to the filesystem.
fn stage_error(artifact: &ArtifactInfo, tmp: &Path, source: io::Error) -> LocalAIError {
    let corrupt_stream = matches!(
        source.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    );
    if artifact.compression == Compression::Gzip && corrupt_stream {
        LocalAIError::DecompressFailed {
            name: artifact.name.clone(),
            source,
        }
    } else {
        LocalAIError::WriteFailed {
            path: tmp.to_path_buf(),
            source,
        }
    }
}

/// Writes the response body to the temporary file, decompressing if needed.
enum ArtifactWriter {
    Plain(BufWriter<File>),
    Gzip(GzDecoder<BufWriter<File>>),
}

impl ArtifactWriter {
    fn new(file: File, compression: Compression) -> Self {
        let writer = BufWriter::new(file);
        match compression {
            Compression::None => Self::Plain(writer),
            Compression::Gzip => Self::Gzip(GzDecoder::new(writer)),
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.write_all(chunk),
            // The decoder accepts nothing past the end of its member.
            Self::Gzip(d) => d.write_all(chunk).map_err(|e| {
                if e.kind() == io::ErrorKind::WriteZero {
                    io::Error::new(io::ErrorKind::InvalidData, "trailing data after gzip stream")
                } else {
                    e
                }
            }),
        }
    }

    /// Flush everything to disk. For gzip this also checks the trailer.
    fn finish(self) -> io::Result<()> {
        let writer = match self {
            Self::Plain(w) => w,
            Self::Gzip(d) => d.finish()?,
        };
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

/// Temporary download target, removed on drop unless persisted.
struct TempFile {
    path: PathBuf,
    keep: bool,
}

impl TempFile {
    fn create(path: PathBuf) -> Result<(Self, File), LocalAIError> {
        let file = File::create(&path).map_err(|source| LocalAIError::WriteFailed {
            path: path.clone(),
            source,
        })?;
        Ok((Self { path, keep: false }, file))
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persist(mut self) {
        self.keep = true;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on a random local port.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/artifact", addr)
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn fetcher() -> ArtifactFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ArtifactFetcher::with_client(client).with_progress(false)
    }

    #[tokio::test]
    async fn test_fetch_gzip_artifact() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("x");
        let url = serve_once("200 OK", gzip(b"OK")).await;

        let path = fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap();

        assert_eq!(path, dest);
        assert_eq!(fs::read(&dest).unwrap(), b"OK");
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_plain_artifact_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("model.gguf");
        fs::write(&dest, b"old weights").unwrap();
        let url = serve_once("200 OK", b"new weights".to_vec()).await;

        fetcher()
            .fetch(&ArtifactInfo::model(url, &dest))
            .await
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"new weights");
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested").join(".c6").join("c6.db");
        let url = serve_once("200 OK", gzip(b"sqlite")).await;

        fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"sqlite");
    }

    #[tokio::test]
    async fn test_fetch_http_error_leaves_no_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("x");
        let url = serve_once("404 Not Found", b"not here".to_vec()).await;

        let err = fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap_err();

        match err {
            LocalAIError::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_malformed_gzip_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("c6.db");
        fs::write(&dest, b"previous database").unwrap();
        let url = serve_once("200 OK", b"<html>definitely not gzip</html>".to_vec()).await;

        let err = fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap_err();

        assert!(matches!(err, LocalAIError::DecompressFailed { .. }), "{err}");
        assert_eq!(fs::read(&dest).unwrap(), b"previous database");
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_truncated_gzip_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("c6.db");
        let mut body = gzip(b"a database that is cut short on the wire");
        body.truncate(body.len() - 6);
        let url = serve_once("200 OK", body).await;

        let err = fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap_err();

        assert!(matches!(err, LocalAIError::DecompressFailed { .. }), "{err}");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_gzip_with_trailing_garbage_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("c6.db");
        fs::write(&dest, b"previous database").unwrap();
        let mut body = gzip(b"OK");
        body.extend_from_slice(b"junkjunk");
        let url = serve_once("200 OK", body).await;

        let err = fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap_err();

        assert!(matches!(err, LocalAIError::DecompressFailed { .. }), "{err}");
        assert_eq!(fs::read(&dest).unwrap(), b"previous database");
        assert!(!temp_path(&dest).exists());
    }

    #[test]
    fn test_gzip_writer_rejects_trailing_data() {
        let dir = tempdir().unwrap();
        let file = File::create(dir.path().join("out")).unwrap();
        let mut writer = ArtifactWriter::new(file, Compression::Gzip);
        let mut body = gzip(b"OK");
        body.extend_from_slice(b"junkjunk");

        let err = writer.write_chunk(&body).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_fetch_checksum_mismatch() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("model.gguf");
        let url = serve_once("200 OK", b"weights".to_vec()).await;
        let artifact = ArtifactInfo::model(url, &dest).with_sha256("00".repeat(32));

        let err = fetcher().fetch(&artifact).await.unwrap_err();

        assert!(matches!(err, LocalAIError::ChecksumMismatch { .. }), "{err}");
        assert!(!dest.exists());
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_checksum_match() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("model.gguf");
        let url = serve_once("200 OK", b"weights".to_vec()).await;
        let expected = hex::encode(Sha256::digest(b"weights"));
        let artifact = ArtifactInfo::model(url, &dest).with_sha256(expected);

        fetcher().fetch(&artifact).await.unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"weights");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempdir().unwrap();
        let dest = dir.path().join("c6.db");
        let url = format!("http://{}/c6.db.gz", addr);

        let err = fetcher()
            .fetch(&ArtifactInfo::database(url, &dest))
            .await
            .unwrap_err();

        assert!(matches!(err, LocalAIError::DownloadFailed { .. }), "{err}");
        assert!(!dest.exists());
    }
}
