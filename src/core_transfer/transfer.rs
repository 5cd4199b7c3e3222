use crate::core_fs::{DirEntry, Filesystem, FsError, WriteMode};
use crate::core_perm::Permissions;
use crate::core_transfer::ascii::{AsciiDecoder, AsciiEncoder};
use crate::core_transfer::error::TransferError;
use crate::core_transfer::listing::{render_listing, ListFormat};
use chrono::Local;
use log::debug;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

impl TransferType {
    pub fn describe(&self) -> &'static str {
        match self {
            TransferType::Ascii => "ASCII",
            TransferType::Binary => "Binary",
        }
    }
}

/// What a data command moves, with its real path already confined.
#[derive(Debug, Clone)]
pub enum TransferRequest {
    Download {
        path: PathBuf,
        /// Restart marker from REST; zero sends the whole file.
        offset: u64,
    },
    Upload {
        path: PathBuf,
        mode: WriteMode,
    },
    Listing {
        path: PathBuf,
        format: ListFormat,
        permissions: Permissions,
    },
}

impl TransferRequest {
    pub fn direction(&self) -> &'static str {
        match self {
            TransferRequest::Download { .. } => "download",
            TransferRequest::Upload { .. } => "upload",
            TransferRequest::Listing { .. } => "listing",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TransferSettings {
    pub upload_buffer_size: usize,
    pub download_buffer_size: usize,
    /// Bound on every single read or write on the data connection.
    pub timeout: Duration,
}

/// Runs one transfer over an established data connection.
///
/// The data stream is shut down on success. On failure the caller drops it,
/// which aborts the connection; the control channel is unaffected.
///
/// # Returns
///
/// The number of bytes that crossed the data connection.
pub async fn execute_transfer<S>(
    request: &TransferRequest,
    data: &mut S,
    fs: &dyn Filesystem,
    transfer_type: TransferType,
    settings: &TransferSettings,
) -> Result<u64, TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let progress = AtomicU64::new(0);
    execute_transfer_tracked(request, data, fs, transfer_type, settings, &progress).await
}

/// [`execute_transfer`], counting bytes in `progress` as they cross the data
/// connection so an abort can tell whether anything moved yet.
pub async fn execute_transfer_tracked<S>(
    request: &TransferRequest,
    data: &mut S,
    fs: &dyn Filesystem,
    transfer_type: TransferType,
    settings: &TransferSettings,
    progress: &AtomicU64,
) -> Result<u64, TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let transferred = match request {
        TransferRequest::Download { path, offset } => {
            send_file(path, *offset, data, fs, transfer_type, settings, progress).await?
        }
        TransferRequest::Upload { path, mode } => {
            receive_file(path, *mode, data, fs, transfer_type, settings, progress).await?
        }
        TransferRequest::Listing {
            path,
            format,
            permissions,
        } => {
            let entries = collect_entries(path, fs).await?;
            let payload = render_listing(*format, &entries, *permissions, &Local::now());
            with_timeout(settings.timeout, data.write_all(&payload)).await?;
            progress.fetch_add(payload.len() as u64, Ordering::Relaxed);
            payload.len() as u64
        }
    };

    let closed = with_timeout(settings.timeout, data.shutdown()).await;
    match (request, closed) {
        (_, Ok(())) => {}
        // The upload is complete; a peer that already hung up is fine.
        (TransferRequest::Upload { .. }, Err(e)) => {
            debug!("Data connection close after upload failed: {}", e)
        }
        (_, Err(e)) => return Err(e),
    }
    debug!("{} finished, {} bytes", request.direction(), transferred);
    Ok(transferred)
}

/// Entries of a directory, or the single entry for a plain file.
pub async fn collect_entries(
    path: &Path,
    fs: &dyn Filesystem,
) -> Result<Vec<DirEntry>, TransferError> {
    let stat = fs.stat(path).await.map_err(TransferError::Local)?;
    if stat.is_dir() {
        fs.list_dir(path).await.map_err(TransferError::Local)
    } else {
        Ok(vec![DirEntry {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            stat,
        }])
    }
}

async fn send_file<S>(
    path: &Path,
    offset: u64,
    data: &mut S,
    fs: &dyn Filesystem,
    transfer_type: TransferType,
    settings: &TransferSettings,
    progress: &AtomicU64,
) -> Result<u64, TransferError>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    let mut reader = fs
        .open_for_read(path, offset)
        .await
        .map_err(TransferError::Local)?;
    let mut buffer = vec![0; settings.download_buffer_size];
    let mut encoder = AsciiEncoder::default();
    let mut encoded = Vec::new();
    let mut total = 0u64;

    loop {
        let n = reader
            .read(&mut buffer)
            .await
            .map_err(|e| TransferError::Local(FsError::from(e)))?;
        if n == 0 {
            break;
        }
        let chunk = match transfer_type {
            TransferType::Binary => &buffer[..n],
            TransferType::Ascii => {
                encoded.clear();
                encoder.encode(&buffer[..n], &mut encoded);
                &encoded[..]
            }
        };
        with_timeout(settings.timeout, data.write_all(chunk)).await?;
        total += chunk.len() as u64;
        progress.fetch_add(chunk.len() as u64, Ordering::Relaxed);
    }

    Ok(total)
}

async fn receive_file<S>(
    path: &Path,
    mode: WriteMode,
    data: &mut S,
    fs: &dyn Filesystem,
    transfer_type: TransferType,
    settings: &TransferSettings,
    progress: &AtomicU64,
) -> Result<u64, TransferError>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut writer = fs
        .open_for_write(path, mode)
        .await
        .map_err(TransferError::Local)?;
    let mut buffer = vec![0; settings.upload_buffer_size];
    let mut decoder = AsciiDecoder::default();
    let mut decoded = Vec::new();
    let mut total = 0u64;

    loop {
        let n = match timeout(settings.timeout, data.read(&mut buffer)).await {
            Ok(Ok(n)) => n,
            // TLS peers that close without close_notify still delivered everything.
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => 0,
            Ok(Err(e)) => return Err(TransferError::Connection(e)),
            Err(_) => return Err(TransferError::TimedOut),
        };
        if n == 0 {
            break;
        }
        total += n as u64;
        progress.fetch_add(n as u64, Ordering::Relaxed);
        let chunk = match transfer_type {
            TransferType::Binary => &buffer[..n],
            TransferType::Ascii => {
                decoded.clear();
                decoder.decode(&buffer[..n], &mut decoded);
                &decoded[..]
            }
        };
        writer
            .write_all(chunk)
            .await
            .map_err(|e| TransferError::Local(FsError::from(e)))?;
    }

    decoded.clear();
    decoder.finish(&mut decoded);
    writer
        .write_all(&decoded)
        .await
        .map_err(|e| TransferError::Local(FsError::from(e)))?;
    writer
        .shutdown()
        .await
        .map_err(|e| TransferError::Local(FsError::from(e)))?;

    Ok(total)
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = io::Result<T>>,
) -> Result<T, TransferError> {
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TransferError::Connection(e)),
        Err(_) => Err(TransferError::TimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_fs::LocalFilesystem;
    use tempfile::TempDir;
    use tokio::io::duplex;

    fn settings() -> TransferSettings {
        TransferSettings {
            upload_buffer_size: 4,
            download_buffer_size: 4,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_download_binary_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"a\r\nb\nc\r").unwrap();

        let (mut server, mut client) = duplex(1024);
        let request = TransferRequest::Download { path, offset: 0 };
        let sent = execute_transfer(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Binary,
            &settings(),
        )
        .await
        .unwrap();
        drop(server);

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(sent, 7);
        assert_eq!(received, b"a\r\nb\nc\r");
    }

    #[tokio::test]
    async fn test_download_ascii_converts_line_endings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("text");
        std::fs::write(&path, b"one\ntwo\r\nthree\n").unwrap();

        let (mut server, mut client) = duplex(1024);
        let request = TransferRequest::Download { path, offset: 0 };
        execute_transfer(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Ascii,
            &settings(),
        )
        .await
        .unwrap();
        drop(server);

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"one\r\ntwo\r\nthree\r\n");
    }

    #[tokio::test]
    async fn test_upload_ascii_and_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload.txt");
        std::fs::write(&path, b"head\n").unwrap();

        let (mut server, mut client) = duplex(1024);
        client.write_all(b"x\r\ny\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let request = TransferRequest::Upload {
            path: path.clone(),
            mode: WriteMode::Append,
        };
        let received = execute_transfer(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Ascii,
            &settings(),
        )
        .await
        .unwrap();

        assert_eq!(received, 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"head\nx\ny\n");
    }

    #[tokio::test]
    async fn test_download_resumes_at_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial");
        std::fs::write(&path, b"abcdefgh").unwrap();

        let (mut server, mut client) = duplex(1024);
        let request = TransferRequest::Download { path, offset: 5 };
        let progress = AtomicU64::new(0);
        let sent = execute_transfer_tracked(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Binary,
            &settings(),
            &progress,
        )
        .await
        .unwrap();
        drop(server);

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"fgh");
        assert_eq!(sent, 3);
        assert_eq!(progress.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_local_error() {
        let dir = TempDir::new().unwrap();
        let (mut server, _client) = duplex(64);
        let request = TransferRequest::Download {
            path: dir.path().join("nope"),
            offset: 0,
        };
        let err = execute_transfer(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Binary,
            &settings(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_ftp_response(), "550 No such file or directory.");
    }

    #[tokio::test]
    async fn test_peer_reset_mid_download_is_426() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big");
        std::fs::write(&path, vec![7u8; 64 * 1024]).unwrap();

        let (mut server, client) = duplex(16);
        drop(client);
        let request = TransferRequest::Download { path, offset: 0 };
        let err = execute_transfer(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Binary,
            &settings(),
        )
        .await
        .unwrap_err();
        assert!(err.to_ftp_response().starts_with("426"));
    }

    #[tokio::test]
    async fn test_listing_of_single_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("only.txt"), b"abc").unwrap();

        let (mut server, mut client) = duplex(1024);
        let request = TransferRequest::Listing {
            path: dir.path().join("only.txt"),
            format: ListFormat::Names,
            permissions: Permissions::all(),
        };
        execute_transfer(
            &request,
            &mut server,
            &LocalFilesystem,
            TransferType::Ascii,
            &settings(),
        )
        .await
        .unwrap();
        drop(server);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "only.txt\r\n");
    }
}
