use crate::constants::MAX_SYMLINK_HOPS;
use crate::core_fs::error::FsError;
use async_trait::async_trait;
use filetime::{set_file_mtime, FileTime};
use std::ffi::OsString;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::io::SeekFrom;
use std::time::SystemTime;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWrite};

pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// How an upload target is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Created if missing, emptied otherwise.
    Truncate,
    /// Created if missing, written after the current end.
    Append,
    /// An existing file, overwritten from this offset on (REST + STOR).
    At(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
}

#[derive(Debug, Clone)]
pub struct FileStat {
    pub kind: FileKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Unix permission bits, or a synthesized value elsewhere.
    pub mode: u32,
}

impl FileStat {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub stat: FileStat,
}

/// Storage operations the FTP core needs.
///
/// Paths handed to implementations are real paths that have already been
/// confined to the user's home directory.
#[async_trait]
pub trait Filesystem: Send + Sync + Debug {
    /// Opens `path` for reading, positioned at `offset`.
    async fn open_for_read(&self, path: &Path, offset: u64) -> Result<FileReader, FsError>;

    async fn open_for_write(&self, path: &Path, mode: WriteMode) -> Result<FileWriter, FsError>;

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError>;

    async fn remove(&self, path: &Path) -> Result<(), FsError>;

    async fn remove_dir(&self, path: &Path) -> Result<(), FsError>;

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    async fn make_dir(&self, path: &Path) -> Result<(), FsError>;

    async fn set_mode(&self, path: &Path, mode: u32) -> Result<(), FsError>;

    async fn set_modified(&self, path: &Path, time: SystemTime) -> Result<(), FsError>;

    async fn stat(&self, path: &Path) -> Result<FileStat, FsError>;

    /// Where `path` really points once every symlink is followed. A missing
    /// tail is kept as written, so targets of STOR or MKD resolve too.
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError>;
}

/// [`Filesystem`] backed by the local disk through `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn open_for_read(&self, path: &Path, offset: u64) -> Result<FileReader, FsError> {
        let mut file = File::open(path).await?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::new(file))
    }

    async fn open_for_write(&self, path: &Path, mode: WriteMode) -> Result<FileWriter, FsError> {
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Truncate => options.create(true).write(true).truncate(true),
            WriteMode::Append => options.create(true).append(true),
            WriteMode::At(_) => options.write(true),
        };
        let mut file = options.open(path).await?;
        if let WriteMode::At(offset) = mode {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::new(file))
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError> {
        if !self.stat(path).await?.is_dir() {
            return Err(FsError::NotADirectory);
        }

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let metadata = match fs::symlink_metadata(entry.path()).await {
                Ok(metadata) => metadata,
                // Raced with a concurrent delete.
                Err(_) => continue,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                stat: to_file_stat(&metadata),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn remove(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path).await?;
        Ok(())
    }

    async fn remove_dir(&self, path: &Path) -> Result<(), FsError> {
        if !self.stat(path).await?.is_dir() {
            return Err(FsError::NotADirectory);
        }
        fs::remove_dir(path).await?;
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).await?;
        Ok(())
    }

    async fn make_dir(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir(path).await?;
        Ok(())
    }

    async fn set_mode(&self, path: &Path, mode: u32) -> Result<(), FsError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
            Ok(())
        }
        #[cfg(not(unix))]
        {
            let _ = (path, mode);
            Err(FsError::Unsupported)
        }
    }

    async fn set_modified(&self, path: &Path, time: SystemTime) -> Result<(), FsError> {
        let path = path.to_path_buf();
        let mtime = FileTime::from_system_time(time);
        tokio::task::spawn_blocking(move || set_file_mtime(path, mtime))
            .await
            .map_err(|e| FsError::Io(io::Error::new(io::ErrorKind::Other, e)))??;
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileStat, FsError> {
        let metadata = fs::metadata(path).await?;
        Ok(to_file_stat(&metadata))
    }

    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        let mut current = path.to_path_buf();
        let mut missing: Vec<OsString> = Vec::new();
        let mut hops = 0;

        loop {
            let err = match fs::canonicalize(&current).await {
                Ok(mut resolved) => {
                    for name in missing.iter().rev() {
                        resolved.push(name);
                    }
                    return Ok(resolved);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => e,
                Err(e) => return Err(e.into()),
            };

            // A dangling link still decides where a new file would land.
            let is_link = fs::symlink_metadata(&current)
                .await
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if is_link {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(FsError::NotFound);
                }
                let target = fs::read_link(&current).await?;
                current = match current.parent() {
                    Some(parent) => parent.join(target),
                    None => target,
                };
                continue;
            }

            match (current.parent(), current.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    current = parent.to_path_buf();
                }
                _ => return Err(err.into()),
            }
        }
    }
}

fn to_file_stat(metadata: &std::fs::Metadata) -> FileStat {
    let kind = if metadata.file_type().is_symlink() {
        FileKind::Symlink
    } else if metadata.is_dir() {
        FileKind::Dir
    } else {
        FileKind::File
    };

    FileStat {
        kind,
        size: metadata.len(),
        modified: metadata.modified().ok(),
        mode: file_mode(metadata),
    }
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}
