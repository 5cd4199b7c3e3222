// Storage seam: the session resolves virtual paths, the filesystem does I/O.

pub mod error;
pub mod filesystem;
pub mod path;

pub use error::{FsError, PathError};
pub use filesystem::{DirEntry, FileKind, FileStat, Filesystem, LocalFilesystem, WriteMode};
pub use path::{resolve_virtual, to_real_path, virtual_file_name, virtual_parent};
