//! DevFS error types

use alloc::string::String;
use core::fmt;

/// Linux errno values reported to the host VFS
pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EACCES: i32 = 13;
    pub const EINVAL: i32 = 22;
    pub const ENOSPC: i32 = 28;
}

/// Runtime errors returned by lookups and handle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevError {
    /// No node matches the path
    NotFound,
    /// The operation slot is absent for this handle
    AccessDenied,
    /// A backend failed with a host errno
    Io(i32),
}

impl DevError {
    /// Errno for the host error surface
    pub const fn errno(&self) -> i32 {
        match self {
            DevError::NotFound => errno::ENOENT,
            DevError::AccessDenied => errno::EACCES,
            DevError::Io(code) => *code,
        }
    }
}

impl fmt::Display for DevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevError::NotFound => write!(f, "No such device node"),
            DevError::AccessDenied => write!(f, "Operation not supported by device"),
            DevError::Io(code) => write!(f, "I/O error (errno {})", code),
        }
    }
}

pub type DevResult<T> = Result<T, DevError>;

/// Construction defects found while building the node tree.
///
/// These abort initialization; they never reach end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Two siblings share a name
    DuplicateName { parent: String, name: String },
    /// A directory declared a child count that does not match its children
    ChildCountMismatch { dir: String, declared: usize, actual: usize },
    /// The parent path of an incremental insert does not exist
    ParentNotFound(String),
    /// The parent path of an incremental insert is not a directory
    NotADirectory(String),
    /// Empty name or a name containing `/`
    InvalidName(String),
    /// No entropy source was configured for the random devices
    MissingEntropySource,
}

impl BuildError {
    pub const fn errno(&self) -> i32 {
        errno::EINVAL
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DuplicateName { parent, name } => {
                write!(f, "Duplicate entry `{}` in `{}`", name, parent)
            }
            BuildError::ChildCountMismatch { dir, declared, actual } => write!(
                f,
                "Directory `{}` declares {} entries but has {}",
                dir, declared, actual
            ),
            BuildError::ParentNotFound(path) => write!(f, "Parent `{}` not found", path),
            BuildError::NotADirectory(path) => write!(f, "Parent `{}` is not a directory", path),
            BuildError::InvalidName(name) => write!(f, "Invalid entry name `{}`", name),
            BuildError::MissingEntropySource => write!(f, "No entropy source configured for random devices"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DevError {}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}

/// Abort on a caller-contract violation.
///
/// Reaching this means the host dispatched an operation to the wrong node
/// kind; it is a defect in the calling layer, not a runtime condition.
#[cold]
#[track_caller]
pub(crate) fn invalid_handle_state(what: fmt::Arguments<'_>) -> ! {
    devfs_error!("invalid handle state: {}", what);
    panic!("invalid handle state: {}", what)
}
