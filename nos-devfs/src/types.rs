//! File types, modes and attributes shared by the dispatcher and handles

use alloc::string::String;
use bitflags::bitflags;

/// Kind of a node in the device tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Directory,
    CharDevice,
    Symlink,
    /// Content-backed pseudo-file
    File,
}

impl NodeKind {
    // Linux dirent d_type values
    pub const DT_CHR: u8 = 2;
    pub const DT_DIR: u8 = 4;
    pub const DT_REG: u8 = 8;
    pub const DT_LNK: u8 = 10;

    /// `d_type` reported to the host's readdir
    pub const fn dirent_type(&self) -> u8 {
        match self {
            NodeKind::Directory => Self::DT_DIR,
            NodeKind::CharDevice => Self::DT_CHR,
            NodeKind::Symlink => Self::DT_LNK,
            NodeKind::File => Self::DT_REG,
        }
    }
}

/// File mode/permissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileMode(pub u32);

impl FileMode {
    pub const S_IFMT: u32   = 0o170000;  // Type mask
    pub const S_IFREG: u32  = 0o100000;  // Regular file
    pub const S_IFDIR: u32  = 0o040000;  // Directory
    pub const S_IFCHR: u32  = 0o020000;  // Character device
    pub const S_IFLNK: u32  = 0o120000;  // Symbolic link

    // Permission bits reported per node kind
    pub const PERM_DIR: u32     = 0o555;
    pub const PERM_FILE_R: u32  = 0o444;
    pub const PERM_FILE_RW: u32 = 0o666;
    pub const PERM_LINK: u32    = 0o777;

    pub const fn new(mode: u32) -> Self {
        Self(mode)
    }

    /// Mode for a node of `kind` with permission bits `perm`
    pub const fn for_kind(kind: NodeKind, perm: u32) -> Self {
        let ty = match kind {
            NodeKind::Directory => Self::S_IFDIR,
            NodeKind::CharDevice => Self::S_IFCHR,
            NodeKind::Symlink => Self::S_IFLNK,
            NodeKind::File => Self::S_IFREG,
        };
        Self(ty | (perm & 0o7777))
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self.0 & Self::S_IFMT {
            Self::S_IFDIR => Some(NodeKind::Directory),
            Self::S_IFCHR => Some(NodeKind::CharDevice),
            Self::S_IFLNK => Some(NodeKind::Symlink),
            Self::S_IFREG => Some(NodeKind::File),
            _ => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.0 & Self::S_IFMT == Self::S_IFDIR
    }

    pub fn permissions(&self) -> u32 {
        self.0 & 0o777
    }
}

/// File attributes (stat structure equivalent)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAttr {
    pub ino: u64,           // Inode number
    pub mode: FileMode,     // Mode and permissions
    pub nlink: u32,         // Number of hard links
    pub uid: u32,           // Owner user ID
    pub gid: u32,           // Owner group ID
    pub size: u64,          // Size in bytes
    pub blksize: u32,       // Block size
    pub blocks: u64,        // Number of 512B blocks
    pub rdev: u64,          // Device ID (for device files)
}

/// Block size reported by stat
pub const BLOCK_SIZE: u32 = 4096;

/// Encode a device identity the way Linux `makedev` does
pub const fn makedev(major: u32, minor: u32) -> u64 {
    let major = major as u64;
    let minor = minor as u64;
    ((major & 0xffff_f000) << 32)
        | ((major & 0x0000_0fff) << 8)
        | ((minor & 0xffff_ff00) << 12)
        | (minor & 0x0000_00ff)
}

/// Seek whence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    Set,  // Absolute position
    Cur,  // Relative to current
    End,  // Relative to end
}

/// Directory entry for readdir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub ino: u64,
    pub kind: NodeKind,
}

bitflags! {
    /// Open intent passed through from the host
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u32 {
        const READ      = 0b0001;
        const WRITE     = 0b0010;
        const TRUNCATE  = 0b0100;
        const DIRECTORY = 0b1000;
    }
}

bitflags! {
    /// Readiness bits for poll
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PollFlags: u32 {
        const READ  = 0b001;
        const WRITE = 0b010;
        /// Size query; always answered with an empty set
        const SIZE  = 0b100;
    }
}
