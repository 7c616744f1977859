//! Node model
//!
//! [`NodeSpec`] is the declarative description handed to the builder;
//! [`Node`] is the arena entry the registry resolves paths against.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;
use spin::RwLock;

use crate::content::{ContentProvider, TextFile};
use crate::ops::DeviceBinding;
use crate::types::{FileAttr, FileMode, NodeKind, BLOCK_SIZE};

/// Index of a node in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Declarative description of a subtree
pub enum NodeSpec {
    Directory {
        name: String,
        declared_len: Option<usize>,
        children: Vec<NodeSpec>,
    },
    CharDevice {
        name: String,
        binding: DeviceBinding,
    },
    Symlink {
        name: String,
        target: String,
    },
    File {
        name: String,
        provider: Arc<dyn ContentProvider>,
        perm: u32,
    },
}

impl NodeSpec {
    pub fn dir(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        NodeSpec::Directory {
            name: name.into(),
            declared_len: None,
            children,
        }
    }

    pub fn device(name: impl Into<String>, binding: DeviceBinding) -> Self {
        NodeSpec::CharDevice {
            name: name.into(),
            binding,
        }
    }

    pub fn symlink(name: impl Into<String>, target: impl Into<String>) -> Self {
        NodeSpec::Symlink {
            name: name.into(),
            target: target.into(),
        }
    }

    pub fn file(name: impl Into<String>, provider: Arc<dyn ContentProvider>, perm: u32) -> Self {
        NodeSpec::File {
            name: name.into(),
            provider,
            perm,
        }
    }

    /// Declare how many children a directory must end up with.
    /// Ignored for other kinds.
    pub fn with_declared_len(mut self, len: usize) -> Self {
        if let NodeSpec::Directory { declared_len, .. } = &mut self {
            *declared_len = Some(len);
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            NodeSpec::Directory { name, .. }
            | NodeSpec::CharDevice { name, .. }
            | NodeSpec::Symlink { name, .. }
            | NodeSpec::File { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeSpec::Directory { .. } => NodeKind::Directory,
            NodeSpec::CharDevice { .. } => NodeKind::CharDevice,
            NodeSpec::Symlink { .. } => NodeKind::Symlink,
            NodeSpec::File { .. } => NodeKind::File,
        }
    }
}

pub(crate) enum NodeData {
    Directory { children: Vec<NodeId> },
    CharDevice { binding: RwLock<DeviceBinding> },
    Symlink { target: String },
    File { provider: Arc<dyn ContentProvider>, perm: u32 },
}

/// Entry in the device tree
pub struct Node {
    name: String,
    ino: u64,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(name: String, ino: u64, data: NodeData) -> Self {
        Self { name, ino, data }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ino(&self) -> u64 {
        self.ino
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Directory { .. } => NodeKind::Directory,
            NodeData::CharDevice { .. } => NodeKind::CharDevice,
            NodeData::Symlink { .. } => NodeKind::Symlink,
            NodeData::File { .. } => NodeKind::File,
        }
    }

    /// Children in registration order; empty for non-directories
    pub fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Directory { children } => children,
            _ => &[],
        }
    }

    /// Current binding of a device node
    pub fn binding(&self) -> Option<DeviceBinding> {
        match &self.data {
            NodeData::CharDevice { binding } => Some(binding.read().clone()),
            _ => None,
        }
    }

    /// Symlink target
    pub fn target(&self) -> Option<&str> {
        match &self.data {
            NodeData::Symlink { target } => Some(target),
            _ => None,
        }
    }

    /// Content source for file and symlink nodes
    pub(crate) fn provider(&self) -> Option<Arc<dyn ContentProvider>> {
        match &self.data {
            NodeData::File { provider, .. } => Some(provider.clone()),
            NodeData::Symlink { target } => Some(Arc::new(TextFile::new(target.clone()))),
            _ => None,
        }
    }

    pub fn mode(&self) -> FileMode {
        let perm = match &self.data {
            NodeData::Directory { .. } => FileMode::PERM_DIR,
            NodeData::CharDevice { binding } => binding.read().perm(),
            NodeData::Symlink { .. } => FileMode::PERM_LINK,
            NodeData::File { perm, .. } => *perm,
        };
        FileMode::for_kind(self.kind(), perm)
    }

    pub fn attr(&self) -> FileAttr {
        let (nlink, size, rdev) = match &self.data {
            NodeData::Directory { .. } => (2, 0, 0),
            NodeData::CharDevice { binding } => (1, 0, binding.read().rdev()),
            NodeData::Symlink { target } => (1, target.len() as u64, 0),
            NodeData::File { provider, .. } => (1, provider.size(), 0),
        };
        FileAttr {
            ino: self.ino,
            mode: self.mode(),
            nlink,
            size,
            blksize: BLOCK_SIZE,
            blocks: size.div_ceil(512),
            rdev,
            ..Default::default()
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("ino", &self.ino)
            .field("kind", &self.kind())
            .finish()
    }
}
