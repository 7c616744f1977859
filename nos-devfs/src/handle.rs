//! Open handles and the I/O multiplexer
//!
//! Every handle carries exactly one representation. The table below is the
//! contract the multiplexer enforces:
//!
//! | op                    | content     | device, slot set | device, slot unset | directory    |
//! |-----------------------|-------------|------------------|--------------------|--------------|
//! | read/write/seek       | backend     | table            | `AccessDenied`     | `AccessDenied` |
//! | truncate              | no-op `Ok`  | table            | `AccessDenied`     | `AccessDenied` |
//! | flush/close           | backend     | table            | `Ok`               | `Ok`         |

use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use crate::content::ContentBackend;
use crate::error::{DevError, DevResult};
use crate::node::NodeId;
use crate::ops::{DeviceBinding, DeviceOps, DeviceSlots};
use crate::types::{DirEntry, NodeKind, OpenFlags, PollFlags, SeekWhence};

/// Representation tag of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Content,
    Device,
    Directory,
}

/// Snapshot of a directory's children taken at open
#[derive(Debug, Clone, Default)]
pub struct DirView {
    entries: Vec<DirEntry>,
}

impl DirView {
    pub fn new(entries: Vec<DirEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }
}

pub enum HandleRepr {
    Content(Box<dyn ContentBackend>),
    Device(DeviceBinding),
    Directory(DirView),
}

impl HandleRepr {
    pub fn kind(&self) -> HandleKind {
        match self {
            HandleRepr::Content(_) => HandleKind::Content,
            HandleRepr::Device(_) => HandleKind::Device,
            HandleRepr::Directory(_) => HandleKind::Directory,
        }
    }
}

/// Open instance of a node
pub struct Handle {
    path: String,
    tree: usize,
    node: NodeId,
    node_kind: NodeKind,
    flags: OpenFlags,
    repr: HandleRepr,
}

fn device_op<'a>(binding: &'a DeviceBinding, slot: DeviceSlots, path: &str) -> DevResult<&'a dyn DeviceOps> {
    if binding.has(slot) {
        Ok(binding.ops().as_ref())
    } else {
        devfs_trace!("devfs: `{}` has no {:?} slot", path, slot);
        Err(DevError::AccessDenied)
    }
}

impl Handle {
    pub(crate) fn new(
        path: String,
        tree: usize,
        node: NodeId,
        node_kind: NodeKind,
        flags: OpenFlags,
        repr: HandleRepr,
    ) -> Self {
        Self {
            path,
            tree,
            node,
            node_kind,
            flags,
            repr,
        }
    }

    /// Path remainder the handle was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Id of the tree the handle was opened in
    pub fn tree_id(&self) -> usize {
        self.tree
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Kind of the node this handle was opened on
    pub fn node_kind(&self) -> NodeKind {
        self.node_kind
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn kind(&self) -> HandleKind {
        self.repr.kind()
    }

    /// Bound table of a device handle
    pub fn binding(&self) -> Option<&DeviceBinding> {
        match &self.repr {
            HandleRepr::Device(binding) => Some(binding),
            _ => None,
        }
    }

    /// Children of a directory handle
    pub fn dir_entries(&self) -> Option<&[DirEntry]> {
        match &self.repr {
            HandleRepr::Directory(view) => Some(view.entries()),
            _ => None,
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> DevResult<usize> {
        match &mut self.repr {
            HandleRepr::Content(backend) => backend.read(buf),
            HandleRepr::Device(binding) => device_op(binding, DeviceSlots::READ, &self.path)?.read(buf),
            HandleRepr::Directory(_) => Err(DevError::AccessDenied),
        }
    }

    pub fn write(&mut self, buf: &[u8]) -> DevResult<usize> {
        match &mut self.repr {
            HandleRepr::Content(backend) => backend.write(buf),
            HandleRepr::Device(binding) => device_op(binding, DeviceSlots::WRITE, &self.path)?.write(buf),
            HandleRepr::Directory(_) => Err(DevError::AccessDenied),
        }
    }

    pub fn seek(&mut self, offset: i64, whence: SeekWhence) -> DevResult<i64> {
        match &mut self.repr {
            HandleRepr::Content(backend) => backend.seek(offset, whence),
            HandleRepr::Device(binding) => {
                device_op(binding, DeviceSlots::SEEK, &self.path)?.seek(offset, whence)
            }
            HandleRepr::Directory(_) => Err(DevError::AccessDenied),
        }
    }

    /// Truncate. Content is pre-populated, so opening it for writing
    /// (`fopen("w")`) must not fail here.
    pub fn truncate(&mut self, len: u64) -> DevResult<()> {
        match &mut self.repr {
            HandleRepr::Content(_) => Ok(()),
            HandleRepr::Device(binding) => device_op(binding, DeviceSlots::TRUNCATE, &self.path)?.truncate(len),
            HandleRepr::Directory(_) => Err(DevError::AccessDenied),
        }
    }

    pub fn flush(&mut self) -> DevResult<()> {
        match &mut self.repr {
            HandleRepr::Content(backend) => backend.flush(),
            HandleRepr::Device(binding) if binding.has(DeviceSlots::FLUSH) => binding.ops().flush(),
            HandleRepr::Device(_) | HandleRepr::Directory(_) => Ok(()),
        }
    }

    /// Close and release the handle
    pub fn close(mut self) -> DevResult<()> {
        match &mut self.repr {
            HandleRepr::Content(backend) => backend.close(),
            HandleRepr::Device(binding) if binding.has(DeviceSlots::CLOSE) => binding.ops().close(),
            HandleRepr::Device(_) | HandleRepr::Directory(_) => Ok(()),
        }
    }

    /// Readiness query. Pseudo-devices never block, so readiness mirrors the
    /// bound slots; a size query always answers with an empty set.
    pub fn poll(&self, requested: PollFlags) -> PollFlags {
        if requested == PollFlags::SIZE {
            return PollFlags::empty();
        }
        let mut ready = PollFlags::empty();
        match &self.repr {
            HandleRepr::Device(binding) => {
                if requested.contains(PollFlags::READ) && binding.has(DeviceSlots::READ) {
                    ready |= PollFlags::READ;
                }
                if requested.contains(PollFlags::WRITE) && binding.has(DeviceSlots::WRITE) {
                    ready |= PollFlags::WRITE;
                }
            }
            HandleRepr::Content(backend) => {
                ready |= requested & PollFlags::READ;
                if requested.contains(PollFlags::WRITE) && backend.writable() {
                    ready |= PollFlags::WRITE;
                }
            }
            HandleRepr::Directory(_) => {}
        }
        ready
    }

    /// Swap in a new device binding; returns false for other representations
    pub(crate) fn rebind(&mut self, binding: DeviceBinding) -> bool {
        match &mut self.repr {
            HandleRepr::Device(current) => {
                *current = binding;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("path", &self.path)
            .field("tree", &self.tree)
            .field("node", &self.node)
            .field("kind", &self.kind())
            .field("flags", &self.flags)
            .finish()
    }
}
