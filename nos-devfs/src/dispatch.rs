//! DevFS dispatcher
//!
//! Entry points the host VFS calls for paths under the mount point. Paths are
//! the remainder after the mount prefix, without normalization.

use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};

use crate::attestation;
use crate::config::DevFsConfig;
use crate::devices;
use crate::error::{invalid_handle_state, BuildError, DevError, DevResult};
use crate::handle::{DirView, Handle, HandleKind, HandleRepr};
use crate::node::{NodeData, NodeId};
use crate::ops::DeviceBinding;
use crate::registry::{Registry, TreeBuilder};
use crate::types::{DirEntry, FileAttr, FileMode, NodeKind, OpenFlags};

/// Mounted `/dev` instance
#[derive(Debug, Clone)]
pub struct DevFs {
    registry: Arc<Registry>,
}

impl DevFs {
    /// Build the standard device tree
    pub fn new(config: &DevFsConfig) -> Result<Self, BuildError> {
        let mut builder = TreeBuilder::new(crate::DEVFS_NAME);
        let mut count = devices::populate(&mut builder, config)?;
        if cfg!(feature = "attestation") {
            builder.add_spec("", attestation::spec(config))?;
            count += 1;
        }
        builder.expect_len("", count)?;
        Ok(Self::from_registry(builder.build()?))
    }

    /// Serve an already built tree
    pub fn from_registry(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn lookup(&self, path: &str) -> DevResult<NodeKind> {
        let id = self.registry.resolve(path)?;
        Ok(self.registry.node(id).kind())
    }

    /// Open a node. Flags travel with the handle and are never rejected here.
    pub fn open(&self, path: &str, flags: OpenFlags) -> DevResult<Handle> {
        let id = self.registry.resolve(path)?;
        let node = self.registry.node(id);
        let repr = match &node.data {
            NodeData::Directory { .. } => HandleRepr::Directory(DirView::new(self.entries(id))),
            NodeData::CharDevice { binding } => HandleRepr::Device(binding.read().clone()),
            NodeData::Symlink { .. } | NodeData::File { .. } => match node.provider() {
                Some(provider) => HandleRepr::Content(provider.open(flags)?),
                None => return Err(DevError::AccessDenied),
            },
        };
        devfs_debug!("devfs: open `{}` ({:?}) flags {:?}", path, node.kind(), flags);
        Ok(Handle::new(path.to_string(), self.registry.tree_id(), id, node.kind(), flags, repr))
    }

    pub fn mode(&self, path: &str) -> DevResult<FileMode> {
        let id = self.registry.resolve(path)?;
        Ok(self.registry.node(id).mode())
    }

    /// List a directory in registration order. Every call starts over.
    pub fn readdir(&self, path: &str) -> DevResult<Vec<DirEntry>> {
        let id = self.registry.resolve(path)?;
        match self.registry.node(id).kind() {
            NodeKind::Directory => Ok(self.entries(id)),
            kind => invalid_handle_state(format_args!("readdir on {:?} `{}`", kind, path)),
        }
    }

    pub fn stat(&self, path: &str) -> DevResult<FileAttr> {
        let id = self.registry.resolve(path)?;
        Ok(self.registry.node(id).attr())
    }

    /// Attributes of the node a handle was opened on
    pub fn hstat(&self, handle: &Handle) -> FileAttr {
        self.check_tree(handle, "hstat");
        self.registry.node(handle.node()).attr()
    }

    /// Stored target of a symlink, verbatim
    pub fn follow_link(&self, path: &str) -> DevResult<String> {
        let id = self.registry.resolve(path)?;
        let node = self.registry.node(id);
        match node.target() {
            Some(target) => Ok(target.to_string()),
            None => invalid_handle_state(format_args!("follow_link on {:?} `{}`", node.kind(), path)),
        }
    }

    /// Point an open device handle at the table currently bound to its node.
    ///
    /// Path, flags and node are left alone. Content and directory handles
    /// have nothing to rebind. The handle must come from this tree and its
    /// path must still name the node it was opened on.
    pub fn rebind(&self, handle: &mut Handle) -> DevResult<()> {
        self.check_tree(handle, "rebind");
        let id = self.registry.resolve(handle.path())?;
        if id != handle.node() {
            invalid_handle_state(format_args!(
                "rebind of `{}`: path now names {:?}, handle holds {:?}",
                handle.path(),
                id,
                handle.node()
            ));
        }
        match (handle.kind(), self.registry.node(id).binding()) {
            (HandleKind::Device, Some(binding)) => {
                devfs_debug!("devfs: rebind `{}` to {:?}", handle.path(), binding);
                handle.rebind(binding);
            }
            (HandleKind::Device, None) => invalid_handle_state(format_args!(
                "rebind of device handle `{}` onto a {:?} node",
                handle.path(),
                self.registry.node(id).kind()
            )),
            (kind, _) => devfs_debug!("devfs: rebind `{}` skipped ({:?} handle)", handle.path(), kind),
        }
        Ok(())
    }

    /// Replace the table bound to a device node
    pub fn set_binding(&self, path: &str, binding: DeviceBinding) -> DevResult<()> {
        self.registry.set_binding(path, binding)
    }

    fn check_tree(&self, handle: &Handle, op: &str) {
        if handle.tree_id() != self.registry.tree_id() {
            invalid_handle_state(format_args!(
                "{} of `{}` from tree {} on tree {}",
                op,
                handle.path(),
                handle.tree_id(),
                self.registry.tree_id()
            ));
        }
    }

    fn entries(&self, dir: NodeId) -> Vec<DirEntry> {
        self.registry
            .node(dir)
            .children()
            .iter()
            .map(|child| {
                let node = self.registry.node(*child);
                DirEntry {
                    name: node.name().to_string(),
                    ino: node.ino(),
                    kind: node.kind(),
                }
            })
            .collect()
    }
}
