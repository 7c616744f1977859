//! Tree registry
//!
//! The tree is an arena of [`Node`]s with the root directory at index 0.
//! [`TreeBuilder`] accepts declarative [`NodeSpec`] subtrees and incremental
//! `add_*` calls in any mix, then validates sibling uniqueness and declared
//! child counts once in [`TreeBuilder::build`]. After that the registry is
//! only read, apart from swapping the binding of a device node.

use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use hashbrown::HashSet;
use spin::RwLock;

use crate::content::ContentProvider;
use crate::error::{invalid_handle_state, BuildError, DevError, DevResult};
use crate::node::{Node, NodeData, NodeId, NodeSpec};
use crate::ops::DeviceBinding;

/// Split a path remainder into its components.
///
/// Separators at either end and repeated separators are ignored; `.` and
/// `..` are ordinary names.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

fn find_child(nodes: &[Node], dir: NodeId, name: &str) -> Option<NodeId> {
    nodes[dir.0]
        .children()
        .iter()
        .copied()
        .find(|child| nodes[child.0].name() == name)
}

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(1);

/// Immutable device tree
pub struct Registry {
    id: usize,
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
}

impl Registry {
    pub const ROOT: NodeId = NodeId(0);

    /// Incremental builder starting from an empty root
    pub fn builder(root_name: &str) -> TreeBuilder {
        TreeBuilder::new(root_name)
    }

    /// Build a whole tree from one declarative root directory
    pub fn declare(root: NodeSpec) -> Result<Self, BuildError> {
        TreeBuilder::from_spec(root)?.build()
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Identity of this tree; unique among trees built in the process
    pub fn tree_id(&self) -> usize {
        self.id
    }

    /// Parent directory of a node; `None` for the root
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a path remainder to a node. An empty path is the root.
    pub fn resolve(&self, path: &str) -> DevResult<NodeId> {
        let mut current = Self::ROOT;
        for name in components(path) {
            current = find_child(&self.nodes, current, name).ok_or(DevError::NotFound)?;
        }
        Ok(current)
    }

    /// Every node id in arena order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Path remainder of a node, without a leading separator
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            names.push(self.node(current).name());
            current = parent;
        }
        names.reverse();
        names.join("/")
    }

    /// Replace the operation table bound to a device node.
    ///
    /// Open handles keep their old binding until they are rebound.
    pub fn set_binding(&self, path: &str, binding: DeviceBinding) -> DevResult<()> {
        let id = self.resolve(path)?;
        match &self.node(id).data {
            NodeData::CharDevice { binding: slot } => {
                devfs_info!("devfs: rebinding `{}` to {:?}", path, binding);
                *slot.write() = binding;
                Ok(())
            }
            _ => invalid_handle_state(format_args!("set_binding on non-device `{}`", path)),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

/// Builder shared by the declarative and incremental construction styles
pub struct TreeBuilder {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    declared: Vec<Option<usize>>,
}

impl TreeBuilder {
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: alloc::vec![Node::new(
                root_name.to_string(),
                1,
                NodeData::Directory { children: Vec::new() },
            )],
            parents: alloc::vec![None],
            declared: alloc::vec![None],
        }
    }

    /// Start from a declarative root directory spec
    pub fn from_spec(root: NodeSpec) -> Result<Self, BuildError> {
        match root {
            NodeSpec::Directory { name, declared_len, children } => {
                let mut builder = Self::new(&name);
                builder.declared[0] = declared_len;
                for child in children {
                    builder.insert(TreeBuilder::ROOT, child)?;
                }
                Ok(builder)
            }
            other => Err(BuildError::NotADirectory(other.name().to_string())),
        }
    }

    const ROOT: NodeId = NodeId(0);

    fn parent_dir(&self, parent: &str) -> Result<NodeId, BuildError> {
        let mut current = Self::ROOT;
        for name in components(parent) {
            current = find_child(&self.nodes, current, name)
                .ok_or_else(|| BuildError::ParentNotFound(parent.to_string()))?;
        }
        match self.nodes[current.0].data {
            NodeData::Directory { .. } => Ok(current),
            _ => Err(BuildError::NotADirectory(parent.to_string())),
        }
    }

    fn push(&mut self, parent: NodeId, name: String, data: NodeData, declared: Option<usize>) -> Result<NodeId, BuildError> {
        if name.is_empty() || name.contains('/') {
            return Err(BuildError::InvalidName(name));
        }
        let id = NodeId(self.nodes.len());
        match &mut self.nodes[parent.0].data {
            NodeData::Directory { children } => children.push(id),
            _ => return Err(BuildError::NotADirectory(self.path_of(parent))),
        }
        self.nodes.push(Node::new(name, id.0 as u64 + 1, data));
        self.parents.push(Some(parent));
        self.declared.push(declared);
        Ok(id)
    }

    fn insert(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, BuildError> {
        match spec {
            NodeSpec::Directory { name, declared_len, children } => {
                let id = self.push(parent, name, NodeData::Directory { children: Vec::new() }, declared_len)?;
                for child in children {
                    self.insert(id, child)?;
                }
                Ok(id)
            }
            NodeSpec::CharDevice { name, binding } => {
                self.push(parent, name, NodeData::CharDevice { binding: RwLock::new(binding) }, None)
            }
            NodeSpec::Symlink { name, target } => self.push(parent, name, NodeData::Symlink { target }, None),
            NodeSpec::File { name, provider, perm } => {
                self.push(parent, name, NodeData::File { provider, perm }, None)
            }
        }
    }

    /// Graft a declarative subtree under `parent`
    pub fn add_spec(&mut self, parent: &str, spec: NodeSpec) -> Result<NodeId, BuildError> {
        let dir = self.parent_dir(parent)?;
        self.insert(dir, spec)
    }

    pub fn add_dir(&mut self, parent: &str, name: &str) -> Result<NodeId, BuildError> {
        self.add_spec(parent, NodeSpec::dir(name, Vec::new()))
    }

    pub fn add_device(&mut self, parent: &str, name: &str, binding: DeviceBinding) -> Result<NodeId, BuildError> {
        self.add_spec(parent, NodeSpec::device(name, binding))
    }

    pub fn add_symlink(&mut self, parent: &str, name: &str, target: &str) -> Result<NodeId, BuildError> {
        self.add_spec(parent, NodeSpec::symlink(name, target))
    }

    pub fn add_file(
        &mut self,
        parent: &str,
        name: &str,
        provider: Arc<dyn ContentProvider>,
        perm: u32,
    ) -> Result<NodeId, BuildError> {
        self.add_spec(parent, NodeSpec::file(name, provider, perm))
    }

    /// Declare the final child count of an existing directory
    pub fn expect_len(&mut self, dir: &str, len: usize) -> Result<(), BuildError> {
        let id = self.parent_dir(dir)?;
        self.declared[id.0] = Some(len);
        Ok(())
    }

    fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == Self::ROOT {
                break;
            }
            names.push(self.nodes[node.0].name());
            current = self.parents[node.0];
        }
        names.reverse();
        let mut path = String::from("/");
        path.push_str(&names.join("/"));
        path
    }

    /// Validate the whole tree and freeze it
    pub fn build(self) -> Result<Registry, BuildError> {
        for (index, node) in self.nodes.iter().enumerate() {
            let NodeData::Directory { children } = &node.data else {
                continue;
            };
            let dir = NodeId(index);
            if let Some(declared) = self.declared[index] {
                if declared != children.len() {
                    return Err(BuildError::ChildCountMismatch {
                        dir: self.path_of(dir),
                        declared,
                        actual: children.len(),
                    });
                }
            }
            let mut seen = HashSet::with_capacity(children.len());
            for child in children {
                let name = self.nodes[child.0].name();
                if !seen.insert(name) {
                    return Err(BuildError::DuplicateName {
                        parent: self.path_of(dir),
                        name: name.to_string(),
                    });
                }
            }
        }
        devfs_info!("devfs: built tree `{}` with {} nodes", self.nodes[0].name(), self.nodes.len());
        Ok(Registry {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: self.nodes,
            parents: self.parents,
        })
    }
}
