//! NOS DevFS - the `/dev` pseudo-device filesystem
//!
//! This crate serves the paths a process expects under `/dev` from an
//! in-memory tree. The host VFS forwards every path below the mount point to
//! [`DevFs`], which resolves it against an immutable [`Registry`] and hands
//! back a [`Handle`] whose operations are multiplexed over three
//! representations: content-backed files, character devices bound to a
//! [`DeviceOps`] table, and directory listings.
//!
//! # Architecture
//!
//! - **Registry**: arena of nodes built once by [`TreeBuilder`]
//! - **Dispatch**: directory-style entry points (`open`, `stat`, `readdir`, ...)
//! - **Handle**: per-open I/O multiplexer with optional-slot semantics
//! - **Devices**: null, zero, random, urandom, tty and the stdio links
//! - **Attestation**: content files under `/dev/attestation`
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use nos_devfs::devices::EntropySource;
//! use nos_devfs::{DevFs, DevFsConfig, DevResult, OpenFlags};
//!
//! // Stand-in for the host platform RNG
//! struct HostRng;
//!
//! impl EntropySource for HostRng {
//!     fn fill(&self, buf: &mut [u8]) -> DevResult<()> {
//!         buf.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8 ^ 0x5a);
//!         Ok(())
//!     }
//! }
//!
//! let config = DevFsConfig::default().with_entropy(Arc::new(HostRng));
//! let fs = DevFs::new(&config).expect("standard tree");
//! let mut zero = fs.open("zero", OpenFlags::READ).unwrap();
//! let mut buf = [0xffu8; 8];
//! assert_eq!(zero.read(&mut buf), Ok(8));
//! assert_eq!(buf, [0u8; 8]);
//! assert_eq!(fs.follow_link("stdout").unwrap(), "/proc/self/fd/0");
//! ```

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod logging;

pub mod attestation;
pub mod config;
pub mod content;
pub mod devices;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod node;
pub mod ops;
pub mod registry;
pub mod types;

pub use crate::config::DevFsConfig;
pub use crate::content::{ContentBackend, ContentProvider, SharedBuffer, TextFile};
pub use crate::dispatch::DevFs;
pub use crate::error::{BuildError, DevError, DevResult};
pub use crate::handle::{Handle, HandleKind};
pub use crate::node::{Node, NodeId, NodeSpec};
pub use crate::ops::{DeviceBinding, DeviceOps, DeviceSlots};
pub use crate::registry::{Registry, TreeBuilder};
pub use crate::types::{DirEntry, FileAttr, FileMode, NodeKind, OpenFlags, PollFlags, SeekWhence};

use alloc::sync::Arc;
use lazy_static::lazy_static;
use spin::Mutex;

/// Filesystem name the host mounts this tree under
pub const DEVFS_NAME: &str = "dev";

lazy_static! {
    /// Instance installed by [`init_devfs`]
    static ref DEVFS: Mutex<Option<Arc<DevFs>>> = Mutex::new(None);
}

/// Build the standard tree and install it as the global instance.
///
/// A construction error leaves any previously installed instance in place;
/// the host is expected to abort initialization.
pub fn init_devfs(config: &DevFsConfig) -> Result<Arc<DevFs>, BuildError> {
    let fs = match DevFs::new(config) {
        Ok(fs) => Arc::new(fs),
        Err(err) => {
            devfs_error!("devfs: initialization failed: {}", err);
            return Err(err);
        }
    };
    *DEVFS.lock() = Some(fs.clone());
    devfs_info!("devfs: mounted `{}` ({} nodes)", DEVFS_NAME, fs.registry().len());
    Ok(fs)
}

/// Global instance, if initialized
pub fn devfs() -> Option<Arc<DevFs>> {
    DEVFS.lock().clone()
}

/// Drop the global instance. Handles already opened stay usable.
pub fn shutdown_devfs() {
    DEVFS.lock().take();
}

static_assertions::assert_impl_all!(DevFs: Send, Sync);
static_assertions::assert_impl_all!(Registry: Send, Sync);
static_assertions::assert_impl_all!(Handle: Send);
static_assertions::assert_impl_all!(DeviceBinding: Send, Sync, Clone);
