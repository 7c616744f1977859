//! Device operation tables
//!
//! A character device is served by a [`DeviceOps`] implementation together
//! with the set of slots it declares. The handle multiplexer only calls a
//! method whose slot is declared; an undeclared read, write, seek or truncate
//! is refused with [`DevError::AccessDenied`], an undeclared flush or close
//! succeeds without calling anything.

use alloc::sync::Arc;
use bitflags::bitflags;
use core::fmt;

use crate::error::{DevError, DevResult};
use crate::types::{makedev, FileMode, SeekWhence};

bitflags! {
    /// Operation slots present in a device table
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceSlots: u8 {
        const READ     = 1 << 0;
        const WRITE    = 1 << 1;
        const SEEK     = 1 << 2;
        const TRUNCATE = 1 << 3;
        const FLUSH    = 1 << 4;
        const CLOSE    = 1 << 5;
    }
}

/// Operations a character device may implement.
///
/// Only the methods named by [`DeviceOps::slots`] are ever invoked, so the
/// defaults below are placeholders for absent slots.
pub trait DeviceOps: Send + Sync {
    /// Slots implemented by this table
    fn slots(&self) -> DeviceSlots;

    /// Read data
    fn read(&self, buf: &mut [u8]) -> DevResult<usize> {
        let _ = buf;
        Err(DevError::AccessDenied)
    }

    /// Write data
    fn write(&self, buf: &[u8]) -> DevResult<usize> {
        let _ = buf;
        Err(DevError::AccessDenied)
    }

    /// Reposition; returns the resulting offset
    fn seek(&self, offset: i64, whence: SeekWhence) -> DevResult<i64> {
        let _ = (offset, whence);
        Err(DevError::AccessDenied)
    }

    /// Truncate
    fn truncate(&self, len: u64) -> DevResult<()> {
        let _ = len;
        Err(DevError::AccessDenied)
    }

    /// Flush buffered output
    fn flush(&self) -> DevResult<()> {
        Ok(())
    }

    /// Release per-open resources
    fn close(&self) -> DevResult<()> {
        Ok(())
    }
}

/// Table with no slots, for devices whose real table is assigned later
pub struct UnboundOps;

impl DeviceOps for UnboundOps {
    fn slots(&self) -> DeviceSlots {
        DeviceSlots::empty()
    }
}

/// A device's identity together with its current operation table
#[derive(Clone)]
pub struct DeviceBinding {
    major: u32,
    minor: u32,
    perm: u32,
    ops: Arc<dyn DeviceOps>,
}

impl DeviceBinding {
    pub fn new(major: u32, minor: u32, ops: Arc<dyn DeviceOps>) -> Self {
        Self {
            major,
            minor,
            perm: FileMode::PERM_FILE_RW,
            ops,
        }
    }

    /// Binding with an empty table
    pub fn unbound(major: u32, minor: u32) -> Self {
        Self::new(major, minor, Arc::new(UnboundOps))
    }

    /// Override the permission bits reported by `mode`/`stat`
    pub fn with_perm(mut self, perm: u32) -> Self {
        self.perm = perm;
        self
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn perm(&self) -> u32 {
        self.perm
    }

    pub fn rdev(&self) -> u64 {
        makedev(self.major, self.minor)
    }

    pub fn slots(&self) -> DeviceSlots {
        self.ops.slots()
    }

    pub fn has(&self, slot: DeviceSlots) -> bool {
        self.slots().contains(slot)
    }

    pub fn ops(&self) -> &Arc<dyn DeviceOps> {
        &self.ops
    }

    /// Same identity, new table
    pub fn rebound(&self, ops: Arc<dyn DeviceOps>) -> Self {
        Self {
            ops,
            ..self.clone()
        }
    }

    /// True when both bindings share one table instance
    pub fn same_table(&self, other: &DeviceBinding) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops)
    }
}

impl fmt::Debug for DeviceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBinding")
            .field("major", &self.major)
            .field("minor", &self.minor)
            .field("perm", &format_args!("{:o}", self.perm))
            .field("slots", &self.slots())
            .finish()
    }
}
