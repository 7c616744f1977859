//! `/dev/null`: a sink that discards everything written and reads as empty.

use alloc::sync::Arc;

use crate::error::DevResult;
use crate::ops::{DeviceBinding, DeviceOps, DeviceSlots};
use crate::types::SeekWhence;

pub const NULL_MAJOR: u32 = 1;
pub const NULL_MINOR: u32 = 3;

pub struct NullDevice;

impl NullDevice {
    pub fn binding() -> DeviceBinding {
        DeviceBinding::new(NULL_MAJOR, NULL_MINOR, Arc::new(NullDevice))
    }
}

/// Accept and discard `buf`
pub(crate) fn discard(buf: &[u8]) -> DevResult<usize> {
    Ok(buf.len())
}

/// Leave the position alone and report the requested offset
pub(crate) fn stay(offset: i64, _whence: SeekWhence) -> DevResult<i64> {
    Ok(offset)
}

impl DeviceOps for NullDevice {
    fn slots(&self) -> DeviceSlots {
        DeviceSlots::READ | DeviceSlots::WRITE | DeviceSlots::SEEK | DeviceSlots::TRUNCATE
    }

    fn read(&self, _buf: &mut [u8]) -> DevResult<usize> {
        Ok(0)
    }

    fn write(&self, buf: &[u8]) -> DevResult<usize> {
        discard(buf)
    }

    fn seek(&self, offset: i64, whence: SeekWhence) -> DevResult<i64> {
        stay(offset, whence)
    }

    fn truncate(&self, _len: u64) -> DevResult<()> {
        Ok(())
    }
}
