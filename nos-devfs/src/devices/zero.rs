//! `/dev/zero`: reads fill the buffer with zero bytes; writes are discarded.

use alloc::sync::Arc;

use super::null::{discard, stay};
use crate::error::DevResult;
use crate::ops::{DeviceBinding, DeviceOps, DeviceSlots};
use crate::types::SeekWhence;

pub const ZERO_MAJOR: u32 = 1;
pub const ZERO_MINOR: u32 = 5;

pub struct ZeroDevice;

impl ZeroDevice {
    pub fn binding() -> DeviceBinding {
        DeviceBinding::new(ZERO_MAJOR, ZERO_MINOR, Arc::new(ZeroDevice))
    }
}

impl DeviceOps for ZeroDevice {
    fn slots(&self) -> DeviceSlots {
        DeviceSlots::READ | DeviceSlots::WRITE | DeviceSlots::SEEK | DeviceSlots::TRUNCATE
    }

    fn read(&self, buf: &mut [u8]) -> DevResult<usize> {
        buf.fill(0);
        Ok(buf.len())
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
