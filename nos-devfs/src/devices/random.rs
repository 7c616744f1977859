//! `/dev/random` and `/dev/urandom`
//!
//! Both nodes share one operation table. Bytes come from an
//! [`EntropySource`] supplied by the host; writes are accepted and dropped
//! without feeding the source.

use alloc::sync::Arc;
use spin::Mutex;

use super::null::{discard, stay};
use crate::error::DevResult;
use crate::ops::{DeviceBinding, DeviceOps, DeviceSlots};
use crate::types::SeekWhence;

pub const RANDOM_MAJOR: u32 = 1;
pub const RANDOM_MINOR: u32 = 8;
pub const URANDOM_MAJOR: u32 = 1;
pub const URANDOM_MINOR: u32 = 9;

/// Byte generator behind the random devices.
///
/// The host supplies this from its platform RNG; the tree refuses to build
/// without one.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` completely
    fn fill(&self, buf: &mut [u8]) -> DevResult<()>;
}

/// Deterministic xorshift64* generator.
///
/// Not cryptographically strong: the same seed always yields the same
/// stream. Only for tests and reproducible runs, installed explicitly with
/// [`DevFsConfig::with_seed`](crate::config::DevFsConfig::with_seed).
pub struct XorShiftSource {
    state: Mutex<u64>,
}

impl XorShiftSource {
    const FALLBACK_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { Self::FALLBACK_SEED } else { seed };
        Self {
            state: Mutex::new(seed),
        }
    }

    fn next(state: &mut u64) -> u64 {
        let mut x = *state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        *state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }
}

impl EntropySource for XorShiftSource {
    fn fill(&self, buf: &mut [u8]) -> DevResult<()> {
        let mut state = self.state.lock();
        for chunk in buf.chunks_mut(8) {
            let word = Self::next(&mut state).to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }
}

pub struct RandomDevice {
    source: Arc<dyn EntropySource>,
}

impl RandomDevice {
    pub fn new(source: Arc<dyn EntropySource>) -> Self {
        Self { source }
    }

    /// Bindings for `random` and `urandom` sharing one table instance
    pub fn bindings(source: Arc<dyn EntropySource>) -> (DeviceBinding, DeviceBinding) {
        let ops: Arc<dyn DeviceOps> = Arc::new(RandomDevice::new(source));
        (
            DeviceBinding::new(RANDOM_MAJOR, RANDOM_MINOR, ops.clone()),
            DeviceBinding::new(URANDOM_MAJOR, URANDOM_MINOR, ops),
        )
    }
}

impl DeviceOps for RandomDevice {
    fn slots(&self) -> DeviceSlots {
        DeviceSlots::READ | DeviceSlots::WRITE | DeviceSlots::SEEK
    }

    fn read(&self, buf: &mut [u8]) -> DevResult<usize> {
        self.source.fill(buf)?;
        Ok(buf.len())
    }

    // Linux mixes written bytes into the pool; here they are dropped.
    fn write(&self, buf: &[u8]) -> DevResult<usize> {
        discard(buf)
    }

    fn seek(&self, offset: i64, whence: SeekWhence) -> DevResult<i64> {
        stay(offset, whence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_differ() {
        let device = RandomDevice::new(Arc::new(XorShiftSource::new(1)));
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        assert_eq!(device.read(&mut a), Ok(64));
        assert_eq!(device.read(&mut b), Ok(64));
        assert_ne!(a, b);
    }

    #[test]
    fn test_odd_length_fill() {
        let source = XorShiftSource::new(7);
        let mut buf = [0u8; 13];
        source.fill(&mut buf).unwrap();
        assert!(buf.iter().any(|b| *b != 0));
    }

    #[test]
    fn test_zero_seed_is_replaced() {
        let a = XorShiftSource::new(0);
        let b = XorShiftSource::new(XorShiftSource::FALLBACK_SEED);
        let mut x = [0u8; 16];
        let mut y = [0u8; 16];
        a.fill(&mut x).unwrap();
        b.fill(&mut y).unwrap();
        assert_eq!(x, y);
        assert!(x.iter().any(|v| *v != 0));
    }

    #[test]
    fn test_write_does_not_touch_source() {
        let reference = XorShiftSource::new(99);
        let device = RandomDevice::new(Arc::new(XorShiftSource::new(99)));
        assert_eq!(device.write(&[0xde, 0xad, 0xbe, 0xef]), Ok(4));

        let mut expected = [0u8; 32];
        let mut actual = [0u8; 32];
        reference.fill(&mut expected).unwrap();
        device.read(&mut actual).unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_random_and_urandom_share_table() {
        let (random, urandom) = RandomDevice::bindings(Arc::new(XorShiftSource::new(3)));
        assert!(random.same_table(&urandom));
        assert_eq!((random.major(), random.minor()), (1, 8));
        assert_eq!((urandom.major(), urandom.minor()), (1, 9));
        assert!(!random.has(DeviceSlots::TRUNCATE));
    }
}
