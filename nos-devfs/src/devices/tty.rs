//! `/dev/tty`: the controlling terminal, forwarded to a host console.

use alloc::{string::String, sync::Arc};

use crate::error::DevResult;
use crate::ops::{DeviceBinding, DeviceOps, DeviceSlots};

pub const TTY_MAJOR: u32 = 5;
pub const TTY_MINOR: u32 = 0;

/// Host console behind `/dev/tty`
pub trait Console: Send + Sync {
    fn read(&self, buf: &mut [u8]) -> DevResult<usize>;

    fn write(&self, buf: &[u8]) -> DevResult<usize>;

    fn flush(&self) -> DevResult<()> {
        Ok(())
    }
}

/// Console that forwards output to the logger and has no input
pub struct LogConsole;

impl Console for LogConsole {
    fn read(&self, _buf: &mut [u8]) -> DevResult<usize> {
        Ok(0)
    }

    fn write(&self, buf: &[u8]) -> DevResult<usize> {
        let text = String::from_utf8_lossy(buf);
        devfs_info!("tty: {}", text.trim_end());
        Ok(buf.len())
    }
}

pub struct TtyDevice {
    console: Arc<dyn Console>,
}

impl TtyDevice {
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self { console }
    }

    pub fn binding(console: Arc<dyn Console>) -> DeviceBinding {
        DeviceBinding::new(TTY_MAJOR, TTY_MINOR, Arc::new(TtyDevice::new(console)))
    }
}

impl DeviceOps for TtyDevice {
    fn slots(&self) -> DeviceSlots {
        DeviceSlots::READ | DeviceSlots::WRITE | DeviceSlots::FLUSH
    }

    fn read(&self, buf: &mut [u8]) -> DevResult<usize> {
        self.console.read(buf)
    }

    fn write(&self, buf: &[u8]) -> DevResult<usize> {
        self.console.write(buf)
    }

    fn flush(&self) -> DevResult<()> {
        self.console.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use spin::Mutex;

    struct Capture(Mutex<Vec<u8>>);

    impl Console for Capture {
        fn read(&self, buf: &mut [u8]) -> DevResult<usize> {
            let n = buf.len().min(2);
            buf[..n].copy_from_slice(&b"ok"[..n]);
            Ok(n)
        }

        fn write(&self, buf: &[u8]) -> DevResult<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn test_tty_forwards_to_console() {
        let console = Arc::new(Capture(Mutex::new(Vec::new())));
        let tty = TtyDevice::new(console.clone());
        assert_eq!(tty.write(b"hi\n"), Ok(3));
        assert_eq!(&console.0.lock()[..], b"hi\n");

        let mut buf = [0u8; 4];
        assert_eq!(tty.read(&mut buf), Ok(2));
        assert_eq!(tty.flush(), Ok(()));
    }

    #[test]
    fn test_log_console() {
        assert_eq!(LogConsole.write(b"boot\n"), Ok(5));
        assert_eq!(LogConsole.read(&mut [0u8; 4]), Ok(0));
        let binding = TtyDevice::binding(Arc::new(LogConsole));
        assert_eq!(binding.rdev(), 0x500);
        assert!(binding.has(DeviceSlots::FLUSH));
        assert!(!binding.has(DeviceSlots::SEEK));
    }
}
