//! Well-known character devices and the standard `/dev` layout
//!
//! Device numbers follow Linux `drivers/char/mem.c` and `drivers/tty`.

pub mod null;
pub mod random;
pub mod tty;
pub mod zero;

pub use null::NullDevice;
pub use random::{EntropySource, RandomDevice, XorShiftSource};
pub use tty::{Console, LogConsole, TtyDevice};
pub use zero::ZeroDevice;

use alloc::sync::Arc;

use crate::config::DevFsConfig;
use crate::error::BuildError;
use crate::registry::TreeBuilder;

/// Names of the stdio redirection links, in registration order
pub const STDIO_LINKS: [&str; 3] = ["stdin", "stdout", "stderr"];

/// Register the standard device nodes and stdio links under the root.
///
/// Fails with [`BuildError::MissingEntropySource`] before touching the
/// builder when the config carries no entropy source.
pub fn populate(builder: &mut TreeBuilder, config: &DevFsConfig) -> Result<usize, BuildError> {
    let source = config.entropy_source()?;
    let mut added = 0;

    builder.add_device("", "null", NullDevice::binding())?;
    added += 1;

    if cfg!(feature = "tty") {
        let console = config.console.clone().unwrap_or_else(|| Arc::new(LogConsole));
        builder.add_device("", "tty", TtyDevice::binding(console))?;
        added += 1;
    }

    builder.add_device("", "zero", ZeroDevice::binding())?;
    added += 1;

    let (random, urandom) = RandomDevice::bindings(source);
    builder.add_device("", "random", random)?;
    builder.add_device("", "urandom", urandom)?;
    added += 2;

    for (name, target) in STDIO_LINKS.iter().zip(config.stdio_targets()) {
        builder.add_symlink("", name, target)?;
        added += 1;
    }

    Ok(added)
}
