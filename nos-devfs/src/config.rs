//! Runtime configuration for the standard `/dev` tree

use alloc::{string::String, sync::Arc};
use core::fmt;

use crate::devices::{Console, EntropySource, XorShiftSource};
use crate::error::BuildError;

/// Target of the stdio links: the process's first duplicated standard stream
pub const DEFAULT_STDIO_TARGET: &str = "/proc/self/fd/0";

/// Attestation type reported outside an enclave
pub const DEFAULT_ATTESTATION_TYPE: &str = "none";

/// Size of `/dev/attestation/user_report_data`
pub const DEFAULT_REPORT_DATA_SIZE: usize = 64;

/// DevFS configuration
#[derive(Clone)]
pub struct DevFsConfig {
    pub stdin_target: String,
    pub stdout_target: String,
    pub stderr_target: String,
    pub attestation_type: String,
    pub report_data_size: usize,
    /// Source behind random/urandom; required to build the standard tree
    pub entropy: Option<Arc<dyn EntropySource>>,
    /// Console behind `/dev/tty`; defaults to the logger
    pub console: Option<Arc<dyn Console>>,
}

impl Default for DevFsConfig {
    fn default() -> Self {
        Self {
            stdin_target: String::from(DEFAULT_STDIO_TARGET),
            stdout_target: String::from(DEFAULT_STDIO_TARGET),
            stderr_target: String::from(DEFAULT_STDIO_TARGET),
            attestation_type: String::from(DEFAULT_ATTESTATION_TYPE),
            report_data_size: DEFAULT_REPORT_DATA_SIZE,
            entropy: None,
            console: None,
        }
    }
}

impl DevFsConfig {
    pub fn with_stdio_targets(mut self, stdin: &str, stdout: &str, stderr: &str) -> Self {
        self.stdin_target = String::from(stdin);
        self.stdout_target = String::from(stdout);
        self.stderr_target = String::from(stderr);
        self
    }

    pub fn with_attestation_type(mut self, ty: &str) -> Self {
        self.attestation_type = String::from(ty);
        self
    }

    /// Install a deterministic [`XorShiftSource`]. Every tree built from the
    /// same seed emits the same random stream.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_entropy(Arc::new(XorShiftSource::new(seed)))
    }

    pub fn with_entropy(mut self, source: Arc<dyn EntropySource>) -> Self {
        self.entropy = Some(source);
        self
    }

    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    /// Targets for stdin, stdout and stderr in that order
    pub fn stdio_targets(&self) -> [&str; 3] {
        [
            self.stdin_target.as_str(),
            self.stdout_target.as_str(),
            self.stderr_target.as_str(),
        ]
    }

    /// The configured source. There is no built-in fallback.
    pub fn entropy_source(&self) -> Result<Arc<dyn EntropySource>, BuildError> {
        self.entropy.clone().ok_or(BuildError::MissingEntropySource)
    }
}

impl fmt::Debug for DevFsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevFsConfig")
            .field("stdin_target", &self.stdin_target)
            .field("stdout_target", &self.stdout_target)
            .field("stderr_target", &self.stderr_target)
            .field("attestation_type", &self.attestation_type)
            .field("report_data_size", &self.report_data_size)
            .field("entropy", &self.entropy.is_some())
            .field("custom_console", &self.console.is_some())
            .finish()
    }
}
