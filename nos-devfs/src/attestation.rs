//! `/dev/attestation`: content-backed files describing the attestation
//! environment. Without an enclave the type reads `none` and the report
//! data buffer is plain memory.

use alloc::{sync::Arc, vec};

use crate::config::DevFsConfig;
use crate::content::{SharedBuffer, TextFile};
use crate::node::NodeSpec;
use crate::types::FileMode;

pub const ATTESTATION_DIR: &str = "attestation";

/// Declarative subtree for `/dev/attestation`
pub fn spec(config: &DevFsConfig) -> NodeSpec {
    NodeSpec::dir(
        ATTESTATION_DIR,
        vec![
            NodeSpec::file(
                "attestation_type",
                Arc::new(TextFile::new(config.attestation_type.clone())),
                FileMode::PERM_FILE_R,
            ),
            NodeSpec::file(
                "user_report_data",
                Arc::new(SharedBuffer::zeroed(config.report_data_size)),
                FileMode::PERM_FILE_RW,
            ),
        ],
    )
    .with_declared_len(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::NodeKind;

    #[test]
    fn test_attestation_subtree() {
        let root = NodeSpec::dir("dev", vec![spec(&DevFsConfig::default())]);
        let registry = Registry::declare(root).unwrap();
        let ty = registry.resolve("attestation/attestation_type").unwrap();
        assert_eq!(registry.node(ty).kind(), NodeKind::File);
        assert_eq!(registry.node(ty).attr().size, 4);
        assert_eq!(registry.node(ty).mode().0, 0o100444);

        let data = registry.resolve("attestation/user_report_data").unwrap();
        assert_eq!(registry.node(data).attr().size, 64);
        assert_eq!(registry.node(data).mode().0, 0o100666);
    }
}
