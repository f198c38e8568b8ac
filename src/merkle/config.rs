//! Configuration implementations for tree operations

use super::tree::TreeConfig;
use crate::types::{MEMBER_DOMAIN_TAG, NODE_DOMAIN_TAG, TREE_HEIGHT};

/// Guardian tree v0 configuration
///
/// Height 8: 128 leaf positions and witnesses of 7 nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuardianTreeV0Config;

impl TreeConfig for GuardianTreeV0Config {
    fn leaf_domain_tag(&self) -> &[u8] { MEMBER_DOMAIN_TAG }

    fn internal_domain_tag(&self) -> &[u8] { NODE_DOMAIN_TAG }

    fn height(&self) -> u8 { TREE_HEIGHT }
}

/// Default config instance (guardian tree v0)
pub(crate) const DEFAULT_CONFIG: GuardianTreeV0Config = GuardianTreeV0Config;
