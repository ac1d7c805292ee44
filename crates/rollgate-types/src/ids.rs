//! Strongly-typed identifiers

use crate::sanitize::sanitize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a destination across the whole service.
///
/// Built from the sanitized cluster identity and the raw namespace, so two
/// destinations whose cluster names differ only in case or punctuation
/// (`prod.east`, `Prod-East`) still collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DestinationKey(String);

impl DestinationKey {
    pub fn new(cluster_identity: &str, namespace: &str) -> Self {
        Self(format!("{}/namespace/{}", sanitize(cluster_identity), namespace))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
