use std::fmt;

use serde::{Deserialize, Serialize};

/// Short product name.
pub const PRODUCT: &str = "cse";

/// One-line product description.
pub const DESCRIPTION: &str = "Container Service Extension for VMware vCloud Director";

/// Static identity reported by `cse version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VersionInfo {
    pub product: String,
    pub description: String,
    pub version: String,
    /// Host platform the binary was built for, e.g. `linux-x86_64`.
    pub runtime: String,
}

impl VersionInfo {
    /// Identity for the given package version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            product: PRODUCT.to_owned(),
            description: DESCRIPTION.to_owned(),
            version: version.into(),
            runtime: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, version {}", self.product, self.description, self.version)
    }
}
