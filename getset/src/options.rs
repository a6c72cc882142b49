//! Construction-time configuration for a container.

use serde::Deserialize;

/// What a container does with a rejected write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionMode {
    /// Return the rejection to the caller as an error.
    #[default]
    Strict,
    /// Deliver the rejection to observers (bubbled up the tree); the write returns `Ok`.
    Observe,
}

/// How a candidate is compared to the current value before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// NaN is identical to NaN; 0.0 and -0.0 differ.
    #[default]
    SameValue,
    /// IEEE equality for floats.
    Strict,
}

/// Options for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Rejection routing.
    pub rejection: RejectionMode,
    /// Change detection.
    pub identity: IdentityPolicy,
    /// Allow `define_property` after construction.
    pub extensible: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that route rejections to observers instead of returning them.
    pub fn observing() -> Self {
        Self::default().with_rejection(RejectionMode::Observe)
    }

    pub fn with_rejection(mut self, mode: RejectionMode) -> Self {
        self.rejection = mode;
        self
    }

    pub fn with_identity(mut self, policy: IdentityPolicy) -> Self {
        self.identity = policy;
        self
    }

    pub fn extensible(mut self, extensible: bool) -> Self {
        self.extensible = extensible;
        self
    }

    /// Parse options from JSON. Missing keys take their defaults.
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}
