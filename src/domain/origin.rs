// src/domain/origin.rs
use crate::constants::DEFAULT_ALLOWED_ORIGINS;

/// Fixed allow-list of page origins that may drive the bridge.
///
/// Matching is exact and case-sensitive: no scheme or host normalization is
/// applied, so callers must pass the origin exactly as the transport reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginGuard {
    origins: Vec<String>,
}

impl OriginGuard {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }
}

impl Default for OriginGuard {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS.iter().copied())
    }
}
