//! Decode limits for untrusted input.

use crate::error::{AetherError, Result};

/// Default maximum number of nested containers accepted on read.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Bounds applied while decoding.
///
/// The wire format itself imposes no nesting limit, so decoding recurses once
/// per container level. The depth guard turns input that would exhaust the
/// stack into a [`AetherError::Format`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_depth: Option<usize>,
    max_size: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_size: None,
        }
    }
}

impl Limits {
    /// No depth guard and no size cap beyond the 64-bit range.
    pub const fn unbounded() -> Self {
        Self {
            max_depth: None,
            max_size: None,
        }
    }

    /// Sets the maximum number of nested containers.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the largest declared byte length or element count accepted.
    pub fn max_size(mut self, size: u64) -> Self {
        self.max_size = Some(size);
        self
    }

    pub fn depth_limit(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn size_limit(&self) -> Option<u64> {
        self.max_size
    }

    /// Enters one container level below `depth`, returning the new depth.
    pub(crate) fn enter(&self, depth: usize) -> Result<usize> {
        let depth = depth + 1;
        match self.max_depth {
            Some(max) if depth > max => Err(AetherError::Format(format!(
                "nesting depth exceeds limit of {max}"
            ))),
            _ => Ok(depth),
        }
    }

    /// Validates a decoded size and converts it to an in-memory length.
    pub(crate) fn check_size(&self, size: i64) -> Result<usize> {
        let size = u64::try_from(size)
            .map_err(|_| AetherError::Format(format!("negative size: {size}")))?;
        if let Some(max) = self.max_size
            && size > max
        {
            return Err(AetherError::ResourceExhausted(format!(
                "declared size {size} exceeds limit of {max}"
            )));
        }
        usize::try_from(size).map_err(|_| {
            AetherError::ResourceExhausted(format!("declared size {size} is not addressable"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_guards_depth_only() {
        let limits = Limits::default();
        assert_eq!(limits.depth_limit(), Some(DEFAULT_MAX_DEPTH));
        assert_eq!(limits.size_limit(), None);
        assert_eq!(limits.check_size(i64::MAX).ok(), usize::try_from(i64::MAX).ok());
    }

    #[test]
    fn depth_guard() {
        let limits = Limits::default().max_depth(2);
        assert_eq!(limits.enter(0).unwrap(), 1);
        assert_eq!(limits.enter(1).unwrap(), 2);
        assert!(matches!(limits.enter(2), Err(AetherError::Format(_))));
        assert_eq!(Limits::unbounded().enter(10_000).unwrap(), 10_001);
    }

    #[test]
    fn negative_size_is_format_error() {
        let err = Limits::default().check_size(-1).unwrap_err();
        assert!(matches!(err, AetherError::Format(_)));
    }

    #[test]
    fn size_cap() {
        let limits = Limits::default().max_size(16);
        assert_eq!(limits.check_size(16).unwrap(), 16);
        assert!(matches!(
            limits.check_size(17),
            Err(AetherError::ResourceExhausted(_))
        ));
    }
}
