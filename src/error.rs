//! Error types for the crate.
//!
//! There is exactly one error: [`ConfigError`], returned when cache
//! configuration parameters are invalid (zero capacity, out-of-range
//! ratios, a segment share that rounds to zero). It is produced only by
//! configuration constructors; every runtime operation on a cache is
//! total.
//!
//! # Example
//!
//! ```
//! use cache_policies::error::ConfigError;
//! use cache_policies::SlruCache;
//!
//! let cache: Result<SlruCache<String, i32>, ConfigError> = SlruCache::with_ratio(100, 0.2);
//! assert!(cache.is_ok());
//!
//! // Invalid ratio is caught without panicking
//! let bad = SlruCache::<String, i32>::with_ratio(100, 2.0);
//! assert!(bad.is_err());
//! ```

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use cache_policies::LirsCache;
///
/// let err = LirsCache::<u64, u64>::with_ratio(0, 0.01).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::error::Error for ConfigError {}
