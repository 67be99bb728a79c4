//! Configuration for the Least Frequently Used (LFU) cache.

use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an LFU (Least Frequently Used) cache.
///
/// LFU tracks an access frequency per entry and evicts the least
/// frequently used one when the cache reaches capacity.
///
/// # Examples
///
/// ```
/// use cache_policies::config::LfuCacheConfig;
/// use core::num::NonZeroUsize;
///
/// let config = LfuCacheConfig::new(NonZeroUsize::new(100).unwrap());
/// assert_eq!(config.capacity().get(), 100);
/// ```
#[derive(Clone, Copy)]
pub struct LfuCacheConfig {
    /// Maximum number of key-value pairs the cache can hold
    capacity: NonZeroUsize,
}

impl LfuCacheConfig {
    /// Creates a new configuration for an LFU cache.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }

    /// Returns the maximum number of key-value pairs the cache can hold.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

impl fmt::Debug for LfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfu_config_creation() {
        let config = LfuCacheConfig::new(NonZeroUsize::new(100).unwrap());
        assert_eq!(config.capacity().get(), 100);
    }
}
