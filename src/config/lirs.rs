//! Configuration for the Low Inter-reference Recency Set (LIRS) cache.
//!
//! LIRS splits the cache between LIR blocks (low inter-reference recency,
//! the bulk of the capacity) and resident HIR blocks (a small buffer,
//! typically around 1% of the capacity).

use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a LIRS cache.
///
/// `lirs_capacity` bounds the number of LIR blocks and `hirs_capacity` the
/// number of resident HIR blocks; their sum is the user-facing capacity.
///
/// # Examples
///
/// ```
/// use cache_policies::config::LirsCacheConfig;
///
/// // 3 entries total, one slot reserved for resident HIR blocks
/// let config = LirsCacheConfig::from_ratio(3, 0.34).unwrap();
/// assert_eq!(config.lirs_capacity().get(), 2);
/// assert_eq!(config.hirs_capacity().get(), 1);
/// ```
#[derive(Clone, Copy)]
pub struct LirsCacheConfig {
    /// Maximum number of LIR blocks.
    lirs_capacity: NonZeroUsize,
    /// Maximum number of resident HIR blocks.
    hirs_capacity: NonZeroUsize,
}

impl LirsCacheConfig {
    /// Share of the capacity reserved for resident HIR blocks when no
    /// explicit ratio is provided. The LIRS paper suggests around 1%.
    pub const DEFAULT_HIRS_RATIO: f64 = 0.01;

    /// Creates a configuration from explicit capacities.
    pub fn new(lirs_capacity: NonZeroUsize, hirs_capacity: NonZeroUsize) -> Self {
        Self {
            lirs_capacity,
            hirs_capacity,
        }
    }

    /// Derives the split from a total capacity and a HIR ratio.
    ///
    /// The resident HIR list receives `floor(capacity * hirs_ratio)` slots
    /// and the LIR blocks the rest.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero, if the ratio is not
    /// strictly between 0 and 1, or if either share rounds down to zero.
    pub fn from_ratio(capacity: usize, hirs_ratio: f64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than zero"));
        }
        if !(hirs_ratio > 0.0 && hirs_ratio < 1.0) {
            return Err(ConfigError::new(
                "hirs ratio must be strictly between 0 and 1",
            ));
        }

        let hirs = (capacity as f64 * hirs_ratio) as usize;
        let lirs = capacity - hirs;
        match (NonZeroUsize::new(lirs), NonZeroUsize::new(hirs)) {
            (Some(lirs), Some(hirs)) => Ok(Self::new(lirs, hirs)),
            _ => Err(ConfigError::new(
                "hirs ratio leaves an empty queue for this capacity",
            )),
        }
    }

    /// Derives the split using
    /// [`DEFAULT_HIRS_RATIO`](Self::DEFAULT_HIRS_RATIO).
    ///
    /// Note that with a 1% HIR share the capacity must be at least 100 for
    /// the resident HIR list to get a slot at all.
    pub fn from_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_ratio(capacity, Self::DEFAULT_HIRS_RATIO)
    }

    /// Returns the total number of resident entries the cache can hold.
    pub fn capacity(&self) -> usize {
        self.lirs_capacity.get() + self.hirs_capacity.get()
    }

    /// Returns the maximum number of LIR blocks.
    pub fn lirs_capacity(&self) -> NonZeroUsize {
        self.lirs_capacity
    }

    /// Returns the maximum number of resident HIR blocks.
    pub fn hirs_capacity(&self) -> NonZeroUsize {
        self.hirs_capacity
    }
}

impl fmt::Debug for LirsCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LirsCacheConfig")
            .field("lirs_capacity", &self.lirs_capacity)
            .field("hirs_capacity", &self.hirs_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lirs_config_from_ratio() {
        let config = LirsCacheConfig::from_ratio(3, 0.34).unwrap();
        assert_eq!(config.lirs_capacity().get(), 2);
        assert_eq!(config.hirs_capacity().get(), 1);
        assert_eq!(config.capacity(), 3);
    }

    #[test]
    fn test_lirs_config_rejects_zero_capacity() {
        assert!(LirsCacheConfig::from_ratio(0, 0.01).is_err());
    }

    #[test]
    fn test_lirs_config_rejects_bad_ratio() {
        assert!(LirsCacheConfig::from_ratio(100, 0.0).is_err());
        assert!(LirsCacheConfig::from_ratio(100, 1.0).is_err());
        assert!(LirsCacheConfig::from_ratio(100, -1.0).is_err());
        assert!(LirsCacheConfig::from_ratio(100, f64::NAN).is_err());
    }

    #[test]
    fn test_lirs_config_rejects_empty_queue() {
        // floor(10 * 0.01) == 0 resident HIR slots
        assert!(LirsCacheConfig::from_ratio(10, 0.01).is_err());
    }

    #[test]
    fn test_lirs_config_default_ratio() {
        let config = LirsCacheConfig::from_capacity(100).unwrap();
        assert_eq!(config.lirs_capacity().get(), 99);
        assert_eq!(config.hirs_capacity().get(), 1);
        assert!(LirsCacheConfig::from_capacity(10).is_err());
    }
}
