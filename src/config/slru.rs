//! Configuration for the Segmented Least Recently Used (SLRU) cache.
//!
//! SLRU divides the cache into a **probationary** segment, where new
//! entries land, and a **protected** segment for entries that have been
//! hit at least twice. A common split reserves 20% of the capacity for the
//! probationary segment.

use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an SLRU (Segmented LRU) cache.
///
/// The two segment capacities sum to the user-facing cache capacity. Both
/// must be at least 1, which the ratio-based constructors enforce.
///
/// # Examples
///
/// ```
/// use cache_policies::config::SlruCacheConfig;
/// use core::num::NonZeroUsize;
///
/// // Explicit split: 2 probationary + 8 protected
/// let config = SlruCacheConfig::new(
///     NonZeroUsize::new(2).unwrap(),
///     NonZeroUsize::new(8).unwrap(),
/// );
/// assert_eq!(config.capacity(), 10);
///
/// // Same split derived from a ratio
/// let config = SlruCacheConfig::from_ratio(10, 0.2).unwrap();
/// assert_eq!(config.probationary_capacity().get(), 2);
/// assert_eq!(config.protected_capacity().get(), 8);
/// ```
#[derive(Clone, Copy)]
pub struct SlruCacheConfig {
    /// Capacity of the probationary segment, where new entries start.
    probationary_capacity: NonZeroUsize,
    /// Capacity of the protected segment, holding double-hit entries.
    protected_capacity: NonZeroUsize,
}

impl SlruCacheConfig {
    /// Share of the capacity given to the probationary segment when no
    /// explicit ratio is provided.
    pub const DEFAULT_PROBATION_RATIO: f64 = 0.2;

    /// Creates a configuration from explicit segment capacities.
    pub fn new(probationary_capacity: NonZeroUsize, protected_capacity: NonZeroUsize) -> Self {
        Self {
            probationary_capacity,
            protected_capacity,
        }
    }

    /// Derives the segment split from a total capacity and a probationary
    /// ratio.
    ///
    /// The probationary segment receives `floor(capacity * probation_ratio)`
    /// slots and the protected segment the rest.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero, if the ratio is not
    /// strictly between 0 and 1, or if either segment share rounds down to
    /// zero.
    pub fn from_ratio(capacity: usize, probation_ratio: f64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than zero"));
        }
        if !(probation_ratio > 0.0 && probation_ratio < 1.0) {
            return Err(ConfigError::new(
                "probation ratio must be strictly between 0 and 1",
            ));
        }

        let probationary = (capacity as f64 * probation_ratio) as usize;
        let protected = capacity - probationary;
        match (
            NonZeroUsize::new(probationary),
            NonZeroUsize::new(protected),
        ) {
            (Some(probationary), Some(protected)) => Ok(Self::new(probationary, protected)),
            _ => Err(ConfigError::new(
                "probation ratio leaves an empty segment for this capacity",
            )),
        }
    }

    /// Derives the segment split using
    /// [`DEFAULT_PROBATION_RATIO`](Self::DEFAULT_PROBATION_RATIO).
    pub fn from_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_ratio(capacity, Self::DEFAULT_PROBATION_RATIO)
    }

    /// Returns the total number of key-value pairs the cache can hold.
    pub fn capacity(&self) -> usize {
        self.probationary_capacity.get() + self.protected_capacity.get()
    }

    /// Returns the capacity of the probationary segment.
    pub fn probationary_capacity(&self) -> NonZeroUsize {
        self.probationary_capacity
    }

    /// Returns the capacity of the protected segment.
    pub fn protected_capacity(&self) -> NonZeroUsize {
        self.protected_capacity
    }
}

impl fmt::Debug for SlruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlruCacheConfig")
            .field("probationary_capacity", &self.probationary_capacity)
            .field("protected_capacity", &self.protected_capacity)
            .finish()
    }
}
