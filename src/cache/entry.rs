//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single process cache entry: an opaque value plus its timing metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Time to live in milliseconds
    pub ttl_ms: u64,
    /// Number of hits served from this entry
    pub access_count: u64,
    /// Last hit (or creation) timestamp (Unix milliseconds)
    pub last_accessed_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    pub fn new(value: V, ttl: Duration, now: u64) -> Self {
        Self {
            value,
            created_at: now,
            ttl_ms: duration_ms(ttl),
            access_count: 0,
            last_accessed_at: now,
        }
    }

    // == Expiry ==
    /// Absolute expiry timestamp in Unix milliseconds.
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl_ms)
    }

    /// Checks whether the entry is logically absent at `now`.
    ///
    /// Boundary condition: once `now` reaches `created_at + ttl` the entry is
    /// expired, so a read one millisecond before that instant still hits.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at()
    }

    /// Checks expiry against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Touch ==
    /// Records a hit at `now`.
    pub fn touch(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }

    /// Remaining TTL in milliseconds at `now` (0 once expired).
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at().saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("value", Duration::from_millis(1000), 5_000);

        assert_eq!(entry.value, "value");
        assert_eq!(entry.created_at, 5_000);
        assert_eq!(entry.last_accessed_at, 5_000);
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.expires_at(), 6_000);
    }

    #[test]
    fn test_expiration_boundary() {
        let entry = CacheEntry::new(1, Duration::from_millis(100), 1_000);

        assert!(!entry.is_expired_at(1_099));
        assert!(entry.is_expired_at(1_100));
        assert!(entry.is_expired_at(1_101));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(1, Duration::ZERO, 1_000);
        assert!(entry.is_expired_at(1_000));
    }

    #[test]
    fn test_touch_updates_access_metadata() {
        let mut entry = CacheEntry::new(1, Duration::from_secs(1), 1_000);
        entry.touch(1_200);
        entry.touch(1_300);

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_accessed_at, 1_300);
        assert_eq!(entry.created_at, 1_000);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(1, Duration::from_secs(10), 0);

        assert_eq!(entry.ttl_remaining_ms(4_000), 6_000);
        assert_eq!(entry.ttl_remaining_ms(20_000), 0);
    }

    #[test]
    fn test_wall_clock_entry_not_expired() {
        let entry = CacheEntry::new(1, Duration::from_secs(60), current_timestamp_ms());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_millis(1_500)), 1_500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);

        let entry = CacheEntry::new(1, Duration::MAX, 10);
        assert_eq!(entry.expires_at(), u64::MAX);
        assert!(!entry.is_expired_at(10_000));
    }
}
