use std::time::{Duration, Instant};

/// A single cached value that expires after a per-value TTL.
///
/// Holds the current OAuth access token; each token response says how long
/// that token lives, so the TTL is supplied with the value.
pub struct ExpiringValue<T: Clone> {
    value: Option<T>,
    expires_at: Option<Instant>,
}

impl<T: Clone> Default for ExpiringValue<T> {
    fn default() -> Self {
        Self {
            value: None,
            expires_at: None,
        }
    }
}

impl<T: Clone> ExpiringValue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value only while it is still fresh.
    pub fn get(&self) -> Option<T> {
        if self.is_fresh() {
            self.value.clone()
        } else {
            None
        }
    }

    pub fn set(&mut self, value: T, ttl: Duration) {
        self.value = Some(value);
        self.expires_at = Some(Instant::now() + ttl);
    }

    pub fn is_fresh(&self) -> bool {
        match (self.value.as_ref(), self.expires_at) {
            (Some(_), Some(expires_at)) => Instant::now() < expires_at,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn get_returns_none_when_empty() {
        let cache = ExpiringValue::<String>::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn get_returns_value_before_expiry() {
        let mut cache = ExpiringValue::new();
        cache.set("token".to_string(), Duration::from_secs(60));

        assert_eq!(cache.get().as_deref(), Some("token"));
        assert!(cache.is_fresh());
    }

    #[test]
    fn get_returns_none_after_expiry() {
        let mut cache = ExpiringValue::new();
        cache.set("token".to_string(), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(20));

        assert!(cache.get().is_none());
        assert!(!cache.is_fresh());
    }

    #[test]
    fn zero_ttl_is_never_fresh() {
        let mut cache = ExpiringValue::new();
        cache.set(1_u8, Duration::ZERO);
        assert!(!cache.is_fresh());
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut cache = ExpiringValue::new();
        cache.set("old".to_string(), Duration::from_secs(60));
        cache.set("new".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get().as_deref(), Some("new"));
    }
}
