//! Cache options for wrapped handlers and their named presets.

use std::time::Duration;

use axum::http::header;

/// How a wrapped handler's responses are cached, both in the process cache
/// and by downstream HTTP caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Process cache TTL; falls back to `revalidate` seconds when unset
    pub ttl: Option<Duration>,
    /// `max-age` advertised to downstream caches, in seconds
    pub revalidate: u64,
    /// `stale-while-revalidate` window, in seconds
    pub stale_while_revalidate: Option<u64>,
    /// Request headers the response varies on
    pub vary: Vec<String>,
}

impl CacheOptions {
    pub fn new(revalidate: u64) -> Self {
        Self {
            ttl: None,
            revalidate,
            stale_while_revalidate: None,
            vary: Vec::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_stale_while_revalidate(mut self, seconds: u64) -> Self {
        self.stale_while_revalidate = Some(seconds);
        self
    }

    pub fn with_vary<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vary = headers.into_iter().map(Into::into).collect();
        self
    }

    /// TTL used when storing into the process cache.
    pub fn effective_ttl(&self) -> Duration {
        self.ttl.unwrap_or(Duration::from_secs(self.revalidate))
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        CachePreset::Dynamic.options()
    }
}

// == Presets ==
/// Named option bundles for common content classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePreset {
    /// Rarely changing content: hour-scale revalidation
    Static,
    /// Regularly updated content: minute-scale
    Dynamic,
    /// Live figures: sub-minute
    Realtime,
    /// Per-user content: very short, varies on credentials
    User,
}

impl CachePreset {
    pub fn options(self) -> CacheOptions {
        match self {
            CachePreset::Static => CacheOptions::new(3600)
                .with_ttl(Duration::from_secs(3600))
                .with_stale_while_revalidate(86_400),
            CachePreset::Dynamic => CacheOptions::new(60)
                .with_ttl(Duration::from_secs(60))
                .with_stale_while_revalidate(300),
            CachePreset::Realtime => CacheOptions::new(10)
                .with_ttl(Duration::from_secs(10))
                .with_stale_while_revalidate(30),
            CachePreset::User => CacheOptions::new(5)
                .with_ttl(Duration::from_secs(5))
                .with_vary([header::AUTHORIZATION.as_str(), header::COOKIE.as_str()]),
        }
    }
}

impl From<CachePreset> for CacheOptions {
    fn from(preset: CachePreset) -> Self {
        preset.options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_scales_are_ordered() {
        let ttl = |p: CachePreset| p.options().effective_ttl();

        assert!(ttl(CachePreset::Static) > ttl(CachePreset::Dynamic));
        assert!(ttl(CachePreset::Dynamic) > ttl(CachePreset::Realtime));
        assert!(ttl(CachePreset::Realtime) > ttl(CachePreset::User));
        assert!(ttl(CachePreset::Realtime) < Duration::from_secs(60));
    }

    #[test]
    fn test_user_preset_varies_on_credentials() {
        let options = CacheOptions::from(CachePreset::User);
        assert_eq!(options.vary, vec!["authorization", "cookie"]);
        assert_eq!(options.stale_while_revalidate, None);
    }

    #[test]
    fn test_effective_ttl_falls_back_to_revalidate() {
        let options = CacheOptions::new(42);
        assert_eq!(options.effective_ttl(), Duration::from_secs(42));

        let options = options.with_ttl(Duration::from_millis(1500));
        assert_eq!(options.effective_ttl(), Duration::from_millis(1500));
    }

    #[test]
    fn test_default_is_dynamic() {
        assert_eq!(CacheOptions::default(), CachePreset::Dynamic.options());
    }
}
