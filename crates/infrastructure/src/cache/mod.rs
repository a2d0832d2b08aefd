//! On-disk response cache for the external source adapter. Keyed by
//! endpoint + query parameters, written atomically (write to a sibling
//! `.tmp` file, then rename) so a crash mid-write never leaves a
//! partially-written cache entry behind.

use std::path::PathBuf;

use claim_auditor_core::Result;

pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_to_filename(endpoint: &str, params: &str) -> String {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        endpoint.hash(&mut hasher);
        params.hash(&mut hasher);
        format!("{endpoint}-{:016x}.json", hasher.finish())
    }

    fn path_for(&self, endpoint: &str, params: &str) -> PathBuf {
        self.root.join(Self::key_to_filename(endpoint, params))
    }

    pub fn get(&self, endpoint: &str, params: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(endpoint, params)).ok()
    }

    /// Writes `body` for `(endpoint, params)`, atomically. Concurrent writers
    /// for the same key may race, but since responses are idempotent reads
    /// the result of the race is still a valid cache entry.
    pub fn put(&self, endpoint: &str, params: &str, body: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let final_path = self.path_for(endpoint, params);
        let tmp_path = final_path.with_extension("tmp");
        std::fs::write(&tmp_path, body)?;
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("claim-auditor-cache-test-{}", std::process::id()));
        let cache = DiskCache::new(&dir);
        cache.put("profile", "ticker=AAPL", "{\"name\":\"Apple\"}").unwrap();
        assert_eq!(cache.get("profile", "ticker=AAPL").as_deref(), Some("{\"name\":\"Apple\"}"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_key_returns_none() {
        let dir = std::env::temp_dir().join(format!("claim-auditor-cache-test-missing-{}", std::process::id()));
        let cache = DiskCache::new(&dir);
        assert!(cache.get("profile", "ticker=MSFT").is_none());
    }
}
