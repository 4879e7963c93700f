// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::{PoisonError, RwLock};

/// Resolved node facts. Empty strings mean unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedInfo {
    pub ipv4: String,
    pub ipv6: String,
}

/// Per-node cache. Writes go through [`NodeCache::set`] only.
#[derive(Debug, Default)]
pub struct NodeCache {
    inner: RwLock<CachedInfo>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached `(ipv4, ipv6)`.
    pub fn ip(&self) -> (String, String) {
        let info = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        (info.ipv4.clone(), info.ipv6.clone())
    }

    /// Applies `update` under the write lock.
    pub(crate) fn set<F>(&self, update: F)
    where
        F: FnOnce(&mut CachedInfo),
    {
        let mut info = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_cache() {
        let cache = NodeCache::new();
        assert_eq!(cache.ip(), (String::new(), String::new()));
    }

    #[test]
    fn test_set_updates_both_fields() {
        let cache = NodeCache::new();
        cache.set(|c| {
            c.ipv4 = "172.17.0.2".to_string();
            c.ipv6 = "fd00::2".to_string();
        });
        assert_eq!(
            cache.ip(),
            ("172.17.0.2".to_string(), "fd00::2".to_string())
        );
    }

    #[test]
    fn test_readers_never_see_half_update() {
        let cache = Arc::new(NodeCache::new());
        let writer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    cache.set(|c| {
                        c.ipv4 = format!("10.0.0.{}", i % 250);
                        c.ipv6 = format!("fd00::{}", i % 250);
                    });
                }
            })
        };
        for _ in 0..1000 {
            let (v4, v6) = cache.ip();
            if !v4.is_empty() {
                assert_eq!(v4.rsplit('.').next(), v6.rsplit(':').next());
            }
        }
        writer.join().unwrap();
    }
}
