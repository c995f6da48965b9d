use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use swapdeck_types::TokenInfo;

/// Resolves a mint to its name, symbol and decimals.
///
/// Resolution never fails: implementations return [`TokenInfo::unknown`]
/// when metadata cannot be obtained, and callers that need to drop unknown
/// tokens check [`TokenInfo::is_unknown`].
#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
    async fn resolve(&self, mint: &str) -> TokenInfo;
}

#[async_trait]
impl<T: TokenMetadataSource + ?Sized> TokenMetadataSource for Arc<T> {
    async fn resolve(&self, mint: &str) -> TokenInfo {
        (**self).resolve(mint).await
    }
}

/// Memoizes resolved metadata in front of another source.
///
/// The fallback sentinel is never cached, so a mint that failed once is
/// looked up again on the next call.
pub struct CachedMetadata<S> {
    inner: S,
    cache: DashMap<String, TokenInfo>,
}

impl<S: TokenMetadataSource> CachedMetadata<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<S: TokenMetadataSource> TokenMetadataSource for CachedMetadata<S> {
    async fn resolve(&self, mint: &str) -> TokenInfo {
        if let Some(hit) = self.cache.get(mint) {
            return hit.clone();
        }
        let info = self.inner.resolve(mint).await;
        if !info.is_unknown() {
            self.cache.insert(mint.to_string(), info.clone());
        }
        info
    }
}
